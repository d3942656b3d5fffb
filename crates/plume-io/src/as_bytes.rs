use glam::Vec2;

/// Fixed-width, native-endian byte encoding.
pub trait AsBytes<const N: usize> {
    fn from_bytes(b: [u8; N]) -> Self;

    fn to_bytes(self) -> [u8; N];
}

impl AsBytes<1> for bool {
    fn from_bytes(b: [u8; 1]) -> Self {
        b[0] != 0
    }

    fn to_bytes(self) -> [u8; 1] {
        [self as u8]
    }
}

impl AsBytes<4> for u32 {
    fn from_bytes(b: [u8; 4]) -> Self {
        u32::from_ne_bytes(b)
    }

    fn to_bytes(self) -> [u8; 4] {
        self.to_ne_bytes()
    }
}

impl AsBytes<8> for u64 {
    fn from_bytes(b: [u8; 8]) -> Self {
        u64::from_ne_bytes(b)
    }

    fn to_bytes(self) -> [u8; 8] {
        self.to_ne_bytes()
    }
}

impl AsBytes<4> for f32 {
    fn from_bytes(b: [u8; 4]) -> Self {
        f32::from_ne_bytes(b)
    }

    fn to_bytes(self) -> [u8; 4] {
        self.to_ne_bytes()
    }
}

impl AsBytes<8> for Vec2 {
    fn from_bytes(b: [u8; 8]) -> Self {
        let [x0, x1, x2, x3, y0, y1, y2, y3] = b;

        Vec2::new(
            f32::from_bytes([x0, x1, x2, x3]),
            f32::from_bytes([y0, y1, y2, y3]),
        )
    }

    fn to_bytes(self) -> [u8; 8] {
        let [x0, x1, x2, x3] = self.x.to_bytes();
        let [y0, y1, y2, y3] = self.y.to_bytes();

        [x0, x1, x2, x3, y0, y1, y2, y3]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec2_keeps_component_order() {
        let v = Vec2::new(1.5, -0.25);
        let bytes = v.to_bytes();

        assert_eq!(bytes[..4], 1.5f32.to_ne_bytes());
        assert_eq!(bytes[4..], (-0.25f32).to_ne_bytes());
        assert_eq!(Vec2::from_bytes(bytes), v);
    }

    #[test]
    fn any_nonzero_byte_is_true() {
        assert!(bool::from_bytes([7]));
        assert!(!bool::from_bytes([0]));
        assert_eq!(true.to_bytes(), [1]);
    }
}
