use std::io::Write;

use encode::{EncodingError, FluidFrameEncoder};
use glam::Vec2;
use ndarray::Zip;
use plume_fluids::SmokeFluid2D;

pub mod as_bytes;
pub mod decode;
pub mod encode;

pub trait EncodeFluid {
    /// Grid layout, written once into the recording's metadata.
    fn encode_header<W: Write>(&self, encoder: &mut FluidFrameEncoder<W>) -> Result<(), EncodingError>;

    fn encode_state<W: Write>(&self, encoder: &mut FluidFrameEncoder<W>) -> Result<(), EncodingError>;
}

impl EncodeFluid for SmokeFluid2D {
    fn encode_header<W: Write>(&self, encoder: &mut FluidFrameEncoder<W>) -> Result<(), EncodingError> {
        let snapshot = self.snapshot();

        encoder.encode_value(snapshot.nx as u32)?;
        encoder.encode_value(snapshot.ny as u32)?;
        encoder.encode_value(snapshot.dx)?;
        encoder.encode_value(snapshot.dy)?;
        encoder.encode_section(snapshot.walls.len(), snapshot.walls.iter().copied())?;

        Ok(())
    }

    fn encode_state<W: Write>(&self, encoder: &mut FluidFrameEncoder<W>) -> Result<(), EncodingError> {
        let snapshot = self.snapshot();
        let n = snapshot.d.len();

        encoder.encode_section(n, snapshot.d.iter().copied())?;

        let velocity = Zip::from(&snapshot.u)
            .and(&snapshot.v)
            .map_collect(|&u, &v| Vec2::new(u, v));
        encoder.encode_section(n, velocity.iter().copied())?;

        Ok(())
    }
}
