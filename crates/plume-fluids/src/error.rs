use thiserror::Error;

/// Invalid construction parameters.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a finite, strictly positive number, got {value}")]
    NotPositive { name: &'static str, value: f32 },

    #[error("{name} must be a finite, non-negative number, got {value}")]
    Negative { name: &'static str, value: f32 },

    #[error("fluid.smoke_fade must lie in (0, 1], got {0}")]
    Fade(f32),

    #[error("scheme.nit must be at least 1")]
    NoIterations,

    #[error("domain needs {cols} x {rows} cells, more than the supported {max}")]
    TooManyCells { cols: f32, rows: f32, max: usize },

    #[error("wall mask has shape {found:?}, expected {expected:?}")]
    MaskShape {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A scheme that cannot be wired into the solver.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemeError {
    #[error("unknown scheme `{0}`, expected `ExplicitEuler` or `ImplicitEuler`")]
    Unknown(String),

    #[error("non-square cells are not supported by the diffusion and projection schemes")]
    NonSquareUnsupported,

    #[error("scheme assumes dx == dy but the grid has dx = {dx}, dy = {dy}")]
    SpacingMismatch { dx: f32, dy: f32 },

    #[error("scheme needs at least one solver iteration")]
    NoIterations,
}

#[derive(Debug, Error)]
pub enum FluidError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scheme(#[from] SchemeError),

    #[error("cell ({row}, {col}) lies outside the {rows}x{cols} grid")]
    OutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("{field} became non-finite at ({row}, {col}) during step {step}")]
    NonFinite {
        field: &'static str,
        row: usize,
        col: usize,
        step: u64,
    },
}
