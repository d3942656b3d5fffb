pub mod config;
pub mod error;
pub mod grid;
pub mod obstacle;
pub mod scene;
pub mod stable;

pub use config::SolverConfig;
pub use error::{ConfigError, FluidError, SchemeError};
pub use grid::Grid;
pub use scene::Scene;
pub use stable::smoke_2d::{FieldSnapshot, SmokeFluid2D, SmokeFluid2DParams};

pub trait Fluid {
    type Params;

    fn step(&mut self, dt: f32, params: &Self::Params);

    /// Locates the first NaN or infinite sample held by the fluid, if any.
    fn find_non_finite(&self) -> Option<NonFinite>;
}

/// A non-finite sample found in one of a fluid's fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NonFinite {
    pub field: &'static str,
    pub row: usize,
    pub col: usize,
}
