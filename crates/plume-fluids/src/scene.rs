use tracing::{info, Span};

use crate::{
    config::SolverConfig,
    error::FluidError,
    stable::smoke_2d::{SmokeFluid2D, SmokeFluid2DParams},
    Fluid,
};

pub struct Scene<F: Fluid> {
    /// The fluid for this scene.
    pub fluid: F,
    /// The parameters for this scene's fluid.
    params: F::Params,
    /// Fixed timestep.
    dt: f32,
    /// Name used in status messages.
    name: String,
    /// Span status messages are emitted in.
    span: Span,
    /// Number of completed steps.
    steps: u64,
}

impl<F: Fluid> Scene<F> {
    pub fn new(fluid: F, params: F::Params, dt: f32, name: impl Into<String>, span: Span) -> Self {
        let name = name.into();
        span.in_scope(|| info!("solver {name} initialised"));

        Self {
            fluid,
            params,
            dt,
            name,
            span,
            steps: 0,
        }
    }

    #[inline(always)]
    pub fn dt(&self) -> f32 {
        self.dt
    }

    #[inline(always)]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    #[inline(always)]
    pub fn params(&self) -> &F::Params {
        &self.params
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Advances the fluid by one step, failing if any field has become non-finite.
    pub fn step(&mut self) -> Result<(), FluidError> {
        self.fluid.step(self.dt, &self.params);
        self.steps += 1;

        match self.fluid.find_non_finite() {
            Some(bad) => Err(FluidError::NonFinite {
                field: bad.field,
                row: bad.row,
                col: bad.col,
                step: self.steps,
            }),
            None => Ok(()),
        }
    }

    /// Runs `steps` steps, calling `between` after each one.
    ///
    /// `between` is the only place where the fields may be inspected or injected into.
    pub fn run<E, B>(&mut self, steps: usize, mut between: B) -> Result<(), E>
    where
        E: From<FluidError>,
        B: FnMut(&mut Self) -> Result<(), E>,
    {
        self.span.in_scope(|| info!(steps, "solver {} running", self.name));

        for _step in 0..steps {
            self.step()?;
            between(self)?;
        }

        Ok(())
    }
}

impl Scene<SmokeFluid2D> {
    /// Builds a smoke scene from a validated configuration.
    pub fn from_config(config: &SolverConfig, span: Span) -> Result<Self, FluidError> {
        let fluid = SmokeFluid2D::from_config(config)?;
        let params = SmokeFluid2DParams::from_config(config);

        Ok(Self::new(fluid, params, config.time.dt, config.name.clone(), span))
    }
}
