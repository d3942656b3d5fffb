use std::path::PathBuf;

use clap::Args;
use glam::Vec2;
use indicatif::{ProgressBar, ProgressStyle};
use plume_fluids::{Scene, SmokeFluid2D, SolverConfig};
use plume_io::encode::FluidDataEncoder;
use tracing::{debug, info, info_span};

use crate::{emitter::Emitter, RunError};

#[derive(Debug, Args)]
pub struct RunArgs {
    /// JSON solver configuration. The built-in default setup is used when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of steps, used when the configuration sets no `time.t_max`.
    #[arg(short, long, default_value_t = 200)]
    pub steps: usize,

    /// Directory to record frames into.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Record one frame every this many steps.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub record_every: u64,

    /// Emitter row. Defaults to a quarter of the way up the domain.
    #[arg(long)]
    pub emitter_row: Option<usize>,

    /// Emitter column. Defaults to the middle of the domain.
    #[arg(long)]
    pub emitter_col: Option<usize>,

    /// Emitter radius, in cells.
    #[arg(long, default_value_t = 6)]
    pub emitter_radius: usize,

    /// Smoke added per unit area and step.
    #[arg(long, default_value_t = 0.5)]
    pub smoke: f32,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub push_x: f32,

    #[arg(long, default_value_t = 4.0, allow_negative_numbers = true)]
    pub push_y: f32,
}

pub fn run(args: RunArgs) -> Result<(), RunError> {
    let config = match &args.config {
        Some(path) => SolverConfig::from_json_file(path)?,
        None => SolverConfig::default(),
    };
    let steps = config.num_steps().unwrap_or(args.steps);

    let span = info_span!("solver", name = %config.name);
    let mut scene = Scene::from_config(&config, span)?;

    let grid = scene.fluid.grid();
    debug!(nx = grid.nx(), ny = grid.ny(), dx = grid.dx(), dy = grid.dy(), "grid built");

    let emitter = Emitter::new(
        grid,
        args.emitter_row.unwrap_or(grid.ny() / 4),
        args.emitter_col.unwrap_or(grid.nx() / 2),
        args.emitter_radius,
        args.smoke,
        Vec2::new(args.push_x, args.push_y),
    )?;

    let mut encoder = match args.output {
        Some(path) => Some(recorder(path, &scene, steps as u64 / args.record_every)?),
        None => None,
    };

    let bar_template = "Running Simulation {spinner:.green} [{elapsed}] [{bar:50.white/white}] {pos}/{len} ({eta})";
    let style = ProgressStyle::with_template(bar_template)?
        .progress_chars("=> ")
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    let progress = ProgressBar::new(steps as u64).with_style(style);

    emitter.apply(&mut scene.fluid)?;

    scene.run::<RunError, _>(steps, |scene| {
        progress.inc(1);

        if let Some(encoder) = encoder.as_mut() {
            if scene.steps() % args.record_every == 0 {
                encoder.encode_frame(scene)?;
            }
        }

        emitter.apply(&mut scene.fluid)?;

        Ok(())
    })?;

    progress.finish();

    info!(
        steps = scene.steps(),
        total_smoke = scene.fluid.total_smoke(),
        max_speed = scene.fluid.max_speed(),
        "finished"
    );

    Ok(())
}

fn recorder(path: PathBuf, scene: &Scene<SmokeFluid2D>, frames: u64) -> Result<FluidDataEncoder, RunError> {
    info!(path = %path.display(), frames, "recording");

    let mut encoder = FluidDataEncoder::new(path, frames)?;
    encoder.encode_metadata(scene)?;

    Ok(encoder)
}
