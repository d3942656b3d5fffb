//! Solver configuration, loaded once at startup.

use std::path::Path;

use glam::Vec2;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    grid::Grid,
    obstacle::{circle::Circle, rectangle::Rectangle, Obstacle, ObstacleSet},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Name used in status messages.
    #[serde(default = "default_name")]
    pub name: String,
    pub domain: DomainConfig,
    pub time: TimeConfig,
    /// Walls along the domain edges.
    #[serde(default)]
    pub boundaries: BoundaryConfig,
    /// Solid shapes stamped into the wall mask.
    #[serde(default)]
    pub obstacles: Vec<ObstacleConfig>,
    pub scheme: SchemeConfig,
    pub fluid: FluidConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    pub width: f32,
    pub height: f32,
    pub base_size: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeConfig {
    pub dt: f32,
    /// Simulated duration. Zero leaves the number of steps to the caller.
    #[serde(default)]
    pub t_max: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryConfig {
    /// Bottom and top rows.
    #[serde(default)]
    pub horizontal: Boundary,
    /// Left and right columns.
    #[serde(default)]
    pub vertical: Boundary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    #[default]
    Open,
    Wall,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ObstacleConfig {
    Circle { center: [f32; 2], radius: f32 },
    Rectangle { min: [f32; 2], max: [f32; 2] },
}

impl ObstacleConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            ObstacleConfig::Circle { radius, .. } => positive("obstacle radius", radius),
            ObstacleConfig::Rectangle { min, max } => {
                positive("obstacle width", max[0] - min[0])?;
                positive("obstacle height", max[1] - min[1])
            }
        }
    }

    pub fn to_obstacle(&self) -> Box<dyn Obstacle> {
        match *self {
            ObstacleConfig::Circle { center, radius } => Box::new(Circle::new(center.into(), radius)),
            ObstacleConfig::Rectangle { min, max } => {
                Box::new(Rectangle::new(Vec2::from(min), Vec2::from(max)))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemeConfig {
    /// `ExplicitEuler` (Jacobi-relaxed diffusion) or `ImplicitEuler` (single relaxation pass).
    pub name: String,
    #[serde(rename = "dx==dy", alias = "dx_equals_dy", default = "default_true")]
    pub dx_equals_dy: bool,
    /// Jacobi iterations per diffusion and projection solve.
    pub nit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FluidConfig {
    #[serde(default = "default_fluid_name")]
    pub name: String,
    pub viscosity: f32,
    pub smoke_viscosity: f32,
    /// Multiplicative smoke decay per step.
    pub smoke_fade: f32,
}

impl SolverConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks every numeric parameter. Scheme names are resolved separately, against the grid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("domain.width", self.domain.width)?;
        positive("domain.height", self.domain.height)?;
        positive("domain.base_size", self.domain.base_size)?;
        positive("time.dt", self.time.dt)?;
        non_negative("time.t_max", self.time.t_max)?;
        non_negative("fluid.viscosity", self.fluid.viscosity)?;
        non_negative("fluid.smoke_viscosity", self.fluid.smoke_viscosity)?;

        let fade = self.fluid.smoke_fade;
        if !(fade > 0.0 && fade <= 1.0) {
            return Err(ConfigError::Fade(fade));
        }

        if self.scheme.nit == 0 {
            return Err(ConfigError::NoIterations);
        }

        self.obstacles.iter().try_for_each(ObstacleConfig::validate)
    }

    /// Builds the grid and its wall mask from the domain, boundaries and obstacles.
    pub fn build_grid(&self) -> Result<Grid, ConfigError> {
        let domain = &self.domain;
        let grid = Grid::new(domain.width, domain.height, domain.base_size, None)?;
        let (ny, nx) = grid.dim();

        let mut walls = Array2::from_elem((ny, nx), false);

        if self.boundaries.horizontal == Boundary::Wall {
            for i in 0..nx {
                walls[(0, i)] = true;
                walls[(ny - 1, i)] = true;
            }
        }

        if self.boundaries.vertical == Boundary::Wall {
            for j in 0..ny {
                walls[(j, 0)] = true;
                walls[(j, nx - 1)] = true;
            }
        }

        let obstacles = ObstacleSet::new(self.obstacles.iter().map(ObstacleConfig::to_obstacle).collect());
        obstacles.stamp(&grid, &mut walls);

        grid.with_walls(walls)
    }

    /// Number of steps covering `time.t_max`, if one was configured.
    pub fn num_steps(&self) -> Option<usize> {
        (self.time.t_max > 0.0).then(|| (self.time.t_max / self.time.dt).ceil() as usize)
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            domain: DomainConfig {
                width: 150.0,
                height: 100.0,
                base_size: 0.5,
            },
            time: TimeConfig {
                dt: 0.1,
                t_max: 0.0,
            },
            boundaries: BoundaryConfig::default(),
            obstacles: vec![],
            scheme: SchemeConfig {
                name: "ExplicitEuler".to_string(),
                dx_equals_dy: true,
                nit: 5,
            },
            fluid: FluidConfig {
                name: default_fluid_name(),
                viscosity: 1e-1,
                smoke_viscosity: 1e-3,
                smoke_fade: 0.99,
            },
        }
    }
}

fn default_name() -> String {
    "plume".to_string()
}

fn default_fluid_name() -> String {
    "air".to_string()
}

fn default_true() -> bool {
    true
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{
        "name": "TestSolver",
        "domain": { "width": 20, "height": 10, "base_size": 1 },
        "time": { "dt": 0.1, "t_max": 1.0 },
        "boundaries": { "horizontal": "wall" },
        "obstacles": [
            { "shape": "circle", "center": [10.0, 5.0], "radius": 1.2 }
        ],
        "scheme": { "name": "ImplicitEuler", "dx==dy": true, "nit": 3 },
        "fluid": {
            "name": "air",
            "viscosity": 0.1,
            "smoke_viscosity": 0.001,
            "smoke_fade": 0.99
        }
    }"#;

    #[test]
    fn parses_full_layout() {
        let config = SolverConfig::from_json_str(JSON).unwrap();

        assert_eq!(config.name, "TestSolver");
        assert_eq!(config.scheme.name, "ImplicitEuler");
        assert!(config.scheme.dx_equals_dy);
        assert_eq!(config.scheme.nit, 3);
        assert_eq!(config.boundaries.horizontal, Boundary::Wall);
        assert_eq!(config.boundaries.vertical, Boundary::Open);
        assert_eq!(config.num_steps(), Some(10));
        config.validate().unwrap();
    }

    #[test]
    fn accepts_spelled_out_square_flag() {
        let json = JSON.replace("\"dx==dy\"", "\"dx_equals_dy\"").replace("true, \"nit\"", "false, \"nit\"");
        let config = SolverConfig::from_json_str(&json).unwrap();

        assert!(!config.scheme.dx_equals_dy);
    }

    #[test]
    fn builds_walls_and_obstacles() {
        let config = SolverConfig::from_json_str(JSON).unwrap();
        let grid = config.build_grid().unwrap();
        let walls = grid.walls();

        assert_eq!(grid.dim(), (10, 20));
        assert!((0..20).all(|i| walls[(0, i)] && walls[(9, i)]));
        assert!(!walls[(5, 0)]);
        assert!(walls[(4, 9)] && walls[(4, 10)] && walls[(5, 9)] && walls[(5, 10)]);
        assert!(!walls[(2, 10)]);
        assert_eq!(grid.wall_cells().len(), 40 + 4);
    }

    #[test]
    fn default_builds_open_domain() {
        let config = SolverConfig::default();
        config.validate().unwrap();

        let grid = config.build_grid().unwrap();
        assert_eq!(grid.dim(), (200, 300));
        assert!(grid.wall_cells().is_empty());
        assert_eq!(config.num_steps(), None);
    }

    #[test]
    fn rejects_invalid_parameters() {
        let mut config = SolverConfig::default();
        config.time.dt = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::NotPositive { name: "time.dt", .. })));

        let mut config = SolverConfig::default();
        config.fluid.viscosity = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Negative { name: "fluid.viscosity", .. })));

        let mut config = SolverConfig::default();
        config.fluid.smoke_fade = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Fade(_))));

        config.fluid.smoke_fade = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Fade(_))));

        let mut config = SolverConfig::default();
        config.scheme.nit = 0;
        assert!(matches!(config.validate(), Err(ConfigError::NoIterations)));

        let mut config = SolverConfig::default();
        config.domain.base_size = -0.5;
        assert!(matches!(config.validate(), Err(ConfigError::NotPositive { .. })));

        let mut config = SolverConfig::default();
        config.obstacles.push(ObstacleConfig::Circle { center: [1.0, 1.0], radius: 0.0 });
        assert!(matches!(config.validate(), Err(ConfigError::NotPositive { name: "obstacle radius", .. })));
    }

    #[test]
    fn reports_malformed_json() {
        assert!(matches!(SolverConfig::from_json_str("{ \"name\": 3 }"), Err(ConfigError::Json(_))));
    }
}
