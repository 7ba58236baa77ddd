//! Maze generation parameters.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{MazeError, Result};
use crate::grid::MAX_DIMENSION;

/// Smallest accepted height or width. The start cell has to sit strictly
/// inside the grid, so there must be an interior to choose from.
pub const MIN_DIMENSION: usize = 5;

/// Structural constraints for [`generate`](crate::generator::generate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MazeConfig {
    pub width: usize,
    pub height: usize,
    /// Probability that a cell stays a wall. Only honored in noise mode.
    #[serde(default = "default_wall_density")]
    pub wall_density: f64,
    /// Carve a connecting walk when the layout leaves the end unreachable.
    #[serde(default = "default_true")]
    pub guaranteed_path: bool,
    /// Wall off the end. Takes precedence over `guaranteed_path`.
    #[serde(default)]
    pub no_path: bool,
    #[serde(default)]
    pub unique_path: bool,
    #[serde(default)]
    pub allow_cycles: bool,
    /// Accepted and validated, but generation does not act on it yet.
    #[serde(default = "default_dead_end_density")]
    pub dead_end_density: f64,
    /// Fixed seed for reproducible mazes. `None` draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_wall_density() -> f64 {
    0.3
}

fn default_dead_end_density() -> f64 {
    0.5
}

fn default_true() -> bool {
    true
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            width: 21,
            height: 21,
            wall_density: default_wall_density(),
            guaranteed_path: true,
            no_path: false,
            unique_path: false,
            allow_cycles: false,
            dead_end_density: default_dead_end_density(),
            seed: None,
        }
    }
}

impl MazeConfig {
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            ..Self::default()
        }
    }

    /// Tree topology is forced whenever a unique path is asked for or
    /// cycles are not allowed.
    pub fn spanning_tree(&self) -> bool {
        self.unique_path || !self.allow_cycles
    }

    /// Reject out-of-range dimensions and densities.
    pub fn validate(&self) -> Result<()> {
        let range = MIN_DIMENSION..=MAX_DIMENSION;
        if !range.contains(&self.height) || !range.contains(&self.width) {
            return Err(MazeError::InvalidDimensions {
                height: self.height,
                width: self.width,
            });
        }
        check_unit("wall_density", self.wall_density)?;
        check_unit("dead_end_density", self.dead_end_density)?;
        Ok(())
    }

    /// RNG for one generation run.
    pub fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }
}

fn check_unit(field: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(MazeError::InvalidDensity { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_defaults_from_json() {
        let config: MazeConfig = serde_json::from_str(r#"{"width": 10, "height": 12}"#).unwrap();
        assert_eq!(config.width, 10);
        assert_eq!(config.height, 12);
        assert_eq!(config.wall_density, 0.3);
        assert!(config.guaranteed_path);
        assert!(!config.no_path);
        assert!(config.spanning_tree());
        assert_eq!(config.seed, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bounds() {
        assert!(matches!(
            MazeConfig::new(4, 10).validate(),
            Err(MazeError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            MazeConfig::new(10, 101).validate(),
            Err(MazeError::InvalidDimensions { .. })
        ));

        let mut config = MazeConfig::new(10, 10);
        config.wall_density = 1.5;
        assert!(matches!(
            config.validate(),
            Err(MazeError::InvalidDensity {
                field: "wall_density",
                ..
            })
        ));

        config.wall_density = 0.2;
        config.dead_end_density = -0.1;
        assert!(matches!(
            config.validate(),
            Err(MazeError::InvalidDensity {
                field: "dead_end_density",
                ..
            })
        ));
    }

    #[test]
    fn test_topology_selection() {
        let mut config = MazeConfig::new(10, 10);
        config.allow_cycles = true;
        assert!(!config.spanning_tree());
        config.unique_path = true;
        assert!(config.spanning_tree());
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let mut config = MazeConfig::new(10, 10);
        config.seed = Some(7);
        let a: u64 = config.rng().gen();
        let b: u64 = config.rng().gen();
        assert_eq!(a, b);
    }
}
