use serde::{Deserialize, Serialize};
use crate::error::GalaxyError;

/// Parameters for a single star-field generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Number of stars to generate. Fixed for the lifetime of a simulation.
    pub num_stars: usize,
    /// Overall radius scale of the disk. Also sets the disk thickness.
    pub spread: f32,
    /// Number of spiral windings swept by the angle (2π per arm).
    pub spiral_arms: f32,
    /// Extra angle per unit of radius; controls how tightly the spiral twists.
    pub rotation: f32,
    /// Base seed for reproducible output. `None` draws from system randomness.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            num_stars: 10_000,
            spread: 50.0,
            spiral_arms: 2.0,
            rotation: 2.0,
            seed: None,
        }
    }
}

impl SimulationParameters {
    /// Checks the constraints the generator relies on.
    /// Only the star count and the sign of `spread` are restricted.
    pub fn validate(&self) -> Result<(), GalaxyError> {
        if self.num_stars == 0 {
            return Err(GalaxyError::invalid("num_stars", "must be greater than 0"));
        }
        if self.spread < 0.0 {
            return Err(GalaxyError::invalid(
                "spread",
                format!("must not be negative (got {})", self.spread),
            ));
        }
        Ok(())
    }

    /// Returns a copy with the three interactively adjustable values replaced.
    pub fn with_shape(&self, spread: f32, spiral_arms: f32, rotation: f32) -> Self {
        Self {
            spread,
            spiral_arms,
            rotation,
            ..self.clone()
        }
    }

    /// Upper bound of the evenly spaced base angle, `2π × spiral_arms`.
    pub fn angular_range(&self) -> f32 {
        2.0 * std::f32::consts::PI * self.spiral_arms
    }
}
