use serde::{Deserialize, Serialize};

/// A batch of generated stars stored as parallel arrays (SoA layout).
///
/// All arrays have the same length. `velocity` is produced by the generator but
/// nothing integrates it yet; it is kept for future time-stepped motion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StarField {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
    /// Per-star scalar in [0, 1), only used to pick a display color.
    pub age: Vec<f32>,
    /// Per-star velocity, each component in [-0.5, 0.5).
    pub velocity: Vec<[f32; 3]>,
}

impl StarField {
    /// Creates a zero-filled field for `num_stars` stars.
    pub fn zeroed(num_stars: usize) -> Self {
        Self {
            x: vec![0.0; num_stars],
            y: vec![0.0; num_stars],
            z: vec![0.0; num_stars],
            age: vec![0.0; num_stars],
            velocity: vec![[0.0; 3]; num_stars],
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// True when every array holds the same number of entries.
    pub fn is_consistent(&self) -> bool {
        let n = self.x.len();
        self.y.len() == n && self.z.len() == n && self.age.len() == n && self.velocity.len() == n
    }

    /// Iterates over `(x, y, z)` positions.
    pub fn positions(&self) -> impl Iterator<Item = (f32, f32, f32)> + '_ {
        self.x
            .iter()
            .zip(self.y.iter())
            .zip(self.z.iter())
            .map(|((&x, &y), &z)| (x, y, z))
    }

    /// Distance of each star from the rotation axis (in the disk plane).
    pub fn planar_radii(&self) -> Vec<f32> {
        self.x
            .iter()
            .zip(self.y.iter())
            .map(|(&x, &y)| (x * x + y * y).sqrt())
            .collect()
    }
}
