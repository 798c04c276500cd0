use anyhow::Result;
use galaxy_common::{SimulationParameters, StarField};
use log::debug;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Uniform;
use rayon::prelude::*;
use std::time::Instant;

/// Number of stars handled by one parallel work item. Every chunk draws from its
/// own RNG seeded with `base_seed + chunk_index`, so the output depends only on
/// the parameters and the base seed, never on how Rayon schedules the chunks.
pub const CHUNK_SIZE: usize = 4096;

/// Generates a spiral-galaxy star field.
///
/// Stars get an evenly spaced base angle over `[0, 2π × spiral_arms]`, a radius
/// of `spread × sqrt(u)` (uniform density over the disk), and are twisted by
/// `rotation × radius`. Height, age and velocity are independent uniform draws.
///
/// With `params.seed == None` a fresh base seed is taken from system randomness,
/// so repeated calls produce different fields.
pub fn generate(params: &SimulationParameters) -> Result<StarField> {
    params.validate()?;
    let base_seed = params.seed.unwrap_or_else(|| rand::rng().random());
    generate_with_seed(params, base_seed)
}

/// Unseeded generation from the four shape values.
pub fn generate_galaxy(num_stars: usize, spread: f32, spiral_arms: f32, rotation: f32) -> Result<StarField> {
    generate(&SimulationParameters {
        num_stars,
        spread,
        spiral_arms,
        rotation,
        seed: None,
    })
}

fn generate_with_seed(params: &SimulationParameters, base_seed: u64) -> Result<StarField> {
    let start_time = Instant::now();
    let num_stars = params.num_stars;
    let spread = params.spread;
    let rotation = params.rotation;
    let theta_max = params.angular_range() as f64;
    // linspace: first angle is 0, last is exactly theta_max
    let last_index = num_stars.saturating_sub(1).max(1) as f64;

    let unit_dist = Uniform::new(0.0f32, 1.0f32)?;
    let velocity_dist = Uniform::new(-0.5f32, 0.5f32)?;

    let mut field = StarField::zeroed(num_stars);
    let StarField { x, y, z, age, velocity } = &mut field;

    x.par_chunks_mut(CHUNK_SIZE)
        .zip(y.par_chunks_mut(CHUNK_SIZE))
        .zip(z.par_chunks_mut(CHUNK_SIZE))
        .zip(age.par_chunks_mut(CHUNK_SIZE))
        .zip(velocity.par_chunks_mut(CHUNK_SIZE))
        .enumerate()
        .for_each(|(chunk_idx, ((((xs, ys), zs), ages), velocities))| {
            let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(chunk_idx as u64));
            let offset = chunk_idx * CHUNK_SIZE;

            for i in 0..xs.len() {
                let theta = (theta_max * ((offset + i) as f64 / last_index)) as f32;
                let radius = spread * rng.sample(&unit_dist).sqrt();
                let angle = theta + rotation * radius;

                xs[i] = radius * angle.cos();
                ys[i] = radius * angle.sin();
                zs[i] = spread * (rng.sample(&unit_dist) - 0.5);
                ages[i] = rng.sample(&unit_dist);
                velocities[i] = [
                    rng.sample(&velocity_dist),
                    rng.sample(&velocity_dist),
                    rng.sample(&velocity_dist),
                ];
            }
        });

    debug!(
        "Generated {} stars (seed {}) in {:.2} ms.",
        num_stars,
        base_seed,
        start_time.elapsed().as_secs_f64() * 1000.0
    );
    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use galaxy_common::GalaxyError;

    fn seeded(num_stars: usize, seed: u64) -> SimulationParameters {
        SimulationParameters {
            num_stars,
            spread: 50.0,
            spiral_arms: 2.0,
            rotation: 2.0,
            seed: Some(seed),
        }
    }

    #[test]
    fn test_notebook_example_properties() {
        let field = generate_galaxy(1000, 50.0, 2.0, 2.0).unwrap();
        assert_eq!(field.len(), 1000);
        assert!(field.is_consistent());
        assert!(field.z.iter().all(|z| z.abs() <= 25.0));
        assert!(field.age.iter().all(|a| (0.0..1.0).contains(a)));
        assert!(field
            .velocity
            .iter()
            .flatten()
            .all(|v| (-0.5..0.5).contains(v)));
        assert!(field.planar_radii().iter().all(|&r| r <= 50.0 + 1e-3));
    }

    #[test]
    fn test_lengths_match_across_chunk_boundaries() {
        for n in [1, 2, CHUNK_SIZE - 1, CHUNK_SIZE, CHUNK_SIZE + 1, 3 * CHUNK_SIZE + 17] {
            let field = generate(&seeded(n, 11)).unwrap();
            assert_eq!(field.len(), n);
            assert_eq!(field.age.len(), n);
            assert_eq!(field.velocity.len(), n);
            assert!(field.is_consistent());
        }
    }

    #[test]
    fn test_zero_stars_is_invalid_parameter() {
        let err = generate_galaxy(0, 50.0, 2.0, 2.0).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GalaxyError>(),
            Some(GalaxyError::InvalidParameter { name: "num_stars", .. })
        ));
    }

    #[test]
    fn test_negative_spread_is_invalid_parameter() {
        let err = generate_galaxy(10, -1.0, 2.0, 2.0).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GalaxyError>(),
            Some(GalaxyError::InvalidParameter { name: "spread", .. })
        ));
    }

    #[test]
    fn test_unseeded_calls_differ() {
        let a = generate_galaxy(500, 50.0, 2.0, 2.0).unwrap();
        let b = generate_galaxy(500, 50.0, 2.0, 2.0).unwrap();
        assert_ne!(a.x, b.x);
    }

    #[test]
    fn test_same_seed_reproduces_field() {
        let a = generate(&seeded(10_000, 42)).unwrap();
        let b = generate(&seeded(10_000, 42)).unwrap();
        assert_eq!(a, b);

        let c = generate(&seeded(10_000, 43)).unwrap();
        assert_ne!(a.x, c.x);
    }

    #[test]
    fn test_random_draws_depend_only_on_chunk() {
        // The base angles change with the star count but the radii of the
        // first chunk come from the same RNG stream.
        let small = generate(&seeded(CHUNK_SIZE + 5, 9)).unwrap();
        let large = generate(&seeded(2 * CHUNK_SIZE, 9)).unwrap();
        let small_r = small.planar_radii();
        let large_r = large.planar_radii();
        for i in 0..CHUNK_SIZE {
            assert!((small_r[i] - large_r[i]).abs() < 1e-3, "radius mismatch at {}", i);
            assert_eq!(small.age[i], large.age[i]);
        }
    }

    #[test]
    fn test_single_star_sits_at_angle_zero() {
        let params = SimulationParameters { rotation: 0.0, ..seeded(1, 3) };
        let field = generate(&params).unwrap();
        assert_eq!(field.len(), 1);
        // angle 0 with no twist: the star lies on the positive x axis
        assert!(field.x[0] >= 0.0);
        assert!(field.y[0].abs() < 1e-4);
    }

    #[test]
    fn test_without_rotation_angles_follow_linspace() {
        let n = 200;
        let params = SimulationParameters { rotation: 0.0, spiral_arms: 1.5, ..seeded(n, 5) };
        let field = generate(&params).unwrap();
        let theta_max = params.angular_range();
        for i in 0..n {
            let theta = theta_max * i as f32 / (n - 1) as f32;
            let r = field.x[i].hypot(field.y[i]);
            assert!((field.x[i] - r * theta.cos()).abs() < 1e-3);
            assert!((field.y[i] - r * theta.sin()).abs() < 1e-3);
        }
    }

    #[test]
    fn test_rotation_twists_angle_by_radius() {
        let n = 300;
        let params = SimulationParameters { rotation: 0.7, spiral_arms: 1.0, ..seeded(n, 8) };
        let field = generate(&params).unwrap();
        let theta_max = params.angular_range();
        for i in 0..n {
            let r = field.x[i].hypot(field.y[i]);
            let angle = theta_max * i as f32 / (n - 1) as f32 + 0.7 * r;
            assert!((field.x[i] - r * angle.cos()).abs() < 1e-2);
            assert!((field.y[i] - r * angle.sin()).abs() < 1e-2);
        }
    }

    #[test]
    fn test_disk_density_is_uniform_over_area() {
        // Uniform area density puts a quarter of the stars inside half the radius;
        // sampling the radius itself uniformly would put half of them there.
        let field = generate(&seeded(40_000, 1234)).unwrap();
        let inner = field.planar_radii().iter().filter(|&&r| r < 25.0).count();
        let fraction = inner as f32 / field.len() as f32;
        assert!((0.23..0.27).contains(&fraction), "inner fraction {}", fraction);
    }

    #[test]
    fn test_zero_spread_collapses_to_origin() {
        let params = SimulationParameters { spread: 0.0, ..seeded(100, 2) };
        let field = generate(&params).unwrap();
        assert!(field.positions().all(|(x, y, z)| x == 0.0 && y == 0.0 && z == 0.0));
        assert!(field.age.iter().all(|a| (0.0..1.0).contains(a)));
    }

    #[test]
    fn test_vertical_extent_scales_with_spread() {
        let field = generate(&seeded(5000, 77)).unwrap();
        let max_z = field.z.iter().fold(0.0f32, |m, z| m.max(z.abs()));
        assert!(max_z <= 25.0);
        // with 5000 draws the slab is essentially filled
        assert!(max_z > 24.0);
    }
}
