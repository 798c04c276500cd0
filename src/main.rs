use anyhow::Result;
use log::{debug, error, info};
use std::time::Instant;

mod controls;
mod generator;
mod output;
mod recorder;
mod simulation;

use controls::Controls;
use galaxy_common::GalaxyConfig;
use recorder::SnapshotRecorder;
use simulation::GalacticSimulation;

fn main() -> Result<()> {
    env_logger::init();

    info!("Starting Galaxy Engine...");

    // --- Load Configuration ---
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    info!("Loading configuration from {}", config_path);
    let config = GalaxyConfig::load(&config_path)?;
    info!("Using {} Rayon threads.", rayon::current_num_threads());

    // --- Initial Galaxy ---
    let start_time = Instant::now();
    let mut sim = GalacticSimulation::new(config)?;
    info!(
        "Generated initial galaxy with {} stars in {:.2} ms.",
        sim.star_field().len(),
        start_time.elapsed().as_secs_f64() * 1000.0
    );
    debug!("Simulation Parameters: {:#?}", sim.parameters());
    debug!("Velocity field holds {} entries (not integrated).", sim.velocities().len());

    let mut recorder = SnapshotRecorder::new();
    recorder.record(&sim, "initial")?;

    // --- Replay Slider Changes ---
    let mut controls = Controls::new(&sim.config().controls, sim.parameters());
    let updates = sim.config().updates.clone();
    if !updates.is_empty() {
        info!("Replaying {} slider changes...", updates.len());
    }
    for (i, update) in updates.iter().enumerate() {
        if let Err(e) = controls.apply(update, &mut sim) {
            error!("Error applying slider change {} ({:?}): {}", i + 1, update, e);
            anyhow::bail!("Slider change failed.");
        }
        let label = controls.describe(update);
        info!("[{}/{}] {}", i + 1, updates.len(), label);
        recorder.record(&sim, label)?;
    }

    // --- Camera Orbit ---
    let steps = sim.config().animation.steps;
    if steps > 0 {
        info!("Animating camera orbit for {} steps...", steps);
        let params = sim.parameters().clone();
        recorder.set_context(&params, "orbit");
        sim.animate(steps, &mut recorder)?;
    }

    info!(
        "Session finished in {:.3} seconds with {} snapshots ({} regenerations).",
        start_time.elapsed().as_secs_f64(),
        recorder.snapshots().len(),
        sim.regeneration_count()
    );

    // --- Save Recorded Data ---
    info!("Saving recorded data...");
    let output_config = &sim.config().output;
    output::save_snapshots(recorder.snapshots(), output_config)?;

    if output_config.save_positions {
        let filename = format!("{}_final_positions.csv", output_config.base_filename);
        output::save_positions_csv(sim.star_field(), &filename)?;
    } else {
        info!("Skipping saving final positions as per config.");
    }

    info!("Galaxy session complete.");
    Ok(())
}
