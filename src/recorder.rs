use crate::simulation::GalacticSimulation;
use anyhow::Result;
use galaxy_common::{Figure, FigureSink, SimulationParameters, Snapshot};
use log::debug;

/// A headless display: every figure it is shown is kept as a [`Snapshot`].
///
/// Figures carry no parameters, so the recorder labels them with the context set
/// by [`SnapshotRecorder::set_context`] (the parameters stay fixed while the
/// camera animation runs).
#[derive(Debug, Default)]
pub struct SnapshotRecorder {
    snapshots: Vec<Snapshot>,
    parameters: SimulationParameters,
    label: String,
}

impl SnapshotRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the parameters and label attached to figures shown from now on.
    pub fn set_context(&mut self, parameters: &SimulationParameters, label: impl Into<String>) {
        self.parameters = parameters.clone();
        self.label = label.into();
    }

    /// Records the simulation's current figure under `label`.
    pub fn record(&mut self, sim: &GalacticSimulation, label: impl Into<String>) -> Result<()> {
        self.set_context(sim.parameters(), label);
        self.show(sim.figure())
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }
}

impl FigureSink for SnapshotRecorder {
    fn show(&mut self, figure: &Figure) -> Result<()> {
        let index = self.snapshots.len() as u32;
        debug!("Recording snapshot {} ({}).", index, self.label);
        self.snapshots.push(Snapshot {
            index,
            label: self.label.clone(),
            parameters: self.parameters.clone(),
            figure: figure.clone(),
        });
        Ok(())
    }
}
