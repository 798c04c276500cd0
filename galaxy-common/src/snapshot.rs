use serde::{Serialize, Deserialize};
use crate::figure::Figure;
use crate::params::SimulationParameters;

/// A copy of the figure taken each time it was shown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Position of this snapshot in the recording (0-based).
    pub index: u32,
    /// What caused the display, e.g. "initial", "Spread = 60" or "orbit".
    pub label: String,
    /// Parameters the star field in `figure` was generated from.
    pub parameters: SimulationParameters,
    pub figure: Figure,
}
