pub mod colorscale;
pub mod config;
pub mod error;
pub mod figure;
pub mod params;
pub mod snapshot;
pub mod star_field;
pub mod vecmath;

// Re-export key types for easier use by dependent crates
pub use colorscale::{ColorScale, value_range};
pub use config::{GalaxyConfig, GalaxyParamsConfig, FigureConfig, AnimationConfig, ControlsConfig, SliderConfig, SliderKind, SliderUpdate, OutputConfig};
pub use error::GalaxyError;
pub use figure::{Figure, FigureSink, Trace, Scatter3d, Marker, Mode, Layout, SceneLayout, Axis, AspectMode, Template, Camera};
pub use params::SimulationParameters;
pub use snapshot::Snapshot;
pub use star_field::StarField;
pub use vecmath::{Vec3, orbit_point, clamp};
