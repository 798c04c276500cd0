//! Renderer-independent description of what should be on screen.
//!
//! A [`Figure`] is a list of traces plus a layout, mirroring how plotting
//! libraries describe a 3D scatter plot. The engine mutates a figure in place;
//! hosts pull it and show it through a [`FigureSink`].

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::colorscale::ColorScale;
use crate::vecmath::Vec3;

/// A capability that can display a figure (a window, an image writer, a recorder).
pub trait FigureSink {
    /// Displays the current state of `figure`. Called again after every change.
    fn show(&mut self, figure: &Figure) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Markers,
}

/// Per-point marker styling. `color` holds one scalar per point that is mapped
/// through `colorscale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub size: f32,
    pub color: Vec<f32>,
    pub colorscale: ColorScale,
    pub opacity: f32,
}

/// A 3D point cloud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scatter3d {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
    pub mode: Mode,
    pub marker: Marker,
}

impl Scatter3d {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Trace {
    Scatter3d(Scatter3d),
}

impl Trace {
    pub fn point_count(&self) -> usize {
        match self {
            Trace::Scatter3d(scatter) => scatter.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub title: String,
    pub show_grid: bool,
}

impl Axis {
    pub fn new(title: &str, show_grid: bool) -> Self {
        Self { title: title.to_string(), show_grid }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectMode {
    /// All three axes drawn with the same length regardless of data range.
    #[default]
    Cube,
    /// Axes proportional to the data range.
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    #[default]
    Dark,
    Light,
}

impl Template {
    /// Background RGB color of the template.
    pub fn background(&self) -> [u8; 3] {
        match self {
            Template::Dark => [17, 17, 17],
            Template::Light => [255, 255, 255],
        }
    }
}

/// Camera eye position, in units of the normalised (cube) scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub eye: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self { eye: Vec3::new(1.5, 1.5, 1.0) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneLayout {
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub zaxis: Axis,
    pub aspect_mode: AspectMode,
    pub camera: Camera,
}

impl Default for SceneLayout {
    fn default() -> Self {
        Self {
            xaxis: Axis::new("X", false),
            yaxis: Axis::new("Y", false),
            zaxis: Axis::new("Z", false),
            aspect_mode: AspectMode::Cube,
            camera: Camera::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub template: Template,
    pub scene: SceneLayout,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            title: String::new(),
            width: 900,
            height: 700,
            template: Template::Dark,
            scene: SceneLayout::default(),
        }
    }
}

/// Traces plus layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every trace, leaving the layout untouched.
    pub fn clear_traces(&mut self) {
        self.data.clear();
    }

    pub fn add_trace(&mut self, trace: Trace) {
        self.data.push(trace);
    }

    pub fn update_layout(&mut self, layout: Layout) {
        self.layout = layout;
    }

    pub fn set_camera_eye(&mut self, eye: Vec3) {
        self.layout.scene.camera.eye = eye;
    }

    pub fn camera_eye(&self) -> Vec3 {
        self.layout.scene.camera.eye
    }

    /// Total number of points across all traces.
    pub fn point_count(&self) -> usize {
        self.data.iter().map(Trace::point_count).sum()
    }
}
