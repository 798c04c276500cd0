use serde::{Deserialize, Serialize};
use anyhow::Result;
use crate::colorscale::ColorScale;
use crate::error::GalaxyError;
use crate::figure::Template;
use crate::params::SimulationParameters;
use std::path::Path;

// Star field generation settings
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GalaxyParamsConfig {
    pub num_stars: usize,
    pub spread: f32,
    pub spiral_arms: f32,
    pub rotation: f32,
    // Omit for a different galaxy on every run
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GalaxyParamsConfig {
    fn default() -> Self {
        let params = SimulationParameters::default();
        GalaxyParamsConfig {
            num_stars: params.num_stars,
            spread: params.spread,
            spiral_arms: params.spiral_arms,
            rotation: params.rotation,
            seed: params.seed,
        }
    }
}

// Styling applied to the figure on every rebuild
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct FigureConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_marker_size")]
    pub marker_size: f32,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub colorscale: ColorScale,
    #[serde(default)]
    pub template: Template,
    #[serde(default = "default_camera_eye")]
    pub camera_eye: [f32; 3],
}

impl Default for FigureConfig {
    fn default() -> Self {
        FigureConfig {
            title: default_title(),
            width: default_width(),
            height: default_height(),
            marker_size: default_marker_size(),
            opacity: default_opacity(),
            colorscale: ColorScale::default(),
            template: Template::default(),
            camera_eye: default_camera_eye(),
        }
    }
}

fn default_title() -> String {
    "3D Galactic Spiral with Nebula Effects".to_string()
}

fn default_width() -> u32 {
    900
}

fn default_height() -> u32 {
    700
}

fn default_marker_size() -> f32 {
    1.5
}

fn default_opacity() -> f32 {
    0.8
}

fn default_camera_eye() -> [f32; 3] {
    [1.5, 1.5, 1.0]
}

// Camera orbit: eye = (cos(i / orbit_divisor) * orbit_radius, sin(..) * orbit_radius, eye_height)
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AnimationConfig {
    #[serde(default)]
    pub steps: u32,
    #[serde(default = "default_orbit_divisor")]
    pub orbit_divisor: f32,
    #[serde(default = "default_orbit_radius")]
    pub orbit_radius: f32,
    #[serde(default = "default_eye_height")]
    pub eye_height: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        AnimationConfig {
            steps: 0,
            orbit_divisor: default_orbit_divisor(),
            orbit_radius: default_orbit_radius(),
            eye_height: default_eye_height(),
        }
    }
}

fn default_orbit_divisor() -> f32 {
    20.0
}

fn default_orbit_radius() -> f32 {
    1.5
}

fn default_eye_height() -> f32 {
    1.0
}

/// Range and step of one slider. The initial value comes from `[galaxy]`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SliderConfig {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl SliderConfig {
    fn validate(&self, name: &'static str) -> Result<(), GalaxyError> {
        if !(self.min <= self.max) {
            return Err(GalaxyError::invalid(
                name,
                format!("slider min ({}) exceeds max ({})", self.min, self.max),
            ));
        }
        if !(self.step > 0.0) {
            return Err(GalaxyError::invalid(name, format!("slider step must be positive (got {})", self.step)));
        }
        Ok(())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ControlsConfig {
    #[serde(default = "default_spread_slider")]
    pub spread: SliderConfig,
    #[serde(default = "default_spiral_arms_slider")]
    pub spiral_arms: SliderConfig,
    #[serde(default = "default_rotation_slider")]
    pub rotation: SliderConfig,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        ControlsConfig {
            spread: default_spread_slider(),
            spiral_arms: default_spiral_arms_slider(),
            rotation: default_rotation_slider(),
        }
    }
}

fn default_spread_slider() -> SliderConfig {
    SliderConfig { min: 10.0, max: 100.0, step: 1.0 }
}

fn default_spiral_arms_slider() -> SliderConfig {
    SliderConfig { min: 1.0, max: 5.0, step: 0.1 }
}

fn default_rotation_slider() -> SliderConfig {
    SliderConfig { min: 0.1, max: 5.0, step: 0.1 }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SliderKind {
    Spread,
    SpiralArms,
    Rotation,
}

/// One scripted slider change, replayed in order by the session driver.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SliderUpdate {
    pub slider: SliderKind,
    pub value: f32,
}

// Configuration for output settings, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    pub base_filename: String,
    pub save_positions: bool,
    pub format: Option<String>, // Output format: "json", "bincode", "messagepack"
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            base_filename: "galaxy".to_string(),
            save_positions: false,
            format: Some("bincode".to_string()),
        }
    }
}

// Main configuration structure, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct GalaxyConfig {
    pub galaxy: GalaxyParamsConfig,
    #[serde(default)]
    pub figure: FigureConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub controls: ControlsConfig,
    #[serde(default)]
    pub updates: Vec<SliderUpdate>,
    pub output: OutputConfig,
}

impl GalaxyConfig {
    /// Loads the configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e))?;
        let config = Self::from_toml_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Failed to load config from '{}': {}", path_ref.display(), e))?;
        Ok(config)
    }

    /// Parses and validates a configuration held in memory.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: GalaxyConfig = toml::from_str(config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every section for values the engine cannot work with.
    pub fn validate(&self) -> Result<(), GalaxyError> {
        self.simulation_parameters().validate()?;

        let figure = &self.figure;
        if figure.width == 0 || figure.height == 0 {
            return Err(GalaxyError::invalid(
                "figure.size",
                format!("width and height must be positive (got {}x{})", figure.width, figure.height),
            ));
        }
        if !(figure.marker_size > 0.0) {
            return Err(GalaxyError::invalid(
                "figure.marker_size",
                format!("must be positive (got {})", figure.marker_size),
            ));
        }
        if !(0.0..=1.0).contains(&figure.opacity) {
            return Err(GalaxyError::invalid(
                "figure.opacity",
                format!("must lie in [0, 1] (got {})", figure.opacity),
            ));
        }
        if self.animation.orbit_divisor == 0.0 {
            return Err(GalaxyError::invalid("animation.orbit_divisor", "must not be zero"));
        }

        self.controls.spread.validate("controls.spread")?;
        if self.controls.spread.min < 0.0 {
            return Err(GalaxyError::invalid(
                "controls.spread",
                format!("slider min must not be negative (got {})", self.controls.spread.min),
            ));
        }
        self.controls.spiral_arms.validate("controls.spiral_arms")?;
        self.controls.rotation.validate("controls.rotation")?;

        Ok(())
    }

    /// Converts the `[galaxy]` section into generation parameters.
    pub fn simulation_parameters(&self) -> SimulationParameters {
        SimulationParameters {
            num_stars: self.galaxy.num_stars,
            spread: self.galaxy.spread,
            spiral_arms: self.galaxy.spiral_arms,
            rotation: self.galaxy.rotation,
            seed: self.galaxy.seed,
        }
    }
}
