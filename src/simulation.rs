use crate::generator::generate;
use anyhow::Result;
use galaxy_common::{
    orbit_point, Axis, FigureConfig, Figure, FigureSink, GalaxyConfig, Layout, Marker, Mode,
    Scatter3d, SceneLayout, SimulationParameters, StarField, Trace, Vec3, AspectMode, Camera,
};
use log::{debug, trace};
use std::time::Instant;

/// Holds the current parameters, the latest star field and the figure built from it.
///
/// Every parameter change regenerates the whole field and rebuilds the figure in
/// place. Hosts read the result through [`GalacticSimulation::figure`] and show it
/// again; nothing is pushed to them.
pub struct GalacticSimulation {
    /// The configuration the simulation was created from (figure style, animation).
    config: GalaxyConfig,
    /// Parameters of the star field currently in `star_field`.
    params: SimulationParameters,
    /// The latest generated field. Velocities are kept but nothing reads them yet.
    star_field: StarField,
    figure: Figure,
    /// Number of regenerations since construction (the initial one is not counted).
    regenerations: u64,
}

impl GalacticSimulation {
    /// Creates a simulation from `config` and generates the initial galaxy.
    pub fn new(config: GalaxyConfig) -> Result<Self> {
        config.validate()?;
        let params = config.simulation_parameters();
        let star_field = generate(&params)?;

        let mut sim = Self {
            config,
            params,
            star_field,
            figure: Figure::new(),
            regenerations: 0,
        };
        sim.rebuild_figure();
        Ok(sim)
    }

    /// Regenerates the star field from the current parameters and rebuilds the figure.
    ///
    /// The previous field (velocities included) is dropped and every existing trace
    /// is removed before the new point cloud is added. If generation fails nothing
    /// is modified.
    pub fn update_galaxy(&mut self) -> Result<()> {
        let start_time = Instant::now();
        self.star_field = generate(&self.params)?;
        self.rebuild_figure();
        self.regenerations += 1;

        debug!(
            "Rebuilt galaxy #{} (spread {:.1}, arms {:.2}, rotation {:.2}) in {:.2} ms.",
            self.regenerations,
            self.params.spread,
            self.params.spiral_arms,
            self.params.rotation,
            start_time.elapsed().as_secs_f64() * 1000.0
        );
        Ok(())
    }

    /// Replaces the three adjustable parameters and regenerates. `num_stars` is
    /// never changed here. On failure the previous parameters are restored.
    pub fn update_parameters(&mut self, spread: f32, spiral_arms: f32, rotation: f32) -> Result<()> {
        let updated = self.params.with_shape(spread, spiral_arms, rotation);
        let previous = std::mem::replace(&mut self.params, updated);
        if let Err(e) = self.update_galaxy() {
            self.params = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Orbits the camera around the galaxy, showing the figure once per step.
    ///
    /// Step `i` places the eye at `(cos(i / d) * r, sin(i / d) * r, h)` with `d`, `r`
    /// and `h` from the animation config. Star data is not touched.
    pub fn animate<S: FigureSink>(&mut self, steps: u32, sink: &mut S) -> Result<()> {
        let animation = &self.config.animation;
        let (divisor, radius, height) = (animation.orbit_divisor, animation.orbit_radius, animation.eye_height);

        for step in 0..steps {
            let eye = orbit_point(step as f32 / divisor, radius, height);
            self.figure.set_camera_eye(eye);
            trace!("Animation step {}/{}: eye at ({:.3}, {:.3}, {:.3})", step + 1, steps, eye.x, eye.y, eye.z);
            sink.show(&self.figure)?;
        }
        Ok(())
    }

    fn rebuild_figure(&mut self) {
        let style = &self.config.figure;
        self.figure.clear_traces();
        self.figure.add_trace(Trace::Scatter3d(point_cloud(&self.star_field, style)));
        self.figure.update_layout(figure_layout(style));
    }

    pub fn figure(&self) -> &Figure {
        &self.figure
    }

    pub fn star_field(&self) -> &StarField {
        &self.star_field
    }

    /// Velocities of the current field. Generated but not yet integrated.
    pub fn velocities(&self) -> &[[f32; 3]] {
        &self.star_field.velocity
    }

    pub fn parameters(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn config(&self) -> &GalaxyConfig {
        &self.config
    }

    pub fn regeneration_count(&self) -> u64 {
        self.regenerations
    }
}

/// One marker trace, colored by star age.
fn point_cloud(field: &StarField, style: &FigureConfig) -> Scatter3d {
    Scatter3d {
        x: field.x.clone(),
        y: field.y.clone(),
        z: field.z.clone(),
        mode: Mode::Markers,
        marker: Marker {
            size: style.marker_size,
            color: field.age.clone(),
            colorscale: style.colorscale,
            opacity: style.opacity,
        },
    }
}

fn figure_layout(style: &FigureConfig) -> Layout {
    Layout {
        title: style.title.clone(),
        width: style.width,
        height: style.height,
        template: style.template,
        scene: SceneLayout {
            xaxis: Axis::new("X", false),
            yaxis: Axis::new("Y", false),
            zaxis: Axis::new("Z", false),
            aspect_mode: AspectMode::Cube,
            camera: Camera { eye: Vec3::from(style.camera_eye) },
        },
    }
}
