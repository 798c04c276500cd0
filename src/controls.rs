use crate::simulation::GalacticSimulation;
use anyhow::Result;
use galaxy_common::{clamp, ControlsConfig, SimulationParameters, SliderConfig, SliderKind, SliderUpdate};
use log::{debug, warn};

/// A bounded numeric input with a fixed step, like a UI slider.
#[derive(Debug, Clone, PartialEq)]
pub struct Slider {
    pub description: &'static str,
    value: f32,
    min: f32,
    max: f32,
    step: f32,
}

impl Slider {
    pub fn new(description: &'static str, range: &SliderConfig, initial: f32) -> Self {
        let mut slider = Self {
            description,
            value: range.min,
            min: range.min,
            max: range.max,
            step: range.step,
        };
        slider.set(initial);
        slider
    }

    /// Moves the slider to the nearest step position of `value` within `[min, max]`
    /// and returns the value actually taken.
    pub fn set(&mut self, value: f32) -> f32 {
        let steps = ((value - self.min) / self.step).round();
        let snapped = self.min + steps * self.step;
        self.value = clamp(snapped, self.min, self.max);
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn range(&self) -> (f32, f32) {
        (self.min, self.max)
    }
}

/// The three sliders that drive a [`GalacticSimulation`].
///
/// The simulation is passed in explicitly on every change; the controls never
/// hold on to it.
#[derive(Debug, Clone)]
pub struct Controls {
    pub spread: Slider,
    pub spiral_arms: Slider,
    pub rotation: Slider,
}

impl Controls {
    /// Builds the sliders with their ranges from `config`, starting at the values in `params`.
    pub fn new(config: &ControlsConfig, params: &SimulationParameters) -> Self {
        Self {
            spread: Slider::new("Spread", &config.spread, params.spread),
            spiral_arms: Slider::new("Spiral Arms", &config.spiral_arms, params.spiral_arms),
            rotation: Slider::new("Rotation", &config.rotation, params.rotation),
        }
    }

    pub fn slider_mut(&mut self, kind: SliderKind) -> &mut Slider {
        match kind {
            SliderKind::Spread => &mut self.spread,
            SliderKind::SpiralArms => &mut self.spiral_arms,
            SliderKind::Rotation => &mut self.rotation,
        }
    }

    /// Moves one slider and pushes all three slider values into the simulation,
    /// which regenerates the galaxy. The caller shows the figure afterwards.
    /// If the simulation rejects the values the slider moves back.
    pub fn apply(&mut self, update: &SliderUpdate, sim: &mut GalacticSimulation) -> Result<()> {
        let slider = self.slider_mut(update.slider);
        let previous = slider.value();
        let applied = slider.set(update.value);
        if (applied - update.value).abs() > 1e-4 * update.value.abs().max(1.0) {
            let (min, max) = slider.range();
            warn!(
                "{} cannot take {}; snapped to {} (range [{}, {}]).",
                slider.description, update.value, applied, min, max
            );
        }
        debug!("{} = {}", slider.description, applied);

        let result = sim.update_parameters(self.spread.value(), self.spiral_arms.value(), self.rotation.value());
        if result.is_err() {
            self.slider_mut(update.slider).value = previous;
        }
        result
    }

    /// Label used when recording the display that follows `update`.
    pub fn describe(&self, update: &SliderUpdate) -> String {
        let slider = match update.slider {
            SliderKind::Spread => &self.spread,
            SliderKind::SpiralArms => &self.spiral_arms,
            SliderKind::Rotation => &self.rotation,
        };
        format!("{} = {}", slider.description, slider.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use galaxy_common::GalaxyConfig;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_slider_clamps_to_range() {
        let range = SliderConfig { min: 10.0, max: 100.0, step: 1.0 };
        let mut slider = Slider::new("Spread", &range, 50.0);
        assert_eq!(slider.value(), 50.0);
        assert_eq!(slider.set(250.0), 100.0);
        assert_eq!(slider.set(-3.0), 10.0);
    }

    #[test]
    fn test_slider_snaps_to_step() {
        let range = SliderConfig { min: 1.0, max: 5.0, step: 0.1 };
        let mut slider = Slider::new("Spiral Arms", &range, 2.0);
        assert!(approx(slider.set(2.34), 2.3));
        assert!(approx(slider.set(2.36), 2.4));

        let coarse = SliderConfig { min: 10.0, max: 100.0, step: 1.0 };
        let mut spread = Slider::new("Spread", &coarse, 50.0);
        assert_eq!(spread.set(61.6), 62.0);
    }

    #[test]
    fn test_initial_value_comes_from_parameters() {
        let params = SimulationParameters { spread: 500.0, spiral_arms: 3.0, ..Default::default() };
        let controls = Controls::new(&ControlsConfig::default(), &params);
        assert_eq!(controls.spread.value(), 100.0);
        assert!(approx(controls.spiral_arms.value(), 3.0));
        assert!(approx(controls.rotation.value(), 2.0));
    }

    #[test]
    fn test_apply_updates_simulation_with_all_sliders() {
        let mut config = GalaxyConfig::default();
        config.galaxy.num_stars = 250;
        let mut sim = GalacticSimulation::new(config.clone()).unwrap();
        let mut controls = Controls::new(&config.controls, sim.parameters());

        controls
            .apply(&SliderUpdate { slider: SliderKind::Spread, value: 60.0 }, &mut sim)
            .unwrap();
        controls
            .apply(&SliderUpdate { slider: SliderKind::Rotation, value: 0.5 }, &mut sim)
            .unwrap();

        let params = sim.parameters();
        assert_eq!(params.spread, 60.0);
        assert!(approx(params.spiral_arms, 2.0));
        assert!(approx(params.rotation, 0.5));
        assert_eq!(params.num_stars, 250);
        assert_eq!(sim.regeneration_count(), 2);
        assert_eq!(sim.figure().data.len(), 1);
    }

    #[test]
    fn test_apply_clamps_out_of_range_request() {
        let mut config = GalaxyConfig::default();
        config.galaxy.num_stars = 50;
        let mut sim = GalacticSimulation::new(config.clone()).unwrap();
        let mut controls = Controls::new(&config.controls, sim.parameters());

        let update = SliderUpdate { slider: SliderKind::Spread, value: 5000.0 };
        controls.apply(&update, &mut sim).unwrap();
        assert_eq!(sim.parameters().spread, 100.0);
        assert_eq!(controls.describe(&update), "Spread = 100");
    }

    #[test]
    fn test_rejected_change_restores_slider() {
        let mut config = GalaxyConfig::default();
        config.galaxy.num_stars = 50;
        let mut sim = GalacticSimulation::new(config.clone()).unwrap();
        // a range the simulation cannot honour, built directly rather than loaded
        let mut ranges = config.controls.clone();
        ranges.spread = SliderConfig { min: -10.0, max: 100.0, step: 1.0 };
        let mut controls = Controls::new(&ranges, sim.parameters());

        let bad = SliderUpdate { slider: SliderKind::Spread, value: -5.0 };
        assert!(controls.apply(&bad, &mut sim).is_err());
        assert_eq!(controls.spread.value(), 50.0);
        assert_eq!(sim.parameters().spread, 50.0);
        assert_eq!(sim.regeneration_count(), 0);

        // later changes are not poisoned by the rejected spread
        controls
            .apply(&SliderUpdate { slider: SliderKind::Rotation, value: 1.0 }, &mut sim)
            .unwrap();
        assert!(approx(sim.parameters().rotation, 1.0));
        assert_eq!(sim.parameters().spread, 50.0);
    }
}
