use palette::{LinSrgb, Mix, Srgb};
use serde::{Deserialize, Serialize};

/// Named sequential color scales used to map a scalar in [0, 1] to a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScale {
    /// Yellow → orange → red (ColorBrewer order: pale yellow at 0, dark red at 1).
    #[default]
    YlOrRd,
    Viridis,
    Greys,
}

const YLORRD: &[[u8; 3]] = &[
    [255, 255, 204],
    [255, 237, 160],
    [254, 217, 118],
    [254, 178, 76],
    [253, 141, 60],
    [252, 78, 42],
    [227, 26, 28],
    [189, 0, 38],
    [128, 0, 38],
];

const VIRIDIS: &[[u8; 3]] = &[
    [68, 1, 84],
    [72, 40, 120],
    [62, 73, 137],
    [49, 104, 142],
    [38, 130, 142],
    [31, 158, 137],
    [53, 183, 121],
    [109, 205, 89],
    [180, 222, 44],
    [253, 231, 37],
];

const GREYS: &[[u8; 3]] = &[[255, 255, 255], [150, 150, 150], [0, 0, 0]];

impl ColorScale {
    pub fn name(&self) -> &'static str {
        match self {
            ColorScale::YlOrRd => "YlOrRd",
            ColorScale::Viridis => "Viridis",
            ColorScale::Greys => "Greys",
        }
    }

    fn stops(&self) -> &'static [[u8; 3]] {
        match self {
            ColorScale::YlOrRd => YLORRD,
            ColorScale::Viridis => VIRIDIS,
            ColorScale::Greys => GREYS,
        }
    }

    /// Samples the scale at `t` (clamped to [0, 1]; NaN maps to 0).
    /// Neighbouring control points are blended in linear RGB.
    pub fn sample(&self, t: f32) -> [u8; 3] {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let segments = (stops.len() - 1) as f32;
        let pos = t * segments;
        let lower = (pos.floor() as usize).min(stops.len() - 2);
        let frac = pos - lower as f32;

        let a = to_linear(stops[lower]);
        let b = to_linear(stops[lower + 1]);
        let mixed: Srgb<u8> = Srgb::<f32>::from_linear(a.mix(b, frac)).into_format();
        [mixed.red, mixed.green, mixed.blue]
    }

    /// Maps every value of `values` into the scale after normalising them over
    /// `[min, max]` of the slice. A constant slice maps to the bottom color.
    pub fn map_normalized(&self, values: &[f32]) -> Vec<[u8; 3]> {
        let (min, max) = value_range(values);
        let span = max - min;
        values
            .iter()
            .map(|&v| {
                let t = if span > f32::EPSILON { (v - min) / span } else { 0.0 };
                self.sample(t)
            })
            .collect()
    }
}

fn to_linear(rgb: [u8; 3]) -> LinSrgb {
    Srgb::new(rgb[0], rgb[1], rgb[2]).into_format::<f32>().into_linear()
}

/// Minimum and maximum of the finite values in `values`; `(0, 0)` when there are none.
pub fn value_range(values: &[f32]) -> (f32, f32) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &v in values.iter().filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if min > max {
        (0.0, 0.0)
    } else {
        (min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_hit_control_points() {
        assert_eq!(ColorScale::YlOrRd.sample(0.0), [255, 255, 204]);
        assert_eq!(ColorScale::YlOrRd.sample(1.0), [128, 0, 38]);
        assert_eq!(ColorScale::Greys.sample(0.0), [255, 255, 255]);
        assert_eq!(ColorScale::Greys.sample(1.0), [0, 0, 0]);
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(ColorScale::Viridis.sample(-3.0), ColorScale::Viridis.sample(0.0));
        assert_eq!(ColorScale::Viridis.sample(7.5), ColorScale::Viridis.sample(1.0));
        assert_eq!(ColorScale::Viridis.sample(f32::NAN), ColorScale::Viridis.sample(0.0));
    }

    #[test]
    fn test_ylorrd_gets_less_green_as_t_grows() {
        let mut previous = u8::MAX;
        for i in 0..=20 {
            let [_, g, _] = ColorScale::YlOrRd.sample(i as f32 / 20.0);
            assert!(g <= previous, "green channel increased at step {}", i);
            previous = g;
        }
    }

    #[test]
    fn test_map_normalized_spans_the_scale() {
        let colors = ColorScale::Greys.map_normalized(&[10.0, 15.0, 20.0]);
        assert_eq!(colors[0], [255, 255, 255]);
        assert_eq!(colors[2], [0, 0, 0]);

        let flat = ColorScale::Greys.map_normalized(&[0.3, 0.3]);
        assert_eq!(flat, vec![[255, 255, 255]; 2]);
    }

    #[test]
    fn test_value_range_ignores_non_finite() {
        assert_eq!(value_range(&[1.0, f32::NAN, -2.0, f32::INFINITY]), (-2.0, 1.0));
        assert_eq!(value_range(&[]), (0.0, 0.0));
    }

    #[test]
    fn test_deserializes_lowercase_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            scale: ColorScale,
        }
        let w: Wrapper = toml::from_str("scale = \"viridis\"").unwrap();
        assert_eq!(w.scale, ColorScale::Viridis);
    }
}
