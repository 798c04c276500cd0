use galaxy_common::{clamp, AspectMode, Figure, Scatter3d, Trace, Vec3};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, Blend};

/// Half the edge length of the box the scene is scaled into. Camera eyes are
/// given in the same units.
const SCENE_HALF_EXTENT: f32 = 0.5;
/// tan(fov / 2) of the virtual camera.
const TAN_HALF_FOV: f32 = 0.4;
const NEAR_PLANE: f32 = 1e-3;

/// Per-axis factors that map data coordinates into the normalised scene box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneScale {
    factors: Vec3,
}

impl SceneScale {
    /// `Cube` stretches every axis to the same length; `Data` keeps the data's proportions.
    pub fn for_figure(figure: &Figure) -> Self {
        let mut extent = Vec3::zero();
        for trace in &figure.data {
            match trace {
                Trace::Scatter3d(scatter) => {
                    extent.x = extent.x.max(max_abs(&scatter.x));
                    extent.y = extent.y.max(max_abs(&scatter.y));
                    extent.z = extent.z.max(max_abs(&scatter.z));
                }
            }
        }

        let extent = match figure.layout.scene.aspect_mode {
            AspectMode::Cube => extent,
            AspectMode::Data => {
                let largest = extent.max_abs();
                Vec3::new(largest, largest, largest)
            }
        };
        Self {
            factors: Vec3::new(axis_factor(extent.x), axis_factor(extent.y), axis_factor(extent.z)),
        }
    }

    pub fn apply(&self, x: f32, y: f32, z: f32) -> Vec3 {
        Vec3::new(x * self.factors.x, y * self.factors.y, z * self.factors.z)
    }
}

fn max_abs(values: &[f32]) -> f32 {
    values.iter().filter(|v| v.is_finite()).fold(0.0f32, |m, v| m.max(v.abs()))
}

fn axis_factor(extent: f32) -> f32 {
    if extent > f32::EPSILON {
        SCENE_HALF_EXTENT / extent
    } else {
        0.0
    }
}

/// Perspective camera at `eye` looking at the origin with +z up.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    eye: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    focal_px: f32,
    center: (f32, f32),
}

impl Projection {
    pub fn new(eye: Vec3, width: u32, height: u32) -> Self {
        let forward = (-eye).normalize_or_zero();
        let mut right = forward.cross(Vec3::new(0.0, 0.0, 1.0)).normalize_or_zero();
        if right == Vec3::zero() {
            // looking straight down (or up) the z axis
            right = Vec3::new(0.0, -1.0, 0.0);
        }
        let up = right.cross(forward);

        Self {
            eye,
            forward,
            right,
            up,
            focal_px: width.min(height) as f32 * 0.5 / TAN_HALF_FOV,
            center: (width as f32 * 0.5, height as f32 * 0.5),
        }
    }

    /// Pixel coordinates and depth of `point`, or `None` if it is behind the camera.
    pub fn project(&self, point: Vec3) -> Option<(f32, f32, f32)> {
        let d = point - self.eye;
        let depth = d.dot(self.forward);
        if depth <= NEAR_PLANE {
            return None;
        }
        let sx = self.center.0 + d.dot(self.right) / depth * self.focal_px;
        let sy = self.center.1 - d.dot(self.up) / depth * self.focal_px;
        Some((sx, sy, depth))
    }
}

/// Renders `figure` as it would appear from its camera eye.
///
/// Points are drawn far to near as filled circles of diameter
/// `marker.size * point_scale`, alpha-blended with the marker opacity.
pub fn draw_figure(figure: &Figure, width: u32, height: u32, point_scale: f32) -> RgbaImage {
    let [r, g, b] = figure.layout.template.background();
    let mut canvas = Blend(RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255])));
    let scene = SceneScale::for_figure(figure);
    let projection = Projection::new(figure.camera_eye(), width, height);

    for trace in &figure.data {
        match trace {
            Trace::Scatter3d(scatter) => draw_scatter(&mut canvas, scatter, &scene, &projection, point_scale),
        }
    }
    canvas.0
}

fn draw_scatter(
    canvas: &mut Blend<RgbaImage>,
    scatter: &Scatter3d,
    scene: &SceneScale,
    projection: &Projection,
    point_scale: f32,
) {
    let marker = &scatter.marker;
    let colors = marker.colorscale.map_normalized(&marker.color);
    let fallback = marker.colorscale.sample(0.0);
    let alpha = (clamp(marker.opacity, 0.0, 1.0) * 255.0).round() as u8;
    let radius = (marker.size * point_scale * 0.5).round().max(0.0) as i32;

    let mut projected: Vec<(f32, f32, f32, usize)> = (0..scatter.len())
        .filter_map(|i| {
            let point = scene.apply(scatter.x[i], scatter.y[i], scatter.z[i]);
            projection.project(point).map(|(sx, sy, depth)| (sx, sy, depth, i))
        })
        .collect();
    projected.sort_by(|a, b| b.2.total_cmp(&a.2));

    for (sx, sy, _, i) in projected {
        let [r, g, b] = colors.get(i).copied().unwrap_or(fallback);
        draw_filled_circle_mut(canvas, (sx.round() as i32, sy.round() as i32), radius, Rgba([r, g, b, alpha]));
    }
}
