//! Pointing-source abstraction and hit testing.
//!
//! Every input device reduces to one capability: produce a ray. Desktop
//! mouse and touch supply normalized device coordinates unprojected through
//! the camera; phones without touch input gaze through the screen center;
//! headsets hand over a world-space ray with a confidence estimate. The
//! variant is selected once at session start and re-selected when an
//! immersive session starts or ends.

use serde::{Deserialize, Serialize};

use crate::constants::{EPSILON, ITEM_RADIUS};
use crate::item::Item;
use crate::vec3::Vec3;

/// Vertical field of view used for NDC unprojection (radians).
const FOV_Y: f64 = 75.0 * std::f64::consts::PI / 180.0;

/// Camera pose as the engine sees it: a position and a look-at target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl CameraPose {
    pub fn new(position: Vec3, look_at: Vec3) -> Self {
        Self { position, look_at }
    }

    pub fn forward(&self) -> Vec3 {
        (self.look_at - self.position).normalize()
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            look_at: Vec3::ZERO,
        }
    }
}

/// World-space ray with a confidence estimate in [0, 1].
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub confidence: f64,
}

/// Where the gaze ray comes from this session.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum PointingSource {
    /// Mouse or touch position in normalized device coordinates [-1, 1].
    Pointer { ndc_x: f64, ndc_y: f64 },
    /// Fixed gaze through the screen center (phone without touch).
    ScreenCenter,
    /// Headset- or eye-tracker-provided world-space ray.
    HeadsetRay {
        origin: Vec3,
        direction: Vec3,
        confidence: f64,
    },
}

impl PointingSource {
    /// Resolve the pointing source into a world-space ray.
    ///
    /// Low-confidence headset rays fall back to the camera's forward
    /// direction rather than jittering the hit test.
    pub fn ray(&self, camera: &CameraPose, aspect: f64) -> Ray {
        match *self {
            PointingSource::Pointer { ndc_x, ndc_y } => unproject(camera, aspect, ndc_x, ndc_y),
            PointingSource::ScreenCenter => unproject(camera, aspect, 0.0, 0.0),
            PointingSource::HeadsetRay {
                origin,
                direction,
                confidence,
            } => {
                if confidence < 0.5 || direction.length() < EPSILON {
                    Ray {
                        origin: camera.position,
                        direction: camera.forward(),
                        confidence: 0.5,
                    }
                } else {
                    Ray {
                        origin,
                        direction: direction.normalize(),
                        confidence,
                    }
                }
            }
        }
    }
}

fn unproject(camera: &CameraPose, aspect: f64, ndc_x: f64, ndc_y: f64) -> Ray {
    let forward = camera.forward();
    let world_up = Vec3::new(0.0, 1.0, 0.0);
    let mut right = forward.cross(world_up);
    if right.length() < EPSILON {
        // Looking straight up or down
        right = Vec3::new(1.0, 0.0, 0.0);
    }
    let right = right.normalize();
    let up = right.cross(forward).normalize();

    let half_h = (FOV_Y / 2.0).tan();
    let half_w = half_h * aspect;
    let direction = (forward + right * (ndc_x * half_w) + up * (ndc_y * half_h)).normalize();

    Ray {
        origin: camera.position,
        direction,
        confidence: 1.0,
    }
}

/// Nearest item intersected by the ray, as an index into `items`.
///
/// Items are hit-tested as spheres of `ITEM_RADIUS` around their position.
pub fn hit_test(ray: &Ray, items: &[Item]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, item) in items.iter().enumerate() {
        if let Some(t) = ray_sphere(ray, item.position, ITEM_RADIUS) {
            match best {
                Some((_, best_t)) if best_t <= t => {}
                _ => best = Some((i, t)),
            }
        }
    }
    best.map(|(i, _)| i)
}

/// Distance along the ray to the first intersection with a sphere, if any.
fn ray_sphere(ray: &Ray, center: Vec3, radius: f64) -> Option<f64> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let t = -b - sqrt_disc;
    if t >= 0.0 {
        return Some(t);
    }
    let t2 = -b + sqrt_disc;
    if t2 >= 0.0 {
        // Origin inside the sphere
        return Some(t2);
    }
    None
}
