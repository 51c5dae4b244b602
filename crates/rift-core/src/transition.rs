//! Camera tweening for rupture transitions.

use serde::{Deserialize, Serialize};

use crate::vec3::Vec3;

/// Easing curve applied to the normalized tween fraction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    /// Violent start that decelerates: t^0.3.
    FastStart,
    /// Cubic ease-out, drifting to a stop.
    SlowEnd,
    /// Cubic ease-in-out that passes the target and settles back.
    #[default]
    Overshoot,
}

impl Easing {
    /// Map raw fraction `t` in [0, 1] onto the eased fraction.
    ///
    /// `Overshoot` intentionally exceeds 1.0 near the end; the tween's lerp
    /// extrapolates past the destination and settles back at t = 1.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::FastStart => t.powf(0.3),
            Easing::SlowEnd => 1.0 - (1.0 - t).powi(3),
            Easing::Overshoot => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    // Back-eased second half: peaks about 7% past the
                    // target around t = 0.78, then settles to 1
                    let u = 2.0 * t - 2.0;
                    let s = 2.0;
                    1.0 + u * u * ((s + 1.0) * u + s) / 2.0
                }
            }
        }
    }
}

/// Point-to-point camera movement over a fixed duration.
#[derive(Clone, Copy, Debug)]
pub struct Tween {
    pub from: Vec3,
    pub to: Vec3,
    pub duration_ms: u64,
    pub easing: Easing,
}

impl Tween {
    pub fn new(from: Vec3, to: Vec3, duration_ms: u64, easing: Easing) -> Self {
        Self {
            from,
            to,
            // A zero duration would divide by zero in sample()
            duration_ms: duration_ms.max(1),
            easing,
        }
    }

    /// Position at `elapsed_ms` since the tween started. Clamps at the
    /// destination once the duration is exceeded.
    pub fn sample(&self, elapsed_ms: u64) -> Vec3 {
        let t = (elapsed_ms as f64 / self.duration_ms as f64).min(1.0);
        self.from.lerp(self.to, self.easing.apply(t))
    }

    pub fn is_complete(&self, elapsed_ms: u64) -> bool {
        elapsed_ms >= self.duration_ms
    }
}
