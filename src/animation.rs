//! Per-frame light animation.
//!
//! The orbit is a pure function of elapsed wall-clock time, so dropped or
//! uneven frames never accumulate drift.

use cgmath::Point3;
use instant::Instant;

use crate::{helper::SpotLightHelper, light::SpotLight};

pub const ORBIT_RADIUS: f32 = 2.5;
/// Milliseconds per radian of orbit.
pub const ORBIT_TIME_SCALE_MS: f64 = 3000.0;

/// Position on the horizontal orbit after `elapsed_ms`, at height `y`.
pub fn orbit_position(elapsed_ms: f64, y: f32) -> Point3<f32> {
    let t = elapsed_ms / ORBIT_TIME_SCALE_MS;
    Point3::new(
        (t.cos() as f32) * ORBIT_RADIUS,
        y,
        (t.sin() as f32) * ORBIT_RADIUS,
    )
}

#[derive(Debug)]
pub struct AnimationDriver {
    start: Instant,
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    pub fn frame(&self, light: &mut SpotLight, helper: &mut SpotLightHelper) {
        Self::frame_at(self.elapsed_ms(), light, helper);
    }

    /// Moves the light along the orbit, keeping its height, and refreshes the helper.
    pub fn frame_at(elapsed_ms: f64, light: &mut SpotLight, helper: &mut SpotLightHelper) {
        light.position = orbit_position(elapsed_ms, light.position.y);
        helper.update(light);
    }
}

impl Default for AnimationDriver {
    fn default() -> Self {
        Self::new()
    }
}
