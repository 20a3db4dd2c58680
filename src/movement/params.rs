//! Per-body free-float parameters with randomized defaults.

use glam::Vec3;
use rand::Rng;

/// Speed range for randomized defaults.
const SPEED_RANGE: std::ops::Range<f32> = 0.5..1.5;
/// Per-axis angular velocity range (rad per step) for randomized defaults.
const SPIN_MAX: f32 = 0.01;

/// Free-float parameters: linear speed, unit direction, and per-axis
/// angular velocity.
///
/// Missing or invalid fields are replaced by randomized defaults within
/// documented ranges: speed ∈ [0.5, 1.5], direction a random unit vector,
/// spin ∈ [0, 0.01] rad/step per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatParams {
    /// Linear speed in units per second.
    pub speed: f32,
    /// Unit travel direction.
    pub direction: Vec3,
    /// Per-axis angular velocity in radians per step.
    pub spin: Vec3,
}

impl FloatParams {
    /// Fully randomized parameters within the documented ranges.
    #[must_use]
    pub fn randomized() -> Self {
        let mut rng = rand::rng();
        Self {
            speed: rng.random_range(SPEED_RANGE),
            direction: random_unit_vector(&mut rng),
            spin: Vec3::new(
                rng.random_range(0.0..SPIN_MAX),
                rng.random_range(0.0..SPIN_MAX),
                rng.random_range(0.0..SPIN_MAX),
            ),
        }
    }

    /// Replace any invalid field (non-finite, non-positive speed, or a
    /// degenerate direction) with a randomized default.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let defaults = Self::randomized();
        let speed = if self.speed.is_finite() && self.speed > 0.0 {
            self.speed
        } else {
            defaults.speed
        };
        let direction = if self.direction.is_finite()
            && self.direction.length_squared() > 1e-6
        {
            self.direction.normalize()
        } else {
            defaults.direction
        };
        let spin = if self.spin.is_finite() { self.spin } else { defaults.spin };
        Self { speed, direction, spin }
    }
}

impl Default for FloatParams {
    fn default() -> Self {
        Self::randomized()
    }
}

fn random_unit_vector<R: Rng>(rng: &mut R) -> Vec3 {
    // Sample a cube and normalize, retrying the rare near-zero sample.
    loop {
        let v = Vec3::new(
            rng.random_range(-1.0..1.0f32),
            rng.random_range(-1.0..1.0f32),
            rng.random_range(-1.0..1.0f32),
        );
        if v.length_squared() > 1e-4 {
            return v.normalize();
        }
    }
}
