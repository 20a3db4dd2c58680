use serde::{Deserialize, Serialize};

/// Camera projection and control parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraOptions {
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
    /// Orbit sensitivity in radians per unit of pointer travel.
    pub rotate_speed: f32,
    /// Zoom sensitivity multiplier on scroll deltas.
    pub zoom_speed: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            fovy: 60.0,
            znear: 0.1,
            zfar: 200.0,
            rotate_speed: 2.5,
            zoom_speed: 1.0,
        }
    }
}
