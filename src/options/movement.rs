use serde::{Deserialize, Serialize};

/// Free-float integration parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MovementOptions {
    /// World half-extent; positions reflect off the boundary on each axis.
    pub bound: f32,
    /// Default strength for scene-setup attraction forces.
    pub attraction_strength: f32,
    /// Default activation distance for scene-setup attraction forces.
    pub attraction_threshold: f32,
}

impl Default for MovementOptions {
    fn default() -> Self {
        Self {
            bound: 10.0,
            attraction_strength: 0.01,
            attraction_threshold: 2.0,
        }
    }
}
