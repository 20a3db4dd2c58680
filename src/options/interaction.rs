use serde::{Deserialize, Serialize};

/// Pointer interaction feedback parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InteractionOptions {
    /// Emphasis scale applied to a hovered body.
    pub hover_emphasis: f32,
    /// Emphasis scale applied to a grabbed body.
    pub grab_emphasis: f32,
}

impl Default for InteractionOptions {
    fn default() -> Self {
        Self {
            hover_emphasis: 1.08,
            grab_emphasis: 1.15,
        }
    }
}
