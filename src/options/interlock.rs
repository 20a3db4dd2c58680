use serde::{Deserialize, Serialize};

/// Interlock evaluation thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InterlockOptions {
    /// Body-center distance below which a pair is evaluated.
    pub interaction_distance: f32,
    /// Minimum facing-normal alignment for a qualifying match.
    pub alignment_threshold: f32,
    /// Snap tween duration in seconds.
    pub snap_duration_secs: f32,
    /// Distance below which a connection indicator is emitted.
    pub connection_distance: f32,
}

impl Default for InterlockOptions {
    fn default() -> Self {
        Self {
            interaction_distance: 1.5,
            alignment_threshold: 0.85,
            snap_duration_secs: 1.0,
            connection_distance: 2.5,
        }
    }
}
