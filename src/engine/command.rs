//! The engine's complete interactive vocabulary.
//!
//! Every user-facing operation, whether triggered by a key press, mouse
//! gesture, or programmatic call, is represented as an [`EngineCommand`]
//! and passed to [`Engine::execute`](super::Engine::execute).

use serde::{Deserialize, Serialize};

/// What a primary-button press on a body does.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    /// Pointer drags orbit the camera; bodies are never grabbed.
    Orbit,
    /// Pointer drags grab bodies; background drags orbit the camera.
    #[default]
    Drag,
}

/// A single engine operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineCommand {
    /// Pointer moved to normalized device coordinates (both axes in
    /// [-1, 1], +y up).
    PointerMoved {
        /// Horizontal NDC position.
        x: f32,
        /// Vertical NDC position.
        y: f32,
    },
    /// Primary button pressed.
    PointerPressed,
    /// Primary button released.
    PointerReleased,
    /// Zoom the camera; positive moves the eye away from the focus.
    Zoom {
        /// Radius change in world units.
        delta: f32,
    },
    /// Switch what pointer drags do.
    SetInteractionMode(InteractionMode),
    /// Impart a random outward impulse to every free body.
    Explode,
    /// Tween every free body back to its spawn position and zero all
    /// velocities. Existing locks are kept.
    ResetBodies,
    /// Toggle the per-frame connection indicator list.
    ToggleConnections,
    /// Toggle free-float integration.
    TogglePhysics,
}
