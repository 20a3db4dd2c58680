//! Converts raw platform events into engine commands.
//!
//! The `InputProcessor` owns the transient input state (pointer position,
//! button state) and the key-binding map. It is the only thing between
//! raw window events and [`Engine::execute`](crate::Engine::execute).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::event::{InputEvent, MouseButton};
use crate::engine::{EngineCommand, InteractionMode};

/// Maps physical key strings to [`EngineCommand`] variants.
///
/// Key strings use the physical key-code format: `"Digit1"`, `"Space"`,
/// `"KeyR"`, etc. Only discrete commands (toggles, one-shots) make sense
/// as key bindings; pointer-parameterized commands come from the mouse
/// path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct KeyBindings {
    /// Forward map: key string → command tag.
    bindings: HashMap<String, KeyCommandTag>,
}

/// Serializable tag for the subset of [`EngineCommand`] that can be
/// key-bound (discrete, parameterless actions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyCommandTag {
    /// Switch to camera-orbit pointer mode.
    OrbitMode,
    /// Switch to body-drag pointer mode.
    DragMode,
    /// Impart a random outward impulse to every free body.
    Explode,
    /// Tween bodies back to their spawn positions.
    ResetBodies,
    /// Toggle the connection indicator list.
    ToggleConnections,
    /// Toggle free-float integration.
    TogglePhysics,
}

impl KeyCommandTag {
    /// Convert to the corresponding parameterless [`EngineCommand`].
    fn to_command(self) -> EngineCommand {
        match self {
            Self::OrbitMode => {
                EngineCommand::SetInteractionMode(InteractionMode::Orbit)
            }
            Self::DragMode => {
                EngineCommand::SetInteractionMode(InteractionMode::Drag)
            }
            Self::Explode => EngineCommand::Explode,
            Self::ResetBodies => EngineCommand::ResetBodies,
            Self::ToggleConnections => EngineCommand::ToggleConnections,
            Self::TogglePhysics => EngineCommand::TogglePhysics,
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let bindings = HashMap::from([
            ("Digit1".into(), KeyCommandTag::OrbitMode),
            ("Digit2".into(), KeyCommandTag::DragMode),
            ("Space".into(), KeyCommandTag::Explode),
            ("KeyR".into(), KeyCommandTag::ResetBodies),
            ("KeyC".into(), KeyCommandTag::ToggleConnections),
            ("KeyP".into(), KeyCommandTag::TogglePhysics),
        ]);
        Self { bindings }
    }
}

impl KeyBindings {
    /// Look up the command for a physical key string.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<EngineCommand> {
        self.bindings.get(key).map(|tag| tag.to_command())
    }
}

/// Converts raw window events into [`EngineCommand`]s.
///
/// Owns the transient pointer state and the keyboard binding map.
///
/// # Usage
///
/// ```ignore
/// // In the event loop:
/// if let Some(cmd) = input_processor.handle_event(event) {
///     engine.execute(cmd);
/// }
/// ```
pub struct InputProcessor {
    /// Last cursor position in NDC.
    cursor_ndc: (f32, f32),
    /// Whether the primary mouse button is currently held.
    mouse_pressed: bool,
    /// Key string → command mapping.
    key_bindings: KeyBindings,
}

impl InputProcessor {
    /// Create a new processor with default key bindings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cursor_ndc: (0.0, 0.0),
            mouse_pressed: false,
            key_bindings: KeyBindings::default(),
        }
    }

    /// Create a processor with custom key bindings.
    #[must_use]
    pub fn with_key_bindings(key_bindings: KeyBindings) -> Self {
        Self {
            key_bindings,
            ..Self::new()
        }
    }

    /// Last cursor position in normalized device coordinates.
    #[must_use]
    pub fn cursor_ndc(&self) -> (f32, f32) {
        self.cursor_ndc
    }

    /// Whether the primary mouse button is pressed.
    #[must_use]
    pub fn mouse_pressed(&self) -> bool {
        self.mouse_pressed
    }

    /// Read-only access to the key bindings.
    #[must_use]
    pub fn key_bindings(&self) -> &KeyBindings {
        &self.key_bindings
    }

    /// Mutable access to the key bindings for reconfiguration.
    pub fn key_bindings_mut(&mut self) -> &mut KeyBindings {
        &mut self.key_bindings
    }

    /// Process a raw input event and return zero or one commands.
    pub fn handle_event(&mut self, event: InputEvent) -> Option<EngineCommand> {
        match event {
            InputEvent::CursorMoved { x, y } => {
                self.cursor_ndc = (x, y);
                Some(EngineCommand::PointerMoved { x, y })
            }
            InputEvent::MouseButton { button, pressed } => {
                if button != MouseButton::Left {
                    return None;
                }
                self.mouse_pressed = pressed;
                Some(if pressed {
                    EngineCommand::PointerPressed
                } else {
                    EngineCommand::PointerReleased
                })
            }
            InputEvent::Scroll { delta } => Some(EngineCommand::Zoom { delta }),
            InputEvent::KeyPressed { key } => self.key_bindings.lookup(&key),
        }
    }
}

impl Default for InputProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: &str) -> InputEvent {
        InputEvent::KeyPressed { key: k.to_owned() }
    }

    #[test]
    fn default_bindings_cover_controls_surface() {
        let mut p = InputProcessor::new();
        assert_eq!(
            p.handle_event(key("Digit1")),
            Some(EngineCommand::SetInteractionMode(InteractionMode::Orbit))
        );
        assert_eq!(
            p.handle_event(key("Digit2")),
            Some(EngineCommand::SetInteractionMode(InteractionMode::Drag))
        );
        assert_eq!(p.handle_event(key("Space")), Some(EngineCommand::Explode));
        assert_eq!(p.handle_event(key("KeyR")), Some(EngineCommand::ResetBodies));
        assert_eq!(
            p.handle_event(key("KeyC")),
            Some(EngineCommand::ToggleConnections)
        );
        assert_eq!(
            p.handle_event(key("KeyP")),
            Some(EngineCommand::TogglePhysics)
        );
        assert_eq!(p.handle_event(key("KeyZ")), None);
    }

    #[test]
    fn mouse_path_produces_pointer_commands() {
        let mut p = InputProcessor::new();
        assert_eq!(
            p.handle_event(InputEvent::CursorMoved { x: 0.25, y: -0.5 }),
            Some(EngineCommand::PointerMoved { x: 0.25, y: -0.5 })
        );
        assert_eq!(p.cursor_ndc(), (0.25, -0.5));

        assert_eq!(
            p.handle_event(InputEvent::MouseButton {
                button: MouseButton::Left,
                pressed: true,
            }),
            Some(EngineCommand::PointerPressed)
        );
        assert!(p.mouse_pressed());
        // Non-primary buttons are ignored.
        assert_eq!(
            p.handle_event(InputEvent::MouseButton {
                button: MouseButton::Right,
                pressed: true,
            }),
            None
        );
        assert_eq!(
            p.handle_event(InputEvent::MouseButton {
                button: MouseButton::Left,
                pressed: false,
            }),
            Some(EngineCommand::PointerReleased)
        );
        assert!(!p.mouse_pressed());
    }

    #[test]
    fn bindings_round_trip_through_serde() {
        let bindings = KeyBindings::default();
        let toml_str = toml::to_string(&bindings).unwrap();
        let parsed: KeyBindings = toml::from_str(&toml_str).unwrap();
        assert_eq!(bindings, parsed);
    }
}
