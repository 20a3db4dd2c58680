//! Centralized engine options with TOML support.
//!
//! All tweakable settings (movement, interlock, interaction, camera,
//! keybindings) are consolidated here and serialize to/from TOML so an
//! embedding application can ship presets.

mod camera;
mod interaction;
mod interlock;
mod movement;

use std::path::Path;

pub use camera::CameraOptions;
pub use interaction::InteractionOptions;
pub use interlock::InterlockOptions;
pub use movement::MovementOptions;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::input::KeyBindings;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[interlock]`) work correctly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Options {
    /// Free-float integration parameters.
    pub movement: MovementOptions,
    /// Interlock thresholds.
    pub interlock: InterlockOptions,
    /// Pointer feedback parameters.
    pub interaction: InteractionOptions,
    /// Camera projection and control parameters.
    pub camera: CameraOptions,
    /// Keyboard binding map.
    pub keybindings: KeyBindings,
}

impl Options {
    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    /// Returns [`EngineError::Io`] when the file cannot be read and
    /// [`EngineError::OptionsParse`] on malformed TOML.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path).map_err(EngineError::Io)?;
        toml::from_str(&content)
            .map_err(|e| EngineError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    /// Returns [`EngineError::Io`] when the file cannot be written and
    /// [`EngineError::OptionsParse`] when serialization fails.
    pub fn save(&self, path: &Path) -> Result<(), EngineError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| EngineError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(EngineError::Io)?;
        }
        std::fs::write(path, content).map_err(EngineError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[interlock]
interaction_distance = 2.0
";
        let opts: Options = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.interlock.interaction_distance, 2.0);
        // Everything else should be default
        assert_eq!(opts.interlock.alignment_threshold, 0.85);
        assert_eq!(opts.movement.bound, 10.0);
    }

    #[test]
    fn keybinding_lookup_through_options() {
        use crate::engine::EngineCommand;
        let opts = Options::default();
        assert_eq!(
            opts.keybindings.lookup("Space"),
            Some(EngineCommand::Explode)
        );
        assert_eq!(opts.keybindings.lookup("KeyZ"), None);
    }
}
