//! Platform-agnostic input events and their translation to commands.

mod event;
mod processor;

pub use event::{InputEvent, MouseButton};
pub use processor::{InputProcessor, KeyBindings, KeyCommandTag};
