//! Engine facade: command vocabulary and the frame loop.

mod command;
mod core;

pub use command::{EngineCommand, InteractionMode};
pub use core::Engine;
