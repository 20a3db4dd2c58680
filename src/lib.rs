//! Real-time movement and interlock engine for interactive 3D bodies.
//!
//! Bodies float freely inside a bounded volume, can be picked up and
//! dragged with a spring, and permanently snap into parent/child
//! assemblies when compatible anchors come close and align. The crate is
//! renderer-agnostic: it owns transforms, kinematics, interaction state
//! and lock topology, and an embedding application draws whatever meshes
//! it likes on top.
//!
//! # Key entry points
//!
//! - [`engine::Engine`] - owns every subsystem and advances one frame at
//!   a time
//! - [`engine::EngineCommand`] - the complete interactive vocabulary
//! - [`shape::ShapeProvider`] - the boundary where mesh construction
//!   hands the simulation its anchor layouts
//! - [`options::Options`] - runtime configuration with TOML presets
//!
//! # Architecture
//!
//! Each frame runs a fixed pipeline: camera easing, free-float
//! integration ([`movement`]), the drag spring ([`interaction`]), tween
//! application ([`animation`]), deferred lock reparenting, the interlock
//! scan ([`interlock`]) and the connection-indicator refresh. Entity
//! failures are dropped and logged; the loop never halts.

pub mod animation;
pub mod body;
pub mod camera;
pub mod engine;
pub mod error;
pub mod input;
pub mod interaction;
pub mod interlock;
pub mod movement;
pub mod options;
pub mod shape;
pub mod util;

pub use engine::{Engine, EngineCommand, InteractionMode};
pub use error::EngineError;
pub use options::Options;
