//! Movement system: free-float kinematics, attraction forces, boundary
//! reflection and smooth one-shot moves.

mod params;
mod system;

pub use params::FloatParams;
pub use system::{AttractionForce, MovementSystem};
