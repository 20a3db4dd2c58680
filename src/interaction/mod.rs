//! Pointer interaction: hover feedback, picking, and drag with a spring.
//!
//! Picking tests the pointer ray against body bounding spheres and
//! resolves hits on locked children to the assembly owner. Dragging keeps
//! the grabbed body on a ground plane through its grab point and pulls it
//! there with a damped spring. Releasing converts smoothed pointer
//! velocity into a fling.

mod layer;

pub use layer::{pick_body, DragPhase, InteractionEvent, InteractionLayer};
