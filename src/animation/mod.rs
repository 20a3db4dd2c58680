//! Scoped animation capability: easing curves and the property tweener.
//!
//! The simulation treats smooth transitions as a capability: "animate a
//! transform channel from its current value to a target over a duration,
//! and report completion". [`Tweener`] owns all in-flight transitions;
//! completion events are drained by the frame loop, never delivered from
//! another thread.

mod easing;
mod tween;

pub use easing::EasingFunction;
pub use tween::{TweenChannel, TweenComplete, Tweener};
