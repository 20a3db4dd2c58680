//! Property tweener: interpolates body transform channels to targets.
//!
//! Tracks active tweens, performs updates, and reports completions.
//! Position and rotation are independent channels; a new tween for the
//! same (body, channel) supersedes any in-flight tween for it (last
//! caller wins). Designed for minimal allocations during the update loop.

use glam::{Quat, Vec3};
use web_time::{Duration, Instant};

use super::easing::EasingFunction;
use crate::body::{BodyId, BodySet};

/// Which transform channel a tween drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TweenChannel {
    /// World-space position (Vec3 lerp).
    Position,
    /// Orientation (Quat slerp).
    Rotation,
    /// Uniform scale (f32 lerp on all axes). Used by emphasis animations.
    Scale,
}

/// Target value for a tween, one variant per channel.
#[derive(Debug, Clone, Copy)]
enum TweenTarget {
    Position { start: Vec3, end: Vec3 },
    Rotation { start: Quat, end: Quat },
    Scale { start: Vec3, end: Vec3 },
}

impl TweenTarget {
    fn channel(&self) -> TweenChannel {
        match self {
            Self::Position { .. } => TweenChannel::Position,
            Self::Rotation { .. } => TweenChannel::Rotation,
            Self::Scale { .. } => TweenChannel::Scale,
        }
    }
}

/// Completion notice for a finished tween, drained by the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TweenComplete {
    /// The body whose channel finished animating.
    pub body: BodyId,
    /// Which channel finished.
    pub channel: TweenChannel,
}

/// An active tween being played.
#[derive(Debug)]
struct ActiveTween {
    body: BodyId,
    target: TweenTarget,
    start_time: Instant,
    duration: Duration,
    easing: EasingFunction,
    is_done: bool,
}

impl ActiveTween {
    #[inline]
    fn progress(&self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.start_time);
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }
}

/// Owns all in-flight transform tweens.
///
/// The update loop applies interpolated values directly to the
/// [`BodySet`] and collects completion events; callers drain them with
/// [`drain_completed`](Self::drain_completed) after each update so
/// lock reparenting stays sequenced relative to subsequent frames.
pub struct Tweener {
    active: Vec<ActiveTween>,
    completed: Vec<TweenComplete>,
}

impl Tweener {
    /// Create an empty tweener.
    #[must_use]
    pub fn new() -> Self {
        Self {
            // Typical case: few concurrent tweens
            active: Vec::with_capacity(16),
            completed: Vec::with_capacity(8),
        }
    }

    /// Animate a body's position to `end` over `duration`.
    ///
    /// Supersedes any in-flight position tween for the same body.
    pub fn move_to(
        &mut self,
        bodies: &BodySet,
        body: BodyId,
        end: Vec3,
        duration: Duration,
        easing: EasingFunction,
    ) {
        let Some(b) = bodies.get(body) else {
            log::warn!("move_to for unknown body {body:?}");
            return;
        };
        self.add(
            body,
            TweenTarget::Position { start: b.transform.position, end },
            duration,
            easing,
        );
    }

    /// Animate a body's rotation to `end` over `duration`.
    ///
    /// Supersedes any in-flight rotation tween for the same body.
    pub fn rotate_to(
        &mut self,
        bodies: &BodySet,
        body: BodyId,
        end: Quat,
        duration: Duration,
        easing: EasingFunction,
    ) {
        let Some(b) = bodies.get(body) else {
            log::warn!("rotate_to for unknown body {body:?}");
            return;
        };
        self.add(
            body,
            TweenTarget::Rotation { start: b.transform.rotation, end },
            duration,
            easing,
        );
    }

    /// Animate a body's uniform scale to `end` over `duration`.
    pub fn scale_to(
        &mut self,
        bodies: &BodySet,
        body: BodyId,
        end: f32,
        duration: Duration,
        easing: EasingFunction,
    ) {
        let Some(b) = bodies.get(body) else {
            return;
        };
        self.add(
            body,
            TweenTarget::Scale {
                start: b.transform.scale,
                end: Vec3::splat(end),
            },
            duration,
            easing,
        );
    }

    fn add(
        &mut self,
        body: BodyId,
        target: TweenTarget,
        duration: Duration,
        easing: EasingFunction,
    ) {
        let channel = target.channel();
        // Preempt the in-flight tween for the same (body, channel) without
        // emitting a completion for it.
        self.active
            .retain(|t| !(t.body == body && t.target.channel() == channel));
        self.active.push(ActiveTween {
            body,
            target,
            start_time: Instant::now(),
            duration,
            easing,
            is_done: false,
        });
    }

    /// Advance all tweens to `now`, writing interpolated values into the
    /// body set. Returns `true` while any tween is still running.
    ///
    /// Tweens whose body has disappeared are dropped without completing.
    pub fn update(&mut self, now: Instant, bodies: &mut BodySet) -> bool {
        for tween in &mut self.active {
            let t = tween.progress(now);
            let eased = tween.easing.evaluate(t);
            let Some(body) = bodies.get_mut(tween.body) else {
                tween.is_done = true;
                continue;
            };
            match tween.target {
                TweenTarget::Position { start, end } => {
                    body.transform.position = start.lerp(end, eased);
                }
                TweenTarget::Rotation { start, end } => {
                    body.transform.rotation = start.slerp(end, eased);
                }
                TweenTarget::Scale { start, end } => {
                    body.transform.scale = start.lerp(end, eased);
                }
            }
            if t >= 1.0 {
                tween.is_done = true;
                self.completed.push(TweenComplete {
                    body: tween.body,
                    channel: tween.target.channel(),
                });
            }
        }
        self.active.retain(|t| !t.is_done);
        !self.active.is_empty()
    }

    /// Take the completion events accumulated since the last drain.
    pub fn drain_completed(&mut self) -> Vec<TweenComplete> {
        std::mem::take(&mut self.completed)
    }

    /// Whether a tween is in flight for the given body and channel.
    #[must_use]
    pub fn is_animating(&self, body: BodyId, channel: TweenChannel) -> bool {
        self.active
            .iter()
            .any(|t| t.body == body && t.target.channel() == channel)
    }

    /// Number of active tweens.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Cancel every tween without applying final state or completing.
    pub fn cancel_all(&mut self) {
        self.active.clear();
        self.completed.clear();
    }
}

impl Default for Tweener {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{BodyShape, Transform};

    fn one_body() -> (BodySet, BodyId) {
        let mut set = BodySet::new();
        let id = set.insert(Transform::identity(), BodyShape::Simple, 1.0);
        (set, id)
    }

    #[test]
    fn zero_duration_completes_on_first_update() {
        let (mut set, id) = one_body();
        let mut tweener = Tweener::new();
        let target = Vec3::new(2.0, 0.0, 0.0);
        tweener.move_to(&set, id, target, Duration::ZERO, EasingFunction::Linear);

        let running = tweener.update(Instant::now(), &mut set);
        assert!(!running);
        assert_eq!(set.get(id).unwrap().transform.position, target);

        let done = tweener.drain_completed();
        assert_eq!(
            done,
            vec![TweenComplete { body: id, channel: TweenChannel::Position }]
        );
    }

    #[test]
    fn end_state_equals_target_within_tolerance() {
        let (mut set, id) = one_body();
        let mut tweener = Tweener::new();
        let target = Vec3::new(1.0, 2.0, 3.0);
        let start = Instant::now();
        tweener.move_to(
            &set,
            id,
            target,
            Duration::from_millis(100),
            EasingFunction::CubicOut,
        );

        // Drive past the end without sleeping.
        let _ = tweener.update(start + Duration::from_millis(250), &mut set);
        let pos = set.get(id).unwrap().transform.position;
        assert!((pos - target).length() < 1e-5);
    }

    #[test]
    fn last_caller_wins_per_channel() {
        let (mut set, id) = one_body();
        let mut tweener = Tweener::new();
        tweener.move_to(
            &set,
            id,
            Vec3::X,
            Duration::from_secs(10),
            EasingFunction::Linear,
        );
        tweener.move_to(
            &set,
            id,
            Vec3::Y,
            Duration::ZERO,
            EasingFunction::Linear,
        );
        assert_eq!(tweener.active_count(), 1);

        let _ = tweener.update(Instant::now(), &mut set);
        assert_eq!(set.get(id).unwrap().transform.position, Vec3::Y);
        // The superseded tween never completes.
        assert_eq!(tweener.drain_completed().len(), 1);
    }

    #[test]
    fn channels_are_independent() {
        let (mut set, id) = one_body();
        let mut tweener = Tweener::new();
        tweener.move_to(
            &set,
            id,
            Vec3::X,
            Duration::from_secs(10),
            EasingFunction::Linear,
        );
        tweener.rotate_to(
            &set,
            id,
            Quat::from_rotation_y(1.0),
            Duration::from_secs(10),
            EasingFunction::Linear,
        );
        assert_eq!(tweener.active_count(), 2);
        assert!(tweener.is_animating(id, TweenChannel::Position));
        assert!(tweener.is_animating(id, TweenChannel::Rotation));
    }

    #[test]
    fn missing_body_drops_tween_without_completion() {
        let (mut set, id) = one_body();
        let mut tweener = Tweener::new();
        tweener.move_to(&set, id, Vec3::X, Duration::ZERO, EasingFunction::Linear);
        let _ = set.remove(id);

        let running = tweener.update(Instant::now(), &mut set);
        assert!(!running);
        assert!(tweener.drain_completed().is_empty());
    }

    #[test]
    fn rotation_slerps_to_target() {
        let (mut set, id) = one_body();
        let mut tweener = Tweener::new();
        let target = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
        let start = Instant::now();
        tweener.rotate_to(
            &set,
            id,
            target,
            Duration::from_millis(50),
            EasingFunction::Linear,
        );
        let _ = tweener.update(start + Duration::from_millis(100), &mut set);
        let rot = set.get(id).unwrap().transform.rotation;
        assert!(rot.angle_between(target) < 1e-4);
    }
}
