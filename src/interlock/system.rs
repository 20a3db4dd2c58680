//! Pairwise interlock evaluation and the lock commit sequence.
//!
//! Each registered pair walks `Idle -> Evaluating -> Locked`. Evaluation
//! scores every anchor combination in world space each step; the first
//! qualifying match commits the lock immediately (the state is terminal
//! from that instant) and starts the snap tweens. Reparenting is deferred
//! until both tween channels report completion so the mover glides onto
//! the anchor instead of teleporting.

use glam::Quat;
use rustc_hash::FxHashMap;
use web_time::Duration;

use super::pair::{CandidatePair, PairKey, PairState};
use crate::animation::{EasingFunction, TweenChannel, TweenComplete, Tweener};
use crate::body::{BodyId, BodySet};
use crate::movement::MovementSystem;

/// Body-center distance below which a pair is evaluated.
const DEFAULT_INTERACTION_DISTANCE: f32 = 1.5;
/// Minimum normal alignment (dot of facing normals) for a qualifying match.
const DEFAULT_ALIGNMENT_THRESHOLD: f32 = 0.85;
/// Duration of the snap tweens.
const DEFAULT_SNAP_DURATION: Duration = Duration::from_secs(1);

/// A committed lock waiting for its snap tweens to finish before the
/// ownership link is written.
#[derive(Debug)]
struct PendingLock {
    key: PairKey,
    parent: BodyId,
    child: BodyId,
    position_done: bool,
    rotation_done: bool,
}

/// Evaluates registered pairs for proximity and anchor alignment, and
/// performs the irreversible snap-and-lock when a match qualifies.
pub struct InterlockSystem {
    pairs: FxHashMap<PairKey, CandidatePair>,
    pending: Vec<PendingLock>,
    interaction_distance: f32,
    alignment_threshold: f32,
    snap_duration: Duration,
}

impl InterlockSystem {
    /// Create an interlock system with default thresholds.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(
            DEFAULT_INTERACTION_DISTANCE,
            DEFAULT_ALIGNMENT_THRESHOLD,
            DEFAULT_SNAP_DURATION,
        )
    }

    /// Create an interlock system with explicit thresholds.
    ///
    /// Non-finite or non-positive values fall back to the defaults.
    #[must_use]
    pub fn with_config(
        interaction_distance: f32,
        alignment_threshold: f32,
        snap_duration: Duration,
    ) -> Self {
        let interaction_distance =
            if interaction_distance.is_finite() && interaction_distance > 0.0 {
                interaction_distance
            } else {
                DEFAULT_INTERACTION_DISTANCE
            };
        let alignment_threshold = if alignment_threshold.is_finite() {
            alignment_threshold.clamp(-1.0, 1.0)
        } else {
            DEFAULT_ALIGNMENT_THRESHOLD
        };
        Self {
            pairs: FxHashMap::default(),
            pending: Vec::new(),
            interaction_distance,
            alignment_threshold,
            snap_duration,
        }
    }

    /// Track a pair for interlock evaluation. `anchor` becomes the parent
    /// and `mover` the child if the pair ever locks.
    ///
    /// Both bodies must exist and carry interlock anchors; otherwise the
    /// call warns and is a no-op. Re-registering an existing pair only
    /// updates its weight.
    pub fn register_pair(
        &mut self,
        bodies: &BodySet,
        anchor: BodyId,
        mover: BodyId,
        weight: f32,
    ) {
        if anchor == mover {
            log::warn!("register_pair: a body cannot pair with itself");
            return;
        }
        for id in [anchor, mover] {
            match bodies.get(id) {
                Some(body) if body.is_interlockable() => {}
                Some(_) => {
                    log::warn!("register_pair: body {id:?} has no interlock anchors");
                    return;
                }
                None => {
                    log::warn!("register_pair: unknown body {id:?}");
                    return;
                }
            }
        }
        let key = PairKey::new(anchor, mover);
        match self.pairs.get_mut(&key) {
            Some(pair) => pair.weight = weight.clamp(0.0, 1.0),
            None => {
                let _prev = self.pairs.insert(
                    key,
                    CandidatePair {
                        anchor,
                        mover,
                        weight: weight.clamp(0.0, 1.0),
                        state: PairState::Idle,
                    },
                );
            }
        }
    }

    /// Evaluate all registered pairs once.
    ///
    /// Qualifying matches commit immediately: the pair's state becomes
    /// `Locked` and the snap tweens start this step. Pairs whose bodies
    /// have vanished are dropped without locking.
    pub fn step(
        &mut self,
        bodies: &mut BodySet,
        movement: &MovementSystem,
        tweener: &mut Tweener,
    ) {
        self.drop_vanished(bodies);

        let keys: Vec<PairKey> = self.pairs.keys().copied().collect();
        for key in keys {
            let Some(pair) = self.pairs.get(&key).copied() else {
                continue;
            };
            if pair.is_locked() {
                continue;
            }
            // A body already claimed by another lock cannot participate;
            // the parent graph stays one level deep.
            let claimed = [pair.anchor, pair.mover]
                .iter()
                .any(|&id| bodies.get(id).is_none_or(|b| b.parent.is_some()));
            if claimed {
                continue;
            }

            let (Some(anchor_pos), Some(mover_pos)) = (
                bodies.world_position(pair.anchor),
                bodies.world_position(pair.mover),
            ) else {
                continue;
            };
            let state = if anchor_pos.distance(mover_pos) < self.interaction_distance
            {
                match self.best_match(bodies, &pair) {
                    Some((anchor_idx, mover_idx)) => {
                        self.commit_lock(
                            bodies, movement, tweener, &pair, anchor_idx, mover_idx,
                        );
                        PairState::Locked
                    }
                    None => PairState::Evaluating,
                }
            } else {
                PairState::Idle
            };
            if let Some(p) = self.pairs.get_mut(&key) {
                p.state = state;
            }
        }
    }

    /// Score every anchor combination and return the indices of the best
    /// qualifying match, if any.
    fn best_match(
        &self,
        bodies: &BodySet,
        pair: &CandidatePair,
    ) -> Option<(usize, usize)> {
        let anchor = bodies.get(pair.anchor)?;
        let mover = bodies.get(pair.mover)?;
        let anchor_points = anchor.shape.interlock_points()?;
        let mover_points = mover.shape.interlock_points()?;
        let (a_pos, a_rot) = bodies.world_pose(pair.anchor)?;
        let (m_pos, m_rot) = bodies.world_pose(pair.mover)?;

        let mut best: Option<(usize, usize)> = None;
        let mut best_score = 0.0f32;
        for (ai, ap) in anchor_points.iter().enumerate() {
            let a_world = a_pos + a_rot * ap.position;
            let a_normal = (a_rot * ap.normal).normalize();
            for (mi, mp) in mover_points.iter().enumerate() {
                let m_world = m_pos + m_rot * mp.position;
                let m_normal = (m_rot * mp.normal).normalize();
                let distance = a_world.distance(m_world);
                if distance >= self.interaction_distance {
                    continue;
                }
                // Facing normals: alignment of 1 means perfectly opposed.
                let alignment = a_normal.dot(-m_normal);
                if alignment <= self.alignment_threshold {
                    continue;
                }
                let score =
                    (1.0 - distance / self.interaction_distance) * alignment;
                if score > best_score {
                    best_score = score;
                    best = Some((ai, mi));
                }
            }
        }
        best
    }

    /// Start the snap tweens and queue the deferred reparent.
    fn commit_lock(
        &mut self,
        bodies: &BodySet,
        movement: &MovementSystem,
        tweener: &mut Tweener,
        pair: &CandidatePair,
        anchor_idx: usize,
        mover_idx: usize,
    ) {
        let Some((a_pos, a_rot)) = bodies.world_pose(pair.anchor) else {
            return;
        };
        let Some((_, m_rot)) = bodies.world_pose(pair.mover) else {
            return;
        };
        let (Some(ap), Some(mp)) = (
            bodies
                .get(pair.anchor)
                .and_then(|b| b.shape.interlock_points())
                .and_then(|pts| pts.get(anchor_idx))
                .copied(),
            bodies
                .get(pair.mover)
                .and_then(|b| b.shape.interlock_points())
                .and_then(|pts| pts.get(mover_idx))
                .copied(),
        ) else {
            return;
        };

        let a_world = a_pos + a_rot * ap.position;
        let a_normal = (a_rot * ap.normal).normalize();
        let m_normal = (m_rot * mp.normal).normalize();

        // Rotate the mover so its anchor normal opposes the target normal,
        // then place it so the two anchor points coincide.
        let target_rot =
            (Quat::from_rotation_arc(m_normal, -a_normal) * m_rot).normalize();
        let target_pos = a_world - target_rot * mp.position;

        log::info!(
            "interlock: locking {:?} onto {:?}",
            pair.mover,
            pair.anchor
        );
        tweener.rotate_to(
            bodies,
            pair.mover,
            target_rot,
            self.snap_duration,
            EasingFunction::CubicOut,
        );
        movement.smooth_move_to(
            tweener,
            bodies,
            pair.mover,
            target_pos,
            self.snap_duration,
        );
        self.pending.push(PendingLock {
            key: PairKey::new(pair.anchor, pair.mover),
            parent: pair.anchor,
            child: pair.mover,
            position_done: false,
            rotation_done: false,
        });
    }

    /// Feed a tween completion event from the frame loop.
    ///
    /// When both snap channels of a pending lock have finished, the mover
    /// is reparented under the anchor at its current world pose.
    pub fn on_tween_complete(&mut self, event: TweenComplete, bodies: &mut BodySet) {
        let mut finished: Option<usize> = None;
        for (i, lock) in self.pending.iter_mut().enumerate() {
            if lock.child != event.body {
                continue;
            }
            match event.channel {
                TweenChannel::Position => lock.position_done = true,
                TweenChannel::Rotation => lock.rotation_done = true,
                TweenChannel::Scale => {}
            }
            if lock.position_done && lock.rotation_done {
                finished = Some(i);
            }
            break;
        }
        let Some(i) = finished else {
            return;
        };
        let lock = self.pending.swap_remove(i);
        if bodies.reparent_preserving_world(lock.child, lock.parent) {
            log::info!(
                "interlock: {:?} locked under {:?}",
                lock.child,
                lock.parent
            );
        } else {
            log::warn!(
                "interlock: reparent of {:?} under {:?} failed; dropping pair",
                lock.child,
                lock.parent
            );
            let _removed = self.pairs.remove(&lock.key);
        }
    }

    fn drop_vanished(&mut self, bodies: &BodySet) {
        self.pairs.retain(|key, _| {
            let alive = bodies.contains(key.first()) && bodies.contains(key.second());
            if !alive {
                log::warn!("interlock: dropping pair {key:?} with vanished body");
            }
            alive
        });
        self.pending
            .retain(|l| bodies.contains(l.parent) && bodies.contains(l.child));
    }

    /// State of a registered pair, in either id order.
    #[must_use]
    pub fn state(&self, a: BodyId, b: BodyId) -> Option<PairState> {
        self.pairs.get(&PairKey::new(a, b)).map(|p| p.state)
    }

    /// Whether the pair has locked (commit performed or in flight).
    #[must_use]
    pub fn is_locked(&self, a: BodyId, b: BodyId) -> bool {
        self.state(a, b) == Some(PairState::Locked)
    }

    /// Number of registered pairs.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// Number of pairs in the terminal state.
    #[must_use]
    pub fn locked_count(&self) -> usize {
        self.pairs.values().filter(|p| p.is_locked()).count()
    }

    /// Iterate all registered pairs.
    pub fn pairs(&self) -> impl Iterator<Item = &CandidatePair> {
        self.pairs.values()
    }

    /// Drop every pair and pending lock. Existing parent links in the body
    /// set are not touched.
    pub fn clear(&mut self) {
        self.pairs.clear();
        self.pending.clear();
    }
}

impl Default for InterlockSystem {
    fn default() -> Self {
        Self::new()
    }
}
