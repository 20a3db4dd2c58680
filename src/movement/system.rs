//! Per-frame kinematic integrator.
//!
//! Movement is best-effort and self-healing: malformed entries are dropped
//! from the active set on the next step rather than raising, and the frame
//! loop never halts on a bad body.

use glam::{EulerRot, Quat, Vec3};
use web_time::Duration;

use super::params::FloatParams;
use crate::animation::{EasingFunction, Tweener};
use crate::body::{BodyId, BodySet};

/// World half-extent; positions reflect off ±`BOUND` on each axis.
const BOUND: f32 = 10.0;
/// Upper clamp on `dt` to prevent instability from frame hitches.
const MAX_STEP: f32 = 0.1;
/// Minimum separation below which attraction direction is degenerate.
const MIN_SEPARATION: f32 = 0.1;
/// Per-step decay applied to residual (fling/impulse) velocity.
const VELOCITY_DAMPING: f32 = 0.995;
/// Residual velocity is expressed per-frame at 60 Hz; scale into seconds.
const VELOCITY_SCALE: f32 = 60.0;
/// Restitution applied to residual velocity on boundary contact.
const BOUNCE_RESTITUTION: f32 = 0.7;

/// A directed pull of `source` toward `target`, active only below the
/// activation distance. Purely additive; carries no state beyond its
/// parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttractionForce {
    /// The body being pulled.
    pub source: BodyId,
    /// The body it is pulled toward.
    pub target: BodyId,
    /// Fraction of the separation covered per second.
    pub strength: f32,
    /// Activation distance threshold.
    pub threshold: f32,
}

#[derive(Debug)]
struct FloatEntry {
    body: BodyId,
    params: FloatParams,
}

/// Owns per-body kinematic state and the two force contributors:
/// free-floating drift with boundary reflection, and pairwise attraction.
pub struct MovementSystem {
    entries: Vec<FloatEntry>,
    attractions: Vec<AttractionForce>,
    bound: f32,
}

impl MovementSystem {
    /// Create an empty movement system with the default world bound.
    #[must_use]
    pub fn new() -> Self {
        Self::with_bound(BOUND)
    }

    /// Create a movement system with a custom world half-extent.
    #[must_use]
    pub fn with_bound(bound: f32) -> Self {
        Self {
            entries: Vec::new(),
            attractions: Vec::new(),
            bound,
        }
    }

    /// Register a body for free-floating integration.
    ///
    /// Invalid parameter fields are replaced by randomized defaults.
    /// Bodies lacking a valid (finite) transform are rejected with a
    /// warning; registration is a no-op for them.
    pub fn add_body(
        &mut self,
        bodies: &BodySet,
        id: BodyId,
        params: Option<FloatParams>,
    ) {
        let Some(body) = bodies.get(id) else {
            log::warn!("add_body: unknown body {id:?}");
            return;
        };
        if !body.transform.is_finite() {
            log::warn!("add_body: body {id:?} has an invalid transform");
            return;
        }
        let params = params.map_or_else(FloatParams::randomized, FloatParams::sanitized);
        match self.entries.iter_mut().find(|e| e.body == id) {
            Some(entry) => entry.params = params,
            None => self.entries.push(FloatEntry { body: id, params }),
        }
    }

    /// Remove a body from the active set (no-op if absent).
    pub fn remove_body(&mut self, id: BodyId) {
        self.entries.retain(|e| e.body != id);
        self.attractions
            .retain(|f| f.source != id && f.target != id);
    }

    /// Register a one-directional pull of `source` toward `target`.
    pub fn add_attraction(
        &mut self,
        source: BodyId,
        target: BodyId,
        strength: f32,
        threshold: f32,
    ) {
        if source == target {
            log::warn!("add_attraction: source and target are the same body");
            return;
        }
        self.attractions.push(AttractionForce {
            source,
            target,
            strength,
            threshold,
        });
    }

    /// Current free-float parameters for a body, if registered.
    #[must_use]
    pub fn params(&self, id: BodyId) -> Option<&FloatParams> {
        self.entries.iter().find(|e| e.body == id).map(|e| &e.params)
    }

    /// Number of registered free-floating bodies.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.entries.len()
    }

    /// Drop all registered bodies and forces.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.attractions.clear();
    }

    /// Advance all registered bodies by `dt` seconds.
    ///
    /// The active drag target and locked children are skipped; their
    /// positions are driven elsewhere. `dt` is clamped to a small maximum
    /// so frame hitches cannot destabilize the integration.
    pub fn step(
        &mut self,
        dt: f32,
        bodies: &mut BodySet,
        drag_target: Option<BodyId>,
    ) {
        let dt = dt.clamp(0.0, MAX_STEP);
        let bound = self.bound;

        self.entries.retain_mut(|entry| {
            let Some(body) = bodies.get_mut(entry.body) else {
                log::warn!("movement: dropping vanished body {:?}", entry.body);
                return false;
            };
            if !body.transform.is_finite() {
                log::warn!(
                    "movement: dropping body {:?} with invalid transform",
                    entry.body
                );
                return false;
            }
            if Some(entry.body) == drag_target || body.parent.is_some() {
                return true;
            }

            let p = &mut entry.params;
            body.transform.position += p.direction * p.speed * dt;

            // Residual velocity from flings and impulses decays toward
            // zero and is expressed per-frame at a 60 Hz reference rate.
            body.transform.position += body.velocity * dt * VELOCITY_SCALE;
            body.velocity *= VELOCITY_DAMPING;

            let spin = p.spin * dt;
            body.transform.rotation = (body.transform.rotation
                * Quat::from_euler(EulerRot::XYZ, spin.x, spin.y, spin.z))
            .normalize();

            // Elastic boundary reflection: flip only the offending axis's
            // sign, and only while still heading outward, so a single
            // crossing flips exactly once.
            let pos = body.transform.position;
            for axis in 0..3 {
                if pos[axis] > bound && p.direction[axis] > 0.0
                    || pos[axis] < -bound && p.direction[axis] < 0.0
                {
                    p.direction[axis] = -p.direction[axis];
                    if body.velocity[axis].signum() == pos[axis].signum() {
                        body.velocity[axis] *= -BOUNCE_RESTITUTION;
                    }
                }
            }
            true
        });

        self.apply_attractions(dt, bodies);
    }

    fn apply_attractions(&mut self, dt: f32, bodies: &mut BodySet) {
        // Forces persist for the scene lifetime; endpoints that vanished
        // are simply skipped this frame.
        for force in &self.attractions {
            let (Some(src), Some(dst)) = (
                bodies.world_position(force.source),
                bodies.world_position(force.target),
            ) else {
                continue;
            };
            let separation = dst - src;
            let distance = separation.length();
            if distance < force.threshold && distance > MIN_SEPARATION {
                let pull = separation / distance * force.strength * dt;
                if let Some(body) = bodies.get_mut(force.source) {
                    if body.parent.is_none() {
                        body.transform.position += pull;
                    }
                }
            }
        }
    }

    /// Request a smooth one-shot move of a body's position.
    ///
    /// Delegates to the tween capability; does not block the integrator.
    /// Concurrent calls for the same body cancel the previous tween (last
    /// caller wins).
    pub fn smooth_move_to(
        &self,
        tweener: &mut Tweener,
        bodies: &BodySet,
        id: BodyId,
        target: Vec3,
        duration: Duration,
    ) {
        tweener.move_to(bodies, id, target, duration, EasingFunction::CubicOut);
    }
}

impl Default for MovementSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{BodyShape, Transform};

    fn body_at(set: &mut BodySet, pos: Vec3) -> BodyId {
        set.insert(Transform::from_position(pos), BodyShape::Simple, 1.0)
    }

    fn fixed_params(direction: Vec3, speed: f32) -> FloatParams {
        FloatParams {
            speed,
            direction,
            spin: Vec3::ZERO,
        }
    }

    #[test]
    fn pure_integration_matches_velocity_integral() {
        let mut set = BodySet::new();
        let id = body_at(&mut set, Vec3::ZERO);
        let mut sys = MovementSystem::new();
        sys.add_body(&set, id, Some(fixed_params(Vec3::X, 1.0)));

        let dt = 0.016;
        let steps = 100;
        for _ in 0..steps {
            sys.step(dt, &mut set, None);
        }
        let expected = Vec3::X * 1.0 * dt * steps as f32;
        let pos = set.get(id).unwrap().transform.position;
        assert!((pos - expected).length() < 1e-3);
    }

    #[test]
    fn boundary_flips_offending_axis_once() {
        let mut set = BodySet::new();
        let id = body_at(&mut set, Vec3::new(9.99, 0.0, 0.0));
        let mut sys = MovementSystem::new();
        let dir = Vec3::new(1.0, 0.0, 0.0);
        sys.add_body(&set, id, Some(fixed_params(dir, 5.0)));

        // First step crosses the bound and flips x.
        sys.step(0.1, &mut set, None);
        let p = sys.params(id).unwrap();
        assert_eq!(p.direction.x, -1.0);
        assert_eq!(p.direction.y, 0.0);
        assert_eq!(p.direction.z, 0.0);

        // Next step heads inward: no second flip even if still outside.
        sys.step(0.01, &mut set, None);
        assert_eq!(sys.params(id).unwrap().direction.x, -1.0);
    }

    #[test]
    fn drag_target_is_skipped() {
        let mut set = BodySet::new();
        let id = body_at(&mut set, Vec3::ZERO);
        let mut sys = MovementSystem::new();
        sys.add_body(&set, id, Some(fixed_params(Vec3::X, 1.0)));

        sys.step(0.1, &mut set, Some(id));
        assert_eq!(set.get(id).unwrap().transform.position, Vec3::ZERO);
    }

    #[test]
    fn locked_child_is_skipped() {
        let mut set = BodySet::new();
        let parent = body_at(&mut set, Vec3::ZERO);
        let child = body_at(&mut set, Vec3::X);
        assert!(set.reparent_preserving_world(child, parent));
        let mut sys = MovementSystem::new();
        sys.add_body(&set, child, Some(fixed_params(Vec3::X, 1.0)));

        let local_before = set.get(child).unwrap().transform.position;
        sys.step(0.1, &mut set, None);
        assert_eq!(set.get(child).unwrap().transform.position, local_before);
    }

    #[test]
    fn attraction_only_below_threshold() {
        let mut set = BodySet::new();
        let a = body_at(&mut set, Vec3::ZERO);
        let b = body_at(&mut set, Vec3::new(5.0, 0.0, 0.0));
        let mut sys = MovementSystem::new();
        sys.add_attraction(a, b, 0.5, 2.0);

        sys.step(0.1, &mut set, None);
        // Distance 5 > threshold 2: no pull.
        assert_eq!(set.get(a).unwrap().transform.position, Vec3::ZERO);

        set.get_mut(b).unwrap().transform.position = Vec3::new(1.0, 0.0, 0.0);
        sys.step(0.1, &mut set, None);
        let pos = set.get(a).unwrap().transform.position;
        assert!(pos.x > 0.0, "source should move toward target");
    }

    #[test]
    fn attraction_guards_minimum_separation() {
        let mut set = BodySet::new();
        let a = body_at(&mut set, Vec3::ZERO);
        let b = body_at(&mut set, Vec3::new(0.05, 0.0, 0.0));
        let mut sys = MovementSystem::new();
        sys.add_attraction(a, b, 0.5, 2.0);

        sys.step(0.1, &mut set, None);
        assert_eq!(set.get(a).unwrap().transform.position, Vec3::ZERO);
    }

    #[test]
    fn vanished_body_is_dropped_not_fatal() {
        let mut set = BodySet::new();
        let id = body_at(&mut set, Vec3::ZERO);
        let mut sys = MovementSystem::new();
        sys.add_body(&set, id, Some(fixed_params(Vec3::X, 1.0)));
        let _ = set.remove(id);

        sys.step(0.1, &mut set, None);
        assert_eq!(sys.body_count(), 0);
    }

    #[test]
    fn add_body_rejects_invalid_transform() {
        let mut set = BodySet::new();
        let id = body_at(&mut set, Vec3::ZERO);
        set.get_mut(id).unwrap().transform.position = Vec3::splat(f32::NAN);
        let mut sys = MovementSystem::new();
        sys.add_body(&set, id, None);
        assert_eq!(sys.body_count(), 0);
    }

    #[test]
    fn dt_is_clamped() {
        let mut set = BodySet::new();
        let id = body_at(&mut set, Vec3::ZERO);
        let mut sys = MovementSystem::new();
        sys.add_body(&set, id, Some(fixed_params(Vec3::X, 1.0)));

        // A 10-second hitch advances at most MAX_STEP worth of motion.
        sys.step(10.0, &mut set, None);
        let pos = set.get(id).unwrap().transform.position;
        assert!(pos.x <= 0.1 + 1e-6);
    }

    #[test]
    fn residual_velocity_decays() {
        let mut set = BodySet::new();
        let id = body_at(&mut set, Vec3::ZERO);
        set.get_mut(id).unwrap().velocity = Vec3::new(0.1, 0.0, 0.0);
        let mut sys = MovementSystem::new();
        sys.add_body(&set, id, Some(fixed_params(Vec3::Y, 0.0)));

        for _ in 0..400 {
            sys.step(0.016, &mut set, None);
        }
        let v = set.get(id).unwrap().velocity;
        assert!(v.length() < 0.1 * 0.995f32.powi(300));
    }
}
