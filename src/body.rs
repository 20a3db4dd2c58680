//! Authoritative body registry: transforms, interlock capability, ownership.
//!
//! Everything the simulation moves is a [`Body`]. Bodies are flat until a
//! lock reparents one under another; the parent graph is at most one level
//! deep and a child's transform is interpreted in its parent's local space.

use std::sync::atomic::{AtomicU64, Ordering};

use glam::{Quat, Vec3};
use rustc_hash::FxHashMap;

// ---------------------------------------------------------------------------
// IDs
// ---------------------------------------------------------------------------

/// Unique body identifier (atomic counter, assigned by [`BodySet`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u64);

impl BodyId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// Position, rotation and scale. Local space when the owning body is a
/// child; world space otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation component.
    pub position: Vec3,
    /// Orientation component.
    pub rotation: Quat,
    /// Per-axis scale (uniform in practice; emphasis animations scale it).
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform at the origin.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Identity transform translated to `position`.
    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    /// Whether every component is a finite number.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.rotation.is_finite()
            && self.scale.is_finite()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

// ---------------------------------------------------------------------------
// Interlock capability
// ---------------------------------------------------------------------------

/// A local anchor used to test whether two bodies can snap together.
///
/// Immutable after the owning body's shape is constructed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterlockPoint {
    /// Anchor position in the body's local space.
    pub position: Vec3,
    /// Outward normal in the body's local space (unit length).
    pub normal: Vec3,
}

/// Typed interlock capability. The interlock system only accepts bodies
/// carrying the `Interlockable` variant, enforced at pair registration.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyShape {
    /// No interlock anchors; the body floats and can be dragged but never
    /// locks.
    Simple,
    /// Carries a fixed ordered list of interlock anchors.
    Interlockable(Vec<InterlockPoint>),
}

impl BodyShape {
    /// The anchor list, or `None` for simple bodies.
    #[must_use]
    pub fn interlock_points(&self) -> Option<&[InterlockPoint]> {
        match self {
            Self::Simple => None,
            Self::Interlockable(points) => Some(points),
        }
    }
}

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

/// A simulated entity: transform, residual velocity, interlock capability
/// and an optional ownership link established by a lock.
#[derive(Debug, Clone)]
pub struct Body {
    /// Unique identifier.
    pub id: BodyId,
    /// Local transform (world space while unparented).
    pub transform: Transform,
    /// Residual velocity from drags, flings and impulses (world space).
    pub velocity: Vec3,
    /// Owning parent after a lock; `None` while free.
    pub parent: Option<BodyId>,
    /// Interlock capability.
    pub shape: BodyShape,
    /// Bounding-sphere radius used as the picking proxy for the external
    /// mesh.
    pub bounding_radius: f32,
    /// Visual emphasis signal (1.0 = none). Opaque to the simulation;
    /// consumed by the renderer.
    pub emphasis: f32,
}

impl Body {
    /// Whether this body carries interlock anchors.
    #[must_use]
    pub fn is_interlockable(&self) -> bool {
        matches!(self.shape, BodyShape::Interlockable(_))
    }
}

// ---------------------------------------------------------------------------
// BodySet
// ---------------------------------------------------------------------------

/// The authoritative body registry. Owns all bodies and the (single-level)
/// parent graph.
pub struct BodySet {
    bodies: FxHashMap<BodyId, Body>,
    /// Insertion order, for deterministic iteration.
    order: Vec<BodyId>,
}

impl BodySet {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bodies: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    /// Insert a body with a fresh id and return the id.
    pub fn insert(
        &mut self,
        transform: Transform,
        shape: BodyShape,
        bounding_radius: f32,
    ) -> BodyId {
        let id = BodyId::next();
        let body = Body {
            id,
            transform,
            velocity: Vec3::ZERO,
            parent: None,
            shape,
            bounding_radius,
            emphasis: 1.0,
        };
        let _prev = self.bodies.insert(id, body);
        self.order.push(id);
        id
    }

    /// Remove a body entirely. Children of the removed body (if any) are
    /// detached back to world space at their current world pose.
    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        let children: Vec<BodyId> = self
            .order
            .iter()
            .copied()
            .filter(|&c| self.bodies.get(&c).is_some_and(|b| b.parent == Some(id)))
            .collect();
        for child in children {
            if let Some((pos, rot)) = self.world_pose(child) {
                if let Some(b) = self.bodies.get_mut(&child) {
                    b.parent = None;
                    b.transform.position = pos;
                    b.transform.rotation = rot;
                }
            }
        }
        self.order.retain(|&b| b != id);
        self.bodies.remove(&id)
    }

    /// Read access to a body.
    #[must_use]
    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(&id)
    }

    /// Write access to a body.
    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(&id)
    }

    /// Whether the registry contains `id`.
    #[must_use]
    pub fn contains(&self, id: BodyId) -> bool {
        self.bodies.contains_key(&id)
    }

    /// Number of bodies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Body ids in insertion order.
    #[must_use]
    pub fn ids(&self) -> Vec<BodyId> {
        self.order.clone()
    }

    /// Iterate bodies in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.order.iter().filter_map(|id| self.bodies.get(id))
    }

    /// Remove all bodies.
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.order.clear();
    }

    /// World-space position and rotation of a body, composing through the
    /// parent link when present.
    #[must_use]
    pub fn world_pose(&self, id: BodyId) -> Option<(Vec3, Quat)> {
        let body = self.bodies.get(&id)?;
        match body.parent.and_then(|p| self.bodies.get(&p)) {
            Some(parent) => {
                let pos = parent.transform.position
                    + parent.transform.rotation * body.transform.position;
                let rot = parent.transform.rotation * body.transform.rotation;
                Some((pos, rot))
            }
            None => Some((body.transform.position, body.transform.rotation)),
        }
    }

    /// World-space position of a body.
    #[must_use]
    pub fn world_position(&self, id: BodyId) -> Option<Vec3> {
        self.world_pose(id).map(|(pos, _)| pos)
    }

    /// Walk the ownership chain from `id` up to its root (the topmost body
    /// that is still tracked here). Handles already-locked children so a
    /// pick on a child resolves to the assembly's owner.
    #[must_use]
    pub fn resolve_owner(&self, id: BodyId) -> Option<BodyId> {
        let mut current = self.bodies.get(&id)?;
        // Parent graph is at most one level deep, but walk defensively
        // until a free body is reached.
        let mut hops = 0;
        while let Some(parent_id) = current.parent {
            match self.bodies.get(&parent_id) {
                Some(parent) => current = parent,
                None => break,
            }
            hops += 1;
            if hops > 8 {
                break;
            }
        }
        Some(current.id)
    }

    /// Reparent `child` under `parent`, rewriting the child's transform to
    /// parent-local coordinates so its world pose is unchanged.
    ///
    /// Enforces the single-level invariant: fails if `child` already has a
    /// parent, if `parent` is itself a child, or if the two are the same
    /// body.
    pub fn reparent_preserving_world(
        &mut self,
        child: BodyId,
        parent: BodyId,
    ) -> bool {
        if child == parent {
            return false;
        }
        let Some((child_pos, child_rot)) = self.world_pose(child) else {
            return false;
        };
        let Some(parent_body) = self.bodies.get(&parent) else {
            return false;
        };
        if parent_body.parent.is_some() {
            return false;
        }
        let parent_pos = parent_body.transform.position;
        let parent_rot = parent_body.transform.rotation;
        let Some(child_body) = self.bodies.get_mut(&child) else {
            return false;
        };
        if child_body.parent.is_some() {
            return false;
        }
        let inv = parent_rot.inverse();
        child_body.parent = Some(parent);
        child_body.transform.position = inv * (child_pos - parent_pos);
        child_body.transform.rotation = inv * child_rot;
        true
    }
}

impl Default for BodySet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_points(size: f32) -> Vec<InterlockPoint> {
        let h = size / 2.0;
        vec![
            InterlockPoint { position: Vec3::new(0.0, h, 0.0), normal: Vec3::Y },
            InterlockPoint { position: Vec3::new(0.0, -h, 0.0), normal: -Vec3::Y },
        ]
    }

    #[test]
    fn insert_assigns_unique_ids() {
        let mut set = BodySet::new();
        let a = set.insert(Transform::identity(), BodyShape::Simple, 1.0);
        let b = set.insert(Transform::identity(), BodyShape::Simple, 1.0);
        assert_ne!(a, b);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn world_pose_free_body_is_local() {
        let mut set = BodySet::new();
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let id = set.insert(t, BodyShape::Simple, 1.0);
        let (pos, rot) = set.world_pose(id).unwrap();
        assert_eq!(pos, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(rot, Quat::IDENTITY);
    }

    #[test]
    fn reparent_preserves_world_pose() {
        let mut set = BodySet::new();
        let parent = set.insert(
            Transform {
                position: Vec3::new(5.0, 0.0, 0.0),
                rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
                scale: Vec3::ONE,
            },
            BodyShape::Interlockable(cube_points(2.0)),
            1.0,
        );
        let child = set.insert(
            Transform::from_position(Vec3::new(6.5, 0.0, 0.0)),
            BodyShape::Interlockable(cube_points(2.0)),
            1.0,
        );
        let before = set.world_pose(child).unwrap();
        assert!(set.reparent_preserving_world(child, parent));
        let after = set.world_pose(child).unwrap();
        assert!((before.0 - after.0).length() < 1e-5);
        assert!(before.1.angle_between(after.1) < 1e-5);
        assert_eq!(set.get(child).unwrap().parent, Some(parent));
    }

    #[test]
    fn reparent_rejects_second_level() {
        let mut set = BodySet::new();
        let a = set.insert(Transform::identity(), BodyShape::Simple, 1.0);
        let b = set.insert(Transform::from_position(Vec3::X), BodyShape::Simple, 1.0);
        let c = set.insert(Transform::from_position(Vec3::Y), BodyShape::Simple, 1.0);
        assert!(set.reparent_preserving_world(b, a));
        // b already has a parent
        assert!(!set.reparent_preserving_world(b, c));
        // a child cannot become a parent
        assert!(!set.reparent_preserving_world(c, b));
        // self-parenting is rejected
        assert!(!set.reparent_preserving_world(a, a));
    }

    #[test]
    fn resolve_owner_walks_to_root() {
        let mut set = BodySet::new();
        let parent = set.insert(Transform::identity(), BodyShape::Simple, 1.0);
        let child = set.insert(Transform::from_position(Vec3::X), BodyShape::Simple, 1.0);
        assert!(set.reparent_preserving_world(child, parent));
        assert_eq!(set.resolve_owner(child), Some(parent));
        assert_eq!(set.resolve_owner(parent), Some(parent));
    }

    #[test]
    fn remove_detaches_children_at_world_pose() {
        let mut set = BodySet::new();
        let parent = set.insert(
            Transform::from_position(Vec3::new(3.0, 0.0, 0.0)),
            BodyShape::Simple,
            1.0,
        );
        let child = set.insert(
            Transform::from_position(Vec3::new(4.0, 0.0, 0.0)),
            BodyShape::Simple,
            1.0,
        );
        assert!(set.reparent_preserving_world(child, parent));
        let world_before = set.world_position(child).unwrap();
        let _removed = set.remove(parent);
        let b = set.get(child).unwrap();
        assert_eq!(b.parent, None);
        assert!((b.transform.position - world_before).length() < 1e-5);
    }
}
