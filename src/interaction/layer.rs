//! Drag state machine and spring follower.

use glam::Vec3;
use web_time::Duration;

use crate::animation::{EasingFunction, Tweener};
use crate::body::{BodyId, BodySet};
use crate::camera::{Camera, Ray};

/// Fraction of the remaining pull applied to the spring velocity per frame.
const SPRING_STIFFNESS: f32 = 0.1;
/// Per-frame decay of the spring velocity.
const SPRING_DAMPING: f32 = 0.9;
/// Converts smoothed pointer velocity into residual body velocity on
/// release.
const FLING_SCALE: f32 = 0.4;
/// Blend factor for the pointer velocity smoother.
const VELOCITY_SMOOTHING: f32 = 0.2;
/// Default hover emphasis scale.
const DEFAULT_HOVER_EMPHASIS: f32 = 1.08;
/// Default grab emphasis scale.
const DEFAULT_GRAB_EMPHASIS: f32 = 1.15;
/// Duration of emphasis tweens.
const EMPHASIS_TWEEN: Duration = Duration::from_millis(150);
/// Radius of the soft pull toward the dragged body.
const ASSIST_RADIUS: f32 = 3.5;
/// Peak per-frame strength of the soft pull.
const ASSIST_STRENGTH: f32 = 0.03;

/// Current pointer interaction phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragPhase {
    /// Pointer over empty space.
    Idle,
    /// Pointer over a body, button up.
    Hovering {
        /// The hovered body (owner-resolved).
        body: BodyId,
    },
    /// Button held on a body.
    Dragging {
        /// The dragged body (owner-resolved).
        body: BodyId,
        /// Height of the horizontal drag plane through the grab point.
        plane_y: f32,
        /// Offset from the grab point to the body center, so the body
        /// does not jump to the cursor.
        grab_offset: Vec3,
    },
}

/// Feedback event for the embedding application, drained once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionEvent {
    /// The pointer entered a body.
    HoverStarted(BodyId),
    /// The pointer left a body.
    HoverEnded(BodyId),
    /// A drag began on a body.
    DragStarted(BodyId),
    /// A drag ended; `fling` is the residual velocity imparted.
    DragEnded {
        /// The body that was dragged.
        body: BodyId,
        /// Residual velocity written into the body.
        fling: Vec3,
    },
    /// A feedback ripple should play at this world position.
    Ripple(Vec3),
}

/// Cast the ray against every body's bounding sphere and return the
/// nearest hit, resolved to its assembly owner.
#[must_use]
pub fn pick_body(bodies: &BodySet, ray: &Ray) -> Option<BodyId> {
    let mut nearest: Option<(f32, BodyId)> = None;
    for body in bodies.iter() {
        let Some(center) = bodies.world_position(body.id) else {
            continue;
        };
        let Some(t) = ray.intersect_sphere(center, body.bounding_radius) else {
            continue;
        };
        if nearest.is_none_or(|(best, _)| t < best) {
            nearest = Some((t, body.id));
        }
    }
    let (_, hit) = nearest?;
    bodies.resolve_owner(hit)
}

/// Owns the pointer interaction state machine.
///
/// One body at most holds the interaction focus; starting a new hover or
/// drag releases the previous holder in the same call.
pub struct InteractionLayer {
    phase: DragPhase,
    pointer_ndc: (f32, f32),
    spring_velocity: Vec3,
    smoothed_pointer: Vec3,
    last_target: Vec3,
    hover_emphasis: f32,
    grab_emphasis: f32,
    events: Vec<InteractionEvent>,
}

impl InteractionLayer {
    /// Create an idle interaction layer with default emphasis scales.
    #[must_use]
    pub fn new() -> Self {
        Self::with_emphasis(DEFAULT_HOVER_EMPHASIS, DEFAULT_GRAB_EMPHASIS)
    }

    /// Create a layer with explicit hover and grab emphasis scales.
    #[must_use]
    pub fn with_emphasis(hover: f32, grab: f32) -> Self {
        Self {
            phase: DragPhase::Idle,
            pointer_ndc: (0.0, 0.0),
            spring_velocity: Vec3::ZERO,
            smoothed_pointer: Vec3::ZERO,
            last_target: Vec3::ZERO,
            hover_emphasis: if hover.is_finite() && hover > 0.0 {
                hover
            } else {
                DEFAULT_HOVER_EMPHASIS
            },
            grab_emphasis: if grab.is_finite() && grab > 0.0 {
                grab
            } else {
                DEFAULT_GRAB_EMPHASIS
            },
            events: Vec::new(),
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    /// The body being dragged, if any. The movement integrator skips it.
    #[must_use]
    pub fn drag_target(&self) -> Option<BodyId> {
        match self.phase {
            DragPhase::Dragging { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Record a pointer position in normalized device coordinates and
    /// refresh hover state when no drag is active.
    pub fn pointer_moved(
        &mut self,
        ndc_x: f32,
        ndc_y: f32,
        camera: &Camera,
        bodies: &mut BodySet,
        tweener: &mut Tweener,
    ) {
        self.pointer_ndc = (ndc_x, ndc_y);
        if matches!(self.phase, DragPhase::Dragging { .. }) {
            return;
        }
        let ray = camera.screen_ray(ndc_x, ndc_y);
        let hit = pick_body(bodies, &ray);
        let current = match self.phase {
            DragPhase::Hovering { body } => Some(body),
            _ => None,
        };
        if hit == current {
            return;
        }
        if let Some(prev) = current {
            Self::clear_emphasis(prev, bodies, tweener);
            self.events.push(InteractionEvent::HoverEnded(prev));
        }
        match hit {
            Some(body) => {
                self.phase = DragPhase::Hovering { body };
                Self::set_emphasis(body, self.hover_emphasis, bodies, tweener);
                self.events.push(InteractionEvent::HoverStarted(body));
            }
            None => self.phase = DragPhase::Idle,
        }
    }

    /// Begin a drag if the pointer is over a body. Returns `true` when a
    /// drag started.
    pub fn button_pressed(
        &mut self,
        camera: &Camera,
        bodies: &mut BodySet,
        tweener: &mut Tweener,
    ) -> bool {
        if matches!(self.phase, DragPhase::Dragging { .. }) {
            return false;
        }
        let ray = camera.screen_ray(self.pointer_ndc.0, self.pointer_ndc.1);
        let Some(body) = pick_body(bodies, &ray) else {
            return false;
        };
        let Some(center) = bodies.world_position(body) else {
            return false;
        };
        // The drag plane is horizontal through the grab point, so pointer
        // motion maps to motion in the world's ground plane.
        let grab_distance = (center - ray.origin).dot(ray.direction);
        let grab_point = ray.at(grab_distance);
        self.phase = DragPhase::Dragging {
            body,
            plane_y: grab_point.y,
            grab_offset: center - grab_point,
        };
        self.spring_velocity = Vec3::ZERO;
        self.smoothed_pointer = Vec3::ZERO;
        self.last_target = center;
        Self::set_emphasis(body, self.grab_emphasis, bodies, tweener);
        self.events.push(InteractionEvent::DragStarted(body));
        log::debug!("drag started on {body:?}");
        true
    }

    /// End an active drag, converting smoothed pointer velocity into a
    /// fling on the released body.
    pub fn button_released(&mut self, bodies: &mut BodySet, tweener: &mut Tweener) {
        let DragPhase::Dragging { body, .. } = self.phase else {
            return;
        };
        self.phase = DragPhase::Idle;
        Self::clear_emphasis(body, bodies, tweener);
        let fling = self.smoothed_pointer * FLING_SCALE;
        if let Some(b) = bodies.get_mut(body) {
            b.velocity = fling;
            self.events.push(InteractionEvent::DragEnded { body, fling });
            self.events
                .push(InteractionEvent::Ripple(b.transform.position));
        }
        log::debug!("drag ended on {body:?}");
    }

    /// Advance the drag spring one frame. A drag whose body has vanished
    /// or become locked aborts quietly.
    pub fn update(&mut self, camera: &Camera, bodies: &mut BodySet) {
        let DragPhase::Dragging { body, plane_y, grab_offset } = self.phase else {
            return;
        };
        let valid = bodies.get(body).is_some_and(|b| b.parent.is_none());
        if !valid {
            log::debug!("drag aborted: body {body:?} vanished or locked");
            self.phase = DragPhase::Idle;
            return;
        }

        let ray = camera.screen_ray(self.pointer_ndc.0, self.pointer_ndc.1);
        let target = Self::plane_target(&ray, plane_y) + grab_offset;

        // Smoothed pointer velocity feeds the fling on release.
        let sample = target - self.last_target;
        self.smoothed_pointer = self.smoothed_pointer.lerp(sample, VELOCITY_SMOOTHING);
        self.last_target = target;

        let dragged_pos = if let Some(b) = bodies.get_mut(body) {
            let pull = (target - b.transform.position) * SPRING_STIFFNESS;
            self.spring_velocity = (self.spring_velocity + pull) * SPRING_DAMPING;
            b.transform.position += self.spring_velocity;
            b.transform.position
        } else {
            return;
        };

        Self::apply_assist(bodies, body, dragged_pos);
    }

    /// Soft pull of nearby free bodies toward the dragged one, so
    /// candidates drift into interlock range while the user holds a body.
    fn apply_assist(bodies: &mut BodySet, dragged: BodyId, center: Vec3) {
        for id in bodies.ids() {
            if id == dragged {
                continue;
            }
            let Some(other) = bodies.get_mut(id) else {
                continue;
            };
            if other.parent.is_some() {
                continue;
            }
            let to_center = center - other.transform.position;
            let distance = to_center.length();
            if distance >= ASSIST_RADIUS || distance < f32::EPSILON {
                continue;
            }
            let falloff = (ASSIST_RADIUS - distance) / ASSIST_RADIUS;
            let strength = falloff * falloff * ASSIST_STRENGTH;
            other.transform.position += to_center / distance * strength;
        }
    }

    /// Intersect the pointer ray with the horizontal plane at `plane_y`,
    /// falling back to a fixed-depth point when the ray runs parallel.
    fn plane_target(ray: &Ray, plane_y: f32) -> Vec3 {
        if ray.direction.y.abs() > 1e-4 {
            let t = (plane_y - ray.origin.y) / ray.direction.y;
            if t > 0.0 {
                return ray.at(t);
            }
        }
        ray.at(10.0)
    }

    /// Take the feedback events accumulated since the last drain.
    pub fn drain_events(&mut self) -> Vec<InteractionEvent> {
        std::mem::take(&mut self.events)
    }

    fn set_emphasis(
        body: BodyId,
        scale: f32,
        bodies: &mut BodySet,
        tweener: &mut Tweener,
    ) {
        if let Some(b) = bodies.get_mut(body) {
            b.emphasis = scale;
        }
        tweener.scale_to(
            bodies,
            body,
            scale,
            EMPHASIS_TWEEN,
            EasingFunction::QuadraticOut,
        );
    }

    fn clear_emphasis(body: BodyId, bodies: &mut BodySet, tweener: &mut Tweener) {
        Self::set_emphasis(body, 1.0, bodies, tweener);
    }
}

impl Default for InteractionLayer {
    fn default() -> Self {
        Self::new()
    }
}
