//! The engine: owns every subsystem and runs the frame loop.

use glam::Vec3;
use rand::Rng;
use rustc_hash::FxHashMap;
use web_time::{Duration, Instant};

use super::command::{EngineCommand, InteractionMode};
use crate::animation::{EasingFunction, Tweener};
use crate::body::{BodyId, BodySet, Transform};
use crate::camera::Camera;
use crate::interaction::{InteractionEvent, InteractionLayer};
use crate::interlock::InterlockSystem;
use crate::movement::{FloatParams, MovementSystem};
use crate::options::Options;
use crate::shape::ShapeData;

/// Duration of the reset-to-spawn tween.
const RESET_DURATION: Duration = Duration::from_millis(1500);

/// Owns all simulation state and advances it one frame at a time.
///
/// The frame order is fixed: camera easing, free-float integration, drag
/// spring, tween application, lock completions, interlock scan,
/// connection refresh. Entity-level failures are dropped and logged by
/// the subsystems; [`update`](Self::update) never halts.
pub struct Engine {
    bodies: BodySet,
    movement: MovementSystem,
    interlock: InterlockSystem,
    interaction: InteractionLayer,
    tweener: Tweener,
    camera: Camera,
    options: Options,
    mode: InteractionMode,
    physics_enabled: bool,
    connections_enabled: bool,
    connections: Vec<(BodyId, BodyId)>,
    spawn_positions: FxHashMap<BodyId, Vec3>,
    last_pointer: (f32, f32),
    orbiting: bool,
}

impl Engine {
    /// Build an engine from options, with the given viewport aspect ratio.
    #[must_use]
    pub fn new(options: Options, aspect: f32) -> Self {
        let mut camera = Camera::new(aspect);
        camera.fovy = options.camera.fovy.to_radians();
        camera.znear = options.camera.znear;
        camera.zfar = options.camera.zfar;

        let interlock = InterlockSystem::with_config(
            options.interlock.interaction_distance,
            options.interlock.alignment_threshold,
            Duration::from_secs_f32(
                options.interlock.snap_duration_secs.clamp(0.0, 60.0),
            ),
        );
        let interaction = InteractionLayer::with_emphasis(
            options.interaction.hover_emphasis,
            options.interaction.grab_emphasis,
        );
        let movement = MovementSystem::with_bound(options.movement.bound);

        Self {
            bodies: BodySet::new(),
            movement,
            interlock,
            interaction,
            tweener: Tweener::new(),
            camera,
            options,
            mode: InteractionMode::default(),
            physics_enabled: true,
            connections_enabled: false,
            connections: Vec::new(),
            spawn_positions: FxHashMap::default(),
            last_pointer: (0.0, 0.0),
            orbiting: false,
        }
    }

    // ── Scene construction ──────────────────────────────────────────────

    /// Spawn a body at `position` with the given shape data, register it
    /// for free-float integration, and remember the position for resets.
    pub fn spawn_body(
        &mut self,
        position: Vec3,
        data: ShapeData,
        params: Option<FloatParams>,
    ) -> BodyId {
        let id = self.bodies.insert(
            Transform::from_position(position),
            data.shape,
            data.bounding_radius,
        );
        let _prev = self.spawn_positions.insert(id, position);
        self.movement.add_body(&self.bodies, id, params);
        id
    }

    /// Register a directed attraction between two bodies, using the
    /// configured defaults for unspecified parameters.
    pub fn add_attraction(&mut self, source: BodyId, target: BodyId, strength: f32) {
        self.movement.add_attraction(
            source,
            target,
            strength,
            self.options.movement.attraction_threshold,
        );
    }

    /// Track a pair of bodies for interlock evaluation.
    pub fn register_pair(&mut self, anchor: BodyId, mover: BodyId, weight: f32) {
        self.interlock
            .register_pair(&self.bodies, anchor, mover, weight);
    }

    // ── Commands ────────────────────────────────────────────────────────

    /// Execute one command.
    pub fn execute(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::PointerMoved { x, y } => self.pointer_moved(x, y),
            EngineCommand::PointerPressed => self.pointer_pressed(),
            EngineCommand::PointerReleased => self.pointer_released(),
            EngineCommand::Zoom { delta } => {
                self.camera.zoom(delta * self.options.camera.zoom_speed);
            }
            EngineCommand::SetInteractionMode(mode) => {
                if mode != self.mode {
                    log::info!("interaction mode: {mode:?}");
                }
                self.mode = mode;
                if mode == InteractionMode::Orbit {
                    // An in-flight grab cannot continue in orbit mode.
                    self.interaction
                        .button_released(&mut self.bodies, &mut self.tweener);
                }
            }
            EngineCommand::Explode => self.explode(),
            EngineCommand::ResetBodies => self.reset_bodies(),
            EngineCommand::ToggleConnections => {
                self.connections_enabled = !self.connections_enabled;
                log::info!("connections: {}", self.connections_enabled);
            }
            EngineCommand::TogglePhysics => {
                self.physics_enabled = !self.physics_enabled;
                log::info!("physics: {}", self.physics_enabled);
            }
        }
    }

    fn pointer_moved(&mut self, x: f32, y: f32) {
        let (dx, dy) = (x - self.last_pointer.0, y - self.last_pointer.1);
        self.last_pointer = (x, y);
        if self.orbiting {
            let speed = self.options.camera.rotate_speed;
            self.camera.orbit(-dx * speed, -dy * speed);
            return;
        }
        self.interaction.pointer_moved(
            x,
            y,
            &self.camera,
            &mut self.bodies,
            &mut self.tweener,
        );
    }

    fn pointer_pressed(&mut self) {
        let grabbed = self.mode == InteractionMode::Drag
            && self.interaction.button_pressed(
                &self.camera,
                &mut self.bodies,
                &mut self.tweener,
            );
        // Background presses, and every press in orbit mode, turn the
        // camera instead.
        self.orbiting = !grabbed;
    }

    fn pointer_released(&mut self) {
        self.orbiting = false;
        self.interaction
            .button_released(&mut self.bodies, &mut self.tweener);
    }

    fn explode(&mut self) {
        let mut rng = rand::rng();
        for id in self.bodies.ids() {
            let Some(body) = self.bodies.get_mut(id) else {
                continue;
            };
            if body.parent.is_some() {
                continue;
            }
            body.velocity += Vec3::new(
                (rng.random_range(0.0..1.0f32) - 0.5) * 0.5,
                rng.random_range(0.0..1.0f32) * 0.3,
                (rng.random_range(0.0..1.0f32) - 0.5) * 0.5,
            );
        }
        log::info!("explode impulse applied");
    }

    fn reset_bodies(&mut self) {
        for id in self.bodies.ids() {
            if let Some(body) = self.bodies.get_mut(id) {
                body.velocity = Vec3::ZERO;
                if body.parent.is_some() {
                    continue;
                }
            }
            if let Some(&spawn) = self.spawn_positions.get(&id) {
                self.tweener.move_to(
                    &self.bodies,
                    id,
                    spawn,
                    RESET_DURATION,
                    EasingFunction::Bounce,
                );
            }
        }
        log::info!("reset to spawn positions");
    }

    // ── Frame loop ──────────────────────────────────────────────────────

    /// Advance one frame by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.update_at(Instant::now(), dt);
    }

    /// Advance one frame with an explicit clock, for deterministic tests.
    pub fn update_at(&mut self, now: Instant, dt: f32) {
        self.camera.update();
        if self.physics_enabled {
            self.movement
                .step(dt, &mut self.bodies, self.interaction.drag_target());
        }
        self.interaction.update(&self.camera, &mut self.bodies);
        let _animating = self.tweener.update(now, &mut self.bodies);
        for event in self.tweener.drain_completed() {
            self.interlock.on_tween_complete(event, &mut self.bodies);
        }
        self.interlock
            .step(&mut self.bodies, &self.movement, &mut self.tweener);
        self.refresh_connections();
    }

    fn refresh_connections(&mut self) {
        self.connections.clear();
        if !self.connections_enabled {
            return;
        }
        let ids = self.bodies.ids();
        let limit = self.options.interlock.connection_distance;
        for (i, &a) in ids.iter().enumerate() {
            let Some(pa) = self.bodies.world_position(a) else {
                continue;
            };
            for &b in &ids[i + 1..] {
                let Some(pb) = self.bodies.world_position(b) else {
                    continue;
                };
                if pa.distance(pb) < limit {
                    self.connections.push((a, b));
                }
            }
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────

    /// The body registry.
    #[must_use]
    pub fn bodies(&self) -> &BodySet {
        &self.bodies
    }

    /// The camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The interlock system (pair states, lock counts).
    #[must_use]
    pub fn interlock(&self) -> &InterlockSystem {
        &self.interlock
    }

    /// Current pointer mode.
    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Whether free-float integration is running.
    #[must_use]
    pub fn physics_enabled(&self) -> bool {
        self.physics_enabled
    }

    /// The body currently being dragged, if any.
    #[must_use]
    pub fn drag_target(&self) -> Option<BodyId> {
        self.interaction.drag_target()
    }

    /// Body pairs within the connection distance, refreshed each frame
    /// while connections are enabled (empty otherwise).
    #[must_use]
    pub fn connections(&self) -> &[(BodyId, BodyId)] {
        &self.connections
    }

    /// Take the interaction feedback events accumulated since the last
    /// drain (hover, drag, ripple).
    pub fn drain_events(&mut self) -> Vec<InteractionEvent> {
        self.interaction.drain_events()
    }

    /// Active options.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::shape::{PuzzleCube, ShapeProvider};

    fn cube_data() -> ShapeData {
        PuzzleCube { size: 1.0 }.build().unwrap()
    }

    fn still_params() -> Option<FloatParams> {
        Some(FloatParams {
            speed: 0.0001,
            direction: Vec3::Y,
            spin: Vec3::ZERO,
        })
    }

    #[test]
    fn explode_imparts_bounded_upward_biased_velocity() {
        let mut engine = Engine::new(Options::default(), 1.0);
        let id = engine.spawn_body(Vec3::ZERO, cube_data(), still_params());

        engine.execute(EngineCommand::Explode);
        let v = engine.bodies().get(id).unwrap().velocity;
        assert!(v.y >= 0.0 && v.y <= 0.3);
        assert!(v.x.abs() <= 0.25 && v.z.abs() <= 0.25);
    }

    #[test]
    fn reset_returns_free_bodies_to_spawn() {
        let mut engine = Engine::new(Options::default(), 1.0);
        let spawn = Vec3::new(2.0, 1.0, 0.0);
        let id = engine.spawn_body(spawn, cube_data(), still_params());

        engine.bodies.get_mut(id).unwrap().transform.position =
            Vec3::new(8.0, -3.0, 4.0);
        engine.bodies.get_mut(id).unwrap().velocity = Vec3::X;

        let start = Instant::now();
        engine.execute(EngineCommand::ResetBodies);
        assert_eq!(engine.bodies().get(id).unwrap().velocity, Vec3::ZERO);
        engine.execute(EngineCommand::TogglePhysics);
        engine.update_at(start + Duration::from_secs(3), 0.016);

        let pos = engine.bodies().get(id).unwrap().transform.position;
        assert!((pos - spawn).length() < 1e-3);
    }

    #[test]
    fn toggle_physics_freezes_drift() {
        let mut engine = Engine::new(Options::default(), 1.0);
        let id = engine.spawn_body(
            Vec3::ZERO,
            cube_data(),
            Some(FloatParams {
                speed: 1.0,
                direction: Vec3::X,
                spin: Vec3::ZERO,
            }),
        );

        engine.execute(EngineCommand::TogglePhysics);
        assert!(!engine.physics_enabled());
        engine.update_at(Instant::now(), 0.1);
        assert_eq!(
            engine.bodies().get(id).unwrap().transform.position,
            Vec3::ZERO
        );

        engine.execute(EngineCommand::TogglePhysics);
        engine.update_at(Instant::now(), 0.1);
        assert!(engine.bodies().get(id).unwrap().transform.position.x > 0.0);
    }

    #[test]
    fn connections_list_tracks_distance_and_toggle() {
        let mut engine = Engine::new(Options::default(), 1.0);
        let a = engine.spawn_body(Vec3::ZERO, cube_data(), still_params());
        let b = engine.spawn_body(Vec3::new(2.0, 0.0, 0.0), cube_data(), still_params());
        let _far = engine.spawn_body(Vec3::new(9.0, 0.0, 0.0), cube_data(), still_params());

        engine.update_at(Instant::now(), 0.001);
        assert!(engine.connections().is_empty(), "disabled by default");

        engine.execute(EngineCommand::ToggleConnections);
        engine.update_at(Instant::now(), 0.001);
        assert_eq!(engine.connections(), &[(a, b)]);

        engine.execute(EngineCommand::ToggleConnections);
        engine.update_at(Instant::now(), 0.001);
        assert!(engine.connections().is_empty());
    }

    #[test]
    fn orbit_mode_never_grabs_bodies() {
        let mut engine = Engine::new(Options::default(), 1.0);
        let _id = engine.spawn_body(Vec3::ZERO, cube_data(), still_params());
        engine.execute(EngineCommand::SetInteractionMode(InteractionMode::Orbit));

        engine.execute(EngineCommand::PointerMoved { x: 0.0, y: 0.0 });
        engine.execute(EngineCommand::PointerPressed);
        assert_eq!(engine.drag_target(), None);

        // A background drag in orbit mode turns the camera.
        let eye_before = engine.camera().eye();
        engine.execute(EngineCommand::PointerMoved { x: 0.3, y: 0.0 });
        engine.update_at(Instant::now(), 0.016);
        assert_ne!(engine.camera().eye(), eye_before);
    }

    #[test]
    fn drag_mode_grabs_hovered_body() {
        let mut engine = Engine::new(Options::default(), 1.0);
        let id = engine.spawn_body(Vec3::ZERO, cube_data(), still_params());

        engine.execute(EngineCommand::PointerMoved { x: 0.0, y: 0.0 });
        engine.execute(EngineCommand::PointerPressed);
        assert_eq!(engine.drag_target(), Some(id));
        engine.execute(EngineCommand::PointerReleased);
        assert_eq!(engine.drag_target(), None);
    }

    #[test]
    fn frame_loop_locks_and_reparents_qualifying_pair() {
        let mut engine = Engine::new(Options::default(), 1.0);
        // Two cubes whose facing anchors align along x at distance 1.2.
        let anchor = engine.spawn_body(Vec3::ZERO, cube_data(), still_params());
        let mover = engine.spawn_body(
            Vec3::new(1.2, 0.0, 0.0),
            cube_data(),
            still_params(),
        );
        engine.register_pair(anchor, mover, 0.9);
        engine.execute(EngineCommand::TogglePhysics);

        let start = Instant::now();
        engine.update_at(start, 0.016);
        assert!(engine.interlock().is_locked(anchor, mover));

        // Drive past the snap and let the completion reparent.
        engine.update_at(start + Duration::from_secs(2), 0.016);
        engine.update_at(start + Duration::from_secs(2), 0.016);
        assert_eq!(engine.bodies().get(mover).unwrap().parent, Some(anchor));
    }
}
