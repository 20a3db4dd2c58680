//! Headless demo: six bodies drift, attract, and lock into assemblies.
//!
//! Runs the engine for a fixed number of frames and logs lock progress.
//! Pass a TOML options file path as the first argument to override the
//! defaults.

use std::path::Path;

use driftlock::body::BodyId;
use driftlock::shape::{
    build_or_fallback, EntangledKnot, HookedTorus, PuzzleCube, ShapeProvider,
    SpiralArm,
};
use driftlock::util::FrameTiming;
use driftlock::{Engine, EngineCommand, Options};
use glam::Vec3;

const FRAMES: u32 = 900;

fn spawn(engine: &mut Engine, provider: &dyn ShapeProvider, position: Vec3) -> BodyId {
    engine.spawn_body(position, build_or_fallback(provider), None)
}

fn build_demo_scene(engine: &mut Engine) {
    let torus = HookedTorus { radius: 0.6, tube: 0.2 };
    let cube = PuzzleCube { size: 1.0 };
    let spiral = SpiralArm { radius: 0.8 };
    let knot = EntangledKnot { radius: 0.5 };

    let torus_a = spawn(engine, &torus, Vec3::new(-3.0, 0.5, 0.0));
    let torus_b = spawn(engine, &torus, Vec3::new(3.0, -0.5, 0.0));
    let cube_a = spawn(engine, &cube, Vec3::new(0.0, 2.5, -2.0));
    let cube_b = spawn(engine, &cube, Vec3::new(0.0, -2.5, 2.0));
    let spiral_a = spawn(engine, &spiral, Vec3::new(-2.0, -2.0, 2.0));
    let knot_a = spawn(engine, &knot, Vec3::new(2.0, 2.0, -2.0));

    // Matching families pull together harder than the cross pairs.
    engine.add_attraction(torus_a, torus_b, 0.02);
    engine.add_attraction(cube_a, cube_b, 0.015);
    engine.add_attraction(spiral_a, knot_a, 0.01);

    engine.register_pair(torus_a, torus_b, 0.9);
    engine.register_pair(cube_a, cube_b, 0.8);
    engine.register_pair(spiral_a, knot_a, 0.7);
    engine.register_pair(torus_a, cube_a, 0.5);
    engine.register_pair(cube_b, spiral_a, 0.4);
}

fn load_options() -> Options {
    let Some(path) = std::env::args().nth(1) else {
        return Options::default();
    };
    match Options::load(Path::new(&path)) {
        Ok(options) => {
            log::info!("loaded options from {path}");
            options
        }
        Err(e) => {
            log::error!("failed to load options from {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn main() {
    env_logger::init();

    let options = load_options();
    let mut engine = Engine::new(options, 16.0 / 9.0);
    build_demo_scene(&mut engine);
    engine.execute(EngineCommand::ToggleConnections);

    let mut timing = FrameTiming::new();
    for frame in 0..FRAMES {
        let dt = timing.tick();
        engine.update(dt);
        if frame % 120 == 0 {
            log::info!(
                "frame {frame}: {} locked, {} connections, {:.0} fps",
                engine.interlock().locked_count(),
                engine.connections().len(),
                timing.fps()
            );
        }
        std::thread::sleep(std::time::Duration::from_millis(16));
    }

    log::info!(
        "done: {} of {} pairs locked",
        engine.interlock().locked_count(),
        engine.interlock().pair_count()
    );
}
