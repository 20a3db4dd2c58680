use web_time::Instant;

/// Upper clamp on reported frame deltas, so a paused process does not
/// feed the simulation a giant step.
const MAX_DT: f32 = 0.25;

/// Frame delta tracking with a smoothed FPS readout.
pub struct FrameTiming {
    last_frame: Instant,
    /// Smoothed FPS using an exponential moving average.
    smoothed_fps: f32,
    /// Smoothing factor (lower = smoother).
    smoothing: f32,
}

impl FrameTiming {
    /// Create a frame timer starting now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            smoothed_fps: 60.0,
            smoothing: 0.05,
        }
    }

    /// Call once per frame. Returns the clamped delta since the previous
    /// call, in seconds, and updates the FPS average.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        if dt > 0.0 {
            let instant_fps = 1.0 / dt;
            self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                + instant_fps * self.smoothing;
        }
        dt.min(MAX_DT)
    }

    /// Smoothed frames per second.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new()
    }
}
