use std::time::{Duration, Instant};

/// Longest step fed to animations after a stall.
const MAX_FRAME_DT: f32 = 0.1;
const FPS_WINDOW: Duration = Duration::from_secs(5);

pub struct FrameTiming {
    last_frame_time: Option<Instant>,
    last_fps_time: Instant,
    frame_count: u32,
    pub frame_dt: f32,
    fps: f32,
}

impl FrameTiming {
    pub fn new(now: Instant) -> Self {
        Self {
            last_frame_time: None,
            last_fps_time: now,
            frame_count: 0,
            frame_dt: 1.0 / 60.0,
            fps: 0.0,
        }
    }

    /// Records a frame at `now` and returns the clamped step in seconds.
    pub fn tick(&mut self, now: Instant) -> f32 {
        let dt = match self.last_frame_time {
            Some(last) => now.saturating_duration_since(last).as_secs_f32(),
            None => 1.0 / 60.0,
        };
        self.last_frame_time = Some(now);
        self.frame_dt = dt.clamp(0.0, MAX_FRAME_DT);

        self.frame_count = self.frame_count.saturating_add(1);
        let elapsed = now.saturating_duration_since(self.last_fps_time);
        if elapsed >= FPS_WINDOW {
            self.fps = self.frame_count as f32 / elapsed.as_secs_f32();
            log::debug!("{:.1} fps (last frame {:.2} ms)", self.fps, dt * 1000.0);
            self.frame_count = 0;
            self.last_fps_time = now;
        }
        self.frame_dt
    }
}
