use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// How the frame loop turns wall-clock time into an integration step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum StepMode {
    /// Frame-rate limited loop: every frame advances by the same step.
    Fixed { step: f32 },
    /// Measured elapsed time, clamped so a stall cannot teleport the camera.
    Variable { max_step: f32 },
}

impl Default for StepMode {
    fn default() -> Self {
        Self::Variable { max_step: 0.1 }
    }
}

impl StepMode {
    pub fn fixed_60hz() -> Self {
        Self::Fixed { step: 1.0 / 60.0 }
    }

    /// Step in seconds for a frame that took `elapsed`.
    pub fn step_for(&self, elapsed: Duration) -> f32 {
        match *self {
            StepMode::Fixed { step } => step,
            StepMode::Variable { max_step } => elapsed.as_secs_f32().min(max_step),
        }
    }
}

/// Produces one step per rendered frame.
#[derive(Debug)]
pub struct FrameClock {
    mode: StepMode,
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new(mode: StepMode) -> Self {
        Self { mode, last: None }
    }

    pub fn mode(&self) -> StepMode {
        self.mode
    }

    /// Mark a frame at `now` and return its step. The first frame of a
    /// variable clock has nothing to measure and yields zero.
    pub fn tick(&mut self, now: Instant) -> f32 {
        let elapsed = self.last.map_or(Duration::ZERO, |last| now - last);
        self.last = Some(now);
        self.mode.step_for(elapsed)
    }
}

/// Ring buffer of recent frame durations.
#[derive(Debug)]
pub struct FrameTimes {
    history: Vec<Duration>,
    capacity: usize,
    index: usize,
    filled: bool,
}

impl FrameTimes {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be positive");
        Self {
            history: vec![Duration::ZERO; capacity],
            capacity,
            index: 0,
            filled: false,
        }
    }

    pub fn record(&mut self, dt: Duration) {
        self.history[self.index] = dt;
        self.index = (self.index + 1) % self.capacity;
        if self.index == 0 {
            self.filled = true;
        }
    }

    fn recorded(&self) -> &[Duration] {
        &self.history[..self.count()]
    }

    pub fn average(&self) -> Duration {
        let count = self.count();
        if count == 0 {
            return Duration::ZERO;
        }
        self.recorded().iter().sum::<Duration>() / count as u32
    }

    pub fn max(&self) -> Duration {
        self.recorded().iter().copied().max().unwrap_or(Duration::ZERO)
    }

    pub fn min(&self) -> Duration {
        self.recorded().iter().copied().min().unwrap_or(Duration::ZERO)
    }

    pub fn count(&self) -> usize {
        if self.filled {
            self.capacity
        } else {
            self.index
        }
    }
}

/// Frames-per-second counter refreshed once per second, plus recent frame
/// times for the overlay.
#[derive(Debug)]
pub struct FpsCounter {
    window_start: Option<Instant>,
    last_frame: Option<Instant>,
    frames: u32,
    fps: Option<u32>,
    times: FrameTimes,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            window_start: None,
            last_frame: None,
            frames: 0,
            fps: None,
            times: FrameTimes::new(120),
        }
    }

    /// Count a presented frame. Returns the new rate when a full second has
    /// passed since the last refresh.
    pub fn frame(&mut self, now: Instant) -> Option<u32> {
        if let Some(last) = self.last_frame {
            self.times.record(now - last);
        }
        self.last_frame = Some(now);

        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;
        if now - start >= Duration::from_secs(1) {
            self.fps = Some(self.frames);
            self.frames = 0;
            self.window_start = Some(now);
            return self.fps;
        }
        None
    }

    /// Rate over the last completed second.
    pub fn fps(&self) -> Option<u32> {
        self.fps
    }

    pub fn times(&self) -> &FrameTimes {
        &self.times
    }

    /// Overlay text, e.g. `Blocky Basement / 60 FPS`.
    pub fn label(&self, title: &str) -> String {
        match self.fps {
            Some(fps) => format!("{title} / {fps} FPS"),
            None => title.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_mode_ignores_elapsed_time() {
        let mode = StepMode::fixed_60hz();
        assert_eq!(mode.step_for(Duration::from_millis(3)), 1.0 / 60.0);
        assert_eq!(mode.step_for(Duration::from_secs(2)), 1.0 / 60.0);
    }

    #[test]
    fn variable_mode_clamps_stalls() {
        let mode = StepMode::Variable { max_step: 0.1 };
        assert!((mode.step_for(Duration::from_millis(20)) - 0.02).abs() < 1e-6);
        assert_eq!(mode.step_for(Duration::from_secs(3)), 0.1);
    }

    #[test]
    fn clock_measures_between_ticks() {
        let t0 = Instant::now();
        let mut clock = FrameClock::new(StepMode::Variable { max_step: 1.0 });
        assert_eq!(clock.tick(t0), 0.0);
        let step = clock.tick(t0 + Duration::from_millis(250));
        assert!((step - 0.25).abs() < 1e-6);
    }

    #[test]
    fn frame_times_track_history() {
        let mut times = FrameTimes::new(3);
        times.record(Duration::from_millis(10));
        times.record(Duration::from_millis(20));
        times.record(Duration::from_millis(30));

        assert_eq!(times.count(), 3);
        assert_eq!(times.average(), Duration::from_millis(20));
        assert_eq!(times.max(), Duration::from_millis(30));
        assert_eq!(times.min(), Duration::from_millis(10));
    }

    #[test]
    fn frame_times_wrap_around() {
        let mut times = FrameTimes::new(2);
        times.record(Duration::from_millis(10));
        times.record(Duration::from_millis(20));
        times.record(Duration::from_millis(30)); // overwrites first

        assert_eq!(times.count(), 2);
        assert_eq!(times.average(), Duration::from_millis(25));
    }

    #[test]
    fn empty_frame_times() {
        let times = FrameTimes::new(4);
        assert_eq!(times.average(), Duration::ZERO);
        assert_eq!(times.max(), Duration::ZERO);
    }

    #[test]
    fn fps_refreshes_once_per_second() {
        let t0 = Instant::now();
        let mut fps = FpsCounter::new();
        assert_eq!(fps.label("Blocky"), "Blocky");

        let mut reported = None;
        for i in 0..=60 {
            if let Some(n) = fps.frame(t0 + Duration::from_millis(i * 1000 / 60)) {
                reported = Some(n);
            }
        }
        assert_eq!(reported, Some(61));
        assert_eq!(fps.label("Blocky"), "Blocky / 61 FPS");
        assert_eq!(fps.times().count(), 60);
    }
}
