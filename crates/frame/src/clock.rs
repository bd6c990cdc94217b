use std::time::Instant;

/// Seconds elapsed since some fixed origin.
pub trait TimeSource {
    fn now(&self) -> f64;
}

/// Wall-clock time since construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicTime {
    start: Instant,
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicTime {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl TimeSource for MonotonicTime {
    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Time that only moves when told to. Drives headless runs and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualTime {
    now: f64,
}

impl ManualTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, seconds: f64) {
        self.now += seconds;
    }

    pub fn set(&mut self, seconds: f64) {
        self.now = seconds;
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> f64 {
        self.now
    }
}

/// Frame timer. The first tick measures from time zero, so the first delta
/// covers startup.
#[derive(Debug, Clone, Copy, Default)]
pub struct Clock {
    last: f64,
    delta: f32,
    max_delta: Option<f32>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap every delta at `max_delta` seconds, e.g. to survive a debugger
    /// pause without the camera flying off.
    pub fn with_max_delta(max_delta: Option<f32>) -> Self {
        Self {
            max_delta,
            ..Self::default()
        }
    }

    /// Sample `now` and return the seconds since the previous sample.
    pub fn tick(&mut self, now: f64) -> f32 {
        let delta = ((now - self.last) as f32).max(0.0);
        self.last = now;
        self.delta = match self.max_delta {
            Some(cap) => delta.min(cap),
            None => delta,
        };
        self.delta
    }

    pub fn delta(&self) -> f32 {
        self.delta
    }

    pub fn last_frame_time(&self) -> f64 {
        self.last
    }
}

/// Frames-per-second estimate refreshed once per second of frame time.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    frames: u32,
    elapsed: f32,
    fps: f32,
    total_frames: u64,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, delta: f32) {
        self.frames += 1;
        self.total_frames += 1;
        self.elapsed += delta;
        if self.elapsed >= 1.0 {
            self.fps = self.frames as f32 / self.elapsed;
            self.frames = 0;
            self.elapsed = 0.0;
        }
    }

    /// Zero until a full second has been recorded.
    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_measures_from_zero() {
        let mut clock = Clock::new();
        assert_eq!(clock.tick(0.25), 0.25);
        assert_eq!(clock.tick(0.75), 0.5);
        assert_eq!(clock.last_frame_time(), 0.75);
    }

    #[test]
    fn delta_is_capped() {
        let mut clock = Clock::with_max_delta(Some(0.1));
        assert_eq!(clock.tick(5.0), 0.1);
        assert_eq!(clock.delta(), 0.1);
    }

    #[test]
    fn time_going_backwards_yields_zero() {
        let mut clock = Clock::new();
        clock.tick(2.0);
        assert_eq!(clock.tick(1.0), 0.0);
    }

    #[test]
    fn manual_time_advances() {
        let mut time = ManualTime::new();
        time.advance(0.5);
        time.advance(0.25);
        assert_eq!(time.now(), 0.75);
        time.set(10.0);
        assert_eq!(time.now(), 10.0);
    }

    #[test]
    fn fps_refreshes_each_second() {
        let mut stats = FrameStats::new();
        for _ in 0..59 {
            stats.record(1.0 / 60.0);
        }
        assert_eq!(stats.fps(), 0.0);
        stats.record(1.0 / 60.0);
        stats.record(1.0 / 60.0);
        assert!((stats.fps() - 60.0).abs() < 2.0);
        assert_eq!(stats.total_frames(), 61);
    }
}
