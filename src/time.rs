//! Frame timing for the host loop.
//!
//! The simulation itself is frame-stepped and never reads a clock. The host
//! uses [`FrameTimer`] to report frame rate and to hand a consistent `now`
//! to time-based helpers such as the theme watcher.
//!
//! # Example
//!
//! ```ignore
//! let mut timer = FrameTimer::new();
//!
//! // Once per redraw:
//! let now = timer.update();
//! if let Some(fps) = timer.take_fps_report() {
//!     window.set_title(&format!("netfield - {fps:.0} fps"));
//! }
//! ```

use std::time::{Duration, Instant};

/// How often the FPS estimate is refreshed.
const FPS_WINDOW: Duration = Duration::from_millis(500);

/// Frame counter with a periodically refreshed FPS estimate.
#[derive(Debug)]
pub struct FrameTimer {
    origin: Instant,
    previous: Instant,
    delta: Duration,
    frames: u64,
    window: FpsWindow,
}

/// Frames counted since `opened`, closed into an estimate every [`FPS_WINDOW`].
#[derive(Debug)]
struct FpsWindow {
    opened: Instant,
    first_frame: u64,
    estimate: f32,
    unreported: bool,
}

impl FpsWindow {
    fn roll(&mut self, now: Instant, frames: u64) {
        let span = now.saturating_duration_since(self.opened);
        if span < FPS_WINDOW {
            return;
        }
        self.estimate = (frames - self.first_frame) as f32 / span.as_secs_f32();
        self.opened = now;
        self.first_frame = frames;
        self.unreported = true;
    }
}

impl FrameTimer {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Create a timer whose clock starts at `now`.
    pub fn starting_at(now: Instant) -> Self {
        Self {
            origin: now,
            previous: now,
            delta: Duration::ZERO,
            frames: 0,
            window: FpsWindow {
                opened: now,
                first_frame: 0,
                estimate: 0.0,
                unreported: false,
            },
        }
    }

    /// Record a frame at the current instant. Returns that instant.
    pub fn update(&mut self) -> Instant {
        let now = Instant::now();
        self.update_at(now);
        now
    }

    /// Record a frame at `now`.
    pub fn update_at(&mut self, now: Instant) {
        self.delta = now.saturating_duration_since(self.previous);
        self.previous = now;
        self.frames += 1;
        self.window.roll(now, self.frames);
    }

    /// Seconds since the timer started, as of the last update.
    pub fn elapsed(&self) -> f32 {
        self.previous.saturating_duration_since(self.origin).as_secs_f32()
    }

    /// Seconds between the last two updates.
    pub fn delta(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    pub fn frame(&self) -> u64 {
        self.frames
    }

    pub fn fps(&self) -> f32 {
        self.window.estimate
    }

    /// The FPS estimate, once per refresh.
    pub fn take_fps_report(&mut self) -> Option<f32> {
        std::mem::take(&mut self.window.unreported).then_some(self.window.estimate)
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_new() {
        let timer = FrameTimer::new();
        assert_eq!(timer.frame(), 0);
        assert_eq!(timer.fps(), 0.0);
        assert_eq!(timer.delta(), 0.0);
    }

    #[test]
    fn test_update_tracks_delta_and_frames() {
        let start = Instant::now();
        let mut timer = FrameTimer::starting_at(start);
        timer.update_at(start + Duration::from_millis(16));
        timer.update_at(start + Duration::from_millis(32));

        assert_eq!(timer.frame(), 2);
        assert!((timer.delta() - 0.016).abs() < 1e-4);
        assert!((timer.elapsed() - 0.032).abs() < 1e-4);
    }

    #[test]
    fn test_fps_reported_once_per_interval() {
        let start = Instant::now();
        let mut timer = FrameTimer::starting_at(start);

        for i in 1..=30 {
            timer.update_at(start + Duration::from_millis(i * 10));
        }
        assert_eq!(timer.take_fps_report(), None);

        for i in 31..=60 {
            timer.update_at(start + Duration::from_millis(i * 10));
        }
        let fps = timer.take_fps_report().unwrap();
        assert!((fps - 100.0).abs() < 1.0);
        assert_eq!(timer.take_fps_report(), None);
    }
}
