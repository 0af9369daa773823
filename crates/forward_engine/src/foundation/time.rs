//! Time management utilities

use std::time::Instant;

/// Frame clock tracking the start time of the previous frame
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_frame: Option<Instant>,
    delta_time: f32,
    frame_count: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Create a clock that has not started a frame yet
    pub fn new() -> Self {
        Self {
            last_frame: None,
            delta_time: 0.0,
            frame_count: 0,
        }
    }

    /// Mark the start of a frame
    ///
    /// Returns the seconds elapsed since the previous call, or 0.0 on the
    /// first frame.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Mark the start of a frame at an explicit instant
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        self.delta_time = self
            .last_frame
            .map_or(0.0, |last| now.saturating_duration_since(last).as_secs_f32());
        self.last_frame = Some(now);
        self.frame_count += 1;
        self.delta_time
    }

    /// Start time of the most recent frame
    pub fn last_frame_time(&self) -> Option<Instant> {
        self.last_frame
    }

    /// Time between the two most recent frame starts, in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Number of frames started so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
