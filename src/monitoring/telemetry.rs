/*!
 * Frame Telemetry
 * Raw frame-rate measurement from wall-clock deltas
 */

use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Frame-rate meter without smoothing
///
/// Each sample is `1 / delta` of the two most recent frames. A zero delta
/// reports `0.0` instead of infinity.
#[derive(Debug, Default)]
pub struct FrameRateMeter {
    last: Mutex<Option<Instant>>,
}

impl FrameRateMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame at `now`, returning the instantaneous rate.
    /// The first frame has no predecessor and reports `0.0`.
    pub fn frame_at(&self, now: Instant) -> f64 {
        let previous = self.last.lock().replace(now);
        match previous {
            Some(prev) => fps_from_delta(now.saturating_duration_since(prev)),
            None => 0.0,
        }
    }

    pub fn frame(&self) -> f64 {
        self.frame_at(Instant::now())
    }

    pub fn reset(&self) {
        *self.last.lock() = None;
    }
}

/// Frames per second for one frame delta
pub fn fps_from_delta(delta: Duration) -> f64 {
    let secs = delta.as_secs_f64();
    if secs > 0.0 {
        1.0 / secs
    } else {
        0.0
    }
}
