use crate::clock::{Clock, Timestamp, MICROS_PER_SEC};

/// length of the fixed measurement window
pub const FPS_WINDOW_MICROS: u64 = MICROS_PER_SEC;

/// Counts presented frames over a fixed, non-sliding one-second window.
///
/// Each closed window reports exactly the frames recorded since the previous
/// window closed; the counter is zeroed at the moment the sample is taken.
#[derive(Debug)]
pub struct FpsEstimator<C: Clock> {
    clock: C,
    rendered_frames: u32,
    window_start: Timestamp,
}

impl<C: Clock> FpsEstimator<C> {
    pub fn new(clock: C) -> Self {
        let window_start = clock.now();
        FpsEstimator {
            clock,
            rendered_frames: 0,
            window_start,
        }
    }

    /// one presented frame; never call this for skipped steps
    pub fn record_rendered_frame(&mut self) {
        self.rendered_frames = self.rendered_frames.wrapping_add(1);
    }

    /// frames counted in the window that is currently open
    pub fn rendered_frames(&self) -> u32 {
        self.rendered_frames
    }

    /// Close the window if at least a second has gone by, returning the
    /// formatted rate. Returns `None` while the window is still open.
    pub fn sample(&mut self) -> Option<String> {
        let now = self.clock.now();
        let elapsed = now.micros_since(self.window_start);
        if elapsed < FPS_WINDOW_MICROS {
            return None;
        }

        let rate = self.rendered_frames as f64 / (elapsed as f64 / MICROS_PER_SEC as f64);
        self.rendered_frames = 0;
        self.window_start = self.clock.now();
        tracing::debug!(rate, elapsed_us = elapsed, "fps window closed");
        Some(format!("FPS: {:.2}", rate))
    }
}
