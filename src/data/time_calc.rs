/// Report frames per second no more often than this.
pub const FPS_INTERVAL_MS: u64 = 1000;

/// Frame-rate counter owned by the caller. Each update returns the next state
/// rather than mutating hidden fields.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FpsMeter {
    frame_count: u32,
    last_report_ms: u64,
}

impl FpsMeter {
    pub fn new(start_ms: u64) -> Self {
        Self {
            frame_count: 0,
            last_report_ms: start_ms,
        }
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Counts one finished frame at `now_ms`.
    ///
    /// Once more than [`FPS_INTERVAL_MS`] has passed since the last report, the
    /// frame rate over that window is returned and the counter restarts.
    pub fn record_frame(self, now_ms: u64) -> (Self, Option<f32>) {
        let frame_count = self.frame_count + 1;
        let elapsed_ms = now_ms.saturating_sub(self.last_report_ms);
        if elapsed_ms > FPS_INTERVAL_MS {
            let fps = frame_count as f32 / elapsed_ms as f32 * 1000.;
            (Self::new(now_ms), Some(fps))
        } else {
            (
                Self {
                    frame_count,
                    last_report_ms: self.last_report_ms,
                },
                None,
            )
        }
    }
}

/// Exponential smoothing of a per-frame metric such as inference time.
///
/// `alpha` is the weight of the new sample. The first sample passes through unchanged.
pub fn smooth(previous: Option<f32>, sample: f32, alpha: f32) -> f32 {
    match previous {
        None => sample,
        Some(prev) => {
            let alpha = alpha.clamp(0., 1.);
            alpha * sample + (1. - alpha) * prev
        }
    }
}
