use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Pacing of the detection loop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoopConfig {
    /// Delay between the end of one cycle and the start of the next (one display frame).
    pub frame_interval_ms: u64,

    /// An inference call that takes longer than this is abandoned and the frame skipped.
    pub inference_timeout_ms: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            inference_timeout_ms: 10_000,
        }
    }
}

impl LoopConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn inference_timeout(&self) -> Duration {
        Duration::from_millis(self.inference_timeout_ms)
    }
}
