use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How one alert is picked when several detections in a frame are near.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AlertSelection {
    /// The last alerting detection in model output order wins.
    #[default]
    LastEvaluated,
    /// The detection with the largest box wins; ties keep the earlier one.
    Nearest,
}

/// Tunable thresholds for proximity alerts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AlertConfig {
    /// Box area (px²) above which an object counts as near.
    pub warning_threshold: f64,

    /// Detections at or below this confidence are neither drawn nor announced.
    pub min_score: f64,

    /// An unchanged warning is repeated at most this often.
    pub repeat_interval_ms: u64,

    pub selection: AlertSelection,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            warning_threshold: 150.0,
            min_score: 0.66,
            repeat_interval_ms: 7_000,
            selection: AlertSelection::LastEvaluated,
        }
    }
}

impl AlertConfig {
    pub fn repeat_interval(&self) -> Duration {
        Duration::from_millis(self.repeat_interval_ms)
    }
}
