use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    #[default]
    Idle,
    Active,
    Stopped,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "Idle",
            SessionStatus::Active => "Active",
            SessionStatus::Stopped => "Stopped",
        }
    }
}

/// Which physical camera feeds the session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum FacingMode {
    /// Selfie camera (`user` in media constraints).
    Front,
    /// Rear camera (`environment` in media constraints).
    #[default]
    Back,
}

impl FacingMode {
    pub fn flipped(self) -> Self {
        match self {
            FacingMode::Front => FacingMode::Back,
            FacingMode::Back => FacingMode::Front,
        }
    }

    /// Value of the `facingMode` media constraint.
    pub fn as_constraint(&self) -> &'static str {
        match self {
            FacingMode::Front => "user",
            FacingMode::Back => "environment",
        }
    }
}

/// Which on-screen buttons are usable for the current status.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ControlsState {
    pub enable_enabled: bool,
    pub stop_enabled: bool,
}

impl ControlsState {
    pub fn for_status(status: SessionStatus) -> Self {
        let active = status == SessionStatus::Active;
        Self {
            enable_enabled: !active,
            stop_enabled: active,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub facing_mode: FacingMode,
    pub session_id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub controls: ControlsState,
}
