use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{ControlsState, FacingMode, SessionSnapshot, SessionStatus};
use crate::platform_bridge::{CaptureStream, VideoFrame};

/// The one camera session of the process. `stream` is the video sink's source: it is
/// `Some` exactly while the session is Active.
pub struct SessionState<S> {
    pub status: SessionStatus,
    pub facing_mode: FacingMode,
    pub session_id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    stream: Option<S>,
}

impl<S: CaptureStream> SessionState<S> {
    pub fn new(facing_mode: FacingMode) -> Self {
        Self {
            status: SessionStatus::Idle,
            facing_mode,
            session_id: None,
            started_at: None,
            stream: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    pub fn stream(&self) -> Option<&S> {
        self.stream.as_ref()
    }

    pub fn current_frame(&self) -> Option<VideoFrame> {
        self.stream.as_ref().and_then(|stream| stream.current_frame())
    }

    pub fn begin(&mut self, stream: S, started_at: DateTime<Utc>) {
        self.status = SessionStatus::Active;
        self.session_id = Some(Uuid::new_v4().to_string());
        self.started_at = Some(started_at);
        self.stream = Some(stream);
    }

    /// Swaps in a stream from the other camera. Status is untouched; the previous
    /// stream is handed back for the caller to release.
    pub fn replace_stream(&mut self, stream: S, facing_mode: FacingMode) -> Option<S> {
        self.facing_mode = facing_mode;
        self.stream.replace(stream)
    }

    /// Ends the session and detaches the stream from the video sink.
    pub fn stop(&mut self) -> Option<S> {
        self.status = SessionStatus::Stopped;
        self.session_id = None;
        self.started_at = None;
        self.stream.take()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            facing_mode: self.facing_mode,
            session_id: self.session_id.clone(),
            started_at: self.started_at,
            controls: ControlsState::for_status(self.status),
        }
    }
}
