use thiserror::Error;

/// Failures of camera-session transitions. None of them leaves a session half-switched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("no camera device available")]
    DeviceUnavailable,
    #[error("detection model is not loaded yet")]
    ModelNotReady,
    #[error("camera capture is not supported on this platform")]
    Unsupported,
    #[error("no active camera session")]
    NoActiveSession,
    #[error("camera request failed: {0}")]
    Capture(String),
}

impl CameraError {
    /// Sentence read aloud to the user, if this failure is user-facing.
    pub fn spoken_message(&self) -> Option<&'static str> {
        match self {
            CameraError::PermissionDenied => Some("Camera permission was denied."),
            CameraError::DeviceUnavailable => Some("No camera device was found."),
            CameraError::Unsupported => Some("Camera access is not supported on this device."),
            CameraError::Capture(_) => Some("The camera could not be started."),
            CameraError::ModelNotReady | CameraError::NoActiveSession => None,
        }
    }
}

/// Failure reported by the speech-recognition service. Listening keeps running.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("speech recognition error: {reason}")]
pub struct RecognitionError {
    pub reason: String,
}
