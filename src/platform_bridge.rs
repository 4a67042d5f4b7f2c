//! Contracts for the platform services the assistant drives: the detection model,
//! media capture, speech synthesis and the overlay render surface.
//!
//! The core never inspects frame pixels and never reads back from the render surface;
//! it only hands frames to the detector and writes overlay elements.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CameraError;
use crate::models::{Detection, FacingMode, OverlayElement, OverlayHandle};

/// One decoded video frame. Pixel data is shared, never copied per consumer.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub captured_at: DateTime<Utc>,
    pub pixels: Arc<Vec<u8>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamConstraints {
    pub facing_mode: FacingMode,
}

impl StreamConstraints {
    pub fn video(facing_mode: FacingMode) -> Self {
        Self { facing_mode }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    VideoInput,
    AudioInput,
    AudioOutput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDeviceInfo {
    pub kind: DeviceKind,
    pub label: String,
}

/// Object-detection model. Must report ready before a camera session may start.
pub trait Detector: Send + Sync + 'static {
    fn is_ready(&self) -> bool;

    fn detect(&self, frame: VideoFrame) -> impl Future<Output = Result<Vec<Detection>>> + Send;
}

/// A live capture stream bound to one camera.
pub trait CaptureStream: Send + Sync + 'static {
    /// Latest decoded frame, `None` until the stream has produced data.
    fn current_frame(&self) -> Option<VideoFrame>;

    fn stop_all_tracks(&self);
}

pub trait MediaDevices: Send + Sync + 'static {
    type Stream: CaptureStream;

    fn is_supported(&self) -> bool {
        true
    }

    fn request_stream(
        &self,
        constraints: StreamConstraints,
    ) -> impl Future<Output = Result<Self::Stream, CameraError>> + Send;

    fn enumerate_devices(
        &self,
    ) -> impl Future<Output = Result<Vec<MediaDeviceInfo>, CameraError>> + Send;
}

/// Text-to-speech. Fire-and-forget; queuing of overlapping utterances is the service's business.
pub trait SpeechSynthesizer: Send + Sync + 'static {
    fn speak(&self, text: &str);

    fn cancel_all(&self);
}

pub trait RenderSurface: Send + Sync + 'static {
    fn create(&self, element: &OverlayElement) -> OverlayHandle;

    fn destroy(&self, handle: OverlayHandle);
}
