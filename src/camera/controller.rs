use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;

use crate::alerts::{AlertDebouncer, ProximityPolicy};
use crate::detection::{detection_loop, overlay::OverlayBoard, LoopConfig};
use crate::error::CameraError;
use crate::models::{SessionSnapshot, SessionStatus};
use crate::platform_bridge::{
    CaptureStream, DeviceKind, Detector, MediaDevices, RenderSurface, SpeechSynthesizer,
    StreamConstraints,
};
use crate::settings::AssistantSettings;

use super::context::{DetectionTask, SessionContext};
use super::state::SessionState;

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

pub const NO_ADDITIONAL_CAMERA: &str = "No additional camera available for switching.";

/// Owns the camera session state machine: `Idle → Active → Stopped → Active …`, with
/// camera switches looping on Active. Voice commands and UI buttons both land here.
pub struct CameraController<M: MediaDevices, D: Detector> {
    context: Arc<Mutex<SessionContext<M::Stream>>>,
    media: Arc<M>,
    detector: Arc<D>,
    speech: Arc<dyn SpeechSynthesizer>,
    loop_config: LoopConfig,
    state_tx: Arc<watch::Sender<SessionSnapshot>>,
}

impl<M: MediaDevices, D: Detector> Clone for CameraController<M, D> {
    fn clone(&self) -> Self {
        Self {
            context: Arc::clone(&self.context),
            media: Arc::clone(&self.media),
            detector: Arc::clone(&self.detector),
            speech: Arc::clone(&self.speech),
            loop_config: self.loop_config,
            state_tx: Arc::clone(&self.state_tx),
        }
    }
}

impl<M: MediaDevices, D: Detector> CameraController<M, D> {
    pub fn new(
        media: Arc<M>,
        detector: Arc<D>,
        speech: Arc<dyn SpeechSynthesizer>,
        surface: Arc<dyn RenderSurface>,
        settings: &AssistantSettings,
    ) -> Self {
        let session = SessionState::new(settings.camera.initial_facing);
        let (state_tx, _) = watch::channel(session.snapshot());
        let context = SessionContext::new(
            session,
            AlertDebouncer::new(settings.alerts.repeat_interval()),
            OverlayBoard::new(surface),
            ProximityPolicy::from(&settings.alerts),
            settings.alerts.selection,
        );

        Self {
            context: Arc::new(Mutex::new(context)),
            media,
            detector,
            speech,
            loop_config: settings.detection,
            state_tx: Arc::new(state_tx),
        }
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.context.lock().await.session.snapshot()
    }

    /// Receives a snapshot after every state transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state_tx.subscribe()
    }

    /// Starts a session on the current facing mode. A no-op when already Active.
    pub async fn enable(&self) -> Result<SessionSnapshot, CameraError> {
        let mut ctx = self.context.lock().await;
        if ctx.is_active() {
            log_info!("camera already active; ignoring enable");
            return Ok(ctx.session.snapshot());
        }

        if !self.detector.is_ready() {
            log_warn!("enable requested before the detection model finished loading");
            return Err(CameraError::ModelNotReady);
        }

        if !self.media.is_supported() {
            log_warn!("camera capture is not supported on this platform");
            return Err(self.report(CameraError::Unsupported));
        }

        let facing_mode = ctx.session.facing_mode;
        let stream = match self
            .media
            .request_stream(StreamConstraints::video(facing_mode))
            .await
        {
            Ok(stream) => stream,
            Err(err) => {
                log_error!("Error accessing the camera ({}): {err}", facing_mode.as_constraint());
                return Err(self.report(err));
            }
        };

        ctx.session.begin(stream, Utc::now());
        if let Some(stale) = ctx.detection.take() {
            drop(stale.cancel());
        }
        ctx.detection = Some(self.spawn_detection_loop());

        let snapshot = ctx.session.snapshot();
        log_info!(
            "camera session {} started on the {} camera",
            snapshot.session_id.as_deref().unwrap_or("?"),
            facing_mode.as_constraint()
        );
        self.publish(&snapshot);
        Ok(snapshot)
    }

    /// Moves the live session to the other camera. The detection loop keeps running and
    /// picks up frames from the new stream on its next cycle. When the other camera
    /// cannot be opened the previous one is reopened, and if that fails too the session
    /// is stopped.
    pub async fn switch_camera(&self) -> Result<SessionSnapshot, CameraError> {
        let mut ctx = self.context.lock().await;
        if !ctx.is_active() {
            log_warn!("switch requested without an active camera session");
            return Err(CameraError::NoActiveSession);
        }

        let devices = match self.media.enumerate_devices().await {
            Ok(devices) => devices,
            Err(err) => {
                log_error!("failed to enumerate capture devices: {err}");
                return Err(self.report(err));
            }
        };
        let video_inputs = devices
            .iter()
            .filter(|device| device.kind == DeviceKind::VideoInput)
            .count();
        if video_inputs <= 1 {
            log_warn!("switch requested with {video_inputs} video input(s)");
            self.speech.speak(NO_ADDITIONAL_CAMERA);
            return Err(CameraError::DeviceUnavailable);
        }

        // Release first: many devices cannot open a second camera while one is live.
        let previous = ctx.session.facing_mode;
        let next = previous.flipped();
        if let Some(stream) = ctx.session.stream() {
            stream.stop_all_tracks();
        }

        let err = match self.media.request_stream(StreamConstraints::video(next)).await {
            Ok(stream) => {
                ctx.session.replace_stream(stream, next);
                let snapshot = ctx.session.snapshot();
                log_info!("switched to the {} camera", next.as_constraint());
                self.publish(&snapshot);
                return Ok(snapshot);
            }
            Err(err) => err,
        };
        log_error!("Error accessing camera ({}): {err}", next.as_constraint());

        // Fall back to the camera we came from; if that is gone too, end the session.
        match self.media.request_stream(StreamConstraints::video(previous)).await {
            Ok(stream) => {
                ctx.session.replace_stream(stream, previous);
                log_warn!("kept the {} camera after a failed switch", previous.as_constraint());
            }
            Err(restore_err) => {
                log_error!(
                    "could not reopen the {} camera ({restore_err}); stopping the session",
                    previous.as_constraint()
                );
                let snapshot = self.end_session(&mut ctx);
                self.publish(&snapshot);
            }
        }
        Err(self.report(err))
    }

    /// Tears the session down. A no-op unless Active.
    pub async fn stop(&self) -> Result<SessionSnapshot, CameraError> {
        let mut ctx = self.context.lock().await;
        if !ctx.is_active() {
            log_info!("camera not active; ignoring stop");
            return Ok(ctx.session.snapshot());
        }

        let snapshot = self.end_session(&mut ctx);
        self.publish(&snapshot);
        Ok(snapshot)
    }

    /// Stops the session and waits for its detection loop to exit.
    pub async fn shutdown(&self) -> anyhow::Result<()> {
        let task = self.context.lock().await.detection.take();
        self.stop().await?;
        if let Some(task) = task {
            task.cancel().await?;
        }
        Ok(())
    }

    pub async fn status(&self) -> SessionStatus {
        self.context.lock().await.session.status
    }

    fn end_session(&self, ctx: &mut SessionContext<M::Stream>) -> SessionSnapshot {
        if let Some(task) = ctx.detection.take() {
            // Detached: an in-flight inference finishes on its own and is discarded.
            drop(task.cancel());
        }

        if let Some(stream) = ctx.session.stop() {
            stream.stop_all_tracks();
        }
        self.speech.cancel_all();
        let destroyed = ctx.overlay.clear();
        ctx.alerts.reset();

        log_info!("camera stopped; removed {destroyed} overlay element(s)");
        ctx.session.snapshot()
    }

    fn spawn_detection_loop(&self) -> DetectionTask {
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(detection_loop(
            Arc::clone(&self.context),
            Arc::clone(&self.detector),
            Arc::clone(&self.speech),
            self.loop_config,
            cancel_token.clone(),
        ));

        DetectionTask {
            cancel_token,
            handle,
        }
    }

    /// Speaks the user-facing part of an error and hands it back.
    fn report(&self, err: CameraError) -> CameraError {
        if let Some(message) = err.spoken_message() {
            self.speech.speak(message);
        }
        err
    }

    fn publish(&self, snapshot: &SessionSnapshot) {
        self.state_tx.send_replace(snapshot.clone());
    }
}
