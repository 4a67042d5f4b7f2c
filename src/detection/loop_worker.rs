use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{sleep, timeout, Instant};
use tokio_util::sync::CancellationToken;

use crate::camera::context::SessionContext;
use crate::models::{Detection, OverlayElement};
use crate::platform_bridge::{CaptureStream, Detector, SpeechSynthesizer};

use super::config::LoopConfig;
use super::overlay::overlay_for;

// Set to false to silence per-frame logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutcome {
    pub overlays: usize,
    pub spoken: Option<String>,
}

/// Applies one frame's inference result: redraws the overlay and voices at most one
/// proximity warning, subject to the debouncer.
pub fn apply_detections<S: CaptureStream>(
    ctx: &mut SessionContext<S>,
    detections: &[Detection],
    speech: &dyn SpeechSynthesizer,
    now: Instant,
) -> FrameOutcome {
    let qualifying: Vec<&Detection> = detections
        .iter()
        .filter(|detection| ctx.policy.qualifies(detection))
        .collect();

    let elements: Vec<OverlayElement> = qualifying.iter().map(|detection| overlay_for(detection)).collect();
    ctx.overlay.replace(&elements);

    let candidate = ctx.policy.select(qualifying.iter().copied(), ctx.selection);
    let spoken = match candidate {
        Some(message) if ctx.alerts.should_speak(&message, now) => {
            speech.speak(&message);
            ctx.alerts.record(&message, now);
            Some(message)
        }
        _ => None,
    };

    FrameOutcome {
        overlays: elements.len(),
        spoken,
    }
}

/// Runs inference frame after frame until the session leaves Active or the token is
/// cancelled. Exactly one inference is in flight at a time.
pub async fn detection_loop<S, D>(
    context: Arc<Mutex<SessionContext<S>>>,
    detector: Arc<D>,
    speech: Arc<dyn SpeechSynthesizer>,
    config: LoopConfig,
    cancel_token: CancellationToken,
) where
    S: CaptureStream,
    D: Detector,
{
    log_info!("detection loop started");
    let mut frames: u64 = 0;

    loop {
        let frame = {
            let ctx = context.lock().await;
            if cancel_token.is_cancelled() || !ctx.is_active() {
                break;
            }
            ctx.session.current_frame()
        };

        match frame {
            Some(frame) => match timeout(config.inference_timeout(), detector.detect(frame)).await {
                Ok(Ok(detections)) => {
                    let mut ctx = context.lock().await;
                    if cancel_token.is_cancelled() || !ctx.is_active() {
                        log_debug!("session stopped during inference; discarding result");
                        break;
                    }

                    let outcome = apply_detections(&mut *ctx, &detections, speech.as_ref(), Instant::now());
                    frames += 1;
                    if let Some(message) = outcome.spoken {
                        log_info!("proximity alert: {message}");
                    }
                }
                Ok(Err(err)) => log_error!("inference failed, skipping frame: {err:?}"),
                Err(_) => log_warn!(
                    "inference timeout (> {}ms), skipping frame",
                    config.inference_timeout_ms
                ),
            },
            None => log_debug!("stream has no decoded frame yet"),
        }

        tokio::select! {
            _ = sleep(config.frame_interval()) => {}
            _ = cancel_token.cancelled() => break,
        }
    }

    log_info!("detection loop shutting down after {frames} frames");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{AlertDebouncer, AlertSelection, ProximityPolicy};
    use crate::camera::state::SessionState;
    use crate::detection::overlay::OverlayBoard;
    use crate::models::{BoundingBox, FacingMode};
    use crate::sim::{MemorySurface, SimStream, SpeechLog};
    use tokio::time::Duration;

    const PERSON_WARNING: &str = "Warning: person is near";

    fn at(start: Instant, ms: u64) -> Instant {
        start + Duration::from_millis(ms)
    }

    fn context(surface: Arc<MemorySurface>) -> SessionContext<SimStream> {
        SessionContext::new(
            SessionState::new(FacingMode::Back),
            AlertDebouncer::new(Duration::from_millis(7_000)),
            OverlayBoard::new(surface),
            ProximityPolicy::default(),
            AlertSelection::LastEvaluated,
        )
    }

    fn person_at_200px() -> Detection {
        Detection::new("person", 0.9, BoundingBox::new(10.0, 10.0, 20.0, 10.0))
    }

    #[test]
    fn persistent_person_is_announced_once_within_interval() {
        let start = Instant::now();
        let surface = Arc::new(MemorySurface::new());
        let speech = SpeechLog::new();
        let mut ctx = context(surface);

        let first = apply_detections(&mut ctx, &[person_at_200px()], &speech, at(start, 0));
        let second = apply_detections(&mut ctx, &[person_at_200px()], &speech, at(start, 3_000));

        assert_eq!(first.spoken.as_deref(), Some(PERSON_WARNING));
        assert_eq!(second.spoken, None);
        assert_eq!(speech.times_spoken(PERSON_WARNING), 1);

        let later = apply_detections(&mut ctx, &[person_at_200px()], &speech, at(start, 7_500));
        assert_eq!(later.spoken.as_deref(), Some(PERSON_WARNING));
    }

    #[test]
    fn low_confidence_detections_are_neither_drawn_nor_spoken() {
        let start = Instant::now();
        let surface = Arc::new(MemorySurface::new());
        let speech = SpeechLog::new();
        let mut ctx = context(surface.clone());
        let faint = Detection::new("car", 0.5, BoundingBox::new(0.0, 0.0, 300.0, 300.0));
        let cup = Detection::new("cup", 0.8, BoundingBox::new(0.0, 0.0, 5.0, 5.0));

        let outcome = apply_detections(&mut ctx, &[faint, cup], &speech, at(start, 0));

        assert_eq!(outcome, FrameOutcome { overlays: 1, spoken: None });
        assert_eq!(surface.live_count(), 1);
        assert!(speech.spoken().is_empty());
    }

    #[test]
    fn last_alerting_detection_wins_by_default() {
        let start = Instant::now();
        let surface = Arc::new(MemorySurface::new());
        let speech = SpeechLog::new();
        let mut ctx = context(surface.clone());
        let chair = Detection::new("chair", 0.8, BoundingBox::new(0.0, 0.0, 40.0, 40.0));

        let outcome = apply_detections(&mut ctx, &[person_at_200px(), chair], &speech, at(start, 0));

        assert_eq!(outcome.spoken.as_deref(), Some("Warning: chair is near"));
        assert_eq!(surface.live_count(), 2);
    }

    #[test]
    fn each_frame_replaces_the_overlay() {
        let start = Instant::now();
        let surface = Arc::new(MemorySurface::new());
        let speech = SpeechLog::new();
        let mut ctx = context(surface.clone());

        apply_detections(&mut ctx, &[person_at_200px(), person_at_200px()], &speech, at(start, 0));
        apply_detections(&mut ctx, &[], &speech, at(start, 16));

        assert_eq!(surface.live_count(), 0);
        assert_eq!(surface.destroyed_count(), 2);
        assert!(ctx.overlay.is_empty());
    }
}
