use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::RecognitionError;
use crate::platform_bridge::{Detector, MediaDevices, SpeechSynthesizer};

use super::config::VoiceCommand;
use super::router::VoiceCommandRouter;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info};

pub const RECOGNITION_ERROR_MESSAGE: &str =
    "An error occurred during voice recognition. Please try again.";

/// Best alternative of one recognition result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionResult {
    pub transcript: String,
    pub is_final: bool,
}

impl RecognitionResult {
    pub fn final_transcript(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: true,
        }
    }
}

/// What the speech-recognition service delivers while listening continuously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// All results of the current recognition session so far; the newest is last.
    Results(Vec<RecognitionResult>),
    Error { reason: String },
}

pub struct VoiceListener<M: MediaDevices, D: Detector> {
    router: VoiceCommandRouter<M, D>,
    speech: Arc<dyn SpeechSynthesizer>,
}

impl<M: MediaDevices, D: Detector> VoiceListener<M, D> {
    pub fn new(router: VoiceCommandRouter<M, D>, speech: Arc<dyn SpeechSynthesizer>) -> Self {
        Self { router, speech }
    }

    pub fn router(&self) -> &VoiceCommandRouter<M, D> {
        &self.router
    }

    pub async fn handle(&self, event: RecognitionEvent) -> Option<VoiceCommand> {
        match event {
            RecognitionEvent::Results(results) => {
                let latest = results.last()?;
                if !latest.is_final {
                    log_debug!("ignoring interim transcript {:?}", latest.transcript);
                    return None;
                }

                let command = latest.transcript.trim().to_lowercase();
                log_info!("Voice command received: {command}");
                self.router.route(&command).await
            }
            RecognitionEvent::Error { reason } => {
                let err = RecognitionError { reason };
                log_error!("{err}");
                self.speech.speak(RECOGNITION_ERROR_MESSAGE);
                None
            }
        }
    }

    /// Handles events one at a time until the channel closes or the token is cancelled.
    /// Recognition errors do not end the loop.
    pub async fn listen(
        &self,
        mut events: mpsc::Receiver<RecognitionEvent>,
        cancel_token: CancellationToken,
    ) {
        log_info!("listening for voice commands");
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        self.handle(event).await;
                    }
                    None => break,
                },
                _ = cancel_token.cancelled() => break,
            }
        }
        log_info!("voice listener shutting down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraController;
    use crate::models::SessionStatus;
    use crate::settings::AssistantSettings;
    use crate::sim::{MemorySurface, ScriptedDetector, SimCameras, SpeechLog};

    fn listener() -> (VoiceListener<SimCameras, ScriptedDetector>, Arc<SpeechLog>) {
        let speech = Arc::new(SpeechLog::new());
        let settings = AssistantSettings::default();
        let controller = CameraController::new(
            Arc::new(SimCameras::new(2)),
            Arc::new(ScriptedDetector::new(Vec::new())),
            speech.clone(),
            Arc::new(MemorySurface::new()),
            &settings,
        );
        let router = VoiceCommandRouter::new(controller, &settings.voice, speech.clone());
        (VoiceListener::new(router, speech.clone()), speech)
    }

    #[tokio::test]
    async fn latest_final_result_is_routed() {
        let (listener, _speech) = listener();
        let event = RecognitionEvent::Results(vec![
            RecognitionResult::final_transcript("stop"),
            RecognitionResult::final_transcript(" Enable Webcam "),
        ]);

        assert_eq!(listener.handle(event).await, Some(VoiceCommand::Enable));
        assert_eq!(
            listener.router().controller().status().await,
            SessionStatus::Active
        );
    }

    #[tokio::test]
    async fn interim_results_are_ignored() {
        let (listener, speech) = listener();
        let event = RecognitionEvent::Results(vec![RecognitionResult {
            transcript: "enable".into(),
            is_final: false,
        }]);

        assert_eq!(listener.handle(event).await, None);
        assert!(speech.spoken().is_empty());
    }

    #[tokio::test]
    async fn errors_are_spoken_and_listening_continues() {
        let (listener, speech) = listener();
        let (tx, rx) = mpsc::channel(8);
        tx.send(RecognitionEvent::Error {
            reason: "no-speech".into(),
        })
        .await
        .expect("send error");
        tx.send(RecognitionEvent::Results(vec![RecognitionResult::final_transcript(
            "start camera",
        )]))
        .await
        .expect("send result");
        drop(tx);

        listener.listen(rx, CancellationToken::new()).await;

        assert_eq!(
            speech.spoken(),
            vec![
                RECOGNITION_ERROR_MESSAGE.to_string(),
                "Webcam enabled.".to_string()
            ]
        );
        assert_eq!(
            listener.router().controller().status().await,
            SessionStatus::Active
        );
    }
}
