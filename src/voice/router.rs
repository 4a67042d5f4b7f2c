use std::sync::Arc;

use crate::camera::CameraController;
use crate::platform_bridge::{Detector, MediaDevices, SpeechSynthesizer};

use super::config::{VoiceCommand, VoiceConfig};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Permissive phrase matcher: a transcript selects a command when it contains any of
/// the command's phrases anywhere.
#[derive(Debug, Clone)]
pub struct CommandMatcher {
    sets: Vec<(VoiceCommand, Vec<String>)>,
}

impl CommandMatcher {
    pub fn new(config: &VoiceConfig) -> Self {
        let sets = config
            .precedence
            .iter()
            .map(|&command| {
                let phrases: Vec<String> = config
                    .phrases_for(command)
                    .iter()
                    .map(|phrase| phrase.trim().to_lowercase())
                    .filter(|phrase| !phrase.is_empty())
                    .collect();
                (command, phrases)
            })
            .collect();

        Self { sets }
    }

    pub fn match_transcript(&self, transcript: &str) -> Option<VoiceCommand> {
        let normalized = transcript.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }

        self.sets
            .iter()
            .find(|(_, phrases)| phrases.iter().any(|phrase| normalized.contains(phrase.as_str())))
            .map(|(command, _)| *command)
    }
}

pub struct VoiceCommandRouter<M: MediaDevices, D: Detector> {
    controller: CameraController<M, D>,
    matcher: CommandMatcher,
    speech: Arc<dyn SpeechSynthesizer>,
}

impl<M: MediaDevices, D: Detector> VoiceCommandRouter<M, D> {
    pub fn new(
        controller: CameraController<M, D>,
        config: &VoiceConfig,
        speech: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            controller,
            matcher: CommandMatcher::new(config),
            speech,
        }
    }

    pub fn controller(&self) -> &CameraController<M, D> {
        &self.controller
    }

    /// Runs the command a transcript asks for and confirms it aloud. The confirmation
    /// follows every matched command, so the user always hears that it was understood;
    /// a failed action also speaks its own error. Transcripts that match nothing are
    /// ignored silently.
    pub async fn route(&self, transcript: &str) -> Option<VoiceCommand> {
        let Some(command) = self.matcher.match_transcript(transcript) else {
            log_debug!("no command in transcript {transcript:?}");
            return None;
        };

        let outcome = match command {
            VoiceCommand::Enable => self.controller.enable().await,
            VoiceCommand::Stop => self.controller.stop().await,
            VoiceCommand::Switch => self.controller.switch_camera().await,
        };

        match outcome {
            Ok(snapshot) => log_info!("voice command {command:?} -> {}", snapshot.status.as_str()),
            Err(err) => log_warn!("voice command {command:?} failed: {err}"),
        }
        self.speech.speak(command.acknowledgement());

        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionStatus;
    use crate::settings::AssistantSettings;
    use crate::sim::{MemorySurface, ScriptedDetector, SimCameras, SpeechLog};

    fn matcher() -> CommandMatcher {
        CommandMatcher::new(&VoiceConfig::default())
    }

    fn router(video_inputs: usize) -> (VoiceCommandRouter<SimCameras, ScriptedDetector>, Arc<SpeechLog>) {
        let speech = Arc::new(SpeechLog::new());
        let settings = AssistantSettings::default();
        let controller = CameraController::new(
            Arc::new(SimCameras::new(video_inputs)),
            Arc::new(ScriptedDetector::new(Vec::new())),
            speech.clone(),
            Arc::new(MemorySurface::new()),
            &settings,
        );
        (
            VoiceCommandRouter::new(controller, &settings.voice, speech.clone()),
            speech,
        )
    }

    #[test]
    fn matching_is_substring_and_case_insensitive() {
        let matcher = matcher();
        assert_eq!(matcher.match_transcript("  Please ENABLE camera now "), Some(VoiceCommand::Enable));
        assert_eq!(matcher.match_transcript("stop camera"), Some(VoiceCommand::Stop));
        assert_eq!(matcher.match_transcript("could you switch it"), Some(VoiceCommand::Switch));
        assert_eq!(matcher.match_transcript("what time is it"), None);
        assert_eq!(matcher.match_transcript("   "), None);
    }

    #[test]
    fn enable_set_wins_ties_by_default() {
        let matcher = matcher();
        assert_eq!(matcher.match_transcript("enable then stop"), Some(VoiceCommand::Enable));
        // No enable phrase hides inside "turn off camera".
        assert_eq!(matcher.match_transcript("turn off camera"), Some(VoiceCommand::Stop));
        // "switch on" contains the enable phrase "on".
        assert_eq!(matcher.match_transcript("switch on"), Some(VoiceCommand::Enable));
    }

    #[test]
    fn precedence_is_configurable() {
        let config = VoiceConfig {
            precedence: vec![VoiceCommand::Stop, VoiceCommand::Enable, VoiceCommand::Switch],
            ..VoiceConfig::default()
        };
        let matcher = CommandMatcher::new(&config);
        assert_eq!(matcher.match_transcript("enable then stop"), Some(VoiceCommand::Stop));
    }

    #[test]
    fn blank_phrases_never_match_everything() {
        let config = VoiceConfig {
            switch_phrases: vec!["".into(), "  ".into()],
            ..VoiceConfig::default()
        };
        let matcher = CommandMatcher::new(&config);
        assert_eq!(matcher.match_transcript("hello there"), None);
    }

    #[tokio::test]
    async fn enable_transcript_activates_and_acknowledges() {
        let (router, speech) = router(1);

        let command = router.route("please enable camera now").await;

        assert_eq!(command, Some(VoiceCommand::Enable));
        assert_eq!(router.controller().status().await, SessionStatus::Active);
        assert_eq!(speech.spoken(), vec!["Webcam enabled.".to_string()]);
    }

    #[tokio::test]
    async fn stop_transcript_stops_and_acknowledges() {
        let (router, speech) = router(1);
        router.route("start").await;

        assert_eq!(router.route("Stop webcam").await, Some(VoiceCommand::Stop));
        assert_eq!(router.controller().status().await, SessionStatus::Stopped);
        assert_eq!(speech.times_spoken("Webcam stopped."), 1);
    }

    #[tokio::test]
    async fn failed_switch_is_still_acknowledged() {
        let (router, speech) = router(1);
        router.route("enable").await;

        assert_eq!(router.route("switch camera").await, Some(VoiceCommand::Switch));
        assert_eq!(speech.times_spoken("Switching camera."), 1);
        assert_eq!(speech.times_spoken(crate::camera::NO_ADDITIONAL_CAMERA), 1);
    }

    #[tokio::test]
    async fn enable_before_model_loads_is_acknowledged() {
        let (router, speech) = router(1);
        router.controller().detector().set_ready(false);

        assert_eq!(router.route("enable webcam").await, Some(VoiceCommand::Enable));
        assert_eq!(router.controller().status().await, SessionStatus::Idle);
        assert_eq!(speech.spoken(), vec!["Webcam enabled.".to_string()]);
    }

    #[tokio::test]
    async fn switch_while_idle_is_acknowledged() {
        let (router, speech) = router(2);

        assert_eq!(router.route("switch camera").await, Some(VoiceCommand::Switch));
        assert_eq!(router.controller().status().await, SessionStatus::Idle);
        assert_eq!(speech.spoken(), vec!["Switching camera.".to_string()]);
    }

    #[tokio::test]
    async fn unmatched_transcript_does_nothing() {
        let (router, speech) = router(2);

        assert_eq!(router.route("good morning").await, None);
        assert_eq!(router.controller().status().await, SessionStatus::Idle);
        assert!(speech.spoken().is_empty());
    }
}
