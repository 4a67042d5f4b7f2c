pub mod alerts;
pub mod camera;
pub mod detection;
pub mod error;
pub mod models;
pub mod platform_bridge;
pub mod settings;
pub mod sim;
pub mod utils;
pub mod voice;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use camera::{
    commands::{enable_camera, get_session_state, stop_camera, switch_camera},
    CameraController,
};
use models::{BoundingBox, Detection};
use platform_bridge::{Detector, MediaDevices, RenderSurface, SpeechSynthesizer};
use settings::{AssistantSettings, SettingsStore};
use sim::{MemorySurface, ScriptedDetector, SimCameras, SpeechLog};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use voice::{RecognitionEvent, RecognitionResult, VoiceCommandRouter, VoiceListener};

pub const MODEL_READY_MESSAGE: &str = "Model loaded successfully. You can now give voice commands like \"enable webcam\", \"stop webcam\", or \"switch camera\".";

/// The assistant's single session context: one camera controller, shared by the voice
/// listener and the on-screen buttons.
pub struct Assistant<M: MediaDevices, D: Detector> {
    controller: CameraController<M, D>,
    listener: VoiceListener<M, D>,
    speech: Arc<dyn SpeechSynthesizer>,
}

impl<M: MediaDevices, D: Detector> Assistant<M, D> {
    pub fn new(
        media: Arc<M>,
        detector: Arc<D>,
        speech: Arc<dyn SpeechSynthesizer>,
        surface: Arc<dyn RenderSurface>,
        settings: &AssistantSettings,
    ) -> Self {
        let controller = CameraController::new(media, detector, Arc::clone(&speech), surface, settings);
        let router = VoiceCommandRouter::new(controller.clone(), &settings.voice, Arc::clone(&speech));
        let listener = VoiceListener::new(router, Arc::clone(&speech));

        Self {
            controller,
            listener,
            speech,
        }
    }

    pub fn controller(&self) -> &CameraController<M, D> {
        &self.controller
    }

    pub fn listener(&self) -> &VoiceListener<M, D> {
        &self.listener
    }

    /// Tells the user the model is up and which commands exist. Returns whether it spoke.
    pub fn announce_ready(&self) -> bool {
        if !self.controller.detector().is_ready() {
            return false;
        }
        self.speech.speak(MODEL_READY_MESSAGE);
        true
    }

    /// Feeds recognition events to the voice router. Without camera support there is
    /// nothing to control, so listening never starts.
    pub async fn listen(
        &self,
        events: mpsc::Receiver<RecognitionEvent>,
        cancel_token: CancellationToken,
    ) {
        if !self.controller.media().is_supported() {
            log::warn!("camera capture is not supported; voice commands are disabled");
            return;
        }
        self.listener.listen(events, cancel_token).await;
    }
}

fn demo_script() -> Vec<Vec<Detection>> {
    let person = |width: f64, height: f64| {
        Detection::new("person", 0.91, BoundingBox::new(120.0, 60.0, width, height))
    };
    vec![
        vec![person(8.0, 10.0)],
        vec![person(10.0, 12.0)],
        vec![
            person(14.0, 14.0),
            Detection::new("chair", 0.72, BoundingBox::new(300.0, 200.0, 12.0, 9.0)),
        ],
        vec![Detection::new("chair", 0.55, BoundingBox::new(300.0, 200.0, 30.0, 30.0))],
    ]
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var_os(var).map(PathBuf::from)
}

/// One console line. Transcripts go to the voice listener; `/` lines press a button and
/// return the resulting snapshot as JSON. Once the listener has stopped, transcripts are
/// dropped with a warning and the buttons keep working.
async fn handle_line<M: MediaDevices, D: Detector>(
    assistant: &Assistant<M, D>,
    events: &mpsc::Sender<RecognitionEvent>,
    line: &str,
) -> anyhow::Result<Option<String>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let Some(button) = line.strip_prefix('/') else {
        let event = RecognitionEvent::Results(vec![RecognitionResult::final_transcript(line)]);
        if events.send(event).await.is_err() {
            log::warn!("voice listener is not running; ignoring {line:?} (use /enable, /stop, /switch, /state)");
        }
        return Ok(None);
    };

    let controller = assistant.controller();
    let result = match button {
        "enable" => enable_camera(controller).await,
        "stop" => stop_camera(controller).await,
        "switch" => switch_camera(controller).await,
        "state" => get_session_state(controller).await,
        other => Err(format!("unknown control /{other}")),
    };
    match result {
        Ok(snapshot) => Ok(Some(serde_json::to_string(&snapshot)?)),
        Err(err) => {
            log::warn!("{err}");
            Ok(None)
        }
    }
}

/// Console harness: every stdin line is a spoken transcript, lines starting with `/`
/// press a button (`/enable`, `/stop`, `/switch`, `/state`). Platform services are
/// simulated.
pub async fn run() -> anyhow::Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("NearSight starting up...");

    let settings_path = env_path("NEARSIGHT_SETTINGS").unwrap_or_else(|| PathBuf::from("nearsight.json"));
    let store = SettingsStore::new(settings_path)?;
    let settings = store.get();
    log::info!("settings loaded from {}", store.path().display());

    let detector = match env_path("NEARSIGHT_SCRIPT") {
        Some(path) => ScriptedDetector::from_json_file(&path)?,
        None => ScriptedDetector::new(demo_script()),
    };

    let assistant = Arc::new(Assistant::new(
        Arc::new(SimCameras::new(2)),
        Arc::new(detector),
        Arc::new(SpeechLog::new()),
        Arc::new(MemorySurface::new()),
        &settings,
    ));
    assistant.announce_ready();

    let (events_tx, events_rx) = mpsc::channel(32);
    let cancel_token = CancellationToken::new();
    let listener_task = tokio::spawn({
        let assistant = Arc::clone(&assistant);
        let cancel_token = cancel_token.clone();
        async move { assistant.listen(events_rx, cancel_token).await }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if let Some(output) = handle_line(&*assistant, &events_tx, &line).await? {
            println!("{output}");
        }
    }

    cancel_token.cancel();
    listener_task
        .await
        .context("voice listener task failed to join")?;
    assistant.controller().shutdown().await?;

    log::info!("NearSight shut down");
    Ok(())
}
