//! In-process stand-ins for the platform services. They back the console harness and
//! the unit tests: a bank of fake cameras, a detector that replays a script of frames,
//! a speech synthesizer that logs what it would say, and an in-memory render surface.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::error::CameraError;
use crate::models::{Detection, FacingMode, OverlayElement, OverlayHandle};
use crate::platform_bridge::{
    CaptureStream, DeviceKind, Detector, MediaDeviceInfo, MediaDevices, RenderSurface,
    SpeechSynthesizer, StreamConstraints, VideoFrame,
};

const ENABLE_LOGS: bool = true;

use crate::log_info;

const FRAME_WIDTH: u32 = 640;
const FRAME_HEIGHT: u32 = 480;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[derive(Debug)]
pub struct StreamProbe {
    pub facing_mode: FacingMode,
    stopped: AtomicBool,
}

impl StreamProbe {
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

pub struct SimStream {
    probe: Arc<StreamProbe>,
    frames_withheld: Arc<AtomicBool>,
    pixels: Arc<Vec<u8>>,
}

impl SimStream {
    pub fn facing_mode(&self) -> FacingMode {
        self.probe.facing_mode
    }
}

impl CaptureStream for SimStream {
    fn current_frame(&self) -> Option<VideoFrame> {
        if self.probe.is_stopped() || self.frames_withheld.load(Ordering::SeqCst) {
            return None;
        }

        Some(VideoFrame {
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
            captured_at: Utc::now(),
            pixels: Arc::clone(&self.pixels),
        })
    }

    fn stop_all_tracks(&self) {
        self.probe.stopped.store(true, Ordering::SeqCst);
    }
}

/// A device with `video_inputs` cameras. Every issued stream is kept as a probe so
/// callers can check which ones were stopped.
pub struct SimCameras {
    video_inputs: AtomicUsize,
    deny_permission: AtomicBool,
    supported: AtomicBool,
    exclusive: AtomicBool,
    frames_withheld: Arc<AtomicBool>,
    blocked: Mutex<Vec<FacingMode>>,
    issued: Mutex<Vec<Arc<StreamProbe>>>,
}

impl SimCameras {
    pub fn new(video_inputs: usize) -> Self {
        Self {
            video_inputs: AtomicUsize::new(video_inputs),
            deny_permission: AtomicBool::new(false),
            supported: AtomicBool::new(true),
            exclusive: AtomicBool::new(false),
            frames_withheld: Arc::new(AtomicBool::new(false)),
            blocked: Mutex::new(Vec::new()),
            issued: Mutex::new(Vec::new()),
        }
    }

    pub fn set_permission_denied(&self, denied: bool) {
        self.deny_permission.store(denied, Ordering::SeqCst);
    }

    pub fn set_supported(&self, supported: bool) {
        self.supported.store(supported, Ordering::SeqCst);
    }

    /// Hardware that can only run one camera at a time: a request fails with "device
    /// busy" while any issued stream is still live.
    pub fn set_exclusive(&self, exclusive: bool) {
        self.exclusive.store(exclusive, Ordering::SeqCst);
    }

    /// Streams stay open but have no decoded frame, as right after the camera starts.
    pub fn withhold_frames(&self, withheld: bool) {
        self.frames_withheld.store(withheld, Ordering::SeqCst);
    }

    /// Requests for this facing mode fail until unblocked.
    pub fn block_facing(&self, facing_mode: FacingMode) {
        lock(&self.blocked).push(facing_mode);
    }

    pub fn issued_streams(&self) -> Vec<Arc<StreamProbe>> {
        lock(&self.issued).clone()
    }
}

impl MediaDevices for SimCameras {
    type Stream = SimStream;

    fn is_supported(&self) -> bool {
        self.supported.load(Ordering::SeqCst)
    }

    async fn request_stream(&self, constraints: StreamConstraints) -> Result<SimStream, CameraError> {
        if self.deny_permission.load(Ordering::SeqCst) {
            return Err(CameraError::PermissionDenied);
        }
        if self.video_inputs.load(Ordering::SeqCst) == 0 {
            return Err(CameraError::DeviceUnavailable);
        }
        if lock(&self.blocked).contains(&constraints.facing_mode) {
            return Err(CameraError::Capture(format!(
                "{} camera unavailable",
                constraints.facing_mode.as_constraint()
            )));
        }
        if self.exclusive.load(Ordering::SeqCst)
            && lock(&self.issued).iter().any(|probe| !probe.is_stopped())
        {
            return Err(CameraError::Capture("device busy".into()));
        }

        let probe = Arc::new(StreamProbe {
            facing_mode: constraints.facing_mode,
            stopped: AtomicBool::new(false),
        });
        lock(&self.issued).push(Arc::clone(&probe));

        Ok(SimStream {
            probe,
            frames_withheld: Arc::clone(&self.frames_withheld),
            pixels: Arc::new(Vec::new()),
        })
    }

    async fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, CameraError> {
        let cameras = self.video_inputs.load(Ordering::SeqCst);
        let mut devices: Vec<MediaDeviceInfo> = (0..cameras)
            .map(|index| MediaDeviceInfo {
                kind: DeviceKind::VideoInput,
                label: format!("Simulated camera {index}"),
            })
            .collect();
        devices.push(MediaDeviceInfo {
            kind: DeviceKind::AudioInput,
            label: "Simulated microphone".into(),
        });
        Ok(devices)
    }
}

/// Replays a fixed list of frames, wrapping around at the end.
pub struct ScriptedDetector {
    ready: AtomicBool,
    script: Vec<Vec<Detection>>,
    cursor: AtomicUsize,
    latency_ms: AtomicU64,
    pending_failures: AtomicUsize,
}

impl ScriptedDetector {
    pub fn new(script: Vec<Vec<Detection>>) -> Self {
        Self {
            ready: AtomicBool::new(true),
            script,
            cursor: AtomicUsize::new(0),
            latency_ms: AtomicU64::new(0),
            pending_failures: AtomicUsize::new(0),
        }
    }

    /// Script file format: a JSON array of frames, each an array of detections.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read detection script {}", path.display()))?;
        let script: Vec<Vec<Detection>> = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid detection script {}", path.display()))?;
        Ok(Self::new(script))
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Every inference takes this long before answering.
    pub fn set_latency(&self, latency: Duration) {
        let millis = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.latency_ms.store(millis, Ordering::SeqCst);
    }

    /// The next `count` inferences fail.
    pub fn fail_next(&self, count: usize) {
        self.pending_failures.store(count, Ordering::SeqCst);
    }

    /// Number of inference calls started so far.
    pub fn calls(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }
}

impl Detector for ScriptedDetector {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn detect(&self, _frame: VideoFrame) -> Result<Vec<Detection>> {
        let index = self.cursor.fetch_add(1, Ordering::SeqCst);
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        let failing = self
            .pending_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            anyhow::bail!("simulated inference failure on call {index}");
        }

        if self.script.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.script[index % self.script.len()].clone())
    }
}

#[derive(Default)]
pub struct SpeechLog {
    spoken: Mutex<Vec<String>>,
    cancellations: AtomicUsize,
}

impl SpeechLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spoken(&self) -> Vec<String> {
        lock(&self.spoken).clone()
    }

    pub fn times_spoken(&self, text: &str) -> usize {
        lock(&self.spoken).iter().filter(|said| *said == text).count()
    }

    pub fn cancellations(&self) -> usize {
        self.cancellations.load(Ordering::SeqCst)
    }
}

impl SpeechSynthesizer for SpeechLog {
    fn speak(&self, text: &str) {
        log_info!("speak: {text}");
        lock(&self.spoken).push(text.to_string());
    }

    fn cancel_all(&self) {
        self.cancellations.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct MemorySurface {
    next_handle: AtomicU64,
    live: Mutex<BTreeMap<OverlayHandle, OverlayElement>>,
    destroyed: AtomicUsize,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_elements(&self) -> Vec<OverlayElement> {
        lock(&self.live).values().cloned().collect()
    }

    pub fn live_count(&self) -> usize {
        lock(&self.live).len()
    }

    pub fn destroyed_count(&self) -> usize {
        self.destroyed.load(Ordering::SeqCst)
    }
}

impl RenderSurface for MemorySurface {
    fn create(&self, element: &OverlayElement) -> OverlayHandle {
        let handle = OverlayHandle(self.next_handle.fetch_add(1, Ordering::SeqCst));
        lock(&self.live).insert(handle, element.clone());
        handle
    }

    fn destroy(&self, handle: OverlayHandle) {
        if lock(&self.live).remove(&handle).is_some() {
            self.destroyed.fetch_add(1, Ordering::SeqCst);
        }
    }
}
