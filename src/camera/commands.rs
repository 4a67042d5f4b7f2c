//! Button handlers for the on-screen controls. They go through the same controller
//! methods as voice commands; only the error type is flattened for the UI layer.

use crate::models::SessionSnapshot;
use crate::platform_bridge::{Detector, MediaDevices};

use super::CameraController;

pub async fn get_session_state<M: MediaDevices, D: Detector>(
    controller: &CameraController<M, D>,
) -> Result<SessionSnapshot, String> {
    Ok(controller.snapshot().await)
}

pub async fn enable_camera<M: MediaDevices, D: Detector>(
    controller: &CameraController<M, D>,
) -> Result<SessionSnapshot, String> {
    controller.enable().await.map_err(|e| e.to_string())
}

pub async fn stop_camera<M: MediaDevices, D: Detector>(
    controller: &CameraController<M, D>,
) -> Result<SessionSnapshot, String> {
    controller.stop().await.map_err(|e| e.to_string())
}

pub async fn switch_camera<M: MediaDevices, D: Detector>(
    controller: &CameraController<M, D>,
) -> Result<SessionSnapshot, String> {
    controller.switch_camera().await.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionStatus;
    use crate::settings::AssistantSettings;
    use crate::sim::{MemorySurface, ScriptedDetector, SimCameras, SpeechLog};
    use std::sync::Arc;

    #[tokio::test]
    async fn buttons_drive_the_same_state_machine() {
        let detector = Arc::new(ScriptedDetector::new(Vec::new()));
        let controller = CameraController::new(
            Arc::new(SimCameras::new(1)),
            detector.clone(),
            Arc::new(SpeechLog::new()),
            Arc::new(MemorySurface::new()),
            &AssistantSettings::default(),
        );

        assert_eq!(
            enable_camera(&controller).await.map(|s| s.status),
            Ok(SessionStatus::Active)
        );
        assert_eq!(
            switch_camera(&controller).await,
            Err("no camera device available".to_string())
        );
        assert_eq!(
            stop_camera(&controller).await.map(|s| s.status),
            Ok(SessionStatus::Stopped)
        );
        assert_eq!(
            get_session_state(&controller).await.map(|s| s.status),
            Ok(SessionStatus::Stopped)
        );

        detector.set_ready(false);
        assert_eq!(
            enable_camera(&controller).await,
            Err("detection model is not loaded yet".to_string())
        );
    }
}
