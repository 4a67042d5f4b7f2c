use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::alerts::{AlertDebouncer, AlertSelection, ProximityPolicy};
use crate::detection::overlay::OverlayBoard;
use crate::platform_bridge::CaptureStream;

use super::state::SessionState;

/// Handle on the running detection loop of the current session.
pub struct DetectionTask {
    pub cancel_token: CancellationToken,
    pub handle: JoinHandle<()>,
}

impl DetectionTask {
    /// Stops new inference from being issued. A result already in flight is discarded
    /// when it lands; the task is not joined here.
    pub fn cancel(self) -> JoinHandle<()> {
        self.cancel_token.cancel();
        self.handle
    }
}

/// Everything the camera handlers and the detection loop mutate, kept behind a single
/// lock so no handler ever observes another one half-way through.
pub struct SessionContext<S> {
    pub session: SessionState<S>,
    pub alerts: AlertDebouncer,
    pub overlay: OverlayBoard,
    pub policy: ProximityPolicy,
    pub selection: AlertSelection,
    pub(crate) detection: Option<DetectionTask>,
}

impl<S: CaptureStream> SessionContext<S> {
    pub fn new(
        session: SessionState<S>,
        alerts: AlertDebouncer,
        overlay: OverlayBoard,
        policy: ProximityPolicy,
        selection: AlertSelection,
    ) -> Self {
        Self {
            session,
            alerts,
            overlay,
            policy,
            selection,
            detection: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_active()
    }
}
