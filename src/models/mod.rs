pub mod detection;
pub mod session;

pub use detection::{BoundingBox, Detection, OverlayElement, OverlayHandle, OverlayLabel};
pub use session::{ControlsState, FacingMode, SessionSnapshot, SessionStatus};
