pub mod config;
pub mod loop_worker;
pub mod overlay;

pub use config::LoopConfig;
pub use loop_worker::{apply_detections, detection_loop, FrameOutcome};
