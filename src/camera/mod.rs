pub mod commands;
pub mod context;
pub mod controller;
pub mod state;

pub use controller::{CameraController, NO_ADDITIONAL_CAMERA};
pub use state::SessionState;
