pub mod config;
pub mod listener;
pub mod router;

pub use config::{VoiceCommand, VoiceConfig};
pub use listener::{RecognitionEvent, RecognitionResult, VoiceListener};
pub use router::{CommandMatcher, VoiceCommandRouter};
