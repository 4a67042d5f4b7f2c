use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VoiceCommand {
    Enable,
    Stop,
    Switch,
}

impl VoiceCommand {
    /// Spoken back once the command has been carried out.
    pub fn acknowledgement(&self) -> &'static str {
        match self {
            VoiceCommand::Enable => "Webcam enabled.",
            VoiceCommand::Stop => "Webcam stopped.",
            VoiceCommand::Switch => "Switching camera.",
        }
    }
}

/// Phrase sets matched by substring against normalized transcripts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VoiceConfig {
    pub enable_phrases: Vec<String>,
    pub stop_phrases: Vec<String>,
    pub switch_phrases: Vec<String>,

    /// Order in which the phrase sets are tried; the first set that matches wins.
    pub precedence: Vec<VoiceCommand>,

    /// BCP 47 tag handed to the speech-recognition service.
    pub language: String,
}

fn phrases(list: &[&str]) -> Vec<String> {
    list.iter().map(|phrase| phrase.to_string()).collect()
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enable_phrases: phrases(&[
                "enable webcam",
                "on camera",
                "on",
                "turn on camera",
                "enable camera",
                "enable",
                "start",
                "start camera",
            ]),
            stop_phrases: phrases(&[
                "stop webcam",
                "off camera",
                "off",
                "turn off camera",
                "stop",
                "disable",
                "disable camera",
                "stop camera",
                "turn off",
            ]),
            switch_phrases: phrases(&[
                "switch webcam",
                "switch camera",
                "switch",
                "change camera",
                "change",
            ]),
            precedence: vec![VoiceCommand::Enable, VoiceCommand::Stop, VoiceCommand::Switch],
            language: "en-US".into(),
        }
    }
}

impl VoiceConfig {
    pub fn phrases_for(&self, command: VoiceCommand) -> &[String] {
        match command {
            VoiceCommand::Enable => &self.enable_phrases,
            VoiceCommand::Stop => &self.stop_phrases,
            VoiceCommand::Switch => &self.switch_phrases,
        }
    }
}
