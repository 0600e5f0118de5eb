use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::speech::SpeechOutput;

/// Severity tag of a narrated message, doubling as the status line's style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Error => "error",
        }
    }
}

/// The visible status line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Status {
    pub message: String,
    pub severity: Severity,
    pub updated_at: DateTime<Utc>,
}

impl Default for Status {
    fn default() -> Self {
        Self {
            message: String::new(),
            severity: Severity::Info,
            updated_at: Utc::now(),
        }
    }
}

/// Last-write-wins narration: a new message interrupts the one being spoken
pub struct NarrationChannel {
    speech: Box<dyn SpeechOutput>,
    status: watch::Sender<Status>,
    /// Keeps cancel-then-speak of concurrent announcements from interleaving
    gate: Mutex<()>,
}

impl NarrationChannel {
    pub fn new(speech: Box<dyn SpeechOutput>) -> Self {
        let (status, _) = watch::channel(Status::default());
        Self {
            speech,
            status,
            gate: Mutex::new(()),
        }
    }

    /// Replace the status line and speak `message`, cutting off any utterance in progress
    pub fn announce(&self, message: &str, severity: Severity) {
        let _gate = self.gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if self.speech.is_speaking() {
            debug!("Preempting current utterance on {}", self.speech.name());
            self.speech.cancel();
        }

        self.status.send_replace(Status {
            message: message.to_string(),
            severity,
            updated_at: Utc::now(),
        });

        match severity {
            Severity::Info => info!("Status: {}", message),
            Severity::Error => warn!("Status (error): {}", message),
        }

        if let Err(e) = self.speech.speak(message) {
            error!("Failed to speak status: {}", e);
        }
    }

    pub fn info(&self, message: &str) {
        self.announce(message, Severity::Info);
    }

    pub fn error(&self, message: &str) {
        self.announce(message, Severity::Error);
    }

    /// Current status line
    pub fn status(&self) -> Status {
        self.status.borrow().clone()
    }

    /// Watch status changes
    pub fn subscribe(&self) -> watch::Receiver<Status> {
        self.status.subscribe()
    }
}
