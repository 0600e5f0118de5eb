//! Spoken and on-screen status feedback
//!
//! Every status or result goes through `NarrationChannel::announce`, which
//! interrupts whatever is being spoken and replaces the visible status line.

mod channel;
mod speech;

pub use channel::{NarrationChannel, Severity, Status};
pub use speech::{CommandSpeech, ConsoleSpeech, SpeechError, SpeechOutput};
