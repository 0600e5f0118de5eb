use std::process::Stdio;
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;
use tokio::process::{Child, Command};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("failed to start speech program {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("speech programs need a running tokio runtime")]
    NoRuntime,
}

/// Speech capability trait
///
/// Implementations:
/// - `ConsoleSpeech`: prints utterances (no audio device needed)
/// - `CommandSpeech`: external text-to-speech program such as `espeak`
pub trait SpeechOutput: Send + Sync {
    /// Whether an utterance is still being spoken
    fn is_speaking(&self) -> bool;

    /// Stop the current utterance, if any
    fn cancel(&self);

    /// Start speaking. Returns once the utterance has begun.
    fn speak(&self, text: &str) -> Result<(), SpeechError>;

    /// Get output name for logging
    fn name(&self) -> &str;
}

/// Prints each utterance to stdout
///
/// Printing is instantaneous, so nothing is ever left to cancel.
#[derive(Debug, Default)]
pub struct ConsoleSpeech;

impl SpeechOutput for ConsoleSpeech {
    fn is_speaking(&self) -> bool {
        false
    }

    fn cancel(&self) {}

    fn speak(&self, text: &str) -> Result<(), SpeechError> {
        println!("🔊 {}", text);
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

/// Speaks through an external program, passing the text as the last argument
///
/// Each utterance runs as a child process watched by a task that reaps it
/// as soon as it exits. Cancelling kills the running process.
pub struct CommandSpeech {
    program: String,
    args: Vec<String>,
    current: Mutex<Option<Utterance>>,
}

/// A running speech process and the task watching it
struct Utterance {
    stop: CancellationToken,
    watcher: JoinHandle<()>,
}

impl CommandSpeech {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            current: Mutex::new(None),
        }
    }

    fn current(&self) -> MutexGuard<'_, Option<Utterance>> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn watch(program: String, mut child: Child, stop: CancellationToken) {
        let stopped = tokio::select! {
            status = child.wait() => {
                match status {
                    Ok(status) => debug!("{} finished: {}", program, status),
                    Err(e) => warn!("Failed to wait for {}: {}", program, e),
                }
                false
            }
            _ = stop.cancelled() => true,
        };

        if stopped {
            if let Err(e) = child.kill().await {
                debug!("{} already exited: {}", program, e);
            }
        }
    }
}

impl SpeechOutput for CommandSpeech {
    fn is_speaking(&self) -> bool {
        self.current()
            .as_ref()
            .is_some_and(|utterance| !utterance.watcher.is_finished())
    }

    fn cancel(&self) {
        if let Some(utterance) = self.current().take() {
            utterance.stop.cancel();
        }
    }

    fn speak(&self, text: &str) -> Result<(), SpeechError> {
        let runtime = Handle::try_current().map_err(|_| SpeechError::NoRuntime)?;

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SpeechError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        info!(
            "Speaking via {} (pid {})",
            self.program,
            child.id().unwrap_or_default()
        );

        let stop = CancellationToken::new();
        let watcher = runtime.spawn(Self::watch(self.program.clone(), child, stop.clone()));

        // Never leave two utterances running.
        if let Some(previous) = self.current().replace(Utterance { stop, watcher }) {
            previous.stop.cancel();
        }

        Ok(())
    }

    fn name(&self) -> &str {
        &self.program
    }
}

impl Drop for CommandSpeech {
    fn drop(&mut self) {
        self.cancel();
    }
}
