//! Command state machine
//!
//! The `Orchestrator` owns the camera, the inference client, the overlay
//! surface and the narration channel, and moves between `Idle`, `Ready` and
//! `Busy` in response to the four user commands.

mod orchestrator;
mod state;

pub use orchestrator::Orchestrator;
pub use state::{Command, CommandError, CommandOutcome, GuardViolation, OrchestratorState, UnknownCommand};
