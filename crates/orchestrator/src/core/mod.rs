//! Core abstractions for the orchestrator execution model.
//!
//! - [`PhaseSpec`] / [`PhaseRole`] - What a phase does and how it is configured
//! - [`PhaseOrchestrator`] - Runs phases in order against one browser session
//! - [`ProgressReporter`] - Observer notifications with ordering guarantees
//! - [`OrderedEventEmitter`] - Event bus publisher with sequence numbers

mod events;
mod execution;
mod phase;

pub use events::{OrderedEventEmitter, ProgressObserver, ProgressReporter};
pub use execution::{PhaseOrchestrator, RunOutcome, COMPLETED_MESSAGE};
pub use phase::{PhaseRole, PhaseSpec};
