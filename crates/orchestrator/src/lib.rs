//! Phased orchestration of browser agents for insurance quotes.
//!
//! A run turns a [`quote_core::Vehicle`] into a fixed sequence of phases,
//! opens one browser session, hands it to each phase in turn and releases it
//! exactly once. Progress goes to a [`ProgressObserver`]; the caller gets a
//! single [`quote_core::RunResult`].

pub mod builder;
pub mod config;
pub mod core;
pub mod error;
pub mod executor;
pub mod prompts;
pub mod resources;
pub mod result;
pub mod services;
pub mod state_machine;

pub use builder::build_phases;
pub use config::{ExecutorConfig, PhaseModels, PortalConfig, StepBudgets};
pub use crate::core::{
    PhaseOrchestrator, PhaseRole, PhaseSpec, ProgressObserver, ProgressReporter, RunOutcome,
};
pub use error::{OrchestratorError, Result};
pub use executor::QuoteExecutor;
pub use resources::SessionGuard;
pub use services::{BrowserAgentClient, Capability, Completion, SessionManager};
pub use state_machine::{RunState, RunStateMachine};
