use quote_core::CoreError;
use thiserror::Error;

use crate::core::PhaseRole;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Invalid input: {0}")]
    Validation(#[from] CoreError),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Phase {index} ({role}) failed: {reason}")]
    PhaseFailed {
        index: usize,
        role: PhaseRole,
        reason: String,
    },

    #[error("Phase {index} ({role}) timed out after {timeout_ms}ms")]
    PhaseTimeout {
        index: usize,
        role: PhaseRole,
        timeout_ms: u64,
    },

    #[error("Capability error: {0}")]
    Capability(String),

    #[error("Failed to acquire browser session: {0}")]
    SessionAcquisition(String),

    #[error("Failed to release browser session: {0}")]
    SessionRelease(String),

    #[error("Browser agent error ({status:?}): {message}")]
    AgentService {
        status: Option<u16>,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl OrchestratorError {
    /// Create a phase failed error.
    pub fn phase_failed(index: usize, role: PhaseRole, reason: impl Into<String>) -> Self {
        Self::PhaseFailed {
            index,
            role,
            reason: reason.into(),
        }
    }

    /// Create a browser agent service error.
    pub fn agent_service(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::AgentService {
            status,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
