//! Event types published during a quote run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope wrapping all events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// Position of the event within its run
    pub sequence: u64,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: Event,
}

impl EventEnvelope {
    /// Create a new envelope with auto-generated ID and timestamp
    pub fn new(sequence: u64, event: Event) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence,
            timestamp: Utc::now(),
            event,
        }
    }
}

/// All events a quote run can publish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A run was accepted and its phases are about to be built
    #[serde(rename = "run.started")]
    RunStarted { run_id: Uuid, vehicle: String },

    /// The shared browser session was opened
    #[serde(rename = "session.acquired")]
    SessionAcquired { run_id: Uuid, session_id: Uuid },

    /// A phase was handed the session
    #[serde(rename = "phase.started")]
    PhaseStarted {
        run_id: Uuid,
        index: usize,
        role: String,
        model: String,
    },

    /// A phase's capability call returned successfully
    #[serde(rename = "phase.completed")]
    PhaseCompleted {
        run_id: Uuid,
        index: usize,
        role: String,
        steps_used: u32,
    },

    /// Observer-facing progress notification
    #[serde(rename = "progress")]
    Progress {
        run_id: Uuid,
        phase: i32,
        message: String,
        terminal_error: bool,
    },

    /// Every phase completed
    #[serde(rename = "run.completed")]
    RunCompleted { run_id: Uuid },

    /// The run stopped on an error
    #[serde(rename = "run.failed")]
    RunFailed { run_id: Uuid, message: String },

    /// The shared browser session was released
    #[serde(rename = "session.released")]
    SessionReleased {
        run_id: Uuid,
        session_id: Uuid,
        success: bool,
    },
}

impl Event {
    /// Get the run ID this event belongs to
    pub fn run_id(&self) -> Uuid {
        match self {
            Event::RunStarted { run_id, .. }
            | Event::SessionAcquired { run_id, .. }
            | Event::PhaseStarted { run_id, .. }
            | Event::PhaseCompleted { run_id, .. }
            | Event::Progress { run_id, .. }
            | Event::RunCompleted { run_id }
            | Event::RunFailed { run_id, .. }
            | Event::SessionReleased { run_id, .. } => *run_id,
        }
    }

    /// Whether no further events follow this one for the same run
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::RunCompleted { .. } | Event::RunFailed { .. })
    }
}
