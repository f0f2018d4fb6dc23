use std::fmt;

use crate::error::{OrchestratorError, Result};

/// Position of a run in its linear phase sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    /// Running the phase with this 1-based index
    Phase(usize),
    Done,
    Error,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Init => f.write_str("init"),
            RunState::Phase(index) => write!(f, "phase({})", index),
            RunState::Done => f.write_str("done"),
            RunState::Error => f.write_str("error"),
        }
    }
}

/// Transition rules for a run of `total` phases.
///
/// Only forward moves exist: the browser is left in whatever state the
/// previous phase produced, so going back has no meaning.
pub struct RunStateMachine {
    total: usize,
}

impl RunStateMachine {
    pub fn new(total: usize) -> Self {
        Self { total }
    }

    pub fn validate_transition(&self, from: RunState, to: RunState) -> Result<()> {
        if self.allowed_transitions(from).contains(&to) {
            Ok(())
        } else {
            Err(OrchestratorError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            })
        }
    }

    fn allowed_transitions(&self, from: RunState) -> Vec<RunState> {
        match from {
            RunState::Init if self.total == 0 => vec![RunState::Done, RunState::Error],
            RunState::Init => vec![RunState::Phase(1), RunState::Error],
            RunState::Phase(index) if index < self.total => {
                vec![RunState::Phase(index + 1), RunState::Error]
            }
            RunState::Phase(index) if index == self.total => vec![RunState::Done, RunState::Error],
            RunState::Phase(_) => vec![RunState::Error],
            RunState::Done | RunState::Error => vec![],
        }
    }

    pub fn can_transition(&self, from: RunState, to: RunState) -> bool {
        self.validate_transition(from, to).is_ok()
    }
}
