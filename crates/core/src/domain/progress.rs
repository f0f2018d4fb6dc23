use serde::{Deserialize, Serialize};

/// Observer phase reserved for a run-level error.
pub const RUN_ERROR_PHASE: i32 = -1;
/// Observer phase used for work done before the first numbered phase.
pub const SETUP_PHASE: i32 = 0;

/// A notification delivered to a progress observer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub phase: i32,
    pub message: String,
    pub is_terminal_error: bool,
}

impl ProgressEvent {
    pub fn new(phase: i32, message: impl Into<String>) -> Self {
        Self {
            phase,
            message: message.into(),
            is_terminal_error: phase == RUN_ERROR_PHASE,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(RUN_ERROR_PHASE, message)
    }
}
