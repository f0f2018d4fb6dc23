//! Result aggregation: the terminal run state as the caller sees it.

use quote_core::RunResult;

use crate::core::RunOutcome;

impl From<RunOutcome> for RunResult {
    fn from(outcome: RunOutcome) -> Self {
        match outcome {
            RunOutcome::Completed { .. } => RunResult::success(),
            RunOutcome::Failed { error, .. } => RunResult::error(error.to_string()),
        }
    }
}
