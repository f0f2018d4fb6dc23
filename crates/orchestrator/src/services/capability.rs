//! Collaborator seams: the browser session backend and the task capability.

use async_trait::async_trait;
use quote_core::SessionHandle;

use crate::error::Result;

/// Opens and closes the shared browser context.
#[async_trait]
pub trait SessionManager: Send + Sync {
    /// Start a browser context that stays alive across phases.
    async fn acquire(&self) -> Result<SessionHandle>;

    /// Tear the browser context down.
    async fn release(&self, handle: SessionHandle) -> Result<()>;
}

/// Completion signal returned by a successful capability call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    /// Actions the capability took
    pub steps_used: u32,
    /// Free-form output, such as extracted dropdown options
    pub output: Option<String>,
}

/// Executes natural-language instructions against a browser session.
///
/// Implementations decide how instructions are interpreted; callers only
/// look at whether the call succeeded within the step budget.
#[async_trait]
pub trait Capability: Send + Sync {
    async fn execute(
        &self,
        instructions: &str,
        model: &str,
        session: &SessionHandle,
        step_budget: u32,
    ) -> Result<Completion>;
}
