//! RAII guard for the shared browser session.
//!
//! The guard is the only owner of the [`SessionHandle`]. Phases borrow the
//! handle; the guard hands it back to the [`SessionManager`] exactly once,
//! either through [`SessionGuard::release`] or, if the guard is dropped
//! first (panic, cancelled run future), from `Drop`.

use std::sync::Arc;
use tracing::{debug, info, warn};

use quote_core::SessionHandle;

use crate::error::{OrchestratorError, Result};
use crate::services::SessionManager;

/// Scoped ownership of one browser session.
///
/// # Example
///
/// ```ignore
/// let guard = SessionGuard::acquire(manager.clone()).await?;
/// orchestrator.run(&phases, guard.handle(), &mut reporter).await;
/// guard.release().await; // consumes the guard, so it cannot run twice
/// ```
pub struct SessionGuard {
    manager: Arc<dyn SessionManager>,
    handle: Option<SessionHandle>,
}

impl SessionGuard {
    /// Acquire a session from `manager`.
    ///
    /// On failure nothing was acquired and there is nothing to release.
    pub async fn acquire(manager: Arc<dyn SessionManager>) -> Result<Self> {
        let handle = manager.acquire().await.map_err(|e| match e {
            OrchestratorError::SessionAcquisition(_) => e,
            other => OrchestratorError::SessionAcquisition(other.to_string()),
        })?;

        info!(
            session_id = %handle.id(),
            remote_id = %handle.remote_id(),
            "Browser session acquired"
        );

        Ok(Self {
            manager,
            handle: Some(handle),
        })
    }

    /// Borrow the session for a phase.
    pub fn handle(&self) -> &SessionHandle {
        match &self.handle {
            Some(handle) => handle,
            None => unreachable!("session handle is only taken when the guard is consumed"),
        }
    }

    /// Release the session.
    ///
    /// Release errors are logged and reported through the return value only,
    /// so they never replace the error that ended the run.
    pub async fn release(mut self) -> bool {
        let Some(handle) = self.handle.take() else {
            return true;
        };
        release_logged(self.manager.as_ref(), handle).await
    }
}

async fn release_logged(manager: &dyn SessionManager, handle: SessionHandle) -> bool {
    let session_id = handle.id();
    debug!(session_id = %session_id, "Releasing browser session");

    match manager.release(handle).await {
        Ok(()) => {
            info!(session_id = %session_id, "Browser session released");
            true
        }
        Err(e) => {
            warn!(
                session_id = %session_id,
                error = %e,
                "Failed to release browser session"
            );
            false
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        warn!(
            session_id = %handle.id(),
            "Session guard dropped without release - releasing in background"
        );

        // Cannot await in Drop
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let manager = Arc::clone(&self.manager);
                runtime.spawn(async move {
                    release_logged(manager.as_ref(), handle).await;
                });
            }
            Err(_) => {
                warn!(
                    session_id = %handle.id(),
                    "No async runtime available, browser session leaked"
                );
            }
        }
    }
}
