use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Reference to the browser context shared by every phase of a run.
///
/// The handle is deliberately not `Clone`: it is owned by one session guard
/// and lent to phases by shared reference.
#[derive(Debug, PartialEq, Eq)]
pub struct SessionHandle {
    id: Uuid,
    remote_id: String,
    opened_at: DateTime<Utc>,
}

impl SessionHandle {
    pub fn new(remote_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            remote_id: remote_id.into(),
            opened_at: Utc::now(),
        }
    }

    /// Local identifier used in logs and events.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Identifier assigned by the backend that owns the browser.
    pub fn remote_id(&self) -> &str {
        &self.remote_id
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }
}
