//! RAII resource guards for automatic cleanup.
//!
//! - [`SessionGuard`] - Exactly-once release of the shared browser session

mod session_guard;

pub use session_guard::SessionGuard;
