pub mod browser_agent;
pub mod capability;

pub use browser_agent::{BrowserAgentClient, DEFAULT_AGENT_URL};
pub use capability::{Capability, Completion, SessionManager};
