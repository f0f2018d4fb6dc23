mod progress;
mod run;
mod session;
mod vehicle;

pub use progress::{ProgressEvent, RUN_ERROR_PHASE, SETUP_PHASE};
pub use run::{RunResult, RunStatus, SUCCESS_MESSAGE};
pub use session::SessionHandle;
pub use vehicle::{Vehicle, DEFAULT_DOORS, DEFAULT_ENGINE, DEFAULT_ZIP_CODE};
