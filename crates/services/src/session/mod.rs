mod progress;
mod runtime;
mod state;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use progress::SessionProgress;
pub use runtime::{ExamSessionHandle, SessionEvent};
pub use state::ExamSession;
pub use workflow::{ExamSessionService, SessionTick};
