#![forbid(unsafe_code)]

pub mod countdown;
pub mod error;
pub mod exam_api;
pub mod session;
pub mod submission;

pub use exam_core::Clock;

pub use countdown::{Countdown, Tick};
pub use error::{ExamServiceError, SessionError};
pub use exam_api::{ExamService, HttpExamService};
pub use submission::{AnswerEntry, AttachmentPart, SubmissionPayload, build_submission};

pub use session::{
    ExamSession, ExamSessionHandle, ExamSessionService, SessionEvent, SessionProgress, SessionTick,
};
