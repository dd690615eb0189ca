mod answer;
mod cursor;
mod exam;
mod ids;
mod progress;
mod submission;

pub use ids::{ExamId, ParseIdError, QuestionId};

pub use answer::{AnswerLedger, AnswerRecord, Attachment};
pub use cursor::NavigationCursor;
pub use exam::{Difficulty, ExamDefinition, ExamQuestion, ExamStatus, McqOption, Question, QuestionType};
pub use progress::{ProgressSnapshot, StoredAnswer};
pub use submission::{Submission, SubmissionAck};
