use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::ExamId;

/// Acknowledgement returned by the exam service after a successful submit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionAck {
    pub id: u64,
    pub submitted_at: DateTime<Utc>,
}

/// A previously submitted attempt, as returned by the exam service.
///
/// Grading display is out of scope here; this carries only the fields the
/// runtime reports back to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: u64,
    pub exam: ExamId,
    pub submitted_at: DateTime<Utc>,
    pub is_corrected: bool,
    #[serde(default)]
    pub total_score: Option<f64>,
    pub time_spent_minutes: u32,
    pub attempt_number: u32,
}
