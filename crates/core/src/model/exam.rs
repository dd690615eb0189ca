use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{ExamId, QuestionId};

//
// ─── EXAM TYPES ────────────────────────────────────────────────────────────────
//

/// Lifecycle status of an exam as reported by the exam service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamStatus {
    Waiting,
    Active,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Kind of answer a question expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Mcq,
    Passage,
    ShortAnswer,
    Essay,
}

/// A single selectable option of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McqOption {
    pub id: u64,
    pub option_text: String,
}

/// The question content embedded in an [`ExamQuestion`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub question_head: String,
    #[serde(rename = "type_ans")]
    pub question_type: QuestionType,
    pub points: u32,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub mcq_options: Vec<McqOption>,
}

/// A question slot within an exam, carrying display order and point value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamQuestion {
    pub id: u64,
    pub display_order: u32,
    pub points: u32,
    pub question: Question,
}

/// Full exam definition as fetched from the exam service.
///
/// Immutable once loaded into a session; the session controller owns it for
/// the lifetime of the attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamDefinition {
    pub id: ExamId,
    pub title: String,
    #[serde(default)]
    pub instructions: Option<String>,
    pub duration_minutes: u32,
    pub start_time: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub status: ExamStatus,
    pub questions: Vec<ExamQuestion>,
}

impl ExamDefinition {
    /// Number of questions in this exam.
    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Question identities in definition order.
    #[must_use]
    pub fn question_ids(&self) -> Vec<QuestionId> {
        self.questions.iter().map(|eq| eq.question.id).collect()
    }

    /// The question slot at the given navigation index, if in bounds.
    #[must_use]
    pub fn question_at(&self, index: usize) -> Option<&ExamQuestion> {
        self.questions.get(index)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "id": 7,
            "title": "Geography",
            "instructions": "Answer everything",
            "duration_minutes": 60,
            "start_time": "2026-01-01T08:00:00Z",
            "deadline": "2026-01-01T12:00:00Z",
            "status": "active",
            "questions": [
                {
                    "id": 100,
                    "display_order": 1,
                    "points": 5,
                    "question": {
                        "id": 3,
                        "question_head": "Capital of France?",
                        "type_ans": "short_answer",
                        "points": 5
                    }
                },
                {
                    "id": 101,
                    "display_order": 2,
                    "points": 10,
                    "question": {
                        "id": 4,
                        "question_head": "Pick one",
                        "type_ans": "mcq",
                        "points": 10,
                        "mcq_options": [
                            { "id": 1, "option_text": "A" },
                            { "id": 2, "option_text": "B" }
                        ]
                    }
                }
            ]
        }"#
    }

    #[test]
    fn exam_definition_decodes_service_json() {
        let exam: ExamDefinition = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(exam.id, ExamId::new(7));
        assert_eq!(exam.total_questions(), 2);
        assert_eq!(exam.question_ids(), vec![QuestionId::new(3), QuestionId::new(4)]);
        assert_eq!(exam.questions[1].question.question_type, QuestionType::Mcq);
        assert_eq!(exam.questions[1].question.mcq_options.len(), 2);
        assert_eq!(exam.status, ExamStatus::Active);
    }

    #[test]
    fn optional_fields_default_when_absent() {
        let exam: ExamDefinition = serde_json::from_str(sample_json()).unwrap();
        let q = &exam.questions[0].question;
        assert!(q.image.is_none());
        assert!(q.difficulty.is_none());
        assert!(q.mcq_options.is_empty());
    }

    #[test]
    fn question_at_respects_bounds() {
        let exam: ExamDefinition = serde_json::from_str(sample_json()).unwrap();
        assert!(exam.question_at(0).is_some());
        assert!(exam.question_at(2).is_none());
    }
}
