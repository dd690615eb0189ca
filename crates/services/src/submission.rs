use serde::{Deserialize, Serialize};

use exam_core::model::{AnswerLedger, ExamDefinition, QuestionId};

//
// ─── SUBMISSION PAYLOAD ────────────────────────────────────────────────────────
//

/// One per-question entry of the JSON `answers` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEntry {
    pub question: QuestionId,
    pub answer_text: Option<String>,
}

/// One binary part of the multipart submission, keyed as
/// `answer_image_<questionId>` on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentPart {
    pub question: QuestionId,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Complete submission for one attempt, independent of the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    pub time_spent_minutes: u32,
    pub answers: Vec<AnswerEntry>,
    pub attachments: Vec<AttachmentPart>,
}

/// Build the submission payload from the loaded exam and the answer ledger.
///
/// Emits one answer entry per exam question in definition order, with `None`
/// text for unanswered or attachment-only questions, and one attachment part
/// per question holding a binary attachment.
#[must_use]
pub fn build_submission(
    exam: &ExamDefinition,
    ledger: &AnswerLedger,
    time_spent_minutes: u32,
) -> SubmissionPayload {
    let mut answers = Vec::with_capacity(exam.total_questions());
    let mut attachments = Vec::new();

    for exam_question in &exam.questions {
        let question = exam_question.question.id;
        let record = ledger.record(question);

        answers.push(AnswerEntry {
            question,
            answer_text: record.and_then(|r| r.text.clone()),
        });

        if let Some(attachment) = record.and_then(|r| r.attachment.as_ref()) {
            attachments.push(AttachmentPart {
                question,
                file_name: attachment.file_name.clone(),
                bytes: attachment.bytes.clone(),
            });
        }
    }

    SubmissionPayload {
        time_spent_minutes,
        answers,
        attachments,
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use exam_core::model::{
        Attachment, ExamId, ExamQuestion, ExamStatus, Question, QuestionType,
    };
    use exam_core::time::fixed_now;

    fn build_exam(question_ids: &[u64]) -> ExamDefinition {
        let questions = question_ids
            .iter()
            .enumerate()
            .map(|(i, id)| ExamQuestion {
                id: 100 + *id,
                display_order: u32::try_from(i).unwrap() + 1,
                points: 5,
                question: Question {
                    id: QuestionId::new(*id),
                    question_head: format!("Q{id}"),
                    question_type: QuestionType::ShortAnswer,
                    points: 5,
                    difficulty: None,
                    image: None,
                    mcq_options: Vec::new(),
                },
            })
            .collect();

        ExamDefinition {
            id: ExamId::new(7),
            title: "Test".into(),
            instructions: None,
            duration_minutes: 60,
            start_time: fixed_now(),
            deadline: fixed_now() + Duration::minutes(120),
            status: ExamStatus::Active,
            questions,
        }
    }

    #[test]
    fn payload_covers_every_question_in_definition_order() {
        let exam = build_exam(&[1, 2]);
        let mut ledger = AnswerLedger::new();
        ledger.set(QuestionId::new(1), Some("Paris".into()), None);
        ledger.set(
            QuestionId::new(2),
            None,
            Some(Attachment::new("sketch.png", vec![1, 2, 3])),
        );

        let payload = build_submission(&exam, &ledger, 42);

        assert_eq!(payload.time_spent_minutes, 42);
        assert_eq!(payload.answers.len(), 2);
        assert_eq!(payload.answers[0].question, QuestionId::new(1));
        assert_eq!(payload.answers[0].answer_text.as_deref(), Some("Paris"));
        assert_eq!(payload.answers[1].question, QuestionId::new(2));
        assert!(payload.answers[1].answer_text.is_none());

        assert_eq!(payload.attachments.len(), 1);
        assert_eq!(payload.attachments[0].question, QuestionId::new(2));
        assert_eq!(payload.attachments[0].file_name, "sketch.png");
    }

    #[test]
    fn unanswered_questions_still_emit_null_entries() {
        let exam = build_exam(&[1, 2, 3]);
        let ledger = AnswerLedger::new();

        let payload = build_submission(&exam, &ledger, 0);

        assert_eq!(payload.answers.len(), 3);
        assert!(payload.answers.iter().all(|a| a.answer_text.is_none()));
        assert!(payload.attachments.is_empty());
    }

    #[test]
    fn answers_field_serializes_with_null_text() {
        let exam = build_exam(&[1]);
        let ledger = AnswerLedger::new();
        let payload = build_submission(&exam, &ledger, 0);

        let json = serde_json::to_string(&payload.answers).unwrap();
        assert_eq!(json, r#"[{"question":1,"answer_text":null}]"#);
    }
}
