use std::collections::HashMap;

use crate::model::ids::QuestionId;

//
// ─── ANSWER TYPES ──────────────────────────────────────────────────────────────
//

/// Binary file attached to an answer (e.g. a photographed worksheet).
///
/// Attachments live in memory only; they are never written to the progress
/// store and do not survive a reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// Answer state for a single question.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnswerRecord {
    pub text: Option<String>,
    pub attachment: Option<Attachment>,
}

impl AnswerRecord {
    /// A question counts as answered when it has text or an attachment.
    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.text.is_some() || self.attachment.is_some()
    }
}

//
// ─── LEDGER ────────────────────────────────────────────────────────────────────
//

/// In-memory map of per-question answers for one attempt.
///
/// No validation of text content or attachment type happens here; size and
/// type constraints are a presentation concern.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerLedger {
    records: HashMap<QuestionId, AnswerRecord>,
}

impl AnswerLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the record for a question wholesale.
    ///
    /// Callers always pass the current attachment explicitly (or `None` to
    /// clear it); there is no field-by-field merge.
    pub fn set(&mut self, question: QuestionId, text: Option<String>, attachment: Option<Attachment>) {
        self.records.insert(question, AnswerRecord { text, attachment });
    }

    #[must_use]
    pub fn record(&self, question: QuestionId) -> Option<&AnswerRecord> {
        self.records.get(&question)
    }

    #[must_use]
    pub fn is_answered(&self, question: QuestionId) -> bool {
        self.records
            .get(&question)
            .is_some_and(AnswerRecord::is_answered)
    }

    /// Count of answered questions among the given identities.
    ///
    /// Counting over the exam's ordered id list (rather than over stored
    /// records) keeps stale records for removed questions from inflating the
    /// total.
    #[must_use]
    pub fn answered_count(&self, questions: &[QuestionId]) -> usize {
        questions.iter().filter(|q| self.is_answered(**q)).count()
    }

    /// Iterate over all stored records.
    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &AnswerRecord)> {
        self.records.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
