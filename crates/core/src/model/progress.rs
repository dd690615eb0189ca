use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::answer::AnswerLedger;
use crate::model::ids::{ExamId, QuestionId};

//
// ─── PROGRESS SNAPSHOT ─────────────────────────────────────────────────────────
//

/// Persisted form of a single answer.
///
/// `image_data_url` is always `None` when captured: binary attachments are
/// deliberately not persisted and must be re-attached after a reload. The
/// field is kept so the stored JSON stays shape-compatible with the
/// `{text, imageDataUrl}` records written by earlier clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAnswer {
    pub text: Option<String>,
    #[serde(rename = "imageDataUrl")]
    pub image_data_url: Option<String>,
}

/// Resumable representation of an in-progress attempt.
///
/// Serialized as `{examId, answers, currentIndex, startedAt}` into the
/// persistent key-value store. `started_at` anchors the duration window and
/// never changes for a given attempt once persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    #[serde(rename = "examId")]
    pub exam_id: ExamId,
    pub answers: HashMap<QuestionId, StoredAnswer>,
    #[serde(rename = "currentIndex")]
    pub current_index: usize,
    #[serde(rename = "startedAt")]
    pub started_at: DateTime<Utc>,
}

impl ProgressSnapshot {
    /// Capture the current ledger and cursor into a persistable snapshot.
    #[must_use]
    pub fn capture(
        exam_id: ExamId,
        ledger: &AnswerLedger,
        current_index: usize,
        started_at: DateTime<Utc>,
    ) -> Self {
        let answers = ledger
            .iter()
            .map(|(question, record)| {
                (
                    *question,
                    StoredAnswer {
                        text: record.text.clone(),
                        image_data_url: None,
                    },
                )
            })
            .collect();

        Self {
            exam_id,
            answers,
            current_index,
            started_at,
        }
    }

    /// Rebuild an answer ledger from this snapshot.
    ///
    /// Attachments are always `None` after restore; only text survives a
    /// reload.
    #[must_use]
    pub fn restore_ledger(&self) -> AnswerLedger {
        let mut ledger = AnswerLedger::new();
        for (question, stored) in &self.answers {
            ledger.set(*question, stored.text.clone(), None);
        }
        ledger
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
