use chrono::{DateTime, Utc};
use std::fmt;

use exam_core::model::{
    AnswerLedger, AnswerRecord, Attachment, ExamDefinition, ExamQuestion, NavigationCursor,
    ProgressSnapshot, QuestionId, SubmissionAck,
};

use crate::countdown::{Countdown, Tick};
use crate::error::SessionError;
use super::progress::SessionProgress;

//
// ─── SESSION STATE ─────────────────────────────────────────────────────────────
//

/// In-memory state of one exam attempt.
///
/// Owns the loaded definition, the answer ledger, the navigation cursor and
/// the countdown. The presentation layer sees only read projections; all
/// mutation goes through explicit commands, normally driven by
/// [`ExamSessionService`](super::ExamSessionService) so every change is
/// persisted.
pub struct ExamSession {
    exam: ExamDefinition,
    ledger: AnswerLedger,
    cursor: NavigationCursor,
    countdown: Countdown,
    started_at: DateTime<Utc>,
    submitting: bool,
    submitted: Option<SubmissionAck>,
}

impl ExamSession {
    /// Start a brand-new attempt anchored at `now`.
    #[must_use]
    pub fn fresh(exam: ExamDefinition, now: DateTime<Utc>) -> Self {
        let countdown = Countdown::seed(exam.deadline, exam.duration_minutes, now, now);
        let total = exam.total_questions();
        Self {
            exam,
            ledger: AnswerLedger::new(),
            cursor: NavigationCursor::new(total),
            countdown,
            started_at: now,
            submitting: false,
            submitted: None,
        }
    }

    /// Resume an attempt from a persisted snapshot.
    ///
    /// Text answers and the cursor come back from the snapshot (the cursor
    /// clamped into bounds in case the exam shrank); attachments are always
    /// gone after a reload. The snapshot's `started_at` stays the anchor so
    /// the duration window keeps counting across reloads.
    #[must_use]
    pub fn resume(exam: ExamDefinition, snapshot: &ProgressSnapshot, now: DateTime<Utc>) -> Self {
        let countdown = Countdown::seed(
            exam.deadline,
            exam.duration_minutes,
            snapshot.started_at,
            now,
        );
        let total = exam.total_questions();
        Self {
            exam,
            ledger: snapshot.restore_ledger(),
            cursor: NavigationCursor::restored(snapshot.current_index, total),
            countdown,
            started_at: snapshot.started_at,
            submitting: false,
            submitted: None,
        }
    }

    //
    // ─── READ PROJECTIONS ──────────────────────────────────────────────────
    //

    #[must_use]
    pub fn exam(&self) -> &ExamDefinition {
        &self.exam
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// The question slot the cursor points at.
    #[must_use]
    pub fn current_question(&self) -> Option<&ExamQuestion> {
        self.exam.question_at(self.cursor.index())
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.cursor.index()
    }

    /// Answer record for the question under the cursor, if any.
    #[must_use]
    pub fn current_answer(&self) -> Option<&AnswerRecord> {
        let question = self.current_question()?.question.id;
        self.ledger.record(question)
    }

    #[must_use]
    pub fn ledger(&self) -> &AnswerLedger {
        &self.ledger
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.countdown.remaining()
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.countdown.is_expired()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let ids = self.exam.question_ids();
        SessionProgress {
            answered: self.ledger.answered_count(&ids),
            total: ids.len(),
        }
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    #[must_use]
    pub fn submitted(&self) -> Option<&SubmissionAck> {
        self.submitted.as_ref()
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.submitted.is_some()
    }

    /// Capture the current ledger and cursor for persistence.
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot::capture(
            self.exam.id,
            &self.ledger,
            self.cursor.index(),
            self.started_at,
        )
    }

    //
    // ─── MUTATION COMMANDS ─────────────────────────────────────────────────
    //

    /// Replace the answer for a question (text and attachment together).
    pub fn set_answer(
        &mut self,
        question: QuestionId,
        text: Option<String>,
        attachment: Option<Attachment>,
    ) {
        self.ledger.set(question, text, attachment);
    }

    pub fn go_to(&mut self, index: usize) {
        self.cursor.go_to(index);
    }

    pub fn next(&mut self) {
        self.cursor.next();
    }

    pub fn prev(&mut self) {
        self.cursor.prev();
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> Tick {
        self.countdown.tick()
    }

    /// Enter the in-flight submission guard.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadySubmitting` when a submission is in
    /// flight or the attempt was already submitted.
    pub fn begin_submission(&mut self) -> Result<(), SessionError> {
        if self.submitting || self.submitted.is_some() {
            return Err(SessionError::AlreadySubmitting);
        }
        self.submitting = true;
        Ok(())
    }

    /// Record a successful submission and stop the countdown.
    pub fn finish_submission(&mut self, ack: SubmissionAck) {
        self.submitting = false;
        self.submitted = Some(ack);
        self.countdown.halt();
    }

    /// Release the guard after a failed submission, leaving the attempt in
    /// its pre-submit state so it can be retried.
    pub fn abort_submission(&mut self) {
        self.submitting = false;
    }
}

impl fmt::Debug for ExamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamSession")
            .field("exam_id", &self.exam.id)
            .field("questions", &self.exam.total_questions())
            .field("current", &self.cursor.index())
            .field("remaining_seconds", &self.countdown.remaining())
            .field("started_at", &self.started_at)
            .field("submitting", &self.submitting)
            .field("submitted", &self.submitted.is_some())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
