use std::sync::Arc;

use tracing::{debug, warn};

use exam_core::model::{Attachment, ExamId, QuestionId, SubmissionAck};
use exam_core::time::time_spent_minutes;
use storage::repository::ProgressStore;

use crate::Clock;
use crate::countdown::Tick;
use crate::error::{ExamServiceError, SessionError};
use crate::exam_api::ExamService;
use crate::submission::{SubmissionPayload, build_submission};
use super::state::ExamSession;

/// Outcome of driving the countdown by one second.
#[derive(Debug)]
pub enum SessionTick {
    /// Still counting; carries the new remaining-seconds value.
    Running(u32),
    /// Time ran out and the automatic submission went through.
    AutoSubmitted(SubmissionAck),
    /// Time ran out but the automatic submission failed. The guard is
    /// released so a manual retry can be attempted; the countdown stays at
    /// zero and will not trigger again.
    AutoSubmitFailed(SessionError),
    /// Nothing happened (already expired and reported, or halted).
    Idle,
}

/// Orchestrates exam session bootstrap, persistence and submission.
///
/// All persistence from the mutation paths is best-effort: a failed store
/// write must never fail the mutation that triggered it, so failures are
/// logged and swallowed.
#[derive(Clone)]
pub struct ExamSessionService {
    clock: Clock,
    store: Arc<dyn ProgressStore>,
    api: Arc<dyn ExamService>,
}

impl ExamSessionService {
    #[must_use]
    pub fn new(clock: Clock, store: Arc<dyn ProgressStore>, api: Arc<dyn ExamService>) -> Self {
        Self { clock, store, api }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Bootstrap a session for the given exam, fresh or resumed.
    ///
    /// A stored snapshot is used when it exists, decodes, and belongs to
    /// this exam; anything else degrades to a fresh start with a warning.
    /// Fresh sessions persist their initial snapshot immediately so a crash
    /// before the first answer still anchors the duration window.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Load` if the exam definition cannot be
    /// fetched. The caller may retry by bootstrapping again.
    pub async fn start_session(&self, exam_id: ExamId) -> Result<ExamSession, SessionError> {
        let exam = self.api.get(exam_id).await.map_err(SessionError::Load)?;
        let now = self.clock.now();

        let snapshot = match self.store.load(exam_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(%exam_id, error = %e, "failed to load saved progress, starting fresh");
                None
            }
        };

        let snapshot = snapshot.filter(|s| {
            if s.exam_id == exam_id {
                return true;
            }
            warn!(%exam_id, stored_exam_id = %s.exam_id, "saved progress belongs to another exam, starting fresh");
            false
        });

        match snapshot {
            Some(snapshot) => {
                debug!(%exam_id, current_index = snapshot.current_index, "resuming saved attempt");
                Ok(ExamSession::resume(exam, &snapshot, now))
            }
            None => {
                let session = ExamSession::fresh(exam, now);
                self.persist(&session).await;
                Ok(session)
            }
        }
    }

    /// Best-effort persist of the session's current snapshot.
    async fn persist(&self, session: &ExamSession) {
        let exam_id = session.exam().id;
        if let Err(e) = self.store.save(exam_id, &session.snapshot()).await {
            warn!(%exam_id, error = %e, "failed to save progress");
        }
    }

    //
    // ─── MUTATIONS (PERSISTED) ─────────────────────────────────────────────
    //

    /// Replace the answer for a question and persist the snapshot.
    pub async fn set_answer(
        &self,
        session: &mut ExamSession,
        question: QuestionId,
        text: Option<String>,
        attachment: Option<Attachment>,
    ) {
        session.set_answer(question, text, attachment);
        self.persist(session).await;
    }

    pub async fn go_to(&self, session: &mut ExamSession, index: usize) {
        session.go_to(index);
        self.persist(session).await;
    }

    pub async fn next(&self, session: &mut ExamSession) {
        session.next();
        self.persist(session).await;
    }

    pub async fn prev(&self, session: &mut ExamSession) {
        session.prev();
        self.persist(session).await;
    }

    //
    // ─── SUBMISSION ────────────────────────────────────────────────────────
    //

    /// Enter the submission guard and build the payload.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadySubmitting` when another submission is
    /// in flight.
    pub fn begin_submission(
        &self,
        session: &mut ExamSession,
    ) -> Result<SubmissionPayload, SessionError> {
        session.begin_submission()?;
        let spent = time_spent_minutes(
            session.started_at(),
            self.clock.now(),
            session.exam().duration_minutes,
        );
        Ok(build_submission(session.exam(), session.ledger(), spent))
    }

    /// Send a prepared payload to the exam service.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError` on transport failure or rejection.
    pub async fn send_submission(
        &self,
        exam_id: ExamId,
        payload: &SubmissionPayload,
    ) -> Result<SubmissionAck, ExamServiceError> {
        self.api.submit(exam_id, payload).await
    }

    /// Settle the session after the service call returned.
    ///
    /// On success the stored progress is cleared (best-effort) and the
    /// countdown halted; on failure the guard is released and persisted
    /// progress stays intact.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Submission` wrapping the service error.
    pub async fn finish_submission(
        &self,
        session: &mut ExamSession,
        result: Result<SubmissionAck, ExamServiceError>,
    ) -> Result<SubmissionAck, SessionError> {
        let exam_id = session.exam().id;
        match result {
            Ok(ack) => {
                if let Err(e) = self.store.clear(exam_id).await {
                    warn!(%exam_id, error = %e, "failed to clear saved progress after submit");
                }
                debug!(%exam_id, submission = ack.id, "submission accepted");
                session.finish_submission(ack.clone());
                Ok(ack)
            }
            Err(e) => {
                session.abort_submission();
                Err(SessionError::Submission(e))
            }
        }
    }

    /// Submit the attempt end to end.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadySubmitting` if a submission is already
    /// in flight, or `SessionError::Submission` if the service call fails
    /// (the session stays retryable).
    pub async fn submit(&self, session: &mut ExamSession) -> Result<SubmissionAck, SessionError> {
        let payload = self.begin_submission(session)?;
        let result = self.send_submission(session.exam().id, &payload).await;
        self.finish_submission(session, result).await
    }

    /// Advance the countdown by one second, auto-submitting on expiry.
    ///
    /// Expiry triggers exactly one submission attempt regardless of how many
    /// questions are answered; if it fails the session is left retryable and
    /// the countdown does not re-fire.
    pub async fn tick(&self, session: &mut ExamSession) -> SessionTick {
        match session.tick() {
            Tick::Running(remaining) => SessionTick::Running(remaining),
            Tick::Idle => SessionTick::Idle,
            Tick::Expired => {
                debug!(exam_id = %session.exam().id, "time expired, auto-submitting");
                match self.submit(session).await {
                    Ok(ack) => SessionTick::AutoSubmitted(ack),
                    Err(e) => SessionTick::AutoSubmitFailed(e),
                }
            }
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
