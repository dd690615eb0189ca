use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use exam_core::model::{Attachment, ExamId, QuestionId, SubmissionAck};

use crate::countdown::Tick;
use crate::error::SessionError;
use super::progress::SessionProgress;
use super::state::ExamSession;
use super::workflow::ExamSessionService;

//
// ─── SESSION RUNTIME ───────────────────────────────────────────────────────────
//

/// Notifications pushed by the ticker task.
#[derive(Debug)]
pub enum SessionEvent {
    /// One second elapsed; carries the new remaining-seconds value (the
    /// expiry tick reports zero before the auto-submit outcome follows).
    Remaining(u32),
    /// Time expired and the automatic submission went through.
    AutoSubmitted(SubmissionAck),
    /// Time expired but the automatic submission failed; a manual retry is
    /// still possible.
    AutoSubmitFailed(SessionError),
}

/// Shared handle over a running exam session.
///
/// Owns the session state behind a mutex together with the one-second ticker
/// task driving the countdown. All session mutations and the submission
/// protocol go through this handle; the ticker is guaranteed not to fire
/// after [`shutdown`](Self::shutdown) (also invoked on drop).
pub struct ExamSessionHandle {
    service: ExamSessionService,
    session: Arc<Mutex<ExamSession>>,
    ticker: Option<JoinHandle<()>>,
}

impl ExamSessionHandle {
    /// Bootstrap a session and start the countdown ticker.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Load` if the exam definition cannot be
    /// fetched.
    pub async fn start(
        service: ExamSessionService,
        exam_id: ExamId,
    ) -> Result<(Self, UnboundedReceiver<SessionEvent>), SessionError> {
        let session = service.start_session(exam_id).await?;
        let session = Arc::new(Mutex::new(session));
        let (events, receiver) = mpsc::unbounded_channel();

        let ticker = tokio::spawn(run_ticker(
            service.clone(),
            Arc::clone(&session),
            events,
        ));

        Ok((
            Self {
                service,
                session,
                ticker: Some(ticker),
            },
            receiver,
        ))
    }

    /// Run a read-only projection against the session state.
    pub async fn with_session<R>(&self, f: impl FnOnce(&ExamSession) -> R) -> R {
        let session = self.session.lock().await;
        f(&session)
    }

    pub async fn remaining_seconds(&self) -> u32 {
        self.with_session(ExamSession::remaining_seconds).await
    }

    pub async fn progress(&self) -> SessionProgress {
        self.with_session(ExamSession::progress).await
    }

    /// Replace the answer for a question; the snapshot is re-persisted.
    pub async fn set_answer(
        &self,
        question: QuestionId,
        text: Option<String>,
        attachment: Option<Attachment>,
    ) {
        let mut session = self.session.lock().await;
        self.service
            .set_answer(&mut session, question, text, attachment)
            .await;
    }

    pub async fn go_to(&self, index: usize) {
        let mut session = self.session.lock().await;
        self.service.go_to(&mut session, index).await;
    }

    pub async fn next(&self) {
        let mut session = self.session.lock().await;
        self.service.next(&mut session).await;
    }

    pub async fn prev(&self) {
        let mut session = self.session.lock().await;
        self.service.prev(&mut session).await;
    }

    /// Submit the attempt manually.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadySubmitting` when racing another submit
    /// (including the expiry auto-submit), or `SessionError::Submission` on
    /// service failure.
    pub async fn submit(&self) -> Result<SubmissionAck, SessionError> {
        submit_shared(&self.service, &self.session).await
    }

    /// Stop the ticker task. No tick can be delivered afterwards.
    pub fn shutdown(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl Drop for ExamSessionHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Submission over the shared session state.
///
/// The lock is held only to enter and to settle the guard, never across the
/// network call, so a racing submit observes `AlreadySubmitting` instead of
/// blocking behind the request.
async fn submit_shared(
    service: &ExamSessionService,
    session: &Arc<Mutex<ExamSession>>,
) -> Result<SubmissionAck, SessionError> {
    let (exam_id, payload) = {
        let mut session = session.lock().await;
        let payload = service.begin_submission(&mut session)?;
        (session.exam().id, payload)
    };

    let result = service.send_submission(exam_id, &payload).await;

    let mut session = session.lock().await;
    service.finish_submission(&mut session, result).await
}

async fn run_ticker(
    service: ExamSessionService,
    session: Arc<Mutex<ExamSession>>,
    events: UnboundedSender<SessionEvent>,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first interval tick completes immediately; the countdown starts
    // one second after spawn.
    interval.tick().await;

    loop {
        interval.tick().await;

        let tick = {
            let mut session = session.lock().await;
            session.tick()
        };

        match tick {
            Tick::Running(remaining) => {
                if events.send(SessionEvent::Remaining(remaining)).is_err() {
                    return;
                }
            }
            // The countdown is settled (halted, or expiry already reported);
            // no further tick can produce anything.
            Tick::Idle => return,
            Tick::Expired => {
                let _ = events.send(SessionEvent::Remaining(0));
                match submit_shared(&service, &session).await {
                    Ok(ack) => {
                        let _ = events.send(SessionEvent::AutoSubmitted(ack));
                    }
                    // A manual submit won the race; its caller reports the
                    // outcome.
                    Err(SessionError::AlreadySubmitting) => {}
                    Err(e) => {
                        let _ = events.send(SessionEvent::AutoSubmitFailed(e));
                    }
                }
                return;
            }
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
