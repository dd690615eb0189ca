use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;

use exam_core::model::{ExamDefinition, ExamId, QuestionId, Submission, SubmissionAck};

use crate::error::ExamServiceError;
use crate::submission::SubmissionPayload;

//
// ─── SERVICE CONTRACT ──────────────────────────────────────────────────────────
//

/// Port to the exam service consumed by the session controller.
#[async_trait]
pub trait ExamService: Send + Sync {
    /// Fetch the full exam definition.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError` if the request fails or the response cannot
    /// be decoded.
    async fn get(&self, exam_id: ExamId) -> Result<ExamDefinition, ExamServiceError>;

    /// Submit an attempt's answers.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError` on transport failure or server rejection.
    async fn submit(
        &self,
        exam_id: ExamId,
        payload: &SubmissionPayload,
    ) -> Result<SubmissionAck, ExamServiceError>;

    /// Fetch the caller's latest submission for an exam.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError` if the request fails or the response cannot
    /// be decoded.
    async fn latest_submission(&self, exam_id: ExamId) -> Result<Submission, ExamServiceError>;
}

//
// ─── HTTP CLIENT ───────────────────────────────────────────────────────────────
//

/// HTTP implementation of [`ExamService`].
///
/// Submissions go out as multipart form data: a `time_spent_minutes` text
/// field, an `answers` field holding the JSON-encoded answer array, and one
/// binary part per attachment named `answer_image_<questionId>`.
#[derive(Clone)]
pub struct HttpExamService {
    client: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl HttpExamService {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token: None,
        }
    }

    /// Attach a bearer token to every request.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ExamServiceError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ExamServiceError::Status(status));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ExamServiceError::Decode(e.to_string()))
    }

    fn attachment_part_name(question: QuestionId) -> String {
        format!("answer_image_{question}")
    }

    fn multipart_form(payload: &SubmissionPayload) -> Result<Form, ExamServiceError> {
        let answers_json = serde_json::to_string(&payload.answers)
            .map_err(|e| ExamServiceError::Decode(e.to_string()))?;

        let mut form = Form::new()
            .text(
                "time_spent_minutes",
                payload.time_spent_minutes.to_string(),
            )
            .text("answers", answers_json);

        for attachment in &payload.attachments {
            let part =
                Part::bytes(attachment.bytes.clone()).file_name(attachment.file_name.clone());
            form = form.part(Self::attachment_part_name(attachment.question), part);
        }

        Ok(form)
    }
}

#[async_trait]
impl ExamService for HttpExamService {
    async fn get(&self, exam_id: ExamId) -> Result<ExamDefinition, ExamServiceError> {
        let url = format!("{}/exams/{exam_id}/", self.base_url);
        let response = self.authorize(self.client.get(url)).send().await?;
        Self::decode(response).await
    }

    async fn submit(
        &self,
        exam_id: ExamId,
        payload: &SubmissionPayload,
    ) -> Result<SubmissionAck, ExamServiceError> {
        let url = format!("{}/exams/{exam_id}/submit/", self.base_url);
        let form = Self::multipart_form(payload)?;
        let response = self
            .authorize(self.client.post(url))
            .multipart(form)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn latest_submission(&self, exam_id: ExamId) -> Result<Submission, ExamServiceError> {
        let url = format!("{}/exams/{exam_id}/submission/", self.base_url);
        let response = self.authorize(self.client.get(url)).send().await?;
        Self::decode(response).await
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::{AnswerEntry, AttachmentPart};

    #[test]
    fn attachment_parts_are_named_after_the_question() {
        assert_eq!(
            HttpExamService::attachment_part_name(QuestionId::new(3)),
            "answer_image_3"
        );
        assert_eq!(
            HttpExamService::attachment_part_name(QuestionId::new(42)),
            "answer_image_42"
        );
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let service = HttpExamService::new("https://api.example.test/v1/");
        assert_eq!(service.base_url, "https://api.example.test/v1");
    }

    #[test]
    fn multipart_form_builds_for_payload_with_attachments() {
        let payload = SubmissionPayload {
            time_spent_minutes: 12,
            answers: vec![AnswerEntry {
                question: QuestionId::new(3),
                answer_text: Some("Paris".into()),
            }],
            attachments: vec![AttachmentPart {
                question: QuestionId::new(3),
                file_name: "photo.jpg".into(),
                bytes: vec![0xff, 0xd8],
            }],
        };

        // reqwest keeps form internals opaque; building without error is the
        // checkable contract here.
        assert!(HttpExamService::multipart_form(&payload).is_ok());
    }
}
