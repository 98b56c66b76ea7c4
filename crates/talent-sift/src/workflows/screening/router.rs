use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::delivery::{BatchRecorder, CandidateDispatcher};
use super::domain::{
    OrganizationId, PostingDraft, ResumeAttachment, SubmissionContext, YearsOfExperience,
};
use super::ranking::RankingService;
use super::service::{ScreeningService, SubmissionError};

pub const SUBMISSIONS_PATH: &str = "/api/v1/screening/submissions";

/// Upload ceiling for one submission, covering every resume plus form fields.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Destination and organization arrive on the query string.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SubmissionQuery {
    #[serde(default)]
    pub(crate) destination: Option<String>,
    #[serde(default)]
    pub(crate) org_id: Option<String>,
}

impl SubmissionQuery {
    fn into_context(self) -> SubmissionContext {
        SubmissionContext::new(
            self.destination.unwrap_or_default(),
            OrganizationId::from_param(self.org_id.as_deref()),
        )
    }
}

struct SubmissionState<R, B, D> {
    service: Arc<ScreeningService<R, B, D>>,
    max_upload_bytes: usize,
}

impl<R, B, D> Clone for SubmissionState<R, B, D> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}

/// Router builder exposing the multipart submission endpoint.
pub fn screening_router<R, B, D>(service: Arc<ScreeningService<R, B, D>>) -> Router
where
    R: RankingService + 'static,
    B: BatchRecorder + 'static,
    D: CandidateDispatcher + 'static,
{
    screening_router_with_limit(service, DEFAULT_MAX_UPLOAD_BYTES)
}

/// Same as [`screening_router`] with an explicit upload ceiling in bytes.
pub fn screening_router_with_limit<R, B, D>(
    service: Arc<ScreeningService<R, B, D>>,
    max_upload_bytes: usize,
) -> Router
where
    R: RankingService + 'static,
    B: BatchRecorder + 'static,
    D: CandidateDispatcher + 'static,
{
    Router::new()
        .route(
            SUBMISSIONS_PATH,
            post(submit_handler::<R, B, D>).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .with_state(SubmissionState {
            service,
            max_upload_bytes,
        })
}

async fn submit_handler<R, B, D>(
    State(state): State<SubmissionState<R, B, D>>,
    Query(query): Query<SubmissionQuery>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response
where
    R: RankingService + 'static,
    B: BatchRecorder + 'static,
    D: CandidateDispatcher + 'static,
{
    if let Some(declared) = declared_length(&headers) {
        if declared > state.max_upload_bytes {
            return payload_too_large(state.max_upload_bytes);
        }
    }

    let draft = match read_draft(multipart).await {
        Ok(draft) => draft,
        Err(error) if error.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return payload_too_large(state.max_upload_bytes);
        }
        Err(error) => {
            let payload = json!({
                "error": format!("malformed multipart body: {}", error.body_text()),
            });
            return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
        }
    };

    match state.service.submit(draft, query.into_context()).await {
        Ok(receipt) => (StatusCode::OK, axum::Json(receipt.status_view())).into_response(),
        Err(error) => error.into_response(),
    }
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

fn payload_too_large(limit: usize) -> Response {
    warn!(limit, "submission rejected: upload exceeds limit");
    let payload = json!({
        "error": format!("upload exceeds the {limit} byte limit for one submission"),
        "max_upload_bytes": limit,
    });
    (StatusCode::PAYLOAD_TOO_LARGE, axum::Json(payload)).into_response()
}

impl IntoResponse for SubmissionError {
    fn into_response(self) -> Response {
        match self {
            SubmissionError::Validation(error) => {
                let payload = json!({
                    "error": error.to_string(),
                    "fields": error.fields(),
                });
                (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
            }
            SubmissionError::Payload(error) => {
                let payload = json!({
                    "error": error.to_string(),
                });
                (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
            }
            SubmissionError::NotRecorded { ranked, source } => {
                let payload = json!({
                    "status": "ranked_not_recorded",
                    "ranked_candidates": ranked,
                    "error": source.to_string(),
                });
                (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
            }
            other @ (SubmissionError::Upstream(_) | SubmissionError::Contract(_)) => {
                let payload = json!({
                    "error": other.to_string(),
                });
                (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
            }
        }
    }
}

async fn read_draft(mut multipart: Multipart) -> Result<PostingDraft, MultipartError> {
    let mut draft = PostingDraft::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resumes" | "resume" => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("resume-{}", draft.attachments.len() + 1));
                let content_type = field.content_type().map(str::to_string);
                let content = field.bytes().await?;

                let mut attachment = ResumeAttachment::new(file_name, content.to_vec());
                if let Some(content_type) = content_type {
                    attachment = attachment.with_content_type(content_type);
                }
                draft.attachments.push(attachment);
            }
            "title" => draft.title = field.text().await?,
            "job_type" => draft.job_type = field.text().await?,
            "years_of_experience" => {
                draft.years_of_experience = YearsOfExperience::from_input(&field.text().await?);
            }
            "required_skills" => draft.required_skills = field.text().await?,
            "description" => draft.description = field.text().await?,
            other => debug!(field = other, "ignoring unknown multipart field"),
        }
    }

    Ok(draft)
}
