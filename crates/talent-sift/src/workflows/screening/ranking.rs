use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, info};

use super::domain::RankedCandidate;
use super::payload::{PayloadError, TransportPayload, DATA_FIELD};

/// The ranking call failed before a usable response arrived.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct UpstreamError {
    pub status: Option<u16>,
    pub message: String,
}

impl UpstreamError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

/// The ranking service answered, but not with a list of candidates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unexpected ranking result shape: {detail}")]
pub struct ContractViolation {
    pub detail: String,
}

impl ContractViolation {
    fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RankingError {
    #[error("ranking service call failed: {0}")]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Contract(#[from] ContractViolation),
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

/// Remote service scoring resumes against a posting.
#[async_trait]
pub trait RankingService: Send + Sync {
    async fn rank(&self, payload: TransportPayload) -> Result<Vec<RankedCandidate>, RankingError>;
}

/// Interpret a ranking response; the result list lives under `data.result`.
pub fn parse_ranking_response(
    status: StatusCode,
    body: &[u8],
) -> Result<Vec<RankedCandidate>, RankingError> {
    let parsed: Option<Value> = serde_json::from_slice(body).ok();

    if !status.is_success() {
        let remote_message = parsed
            .as_ref()
            .and_then(|value| value.get("message"))
            .and_then(Value::as_str)
            .filter(|message| !message.trim().is_empty())
            .map(str::to_string);
        let message = remote_message
            .unwrap_or_else(|| format!("upload failed with status {}", status.as_u16()));
        return Err(UpstreamError::status(status.as_u16(), message).into());
    }

    let body = parsed.ok_or_else(|| ContractViolation::new("response body is not JSON"))?;
    let result = body
        .get("data")
        .and_then(|data| data.get("result"))
        .ok_or_else(|| ContractViolation::new("missing data.result"))?;

    if !result.is_array() {
        return Err(ContractViolation::new("data.result is not a list").into());
    }

    serde_json::from_value::<Vec<RankedCandidate>>(result.clone())
        .map_err(|err| ContractViolation::new(format!("malformed candidate record: {err}")).into())
}

/// HTTP client for the ranking workflow endpoint.
#[derive(Debug, Clone)]
pub struct HttpRankingClient {
    client: Client,
    endpoint: Url,
}

impl HttpRankingClient {
    pub fn new(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    fn form(payload: TransportPayload) -> Result<Form, RankingError> {
        let metadata = payload.metadata_json()?;
        let mut form = Form::new().text(DATA_FIELD, metadata);

        for part in payload.parts {
            let file = Part::bytes(part.content)
                .file_name(part.file_name.clone())
                .mime_str(&part.content_type)
                .map_err(|_| PayloadError::InvalidContentType {
                    file_name: part.file_name,
                    content_type: part.content_type,
                })?;
            form = form.part(part.field, file);
        }

        Ok(form)
    }
}

#[async_trait]
impl RankingService for HttpRankingClient {
    async fn rank(&self, payload: TransportPayload) -> Result<Vec<RankedCandidate>, RankingError> {
        let resumes = payload.parts.len();
        let form = Self::form(payload)?;

        debug!(endpoint = %self.endpoint, resumes, "sending resumes for ranking");
        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|err| UpstreamError::transport(format!("ranking request failed: {err}")))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| UpstreamError::transport(format!("ranking response unreadable: {err}")))?;

        let candidates = parse_ranking_response(status, &body)?;
        info!(resumes, candidates = candidates.len(), "ranking completed");
        Ok(candidates)
    }
}
