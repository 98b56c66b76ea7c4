use async_trait::async_trait;
use reqwest::{header, Client, Url};
use tracing::{info, warn};

use super::{excerpt, BasicCredentials};
use crate::workflows::screening::domain::RankedCandidate;

/// The record system did not accept the batch; nothing was recorded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("record system rejected the batch with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("record system unreachable: {0}")]
    Transport(String),
}

/// Endpoint accepting an entire candidate list in one call.
#[async_trait]
pub trait BatchRecorder: Send + Sync {
    async fn record_batch(&self, candidates: &[RankedCandidate]) -> Result<(), DeliveryError>;
}

/// All-or-nothing delivery of the ranked list.
#[derive(Debug, Clone)]
pub struct BulkDelivery<B> {
    recorder: B,
}

impl<B> BulkDelivery<B>
where
    B: BatchRecorder,
{
    pub fn new(recorder: B) -> Self {
        Self { recorder }
    }

    pub async fn deliver(&self, candidates: &[RankedCandidate]) -> Result<(), DeliveryError> {
        match self.recorder.record_batch(candidates).await {
            Ok(()) => {
                info!(candidates = candidates.len(), "ranked batch recorded");
                Ok(())
            }
            Err(error) => {
                warn!(
                    candidates = candidates.len(),
                    %error,
                    "ranked batch not recorded; none of the candidates reached the record system"
                );
                Err(error)
            }
        }
    }
}

/// JSON client for the ticketing/record system's upload API.
#[derive(Debug, Clone)]
pub struct HttpTicketingClient {
    client: Client,
    endpoint: Url,
    credentials: Option<BasicCredentials>,
}

impl HttpTicketingClient {
    pub fn new(client: Client, endpoint: Url, credentials: Option<BasicCredentials>) -> Self {
        Self {
            client,
            endpoint,
            credentials,
        }
    }
}

#[async_trait]
impl BatchRecorder for HttpTicketingClient {
    async fn record_batch(&self, candidates: &[RankedCandidate]) -> Result<(), DeliveryError> {
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .header(header::ACCEPT, "application/json")
            .json(candidates);

        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.username, credentials.password.as_ref());
        }

        let response = request
            .send()
            .await
            .map_err(|err| DeliveryError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(DeliveryError::Rejected {
            status: status.as_u16(),
            body: excerpt(&body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingBatch {
        batches: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl BatchRecorder for RecordingBatch {
        async fn record_batch(&self, candidates: &[RankedCandidate]) -> Result<(), DeliveryError> {
            self.batches
                .lock()
                .expect("batch mutex")
                .push(candidates.len());
            Ok(())
        }
    }

    struct RejectingBatch;

    #[async_trait]
    impl BatchRecorder for RejectingBatch {
        async fn record_batch(&self, _candidates: &[RankedCandidate]) -> Result<(), DeliveryError> {
            Err(DeliveryError::Rejected {
                status: 401,
                body: "bad credentials".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn empty_batch_is_still_delivered() {
        let delivery = BulkDelivery::new(RecordingBatch::default());
        delivery.deliver(&[]).await.expect("empty batch accepted");
        assert_eq!(*delivery.recorder.batches.lock().expect("mutex"), vec![0]);
    }

    #[tokio::test]
    async fn rejection_is_propagated() {
        let delivery = BulkDelivery::new(RejectingBatch);
        let error = delivery.deliver(&[]).await.expect_err("rejected");
        assert_eq!(
            error,
            DeliveryError::Rejected {
                status: 401,
                body: "bad credentials".to_string()
            }
        );
    }
}
