use std::fmt;

use async_trait::async_trait;
use futures::stream::{FuturesOrdered, StreamExt};
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::excerpt;
use crate::workflows::screening::domain::RankedCandidate;

/// Why a single candidate did not reach the automation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemDeliveryError {
    #[error("automation endpoint answered {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("automation endpoint unreachable: {0}")]
    Transport(String),
    #[error("automation endpoint returned a non-JSON body: {0}")]
    MalformedResponse(String),
}

/// Endpoint receiving one candidate per call.
#[async_trait]
pub trait CandidateDispatcher: Send + Sync {
    async fn dispatch(&self, candidate: &RankedCandidate) -> Result<Value, ItemDeliveryError>;
}

/// Successful per-item delivery with the endpoint's JSON reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Delivered {
    pub response: Value,
}

/// Failed per-item delivery; kept as data so the batch continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failed {
    pub reason: ItemDeliveryError,
}

/// Outcome for one candidate, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemOutcome {
    pub position: usize,
    pub candidate: String,
    pub result: Result<Delivered, Failed>,
}

impl ItemOutcome {
    pub fn is_delivered(&self) -> bool {
        self.result.is_ok()
    }
}

/// One or more per-item deliveries failed while the batch still completed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{failed} of {attempted} candidates were not delivered: {}", .candidates.join(", "))]
pub struct PartialDeliveryFailure {
    pub attempted: usize,
    pub failed: usize,
    pub candidates: Vec<String>,
}

/// Per-candidate classification produced by [`PerItemDelivery`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryReport {
    pub items: Vec<ItemOutcome>,
}

impl DeliveryReport {
    pub fn delivered(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.items.iter().filter(|item| item.is_delivered())
    }

    pub fn failed(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.items.iter().filter(|item| !item.is_delivered())
    }

    pub fn delivered_count(&self) -> usize {
        self.delivered().count()
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// `Some` when any candidate failed; the report itself is never an error.
    pub fn partial_failure(&self) -> Option<PartialDeliveryFailure> {
        let candidates: Vec<String> = self.failed().map(|item| item.candidate.clone()).collect();
        if candidates.is_empty() {
            return None;
        }

        Some(PartialDeliveryFailure {
            attempted: self.items.len(),
            failed: candidates.len(),
            candidates,
        })
    }

    pub fn view(&self) -> DeliveryReportView {
        DeliveryReportView {
            attempted: self.items.len(),
            delivered: self.delivered_count(),
            failed: self.failed_count(),
            items: self
                .items
                .iter()
                .map(|item| ItemOutcomeView {
                    position: item.position,
                    candidate: item.candidate.clone(),
                    status: if item.is_delivered() {
                        "delivered"
                    } else {
                        "failed"
                    },
                    error: item.result.as_ref().err().map(|f| f.reason.to_string()),
                })
                .collect(),
        }
    }
}

/// Serializable summary of a [`DeliveryReport`].
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReportView {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
    pub items: Vec<ItemOutcomeView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemOutcomeView {
    pub position: usize,
    pub candidate: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Best-effort delivery of each candidate with per-item failure isolation.
pub struct PerItemDelivery<D> {
    dispatcher: D,
    concurrency: usize,
}

impl<D> fmt::Debug for PerItemDelivery<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerItemDelivery")
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

impl<D> PerItemDelivery<D>
where
    D: CandidateDispatcher,
{
    /// Sequential dispatch, one candidate at a time.
    pub fn new(dispatcher: D) -> Self {
        Self::with_concurrency(dispatcher, 1)
    }

    pub fn with_concurrency(dispatcher: D, concurrency: usize) -> Self {
        Self {
            dispatcher,
            concurrency: concurrency.max(1),
        }
    }

    /// Attempt every candidate; report order always matches input order.
    pub async fn deliver(&self, candidates: &[RankedCandidate]) -> DeliveryReport {
        let mut items = Vec::with_capacity(candidates.len());
        let mut queue = candidates.iter().enumerate();
        let mut pending = FuturesOrdered::new();

        loop {
            while pending.len() < self.concurrency {
                match queue.next() {
                    Some((index, candidate)) => {
                        pending.push_back(self.deliver_one(index + 1, candidate))
                    }
                    None => break,
                }
            }

            match pending.next().await {
                Some(outcome) => items.push(outcome),
                None => break,
            }
        }

        DeliveryReport { items }
    }

    async fn deliver_one(&self, position: usize, candidate: &RankedCandidate) -> ItemOutcome {
        let result = match self.dispatcher.dispatch(candidate).await {
            Ok(response) => {
                debug!(position, candidate = %candidate.name, "candidate delivered");
                Ok(Delivered { response })
            }
            Err(reason) => {
                warn!(
                    position,
                    candidate = %candidate.name,
                    email = %candidate.email,
                    error = %reason,
                    "candidate delivery failed; continuing with remaining candidates"
                );
                Err(Failed { reason })
            }
        };

        ItemOutcome {
            position,
            candidate: candidate.name.clone(),
            result,
        }
    }
}

#[derive(Debug, Serialize)]
struct CandidatePayload<'a> {
    name: &'a str,
    score: f64,
    phone: &'a str,
    email: &'a str,
    justification: &'a str,
}

impl<'a> From<&'a RankedCandidate> for CandidatePayload<'a> {
    fn from(candidate: &'a RankedCandidate) -> Self {
        Self {
            name: &candidate.name,
            score: candidate.score,
            phone: &candidate.phone,
            email: &candidate.email,
            justification: &candidate.justification,
        }
    }
}

/// Bearer-authenticated client for the workflow automation webhook.
#[derive(Clone)]
pub struct HttpAutomationClient {
    client: Client,
    endpoint: Url,
    token: Option<String>,
}

impl fmt::Debug for HttpAutomationClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpAutomationClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl HttpAutomationClient {
    pub fn new(client: Client, endpoint: Url, token: Option<String>) -> Self {
        Self {
            client,
            endpoint,
            token,
        }
    }
}

#[async_trait]
impl CandidateDispatcher for HttpAutomationClient {
    async fn dispatch(&self, candidate: &RankedCandidate) -> Result<Value, ItemDeliveryError> {
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .json(&CandidatePayload::from(candidate));

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| ItemDeliveryError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ItemDeliveryError::Transport(err.to_string()))?;

        if !status.is_success() {
            return Err(ItemDeliveryError::Rejected {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        serde_json::from_str(&body).map_err(|_| ItemDeliveryError::MalformedResponse(excerpt(&body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn candidate(name: &str) -> RankedCandidate {
        RankedCandidate {
            name: name.to_string(),
            score: 80.0,
            email: format!("{}@example.com", name.to_lowercase()),
            phone: "555-0100".to_string(),
            justification: "solid match".to_string(),
        }
    }

    struct FailingFor {
        names: HashSet<&'static str>,
        calls: AtomicUsize,
    }

    impl FailingFor {
        fn new(names: &[&'static str]) -> Self {
            Self {
                names: names.iter().copied().collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CandidateDispatcher for FailingFor {
        async fn dispatch(&self, candidate: &RankedCandidate) -> Result<Value, ItemDeliveryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.names.contains(candidate.name.as_str()) {
                Err(ItemDeliveryError::Rejected {
                    status: 500,
                    body: "boom".to_string(),
                })
            } else {
                Ok(json!({ "accepted": candidate.name }))
            }
        }
    }

    /// Finishes later items first to prove ordering does not follow completion.
    struct ReverseLatency;

    #[async_trait]
    impl CandidateDispatcher for ReverseLatency {
        async fn dispatch(&self, candidate: &RankedCandidate) -> Result<Value, ItemDeliveryError> {
            let delay = match candidate.name.as_str() {
                "Ada" => 30,
                "Grace" => 15,
                _ => 0,
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(json!({ "ok": true }))
        }
    }

    #[tokio::test]
    async fn middle_failure_does_not_halt_batch() {
        let delivery = PerItemDelivery::new(FailingFor::new(&["Grace"]));
        let candidates = vec![candidate("Ada"), candidate("Grace"), candidate("Linus")];

        let report = delivery.deliver(&candidates).await;

        assert_eq!(delivery.dispatcher.calls.load(Ordering::SeqCst), 3);
        let statuses: Vec<(usize, bool)> = report
            .items
            .iter()
            .map(|item| (item.position, item.is_delivered()))
            .collect();
        assert_eq!(statuses, vec![(1, true), (2, false), (3, true)]);

        let partial = report.partial_failure().expect("partial failure recorded");
        assert_eq!(partial.failed, 1);
        assert_eq!(partial.attempted, 3);
        assert_eq!(partial.candidates, vec!["Grace".to_string()]);
    }

    #[tokio::test]
    async fn empty_candidate_list_gives_empty_report() {
        let delivery = PerItemDelivery::new(FailingFor::new(&[]));
        let report = delivery.deliver(&[]).await;
        assert!(report.is_empty());
        assert!(report.partial_failure().is_none());
    }

    #[tokio::test]
    async fn concurrent_dispatch_keeps_input_order() {
        let delivery = PerItemDelivery::with_concurrency(ReverseLatency, 3);
        let candidates = vec![candidate("Ada"), candidate("Grace"), candidate("Linus")];

        let report = delivery.deliver(&candidates).await;

        let names: Vec<&str> = report.items.iter().map(|i| i.candidate.as_str()).collect();
        assert_eq!(names, vec!["Ada", "Grace", "Linus"]);
        assert_eq!(report.delivered_count(), 3);
    }

    #[test]
    fn zero_concurrency_falls_back_to_sequential() {
        let delivery = PerItemDelivery::with_concurrency(ReverseLatency, 0);
        assert_eq!(delivery.concurrency, 1);
    }

    #[test]
    fn report_view_lists_failures_with_reasons() {
        let report = DeliveryReport {
            items: vec![
                ItemOutcome {
                    position: 1,
                    candidate: "Ada".to_string(),
                    result: Ok(Delivered {
                        response: json!({}),
                    }),
                },
                ItemOutcome {
                    position: 2,
                    candidate: "Grace".to_string(),
                    result: Err(Failed {
                        reason: ItemDeliveryError::Transport("connection reset".to_string()),
                    }),
                },
            ],
        };

        let view = serde_json::to_value(report.view()).expect("serializes");
        assert_eq!(view["delivered"], 1);
        assert_eq!(view["failed"], 1);
        assert_eq!(view["items"][1]["status"], "failed");
        assert_eq!(
            view["items"][1]["error"],
            "automation endpoint unreachable: connection reset"
        );
        assert!(view["items"][0].get("error").is_none());
    }
}
