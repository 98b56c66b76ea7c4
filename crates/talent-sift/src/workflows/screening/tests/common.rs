use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::{json, Value};

use crate::workflows::screening::delivery::{
    BatchRecorder, BulkDelivery, CandidateDispatcher, DeliveryError, ItemDeliveryError,
    PerItemDelivery,
};
use crate::workflows::screening::domain::{
    PostingDraft, RankedCandidate, ResumeAttachment, YearsOfExperience,
};
use crate::workflows::screening::payload::TransportPayload;
use crate::workflows::screening::ranking::{
    ContractViolation, RankingError, RankingService, UpstreamError,
};
use crate::workflows::screening::service::ScreeningService;

pub(super) type FakeService = ScreeningService<ScriptedRanking, MemoryBatch, MemoryDispatcher>;

pub(super) fn candidate(name: &str, score: f64) -> RankedCandidate {
    RankedCandidate {
        name: name.to_string(),
        score,
        email: format!("{}@example.com", name.to_lowercase()),
        phone: "555-0100".to_string(),
        justification: format!("{name} matches the required skills"),
    }
}

pub(super) fn three_candidates() -> Vec<RankedCandidate> {
    vec![
        candidate("Ada", 94.0),
        candidate("Grace", 88.0),
        candidate("Linus", 71.5),
    ]
}

pub(super) fn draft() -> PostingDraft {
    PostingDraft {
        title: "Platform Engineer".to_string(),
        job_type: "fulltime".to_string(),
        years_of_experience: Some(YearsOfExperience::clamped(4)),
        required_skills: "Rust, Tokio, Postgres".to_string(),
        description: "<p>Own the <strong>screening</strong> platform.</p>".to_string(),
        attachments: vec![
            ResumeAttachment::new("ada.pdf", b"%PDF-ada".to_vec()),
            ResumeAttachment::new("grace.pdf", b"%PDF-grace".to_vec()),
        ]
        .into(),
    }
}

#[derive(Debug, Clone)]
pub(super) enum Script {
    Candidates(Vec<RankedCandidate>),
    Upstream(UpstreamError),
    Contract(ContractViolation),
}

/// Ranking fake replaying a fixed answer and recording every payload.
#[derive(Clone)]
pub(super) struct ScriptedRanking {
    script: Script,
    payloads: Arc<Mutex<Vec<TransportPayload>>>,
}

impl ScriptedRanking {
    pub(super) fn returning(candidates: Vec<RankedCandidate>) -> Self {
        Self::with_script(Script::Candidates(candidates))
    }

    pub(super) fn with_script(script: Script) -> Self {
        Self {
            script,
            payloads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.payloads.lock().expect("ranking mutex poisoned").len()
    }

    pub(super) fn payloads(&self) -> Vec<TransportPayload> {
        self.payloads.lock().expect("ranking mutex poisoned").clone()
    }
}

#[async_trait]
impl RankingService for ScriptedRanking {
    async fn rank(&self, payload: TransportPayload) -> Result<Vec<RankedCandidate>, RankingError> {
        self.payloads
            .lock()
            .expect("ranking mutex poisoned")
            .push(payload);
        match &self.script {
            Script::Candidates(candidates) => Ok(candidates.clone()),
            Script::Upstream(error) => Err(RankingError::Upstream(error.clone())),
            Script::Contract(error) => Err(RankingError::Contract(error.clone())),
        }
    }
}

/// Record-system fake that either stores batches or rejects them.
#[derive(Default, Clone)]
pub(super) struct MemoryBatch {
    batches: Arc<Mutex<Vec<Vec<RankedCandidate>>>>,
    rejection: Option<DeliveryError>,
}

impl MemoryBatch {
    pub(super) fn rejecting(error: DeliveryError) -> Self {
        Self {
            batches: Arc::default(),
            rejection: Some(error),
        }
    }

    pub(super) fn batches(&self) -> Vec<Vec<RankedCandidate>> {
        self.batches.lock().expect("batch mutex poisoned").clone()
    }
}

#[async_trait]
impl BatchRecorder for MemoryBatch {
    async fn record_batch(&self, candidates: &[RankedCandidate]) -> Result<(), DeliveryError> {
        if let Some(error) = &self.rejection {
            return Err(error.clone());
        }
        self.batches
            .lock()
            .expect("batch mutex poisoned")
            .push(candidates.to_vec());
        Ok(())
    }
}

/// Automation fake failing for a configured set of candidate names.
#[derive(Default, Clone)]
pub(super) struct MemoryDispatcher {
    failing: Arc<HashSet<String>>,
    attempts: Arc<AtomicUsize>,
    delivered: Arc<Mutex<Vec<String>>>,
}

impl MemoryDispatcher {
    pub(super) fn failing_for(names: &[&str]) -> Self {
        Self {
            failing: Arc::new(names.iter().map(|name| name.to_string()).collect()),
            ..Self::default()
        }
    }

    pub(super) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub(super) fn delivered(&self) -> Vec<String> {
        self.delivered
            .lock()
            .expect("dispatcher mutex poisoned")
            .clone()
    }
}

#[async_trait]
impl CandidateDispatcher for MemoryDispatcher {
    async fn dispatch(&self, candidate: &RankedCandidate) -> Result<Value, ItemDeliveryError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&candidate.name) {
            return Err(ItemDeliveryError::Rejected {
                status: 503,
                body: "workflow paused".to_string(),
            });
        }
        self.delivered
            .lock()
            .expect("dispatcher mutex poisoned")
            .push(candidate.name.clone());
        Ok(json!({ "received": candidate.name }))
    }
}

pub(super) fn build_service(
    ranking: ScriptedRanking,
    batch: MemoryBatch,
    dispatcher: MemoryDispatcher,
) -> FakeService {
    ScreeningService::new(
        ranking,
        BulkDelivery::new(batch),
        PerItemDelivery::new(dispatcher),
    )
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
