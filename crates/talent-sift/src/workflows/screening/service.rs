use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, info_span, warn, Instrument};

use super::delivery::{
    BatchRecorder, BulkDelivery, CandidateDispatcher, DeliveryError, DeliveryReport,
    DeliveryReportView, PerItemDelivery,
};
use super::destination::{self, DeliveryRoute};
use super::domain::{OrganizationId, PostingDraft, RankedCandidate, SubmissionContext};
use super::payload::{PayloadBuilder, PayloadError};
use super::ranking::{ContractViolation, RankingError, RankingService, UpstreamError};
use super::validation::{PostingValidator, ValidationError};

/// Identifier assigned to each submission attempt for log correlation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SubmissionId(pub String);

static SUBMISSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_submission_id() -> SubmissionId {
    let id = SUBMISSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SubmissionId(format!("sub-{id:06}"))
}

/// How a submission ended once ranking succeeded.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// The record system accepted the whole ranked batch.
    Recorded { candidates: Vec<RankedCandidate> },
    /// Per-item delivery ran to completion; inspect the report for failures.
    Submitted {
        candidates: Vec<RankedCandidate>,
        report: DeliveryReport,
    },
    /// The destination was not recognized, so nothing was delivered.
    CompletedWithoutDelivery { candidates: Vec<RankedCandidate> },
}

impl SubmissionOutcome {
    pub const fn label(&self) -> &'static str {
        match self {
            SubmissionOutcome::Recorded { .. } => "recorded",
            SubmissionOutcome::Submitted { .. } => "submitted",
            SubmissionOutcome::CompletedWithoutDelivery { .. } => "completed_without_delivery",
        }
    }

    pub fn candidates(&self) -> &[RankedCandidate] {
        match self {
            SubmissionOutcome::Recorded { candidates }
            | SubmissionOutcome::Submitted { candidates, .. }
            | SubmissionOutcome::CompletedWithoutDelivery { candidates } => candidates,
        }
    }

    pub fn report(&self) -> Option<&DeliveryReport> {
        match self {
            SubmissionOutcome::Submitted { report, .. } => Some(report),
            _ => None,
        }
    }
}

/// Result of a submission whose ranking step succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub submission_id: SubmissionId,
    pub submitted_at: DateTime<Utc>,
    pub organization_id: OrganizationId,
    pub route: DeliveryRoute,
    pub outcome: SubmissionOutcome,
}

impl SubmissionReceipt {
    pub fn status_view(&self) -> SubmissionStatusView {
        SubmissionStatusView {
            submission_id: self.submission_id.clone(),
            submitted_at: self.submitted_at,
            organization_id: self.organization_id,
            destination: self.route.label(),
            status: self.outcome.label(),
            candidates: self.outcome.candidates().to_vec(),
            report: self.outcome.report().map(DeliveryReport::view),
        }
    }
}

/// Serializable receipt for API and CLI output.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionStatusView {
    pub submission_id: SubmissionId,
    pub submitted_at: DateTime<Utc>,
    pub organization_id: OrganizationId,
    pub destination: &'static str,
    pub status: &'static str,
    pub candidates: Vec<RankedCandidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<DeliveryReportView>,
}

/// Error raised by the screening service.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error("ranking service call failed: {0}")]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Contract(#[from] ContractViolation),
    #[error("ranking succeeded for {ranked} candidates but none were recorded: {source}")]
    NotRecorded {
        ranked: usize,
        #[source]
        source: DeliveryError,
    },
}

impl From<RankingError> for SubmissionError {
    fn from(value: RankingError) -> Self {
        match value {
            RankingError::Upstream(error) => Self::Upstream(error),
            RankingError::Contract(error) => Self::Contract(error),
            RankingError::Payload(error) => Self::Payload(error),
        }
    }
}

/// Orchestrates validate, build, rank, route, and deliver for one submission.
pub struct ScreeningService<R, B, D> {
    validator: PostingValidator,
    payloads: PayloadBuilder,
    ranking: R,
    bulk: BulkDelivery<B>,
    per_item: PerItemDelivery<D>,
}

impl<R, B, D> std::fmt::Debug for ScreeningService<R, B, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreeningService").finish_non_exhaustive()
    }
}

impl<R, B, D> ScreeningService<R, B, D>
where
    R: RankingService + 'static,
    B: BatchRecorder + 'static,
    D: CandidateDispatcher + 'static,
{
    pub fn new(ranking: R, bulk: BulkDelivery<B>, per_item: PerItemDelivery<D>) -> Self {
        Self {
            validator: PostingValidator,
            payloads: PayloadBuilder,
            ranking,
            bulk,
            per_item,
        }
    }

    /// Run a full submission. Each call ranks and delivers afresh.
    pub async fn submit(
        &self,
        draft: PostingDraft,
        context: SubmissionContext,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let submission_id = next_submission_id();
        let span = info_span!(
            "submission",
            id = %submission_id.0,
            org = context.organization_id.0,
            destination = %context.destination
        );

        self.run(submission_id, draft, context)
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        submission_id: SubmissionId,
        draft: PostingDraft,
        context: SubmissionContext,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let submitted_at = Utc::now();

        let posting = self.validator.validate(draft).map_err(|error| {
            let fields: Vec<&str> = error.fields().keys().copied().collect();
            warn!(?fields, "posting rejected");
            error
        })?;
        let payload = self.payloads.build(&posting, &context)?;

        let candidates = self.ranking.rank(payload).await?;
        info!(candidates = candidates.len(), "resumes ranked");

        let route = destination::route(&context);
        let outcome = match route {
            DeliveryRoute::Ticketing => match self.bulk.deliver(&candidates).await {
                Ok(()) => SubmissionOutcome::Recorded { candidates },
                Err(source) => {
                    return Err(SubmissionError::NotRecorded {
                        ranked: candidates.len(),
                        source,
                    })
                }
            },
            DeliveryRoute::Automation => {
                let report = self.per_item.deliver(&candidates).await;
                if let Some(partial) = report.partial_failure() {
                    warn!(%partial, "automation delivery completed with failures");
                }
                SubmissionOutcome::Submitted { candidates, report }
            }
            DeliveryRoute::NoOp => {
                info!("destination not recognized; completed without delivery");
                SubmissionOutcome::CompletedWithoutDelivery { candidates }
            }
        };

        Ok(SubmissionReceipt {
            submission_id,
            submitted_at,
            organization_id: context.organization_id,
            route,
            outcome,
        })
    }
}
