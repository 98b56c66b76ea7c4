//! Resume screening submissions: validate a posting, rank its resumes with the
//! external AI service, and hand the ranked candidates to the destination the
//! caller picked.
//!
//! Destinations carry different reliability contracts. The ticketing system
//! records the whole batch or nothing; the automation webhook is best-effort
//! per candidate and reports individual failures as data.

pub mod delivery;
pub mod destination;
pub mod domain;
pub mod payload;
pub mod ranking;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use delivery::{
    BasicCredentials, BatchRecorder, BulkDelivery, CandidateDispatcher, Delivered, DeliveryError,
    DeliveryReport, DeliveryReportView, Failed, HttpAutomationClient, HttpTicketingClient,
    ItemDeliveryError, ItemOutcome, ItemOutcomeView, PartialDeliveryFailure, PerItemDelivery,
};
pub use destination::{route, DeliveryRoute};
pub use domain::{
    Attachments, JobPosting, JobType, OrganizationId, PostingDraft, RankedCandidate,
    ResumeAttachment, SubmissionContext, YearsOfExperience,
};
pub use payload::{PayloadBuilder, PayloadError, TransportPayload};
pub use ranking::{
    parse_ranking_response, ContractViolation, HttpRankingClient, RankingError, RankingService,
    UpstreamError,
};
pub use router::{
    screening_router, screening_router_with_limit, DEFAULT_MAX_UPLOAD_BYTES,
};
pub use service::{
    ScreeningService, SubmissionError, SubmissionOutcome, SubmissionReceipt, SubmissionStatusView,
};
pub use validation::{PostingValidator, ValidationError};
