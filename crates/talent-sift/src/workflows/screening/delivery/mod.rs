pub mod automation;
pub mod ticketing;

pub use automation::{
    CandidateDispatcher, Delivered, DeliveryReport, DeliveryReportView, Failed,
    HttpAutomationClient, ItemDeliveryError, ItemOutcome, ItemOutcomeView, PartialDeliveryFailure,
    PerItemDelivery,
};
pub use ticketing::{BatchRecorder, BulkDelivery, DeliveryError, HttpTicketingClient};

/// Basic-auth pair for the record system.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: Option<String>,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Trim a response body for inclusion in log lines and error messages.
pub(crate) fn excerpt(body: &str) -> String {
    const LIMIT: usize = 200;
    let trimmed = body.trim();
    match trimmed.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
