use serde::Serialize;

use super::domain::SubmissionContext;

/// Downstream system selected for a submission's ranked candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryRoute {
    /// Record system receiving the whole batch at once.
    Ticketing,
    /// Workflow automation receiving one call per candidate.
    Automation,
    /// Destination not recognized; ranking completes without delivery.
    NoOp,
}

impl DeliveryRoute {
    pub const fn label(self) -> &'static str {
        match self {
            DeliveryRoute::Ticketing => "ticketing",
            DeliveryRoute::Automation => "automation",
            DeliveryRoute::NoOp => "none",
        }
    }
}

/// Map the context's destination identifier onto a delivery route.
pub fn route(context: &SubmissionContext) -> DeliveryRoute {
    match context.destination.trim().to_ascii_lowercase().as_str() {
        "ticketing" | "servicenow" => DeliveryRoute::Ticketing,
        "automation" | "workflow" | "n8n" => DeliveryRoute::Automation,
        _ => DeliveryRoute::NoOp,
    }
}
