use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use talent_sift::config::IntegrationConfig;
use talent_sift::error::AppError;
use talent_sift::workflows::screening::{
    BulkDelivery, HttpAutomationClient, HttpRankingClient, HttpTicketingClient, PerItemDelivery,
    ScreeningService,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type LiveScreeningService =
    ScreeningService<HttpRankingClient, HttpTicketingClient, HttpAutomationClient>;

/// Wire the HTTP-backed ranking and delivery clients from configuration.
pub(crate) fn build_screening_service(
    config: &IntegrationConfig,
) -> Result<LiveScreeningService, AppError> {
    let client = config.http_client()?;

    let ranking = HttpRankingClient::new(client.clone(), config.ranking_url.clone());
    let ticketing = HttpTicketingClient::new(
        client.clone(),
        config.ticketing_url.clone(),
        config.ticketing_credentials.clone(),
    );
    let automation = HttpAutomationClient::new(
        client,
        config.automation_url.clone(),
        config.automation_token.clone(),
    );

    Ok(ScreeningService::new(
        ranking,
        BulkDelivery::new(ticketing),
        PerItemDelivery::with_concurrency(automation, config.automation_concurrency),
    ))
}
