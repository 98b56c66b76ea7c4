use crate::cli::ServeArgs;
use crate::infra::{build_screening_service, AppState};
use crate::routes::with_screening_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use talent_sift::config::AppConfig;
use talent_sift::error::AppError;
use talent_sift::telemetry;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let screening_service = Arc::new(build_screening_service(&config.integrations)?);

    let app = with_screening_routes(screening_service, config.server.max_upload_bytes)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        ranking = %config.integrations.ranking_url,
        automation_concurrency = config.integrations.automation_concurrency,
        max_upload_bytes = config.server.max_upload_bytes,
        "resume screening orchestrator ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
