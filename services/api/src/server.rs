use crate::cli::ServeArgs;
use crate::infra::{AppState, SessionState};
use crate::routes::with_session_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use response_ai::config::AppConfig;
use response_ai::error::AppError;
use response_ai::prediction::{PredictionBackends, PredictionController};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut config: AppConfig, mut args: ServeArgs) -> Result<(), AppError> {
    if let Some(host) = args.host.take() {
        config.rebind_host(host);
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let backends = PredictionBackends::from_config(&config.predictor);
    let controller = PredictionController::new(backends.endpoint());
    let session = SessionState::new(controller, backends);

    let app = with_session_routes(session)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        endpoint = %config.predictor.endpoint,
        "response prediction console ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
