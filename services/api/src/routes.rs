use crate::infra::{AppState, SessionState, SessionView};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use response_ai::error::AppError;
use response_ai::prediction::{form_layout, validate_input, SectionLayout};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub(crate) struct FieldUpdateRequest {
    pub(crate) value: f64,
}

pub(crate) fn with_session_routes(session: SessionState) -> Router {
    Router::new()
        .route("/api/v1/form", get(form_endpoint))
        .route("/api/v1/session", get(session_endpoint))
        .route("/api/v1/session/fields/:field", put(update_field_endpoint))
        .route("/api/v1/session/mode", post(toggle_mode_endpoint))
        .route("/api/v1/session/predict", post(predict_endpoint))
        .route("/api/v1/session/reset", post(reset_endpoint))
        .with_state(session)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn form_endpoint() -> Json<Vec<SectionLayout>> {
    Json(form_layout())
}

pub(crate) async fn session_endpoint(State(session): State<SessionState>) -> Json<SessionView> {
    Json(session.view().await)
}

pub(crate) async fn update_field_endpoint(
    State(session): State<SessionState>,
    Path(field): Path<String>,
    Json(request): Json<FieldUpdateRequest>,
) -> Result<Json<SessionView>, AppError> {
    let (field, value) = validate_input(&field, request.value)?;
    let view = session
        .update(|controller| controller.update_field(field, value))
        .await;
    Ok(Json(view))
}

pub(crate) async fn toggle_mode_endpoint(State(session): State<SessionState>) -> Json<SessionView> {
    Json(session.update(|controller| controller.toggle_mode()).await)
}

pub(crate) async fn reset_endpoint(State(session): State<SessionState>) -> Json<SessionView> {
    Json(session.update(|controller| controller.reset_profile()).await)
}

pub(crate) async fn predict_endpoint(State(session): State<SessionState>) -> Json<SessionView> {
    Json(session.submit().await)
}
