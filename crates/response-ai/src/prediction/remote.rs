//! Client for the remote classification service.
//!
//! The service accepts the profile as a JSON object keyed by model column name
//! and answers `{"Prediction": 0|1}`. A single attempt is made per call; the
//! transport default applies for timeouts.

use reqwest::Client;
use serde::Deserialize;
use std::time::Instant;

use super::predictor::{Prediction, PredictionError, Predictor};
use super::profile::CustomerProfile;

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    #[serde(rename = "Prediction")]
    prediction: Prediction,
}

/// Predictor backed by an HTTP POST to the classification service.
#[derive(Debug, Clone)]
pub struct RemotePredictor {
    client: Client,
    endpoint: String,
}

impl RemotePredictor {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = Client::builder().build().unwrap_or_default();
        Self::with_client(client, endpoint)
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Predictor for RemotePredictor {
    async fn predict(&self, profile: &CustomerProfile) -> Result<Prediction, PredictionError> {
        let started = Instant::now();
        tracing::info!(endpoint = %self.endpoint, "sending profile to classification service");

        let response = self
            .client
            .post(&self.endpoint)
            .json(profile)
            .send()
            .await
            .map_err(|error| classify_transport_error(&self.endpoint, error))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                elapsed_ms = started.elapsed().as_millis(),
                "classification service returned non-success status"
            );
            return Err(PredictionError::RequestFailed {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|error| classify_transport_error(&self.endpoint, error))?;
        let decoded: PredictionResponse = serde_json::from_slice(&body).map_err(|error| {
            PredictionError::UnexpectedFailure(format!("invalid prediction payload: {error}"))
        })?;

        tracing::info!(
            prediction = decoded.prediction.bit(),
            elapsed_ms = started.elapsed().as_millis(),
            "classification service responded"
        );
        Ok(decoded.prediction)
    }
}

/// Sort a transport error into connectivity or programming failures.
///
/// Anything that stopped the request or response from crossing the wire is a
/// connectivity failure; a request that could not even be built is not.
fn classify_transport_error(endpoint: &str, error: reqwest::Error) -> PredictionError {
    if error.is_builder() || error.is_redirect() {
        tracing::error!(endpoint, error = %error, "prediction request rejected before exchange");
        return PredictionError::UnexpectedFailure(format!("prediction request failed: {error}"));
    }

    tracing::warn!(
        endpoint,
        connect = error.is_connect(),
        timeout = error.is_timeout(),
        error = %error,
        "classification service unreachable"
    );
    PredictionError::ConnectivityFailed(error)
}
