use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

use super::mock::SimulatedPredictor;
use super::profile::CustomerProfile;
use super::remote::RemotePredictor;

/// Where a submission is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Simulated,
    Live,
}

impl Mode {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Simulated => Self::Live,
            Self::Live => Self::Simulated,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Simulated => "Simulation",
            Self::Live => "Live",
        }
    }
}

/// Binary campaign-response prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Prediction {
    Negative,
    Positive,
}

impl Prediction {
    pub const fn bit(self) -> u8 {
        match self {
            Self::Negative => 0,
            Self::Positive => 1,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Negative => "Negative Response",
            Self::Positive => "Positive Response",
        }
    }
}

impl From<bool> for Prediction {
    fn from(value: bool) -> Self {
        if value {
            Self::Positive
        } else {
            Self::Negative
        }
    }
}

impl From<Prediction> for u8 {
    fn from(value: Prediction) -> Self {
        value.bit()
    }
}

impl TryFrom<u8> for Prediction {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Negative),
            1 => Ok(Self::Positive),
            other => Err(format!("prediction must be 0 or 1, got {other}")),
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bit())
    }
}

/// Failure of a single prediction attempt.
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    /// The network exchange could not be completed at all.
    #[error("Connection refused. Ensure the classification service is running and accepts cross-origin requests.")]
    ConnectivityFailed(#[source] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("Server responded with {status}: {status_text}")]
    RequestFailed { status: u16, status_text: String },
    #[error("{0}")]
    UnexpectedFailure(String),
}

impl PredictionError {
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::ConnectivityFailed(_))
    }
}

/// Something that can turn a profile into a prediction.
pub trait Predictor: Send + Sync {
    fn predict(
        &self,
        profile: &CustomerProfile,
    ) -> impl Future<Output = Result<Prediction, PredictionError>> + Send;
}

/// The simulated and live predictors a controller dispatches between.
pub struct PredictionBackends<L = RemotePredictor> {
    simulated: SimulatedPredictor,
    live: L,
}

impl<L: Predictor> PredictionBackends<L> {
    pub fn new(simulated: SimulatedPredictor, live: L) -> Self {
        Self { simulated, live }
    }

    pub async fn predict(
        &self,
        mode: Mode,
        profile: &CustomerProfile,
    ) -> Result<Prediction, PredictionError> {
        match mode {
            Mode::Simulated => self.simulated.predict(profile).await,
            Mode::Live => self.live.predict(profile).await,
        }
    }
}

impl PredictionBackends<RemotePredictor> {
    /// Backends for the resolved endpoint and configured simulated latency.
    pub fn from_config(config: &crate::config::PredictorConfig) -> Self {
        Self::new(
            SimulatedPredictor::with_latency(config.simulated_latency),
            RemotePredictor::new(config.endpoint.clone()),
        )
    }

    pub fn endpoint(&self) -> &str {
        self.live.endpoint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_decodes_only_binary_values() {
        let positive: Prediction = serde_json::from_str("1").expect("1 decodes");
        assert_eq!(positive, Prediction::Positive);
        assert!(serde_json::from_str::<Prediction>("2").is_err());
        assert_eq!(
            serde_json::to_string(&Prediction::Negative).expect("encodes"),
            "0"
        );
    }

    #[test]
    fn request_failure_message_matches_status_line() {
        let error = PredictionError::RequestFailed {
            status: 500,
            status_text: "Internal Server Error".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Server responded with 500: Internal Server Error"
        );
        assert!(!error.is_connectivity());
    }

    #[test]
    fn mode_toggles_back_and_forth() {
        assert_eq!(Mode::default(), Mode::Simulated);
        assert_eq!(Mode::Simulated.toggled(), Mode::Live);
        assert_eq!(Mode::Live.toggled(), Mode::Simulated);
    }
}
