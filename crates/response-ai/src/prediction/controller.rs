use serde::Serialize;

use super::predictor::{Mode, Prediction, PredictionBackends, PredictionError, Predictor};
use super::profile::{CustomerProfile, ProfileField};

/// What the presentation layer should show for the current profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PredictionOutcome {
    NoResult,
    Pending,
    Succeeded { prediction: Prediction },
    Failed { message: String, connectivity: bool },
}

impl PredictionOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }

    fn from_result(result: &Result<Prediction, PredictionError>) -> Self {
        match result {
            Ok(prediction) => Self::Succeeded {
                prediction: *prediction,
            },
            Err(error) => Self::Failed {
                message: error.to_string(),
                connectivity: error.is_connectivity(),
            },
        }
    }
}

/// Remediation hints shown when the live service could not be reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionGuide {
    pub endpoint: String,
    pub summary: &'static str,
    pub steps: &'static [&'static str],
    pub cors_snippet: &'static str,
}

const GUIDE_SUMMARY: &str = "The request never reached the classification service. This is usually \
missing CORS configuration or the server being offline.";

const GUIDE_STEPS: &[&str] = &[
    "Start the classification service and confirm it listens on the endpoint above",
    "Allow cross-origin requests from this console",
    "Switch back to simulation mode to keep working without a backend",
];

const CORS_SNIPPET: &str = r#"from fastapi.middleware.cors import CORSMiddleware

app.add_middleware(
    CORSMiddleware,
    allow_origins=["*"],
    allow_credentials=True,
    allow_methods=["*"],
    allow_headers=["*"],
)"#;

/// A prediction request captured at submission time.
///
/// Running it needs no access to the controller, so a host holding the
/// controller behind a lock can release the lock while it is in flight.
#[derive(Debug, Clone)]
pub struct Submission {
    generation: u64,
    mode: Mode,
    profile: CustomerProfile,
}

impl Submission {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn profile(&self) -> &CustomerProfile {
        &self.profile
    }

    pub async fn run<L: Predictor>(self, backends: &PredictionBackends<L>) -> SubmissionResult {
        let result = backends.predict(self.mode, &self.profile).await;
        SubmissionResult {
            generation: self.generation,
            result,
        }
    }
}

/// Outcome of a [`Submission`], tagged with the generation it was started in.
#[derive(Debug)]
pub struct SubmissionResult {
    generation: u64,
    result: Result<Prediction, PredictionError>,
}

/// Owns the profile being edited, the scoring mode, and the displayed outcome.
#[derive(Debug, Clone)]
pub struct PredictionController {
    profile: CustomerProfile,
    mode: Mode,
    outcome: PredictionOutcome,
    endpoint: String,
    generation: u64,
}

impl PredictionController {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_mode(endpoint, Mode::default())
    }

    pub fn with_mode(endpoint: impl Into<String>, mode: Mode) -> Self {
        Self {
            profile: CustomerProfile::default(),
            mode,
            outcome: PredictionOutcome::NoResult,
            endpoint: endpoint.into(),
            generation: 0,
        }
    }

    pub fn profile(&self) -> &CustomerProfile {
        &self.profile
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn outcome(&self) -> &PredictionOutcome {
        &self.outcome
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Set one field; any shown or in-flight result is dropped.
    pub fn update_field(&mut self, field: ProfileField, value: f64) {
        self.profile.set(field, value);
        if self.outcome != PredictionOutcome::NoResult {
            tracing::debug!(%field, "profile edited, clearing outcome");
            self.invalidate();
        }
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
        tracing::info!(mode = self.mode.label(), "prediction mode toggled");
        self.invalidate();
    }

    pub fn reset_profile(&mut self) {
        self.profile = CustomerProfile::default();
        self.invalidate();
    }

    /// Mark the outcome pending and capture the request, or `None` if a
    /// submission is already in flight.
    pub fn begin_submission(&mut self) -> Option<Submission> {
        if self.outcome == PredictionOutcome::Pending {
            tracing::debug!("submission already pending, ignoring");
            return None;
        }

        self.generation += 1;
        self.outcome = PredictionOutcome::Pending;
        tracing::info!(
            generation = self.generation,
            mode = self.mode.label(),
            "prediction submitted"
        );

        Some(Submission {
            generation: self.generation,
            mode: self.mode,
            profile: self.profile.clone(),
        })
    }

    /// Apply a finished submission. Results from a superseded generation are
    /// discarded and `false` is returned.
    pub fn complete_submission(&mut self, finished: &SubmissionResult) -> bool {
        if finished.generation != self.generation || self.outcome != PredictionOutcome::Pending {
            tracing::debug!(
                finished = finished.generation,
                current = self.generation,
                "discarding stale prediction result"
            );
            return false;
        }

        self.outcome = PredictionOutcome::from_result(&finished.result);
        match &self.outcome {
            PredictionOutcome::Succeeded { prediction } => {
                tracing::info!(prediction = prediction.bit(), "prediction succeeded");
            }
            PredictionOutcome::Failed {
                message,
                connectivity,
            } => {
                tracing::warn!(%message, connectivity, "prediction failed");
            }
            _ => {}
        }
        true
    }

    /// Submit the current profile and wait for the outcome.
    pub async fn submit<L: Predictor>(
        &mut self,
        backends: &PredictionBackends<L>,
    ) -> &PredictionOutcome {
        if let Some(submission) = self.begin_submission() {
            let finished = submission.run(backends).await;
            self.complete_submission(&finished);
        }
        &self.outcome
    }

    /// Remediation hints, present only for a live connectivity failure.
    pub fn connection_guide(&self) -> Option<ConnectionGuide> {
        match (&self.outcome, self.mode) {
            (
                PredictionOutcome::Failed {
                    connectivity: true, ..
                },
                Mode::Live,
            ) => Some(ConnectionGuide {
                endpoint: self.endpoint.clone(),
                summary: GUIDE_SUMMARY,
                steps: GUIDE_STEPS,
                cors_snippet: CORS_SNIPPET,
            }),
            _ => None,
        }
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        self.outcome = PredictionOutcome::NoResult;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::mock::SimulatedPredictor;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Live predictor that replays scripted results.
    struct ScriptedPredictor {
        results: Mutex<Vec<Result<Prediction, PredictionError>>>,
    }

    impl ScriptedPredictor {
        fn new(results: Vec<Result<Prediction, PredictionError>>) -> Self {
            Self {
                results: Mutex::new(results),
            }
        }
    }

    impl Predictor for ScriptedPredictor {
        async fn predict(
            &self,
            _profile: &CustomerProfile,
        ) -> Result<Prediction, PredictionError> {
            self.results
                .lock()
                .expect("script mutex poisoned")
                .remove(0)
        }
    }

    fn backends(
        live: Vec<Result<Prediction, PredictionError>>,
    ) -> PredictionBackends<ScriptedPredictor> {
        PredictionBackends::new(
            SimulatedPredictor::with_latency(Duration::ZERO),
            ScriptedPredictor::new(live),
        )
    }

    fn controller() -> PredictionController {
        PredictionController::new("http://127.0.0.1:8000/predict")
    }

    #[tokio::test]
    async fn simulated_submission_scores_default_profile_negative() {
        let backends = backends(Vec::new());
        let mut controller = controller();

        let outcome = controller.submit(&backends).await;

        assert_eq!(
            *outcome,
            PredictionOutcome::Succeeded {
                prediction: Prediction::Negative
            }
        );
    }

    #[tokio::test]
    async fn edited_income_flips_simulated_result() {
        let backends = backends(Vec::new());
        let mut controller = controller();
        controller.submit(&backends).await;

        controller.update_field(ProfileField::Income, 75_000.0);
        assert_eq!(*controller.outcome(), PredictionOutcome::NoResult);

        let outcome = controller.submit(&backends).await;
        assert_eq!(
            *outcome,
            PredictionOutcome::Succeeded {
                prediction: Prediction::Positive
            }
        );
    }

    #[tokio::test]
    async fn toggle_clears_outcome_from_any_state() {
        let backends = backends(vec![Err(PredictionError::RequestFailed {
            status: 503,
            status_text: "Service Unavailable".to_string(),
        })]);
        let mut controller = controller();

        controller.toggle_mode();
        assert_eq!(controller.mode(), Mode::Live);
        assert_eq!(*controller.outcome(), PredictionOutcome::NoResult);

        controller.submit(&backends).await;
        assert!(controller.outcome().is_resolved());
        controller.toggle_mode();
        assert_eq!(*controller.outcome(), PredictionOutcome::NoResult);

        controller.begin_submission().expect("idle controller accepts submission");
        controller.toggle_mode();
        assert_eq!(*controller.outcome(), PredictionOutcome::NoResult);
    }

    #[tokio::test]
    async fn live_success_reports_service_prediction() {
        let backends = backends(vec![Ok(Prediction::Positive)]);
        let mut controller = PredictionController::with_mode("http://svc/predict", Mode::Live);

        let outcome = controller.submit(&backends).await;

        assert_eq!(
            *outcome,
            PredictionOutcome::Succeeded {
                prediction: Prediction::Positive
            }
        );
        assert!(controller.connection_guide().is_none());
    }

    #[tokio::test]
    async fn server_error_fails_without_connection_guide() {
        let backends = backends(vec![Err(PredictionError::RequestFailed {
            status: 500,
            status_text: "Internal Server Error".to_string(),
        })]);
        let mut controller = PredictionController::with_mode("http://svc/predict", Mode::Live);

        controller.submit(&backends).await;

        assert_eq!(
            *controller.outcome(),
            PredictionOutcome::Failed {
                message: "Server responded with 500: Internal Server Error".to_string(),
                connectivity: false,
            }
        );
        assert!(controller.connection_guide().is_none());
    }

    #[tokio::test]
    async fn failure_is_cleared_by_editing() {
        let backends = backends(vec![Err(PredictionError::UnexpectedFailure(
            "boom".to_string(),
        ))]);
        let mut controller = PredictionController::with_mode("http://svc/predict", Mode::Live);
        controller.submit(&backends).await;
        assert!(matches!(
            controller.outcome(),
            PredictionOutcome::Failed {
                connectivity: false,
                ..
            }
        ));

        controller.update_field(ProfileField::Recency, 12.0);
        assert_eq!(*controller.outcome(), PredictionOutcome::NoResult);
        assert_eq!(controller.profile().recency, 12);
    }

    #[test]
    fn second_submission_while_pending_is_ignored() {
        let mut controller = controller();
        assert!(controller.begin_submission().is_some());
        assert!(controller.begin_submission().is_none());
        assert_eq!(*controller.outcome(), PredictionOutcome::Pending);
    }

    #[tokio::test]
    async fn result_from_before_an_edit_is_discarded() {
        let backends = backends(Vec::new());
        let mut controller = controller();

        let stale = controller
            .begin_submission()
            .expect("idle controller accepts submission");
        controller.update_field(ProfileField::Income, 90_000.0);
        assert_eq!(*controller.outcome(), PredictionOutcome::NoResult);

        let fresh = controller
            .begin_submission()
            .expect("edit released the pending guard");
        let fresh_result = fresh.run(&backends).await;
        let stale_result = stale.run(&backends).await;

        assert!(controller.complete_submission(&fresh_result));
        assert!(!controller.complete_submission(&stale_result));
        assert_eq!(
            *controller.outcome(),
            PredictionOutcome::Succeeded {
                prediction: Prediction::Positive
            }
        );
    }

    #[tokio::test]
    async fn submission_snapshots_profile_and_mode() {
        let mut controller = controller();
        let submission = controller
            .begin_submission()
            .expect("idle controller accepts submission");
        controller.toggle_mode();
        controller.update_field(ProfileField::KidHome, 2.0);

        assert_eq!(submission.mode(), Mode::Simulated);
        assert_eq!(submission.profile().kid_home, 0);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut controller = controller();
        controller.update_field(ProfileField::MntGoldProds, 900.0);
        controller.reset_profile();
        assert_eq!(*controller.profile(), CustomerProfile::default());
        assert_eq!(*controller.outcome(), PredictionOutcome::NoResult);
    }
}
