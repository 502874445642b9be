use metrics_exporter_prometheus::PrometheusHandle;
use response_ai::prediction::{
    ConnectionGuide, CustomerProfile, Mode, PredictionBackends, PredictionController,
    PredictionOutcome,
};
use serde::Serialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// The one prediction session served over HTTP.
#[derive(Clone)]
pub(crate) struct SessionState {
    controller: Arc<Mutex<PredictionController>>,
    backends: Arc<PredictionBackends>,
}

/// Everything a page needs to render the form and its result panel.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SessionView {
    pub(crate) mode: Mode,
    pub(crate) endpoint: String,
    pub(crate) profile: CustomerProfile,
    pub(crate) outcome: PredictionOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) connection_guide: Option<ConnectionGuide>,
}

impl SessionView {
    pub(crate) fn of(controller: &PredictionController) -> Self {
        Self {
            mode: controller.mode(),
            endpoint: controller.endpoint().to_string(),
            profile: controller.profile().clone(),
            outcome: controller.outcome().clone(),
            connection_guide: controller.connection_guide(),
        }
    }
}

impl SessionState {
    pub(crate) fn new(controller: PredictionController, backends: PredictionBackends) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            backends: Arc::new(backends),
        }
    }

    pub(crate) async fn view(&self) -> SessionView {
        SessionView::of(&*self.controller.lock().await)
    }

    /// Apply a change to the controller and return the resulting view.
    pub(crate) async fn update<F>(&self, change: F) -> SessionView
    where
        F: FnOnce(&mut PredictionController),
    {
        let mut controller = self.controller.lock().await;
        change(&mut controller);
        SessionView::of(&controller)
    }

    /// Run one submission without holding the lock while it is in flight.
    pub(crate) async fn submit(&self) -> SessionView {
        let submission = self.controller.lock().await.begin_submission();
        if let Some(submission) = submission {
            let finished = submission.run(&self.backends).await;
            self.controller.lock().await.complete_submission(&finished);
        }
        self.view().await
    }
}
