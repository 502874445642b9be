//! Customer response prediction: profile model, form layout, predictors, and
//! the controller that ties them together.

pub mod controller;
pub mod form;
pub mod import;
pub mod mock;
pub mod predictor;
pub mod profile;
pub mod remote;

pub use controller::{
    ConnectionGuide, PredictionController, PredictionOutcome, Submission, SubmissionResult,
};
pub use form::{
    form_layout, parse_assignment, validate_input, FieldError, FieldKind, FieldSpec,
    FieldValueError, FormSection, SectionLayout,
};
pub use import::{ImportedProfile, ProfileImportError, ProfileImporter};
pub use mock::{mock_predict, SimulatedPredictor, SIMULATED_LATENCY};
pub use predictor::{Mode, Prediction, PredictionBackends, PredictionError, Predictor};
pub use profile::{CustomerProfile, ProfileField, UnknownField};
pub use remote::RemotePredictor;
