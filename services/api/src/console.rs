use clap::Args;
use response_ai::config::AppConfig;
use response_ai::error::AppError;
use response_ai::prediction::{
    form_layout, parse_assignment, CustomerProfile, ImportedProfile, Mode, Prediction,
    PredictionBackends, PredictionController, PredictionOutcome, ProfileField, ProfileImporter,
    RemotePredictor, SimulatedPredictor,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldOverride {
    field: ProfileField,
    value: f64,
}

fn parse_override(raw: &str) -> Result<FieldOverride, String> {
    parse_assignment(raw).map(|(field, value)| FieldOverride { field, value })
}

fn parse_delimiter(raw: &str) -> Result<u8, String> {
    match raw {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        other if other.len() == 1 && other.is_ascii() => Ok(other.as_bytes()[0]),
        other => Err(format!("delimiter must be a single ASCII character or 'tab', got '{other}'")),
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct PredictArgs {
    /// Score against the live classification service instead of the simulation
    #[arg(long)]
    pub(crate) live: bool,
    /// Override a profile field, e.g. --set Income=75000 (repeatable)
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_override)]
    pub(crate) overrides: Vec<FieldOverride>,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// Customer export with model column names in the header row
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Column delimiter ("tab" for tab-separated exports)
    #[arg(long, default_value = ",", value_parser = parse_delimiter)]
    pub(crate) delimiter: u8,
    /// Score against the live classification service instead of the heuristic
    #[arg(long)]
    pub(crate) live: bool,
}

pub(crate) async fn run_predict(config: &AppConfig, args: PredictArgs) -> Result<(), AppError> {
    let backends = PredictionBackends::from_config(&config.predictor);
    let mode = if args.live {
        Mode::Live
    } else {
        Mode::Simulated
    };
    let mut controller = PredictionController::with_mode(backends.endpoint(), mode);
    for FieldOverride { field, value } in args.overrides {
        controller.update_field(field, value);
    }

    controller.submit(&backends).await;
    render_session(&controller);
    Ok(())
}

pub(crate) async fn run_batch(config: &AppConfig, args: BatchArgs) -> Result<(), AppError> {
    let BatchArgs {
        csv,
        delimiter,
        live,
    } = args;

    let rows = ProfileImporter::with_delimiter(delimiter).import_path(&csv)?;
    let backends = PredictionBackends::new(
        SimulatedPredictor::with_latency(Duration::ZERO),
        RemotePredictor::new(config.predictor.endpoint.clone()),
    );
    let mode = if live { Mode::Live } else { Mode::Simulated };

    println!("Batch scoring {} ({} rows, {} mode)", csv.display(), rows.len(), mode.label());
    let mut tally = BatchTally::default();
    for row in &rows {
        let result = backends.predict(mode, &row.profile).await;
        match &result {
            Ok(prediction) => println!(
                "- row {} | {} | prediction {}{}",
                row.row,
                row.customer_id.as_deref().unwrap_or("-"),
                prediction,
                observed_note(row)
            ),
            Err(err) => println!(
                "- row {} | {} | failed: {}",
                row.row,
                row.customer_id.as_deref().unwrap_or("-"),
                err
            ),
        }
        tally.record(row, result.ok());
    }

    tally.render();
    Ok(())
}

pub(crate) fn show_fields() {
    let defaults = CustomerProfile::default();
    for section in form_layout() {
        println!("{}", section.title);
        for spec in &section.fields {
            let bounds = match (spec.min, spec.max) {
                (Some(min), Some(max)) => format!(" [{min}..={max}]"),
                (Some(min), None) => format!(" [>= {min}]"),
                _ => String::new(),
            };
            println!(
                "- {} ({}): {:?}{}, default {}",
                spec.field,
                spec.label,
                spec.kind,
                bounds,
                defaults.get(spec.field)
            );
        }
        println!();
    }
}

fn observed_note(row: &ImportedProfile) -> String {
    match row.observed {
        Some(observed) => format!(" (observed {observed})"),
        None => String::new(),
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct BatchTally {
    scored: usize,
    positive: usize,
    failed: usize,
    labelled: usize,
    agreed: usize,
}

impl BatchTally {
    fn record(&mut self, row: &ImportedProfile, prediction: Option<Prediction>) {
        let Some(prediction) = prediction else {
            self.failed += 1;
            return;
        };

        self.scored += 1;
        if prediction == Prediction::Positive {
            self.positive += 1;
        }
        if let Some(observed) = row.observed {
            self.labelled += 1;
            if observed == prediction {
                self.agreed += 1;
            }
        }
    }

    fn agreement(&self) -> Option<f64> {
        if self.labelled == 0 {
            None
        } else {
            Some(self.agreed as f64 / self.labelled as f64)
        }
    }

    fn render(&self) {
        println!(
            "\nScored {} | positive {} | failed {}",
            self.scored, self.positive, self.failed
        );
        if let Some(rate) = self.agreement() {
            println!(
                "Agreement with observed responses: {}/{} ({:.1}%)",
                self.agreed,
                self.labelled,
                rate * 100.0
            );
        }
    }
}

fn render_session(controller: &PredictionController) {
    println!(
        "Mode: {} | Backend URL: {}",
        controller.mode().label(),
        controller.endpoint()
    );

    match controller.outcome() {
        PredictionOutcome::Succeeded { prediction } => {
            println!("{}", prediction.label());
            println!("Model Prediction: {}", prediction);
            println!("Prediction based on {} variable inputs.", ProfileField::COUNT);
        }
        PredictionOutcome::Failed { message, .. } => {
            println!("Analysis Failed");
            println!("  {}", message);
        }
        PredictionOutcome::Pending | PredictionOutcome::NoResult => {
            println!("No prediction available");
        }
    }

    if let Some(guide) = controller.connection_guide() {
        println!("\nConnection Issue Detected");
        println!("{}", guide.summary);
        println!("Endpoint: {}", guide.endpoint);
        for step in guide.steps {
            println!("- {}", step);
        }
        println!("\n{}", guide.cors_snippet);
    }
}
