use crate::console::{run_batch, run_predict, show_fields, BatchArgs, PredictArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use response_ai::config::AppConfig;
use response_ai::error::AppError;
use response_ai::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "ResponseAI",
    about = "Score customer profiles for campaign response, simulated or against the live model",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP session API (default command)
    Serve(ServeArgs),
    /// Score one profile built from the defaults plus overrides
    Predict(PredictArgs),
    /// Score every row of a customer export
    Batch(BatchArgs),
    /// List the form sections and fields with their defaults
    Fields,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match command {
        Command::Serve(args) => server::run(config, args).await,
        Command::Predict(args) => run_predict(&config, args).await,
        Command::Batch(args) => run_batch(&config, args).await,
        Command::Fields => {
            show_fields();
            Ok(())
        }
    }
}
