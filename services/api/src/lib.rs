mod cli;
mod console;
mod infra;
mod routes;
mod server;

use response_ai::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
