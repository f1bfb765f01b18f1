mod cli;
mod infra;
mod render;
mod routes;
mod seed;
mod server;

use distribution_hub::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
