use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;

use docfmt::{app, Config, Metrics, Server};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let metrics = Metrics::new();
    match Server::bind(config.addr()).serve(app(metrics)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(port = config.port, "server failed: {e}");
            ExitCode::FAILURE
        }
    }
}
