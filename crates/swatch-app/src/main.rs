use clap::Parser;
use std::process::ExitCode;

use swatch_app::cli::{self, Cli};
use swatch_app::telemetry::{self, LogConfig};

#[tokio::main]
async fn main() -> ExitCode {
    // .env may set RUST_LOG
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    telemetry::init(
        &LogConfig::default()
            .with_level(cli.log_level.clone())
            .with_directive("sqlx=warn"),
    );
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    match cli::run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
