use std::process::ExitCode;
use std::sync::Arc;

use cluster_api_state_metrics::config::{load_config, print_schema};
use cluster_api_state_metrics::startup::run;
use cluster_api_state_metrics::utils::logger::init_logging;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    if std::env::args().any(|arg| arg == "--print-schema") {
        return match print_schema() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error printing configuration schema: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    info!(
        event_name = "startup.begin",
        event_domain = "startup",
        version = env!("CARGO_PKG_VERSION"),
        "Starting cluster-api-state-metrics"
    );

    match run(Arc::new(config)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(
                event_name = "startup.failed",
                event_domain = "startup",
                "{}",
                e
            );
            ExitCode::FAILURE
        }
    }
}
