//! ParkPro - guest parking planner
//!
//! Suggests and books visitor parking slots for apartment stays, against a
//! local SQLite booking log or one shared over the network.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod backend;
mod cli;
mod commands;
mod state;

/// Filter used when neither `RUST_LOG` nor the settings name one
const DEFAULT_LOG_FILTER: &str = "info";

fn init_logging(configured: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured.unwrap_or(DEFAULT_LOG_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match cli::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("parkpro: {}\n\n{}", e, cli::USAGE);
            std::process::exit(2);
        }
    };

    let app_state = match state::AppState::new() {
        Ok(state) => state,
        Err(e) => {
            eprintln!("parkpro: failed to initialize: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(app_state.settings.log_filter.as_deref());
    tracing::debug!(command = ?command, "Starting ParkPro");

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    let mut stdout = std::io::stdout();
    if let Err(e) = runtime.block_on(commands::run(command, &app_state, &mut stdout)) {
        tracing::debug!(error = ?e, "Command failed");
        eprintln!("parkpro: {}", e);
        std::process::exit(1);
    }
}
