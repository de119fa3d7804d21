use std::process::ExitCode;

use backup_hook::config::Config;
use backup_hook::{logging, server};
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    // Held until exit so buffered file output is flushed.
    let _log_guard = match logging::init(config.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("backup-hook: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        slot = %config.slot_path.display(),
        bind = %config.bind,
        "Webhook receiver starting"
    );

    match server::serve(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Webhook receiver failed");
            ExitCode::FAILURE
        }
    }
}
