//! Process configuration, parsed once at startup.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Default slot file read by the backup worker.
pub const DEFAULT_SLOT_PATH: &str = "/backup/backup_request.json";

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "backup-hook")]
#[command(version)]
#[command(about = "Records a pending backup request on every push webhook", long_about = None)]
pub struct Config {
    /// Address the webhook server listens on
    ///
    /// Can also be set via BACKUP_HOOK_BIND environment variable
    #[arg(long, env = "BACKUP_HOOK_BIND", default_value = "0.0.0.0:9000")]
    pub bind: SocketAddr,

    /// File holding the pending backup request
    ///
    /// Its parent directory is created at startup.
    /// Can also be set via BACKUP_REQUEST_FILE environment variable
    #[arg(long, env = "BACKUP_REQUEST_FILE", default_value = DEFAULT_SLOT_PATH)]
    pub slot_path: PathBuf,

    /// Also append logs to this file (e.g. /app/webhook.log)
    ///
    /// Console logging is always on.
    /// Can also be set via BACKUP_HOOK_LOG_FILE environment variable
    #[arg(long, env = "BACKUP_HOOK_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}
