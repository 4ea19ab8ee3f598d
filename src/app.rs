use std::io;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::infrastructure::config::ConfigService;
use crate::infrastructure::storage::ensure_upload_dir;
use crate::interfaces::http::start_server;

pub async fn run() -> io::Result<()> {
    let config = ConfigService::load()
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err.to_string()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str()));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let upload_dir = ensure_upload_dir(&config.upload_dir).map_err(|err| {
        error!(
            error = %err,
            upload_dir = %config.upload_dir.display(),
            "Failed to create upload dir"
        );
        err
    })?;

    info!(
        host = %config.host,
        port = config.port,
        upload_dir = %upload_dir.display(),
        max_upload_bytes = config.max_upload_bytes,
        "Starting HTTP server"
    );

    start_server(&config)?.await
}
