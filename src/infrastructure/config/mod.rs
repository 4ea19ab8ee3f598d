use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::domain::error::Result;

pub const CONFIG_FILE: &str = "csvbridge.toml";
pub const ENV_PREFIX: &str = "CSVBRIDGE_";

/// Server settings: defaults, then `csvbridge.toml`, then `CSVBRIDGE_*` env vars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Created at startup; the endpoints process uploads in memory.
    pub upload_dir: PathBuf,

    /// Upper bound on the total bytes of file parts in one request
    pub max_upload_bytes: usize,

    /// Return raw failure text in 500 bodies instead of a generic message
    pub expose_error_details: bool,

    /// `EnvFilter` directive, overridden by `RUST_LOG`
    pub log_filter: String,

    #[serde(default)]
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 64 * 1024 * 1024,
            expose_error_details: false,
            log_filter: "info".to_string(),
            workers: None,
        }
    }
}

pub struct ConfigService;

impl ConfigService {
    /// Load from the working directory, reading `.env` first if present
    pub fn load() -> Result<ServerConfig> {
        let _ = dotenvy::dotenv();
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<ServerConfig> {
        let config = Self::figment(path).extract::<ServerConfig>()?;
        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(ServerConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}
