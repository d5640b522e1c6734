//! Server configuration from `IDV_*` environment variables, optionally
//! preloaded from a `KEY=VALUE` file named by `IDV_CONFIG_PATH`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

use idv_db::DbConfig;
use idv_verify::VerifyConfig;
use thiserror::Error;

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3001,http://127.0.0.1:3001";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to read config file at {0}")]
    FileRead(String),

    #[error("invalid config line {line} (expected KEY=VALUE)")]
    FileParse { line: usize },

    #[error("{key} {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Browser origins allowed by CORS.
    pub cors_origins: Vec<String>,
    pub db: DbConfig,
    pub verify: VerifyConfig,
}

impl ServerConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let mut merged = HashMap::new();

        if let Ok(path) = std::env::var("IDV_CONFIG_PATH") {
            let path = path.trim();
            if !path.is_empty() {
                merged.extend(parse_env_file(path)?);
            }
        }

        // Process environment wins over the file.
        merged.extend(std::env::vars());

        Self::from_kv(&merged)
    }

    pub fn from_kv(kv: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let db_defaults = DbConfig::default();
        let verify_defaults = VerifyConfig::default();

        let bind_addr = match non_empty(kv, "IDV_BIND_ADDR") {
            None => SocketAddr::from(([0, 0, 0, 0], 8000)),
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                key: "IDV_BIND_ADDR",
                message: "must be a valid host:port socket address".into(),
            })?,
        };

        let cors_origins = non_empty(kv, "IDV_CORS_ORIGINS")
            .unwrap_or(DEFAULT_CORS_ORIGINS)
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        let max_connections = match non_empty(kv, "IDV_DB_MAX_CONNECTIONS") {
            None => db_defaults.max_connections,
            Some(v) => match v.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "IDV_DB_MAX_CONNECTIONS",
                        message: "must be a positive integer".into(),
                    });
                }
            },
        };

        let db = DbConfig {
            url: string_or(kv, "IDV_DB_URL", db_defaults.url),
            namespace: string_or(kv, "IDV_DB_NAMESPACE", db_defaults.namespace),
            database: string_or(kv, "IDV_DB_DATABASE", db_defaults.database),
            username: string_or(kv, "IDV_DB_USERNAME", db_defaults.username),
            password: string_or(kv, "IDV_DB_PASSWORD", db_defaults.password),
            max_connections,
        };

        let verify = VerifyConfig {
            storage_dir: non_empty(kv, "IDV_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(verify_defaults.storage_dir),
            ingest_vendor: string_or(kv, "IDV_INGEST_VENDOR", verify_defaults.ingest_vendor),
        };

        Ok(Self {
            bind_addr,
            cors_origins,
            db,
            verify,
        })
    }
}

fn parse_env_file(path: &str) -> Result<HashMap<String, String>, ConfigError> {
    let contents =
        std::fs::read_to_string(path).map_err(|_| ConfigError::FileRead(path.to_string()))?;

    let mut kv = HashMap::new();
    for (idx, raw_line) in contents.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = line
            .split_once('=')
            .ok_or(ConfigError::FileParse { line: idx + 1 })?;
        kv.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(kv)
}

fn non_empty<'a>(kv: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    kv.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn string_or(kv: &HashMap<String, String>, key: &str, default: String) -> String {
    non_empty(kv, key).map(str::to_string).unwrap_or(default)
}
