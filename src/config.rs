//! Runtime configuration.
//!
//! Values come from an optional YAML file followed by environment overrides.

use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

use crate::http::parser::ParserLimits;

const CONFIG_ENV: &str = "REQECHO_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "reqecho.yaml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub parser: ParserConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Size of the scratch buffer used for each socket read.
    pub read_buffer_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub max_line_length: usize,
    pub max_content_length: usize,
    pub max_headers: usize,
    /// Answer malformed requests with `400 Bad Request` before closing
    /// instead of dropping the connection silently.
    pub reject_with_bad_request: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            read_buffer_size: 1024,
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        let limits = ParserLimits::default();
        Self {
            max_line_length: limits.max_line_length,
            max_content_length: limits.max_content_length,
            max_headers: limits.max_headers,
            reject_with_bad_request: false,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl Config {
    /// Loads the YAML file named by `REQECHO_CONFIG` (or `reqecho.yaml` when it
    /// exists), then applies the `LISTEN` override.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(DEFAULT_CONFIG_PATH)?
            }
            Err(_) => Self::default(),
        };

        if let Ok(addr) = std::env::var("LISTEN") {
            cfg.server.listen_addr = addr;
        }

        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_yaml_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Maximum tracing level, falling back to `INFO` on an unknown name.
    pub fn log_level(&self) -> tracing::Level {
        self.log.level.parse().unwrap_or(tracing::Level::INFO)
    }
}

impl ParserConfig {
    pub fn limits(&self) -> ParserLimits {
        ParserLimits {
            max_line_length: self.max_line_length,
            max_content_length: self.max_content_length,
            max_headers: self.max_headers,
        }
    }
}
