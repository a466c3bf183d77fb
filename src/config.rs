//! Server configuration.
//!
//! Settings come from an optional YAML file named by `TRICKLE_CONFIG`, and
//! the `LISTEN` environment variable overrides the listen address on top.
//!
//! ```yaml
//! server:
//!   listen_addr: "0.0.0.0:8080"
//!   read_buffer_size: 1
//!   read_timeout_ms: 5000
//!   concurrent: false
//! limits:
//!   max_line_length: 8192
//!   max_body_length: 1048576
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::http::parser::ParserLimits;

/// Environment variable holding the path of the YAML config file.
pub const CONFIG_ENV: &str = "TRICKLE_CONFIG";
/// Environment variable overriding `server.listen_addr`.
pub const LISTEN_ENV: &str = "LISTEN";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub limits: ParserLimits,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the listener binds to
    pub listen_addr: String,
    /// Bytes requested from the socket per read; 1 reads byte-by-byte
    pub read_buffer_size: usize,
    /// Give up on a peer that sends nothing for this long
    pub read_timeout_ms: Option<u64>,
    /// Serve connections on separate tasks instead of one at a time
    pub concurrent: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            read_buffer_size: 1024,
            read_timeout_ms: None,
            concurrent: false,
        }
    }
}

impl Config {
    /// Loads configuration from the environment.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_ENV).ok();
        let listen = std::env::var(LISTEN_ENV).ok();
        Self::resolve(path.as_deref().map(Path::new), listen)
    }

    /// Builds a config from an optional file and an optional listen override.
    pub fn resolve(path: Option<&Path>, listen_override: Option<String>) -> Result<Self> {
        let mut cfg = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(addr) = listen_override {
            cfg.server.listen_addr = addr;
        }

        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg: Config = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.server.read_buffer_size == 0 {
            anyhow::bail!("server.read_buffer_size must be at least 1");
        }
        if self.limits.max_line_length == 0 {
            anyhow::bail!("limits.max_line_length must be at least 1");
        }
        Ok(())
    }
}
