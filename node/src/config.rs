//! Service configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use kyc_types::ProtocolMetadata;

use crate::logging::LogFormat;
use crate::NodeError;

/// Storage backend for records and documents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Persistent LMDB environment under `data_dir`.
    #[default]
    Lmdb,
    /// In-process maps; everything is lost on exit.
    Memory,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lmdb" => Ok(Backend::Lmdb),
            "memory" => Ok(Backend::Memory),
            other => Err(format!("unknown backend {other:?} (expected lmdb or memory)")),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Backend::Lmdb => "lmdb",
            Backend::Memory => "memory",
        })
    }
}

/// Configuration for the gateway.
///
/// Can be loaded from a TOML file via [`ServiceConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Data directory for the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub backend: Backend,

    /// HTTP port. 0 binds a free port.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter, e.g. "info" or "debug,kyc_callback=trace".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// LMDB map size in bytes.
    #[serde(default = "default_lmdb_map_size")]
    pub lmdb_map_size: usize,

    /// Largest accepted HTTP request body in bytes. Uploaded files travel
    /// base64-encoded, so this must be a third above the largest document.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Required slugs that seed every new record.
    #[serde(default)]
    pub metadata: ProtocolMetadata,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./kyc_data")
}

fn default_rpc_port() -> u16 {
    3000
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_lmdb_map_size() -> usize {
    1024 * 1024 * 1024
}

fn default_max_upload_bytes() -> usize {
    kyc_rpc::DEFAULT_BODY_LIMIT
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ServiceConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| NodeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn log_format(&self) -> Result<LogFormat, NodeError> {
        self.log_format.parse().map_err(NodeError::Config)
    }

    /// Reject settings that would only fail later, at startup.
    pub fn validate(&self) -> Result<(), NodeError> {
        self.log_format()?;
        if self.backend == Backend::Lmdb && self.lmdb_map_size == 0 {
            return Err(NodeError::Config("lmdb_map_size must be positive".into()));
        }
        if self.max_upload_bytes == 0 {
            return Err(NodeError::Config("max_upload_bytes must be positive".into()));
        }
        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backend: Backend::default(),
            rpc_port: default_rpc_port(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            lmdb_map_size: default_lmdb_map_size(),
            max_upload_bytes: default_max_upload_bytes(),
            metadata: ProtocolMetadata::default(),
        }
    }
}
