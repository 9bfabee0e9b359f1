//! Engine configuration
//!
//! All tuning lives in one explicit config object handed to constructors.
//! There is no global state and no environment sniffing; a config either
//! comes from a deserialized file or from `Default`.

use std::path::PathBuf;

use serde::Deserialize;

/// Connection pool tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    /// Hard ceiling on open connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Idle connections older than this are closed on checkout.
    #[serde(default = "default_max_idle_secs")]
    pub max_idle_secs: u64,
    /// How long `acquire` may block at the ceiling. `None` fails fast.
    #[serde(default)]
    pub acquire_timeout_ms: Option<u64>,
}

fn default_max_connections() -> usize {
    8
}

fn default_max_idle_secs() -> u64 {
    300
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            max_idle_secs: default_max_idle_secs(),
            acquire_timeout_ms: None,
        }
    }
}

/// Result cache tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// TTL applied when the caller does not pass one.
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,
}

fn default_ttl_secs() -> u64 {
    3600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: default_ttl_secs(),
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    /// Directory for snapshot history and the file cache.
    #[serde(default)]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}
