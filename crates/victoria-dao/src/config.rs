use serde::{Deserialize, Serialize};

use crate::error::{DaoError, DaoResult};

/// Configuration for a [`Dao`](crate::Dao).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaoConfig {
    /// Buffered watcher failures per subscriber before the oldest are dropped.
    pub watcher_failure_capacity: usize,
    /// TTL applied to list proxy documents. `0` means no expiry.
    pub list_document_ttl: u32,
}

impl Default for DaoConfig {
    fn default() -> Self {
        Self {
            watcher_failure_capacity: 64,
            list_document_ttl: 0,
        }
    }
}

impl DaoConfig {
    /// Parse a TOML fragment. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> DaoResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| DaoError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the DAO cannot run with.
    pub fn validate(&self) -> DaoResult<()> {
        if self.watcher_failure_capacity == 0 {
            return Err(DaoError::Config(
                "watcher_failure_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
