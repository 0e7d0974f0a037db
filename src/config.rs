//! Index configuration.

use crate::error::{IndexError, Result};
use serde::{Deserialize, Serialize};

/// Upper bound on the number of shards.
pub const MAX_SHARDS: usize = 4096;

/// Index configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Number of independently locked partitions. Ids on different shards
    /// never contend with each other.
    pub shard_count: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { shard_count: 16 }
    }
}

impl IndexConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: IndexConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.shard_count == 0 {
            return Err(IndexError::InvalidConfig(
                "shard_count must be at least 1".into(),
            ));
        }
        if self.shard_count > MAX_SHARDS {
            return Err(IndexError::InvalidConfig(format!(
                "shard_count {} exceeds maximum of {}",
                self.shard_count, MAX_SHARDS
            )));
        }
        Ok(())
    }
}
