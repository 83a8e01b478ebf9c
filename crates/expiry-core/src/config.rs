//! ExpiryConfig - 設定
//!
//! すべての項目にデフォルト値がある。JSON で上書きできる。

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{CategoryPolicy, HookName, TimestampParser};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config json")]
    Parse(#[from] serde_json::Error),

    #[error("utc_offset_seconds={0} is outside ±24h")]
    InvalidOffset(i32),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("tick_interval_ms must be positive")]
    ZeroTick,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExpiryConfig {
    /// Metadata key, and name of the form field, holding the expiry.
    pub meta_key: String,
    /// Hook the deferred expiry events are delivered to.
    pub hook_name: String,
    pub expired_category: String,
    /// Site offset naive form dates are read in.
    pub utc_offset_seconds: i32,
    pub category_policy: CategoryPolicy,
    /// Serialize work on the same item.
    pub item_locks: bool,
    pub tick_interval_ms: u64,
}

impl Default for ExpiryConfig {
    fn default() -> Self {
        Self {
            meta_key: "_post_expiry_date".to_string(),
            hook_name: "post_expiry".to_string(),
            expired_category: "expired".to_string(),
            utc_offset_seconds: 2 * 60 * 60,
            category_policy: CategoryPolicy::Replace,
            item_locks: true,
            tick_interval_ms: 1_000,
        }
    }
}

impl ExpiryConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.meta_key.trim().is_empty() {
            return Err(ConfigError::Empty("meta_key"));
        }
        if self.hook_name.trim().is_empty() {
            return Err(ConfigError::Empty("hook_name"));
        }
        if self.expired_category.trim().is_empty() {
            return Err(ConfigError::Empty("expired_category"));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTick);
        }
        self.parser().map(|_| ())
    }

    pub fn parser(&self) -> Result<TimestampParser, ConfigError> {
        TimestampParser::from_offset_seconds(self.utc_offset_seconds)
            .ok_or(ConfigError::InvalidOffset(self.utc_offset_seconds))
    }

    pub fn hook(&self) -> HookName {
        HookName::new(self.hook_name.clone())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
