//! Store configuration.
//!
//! Defaults can be overridden from the environment:
//! - `ACCOUNTFORM_STORAGE_KEY`: key the account list is stored under
//! - `ACCOUNTFORM_STORAGE_DIR`: directory used by [`FileStorage`](crate::FileStorage)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default key the account list is stored under.
pub const DEFAULT_STORAGE_KEY: &str = "accounts";

/// Environment variable overriding the storage key.
pub const STORAGE_KEY_ENV: &str = "ACCOUNTFORM_STORAGE_KEY";

/// Environment variable overriding the storage directory.
pub const STORAGE_DIR_ENV: &str = "ACCOUNTFORM_STORAGE_DIR";

/// Where and under which key the account list is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    /// Key of the stored account list.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Directory for file-backed storage.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            storage_dir: default_storage_dir(),
        }
    }
}

impl StoreConfig {
    /// Default configuration with environment overrides applied.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// Set the storage key.
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Set the storage directory.
    #[must_use]
    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }

    /// Apply overrides looked up by environment variable name.
    ///
    /// Empty values are ignored.
    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup(STORAGE_KEY_ENV).filter(|v| !v.is_empty()) {
            self.storage_key = key;
        }
        if let Some(dir) = lookup(STORAGE_DIR_ENV).filter(|v| !v.is_empty()) {
            self.storage_dir = PathBuf::from(dir);
        }
        self
    }
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_storage_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("accountform")
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.storage_key, "accounts");
        assert!(config.storage_dir.ends_with("accountform"));
    }

    #[test]
    fn overrides_applied() {
        let config = StoreConfig::default().with_overrides(|name| match name {
            STORAGE_KEY_ENV => Some("form-accounts".to_string()),
            STORAGE_DIR_ENV => Some("/var/lib/form".to_string()),
            _ => None,
        });
        assert_eq!(config.storage_key, "form-accounts");
        assert_eq!(config.storage_dir, PathBuf::from("/var/lib/form"));
    }

    #[test]
    fn empty_overrides_ignored() {
        let config = StoreConfig::default().with_overrides(|_| Some(String::new()));
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn deserialize_fills_defaults() {
        let config: StoreConfig = serde_json::from_str(r#"{"storageKey":"k"}"#).unwrap();
        assert_eq!(config.storage_key, "k");
        assert_eq!(config.storage_dir, StoreConfig::default().storage_dir);
    }

    #[test]
    fn builders() {
        let config = StoreConfig::default()
            .with_storage_key("k")
            .with_storage_dir("/tmp/x");
        assert_eq!(config.storage_key, "k");
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/x"));
    }
}
