// Copyright (c) 2024-2025 Datasack Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Connection and change-feed configuration

use crate::storage::BackendType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default on-disk location of a store
pub const DEFAULT_DATA_PATH: &str = "./datasack-data";

/// Error raised while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration used to open a [`Connection`](crate::Connection)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Key-value backend holding the documents
    pub backend: BackendType,

    /// Directory of the store (ignored by the memory backend)
    pub path: PathBuf,

    /// Flush pending writes when the connection is closed
    pub flush_on_close: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            backend: BackendType::default(),
            path: PathBuf::from(DEFAULT_DATA_PATH),
            flush_on_close: true,
        }
    }
}

impl ConnectionConfig {
    /// Sled store rooted at `path`
    pub fn sled<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            backend: BackendType::Sled,
            path: path.into(),
            ..Self::default()
        }
    }

    /// Ephemeral in-memory store
    pub fn memory() -> Self {
        Self {
            backend: BackendType::Memory,
            ..Self::default()
        }
    }

    /// Load configuration from a JSON file; missing fields take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Options for a live change feed on a table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChangeFeedOptions {
    /// Emit the current table contents before any change
    pub include_initial: bool,

    /// Collapse changes that arrive together
    pub squash: bool,

    /// Report positions of changes in ordered feeds
    pub include_offsets: bool,

    /// Tag every change with its kind
    pub include_types: bool,

    /// Emit feed state notifications
    pub include_states: bool,

    /// Changes buffered before the feed errors out
    pub changefeed_queue_size: usize,
}

/// Change-feed options carried by document drivers
///
/// No driver operation opens a change feed yet; these are the defaults a
/// subscription would start from.
pub const DEFAULT_CHANGE_FEED_OPTIONS: ChangeFeedOptions = ChangeFeedOptions {
    include_initial: false,
    squash: false,
    include_offsets: false,
    include_types: false,
    include_states: false,
    changefeed_queue_size: 100_000,
};

impl Default for ChangeFeedOptions {
    fn default() -> Self {
        DEFAULT_CHANGE_FEED_OPTIONS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_connection_config() {
        let config = ConnectionConfig::default();
        assert_eq!(config.backend, BackendType::Sled);
        assert_eq!(config.path, PathBuf::from(DEFAULT_DATA_PATH));
        assert!(config.flush_on_close);
    }

    #[test]
    fn test_config_from_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"backend": "memory"}}"#).unwrap();

        let config = ConnectionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.backend, BackendType::Memory);
        assert!(config.flush_on_close);
    }

    #[test]
    fn test_config_parse_error_names_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = ConnectionConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_change_feed_defaults() {
        let options = ChangeFeedOptions::default();
        assert!(!options.include_initial);
        assert!(!options.squash);
        assert!(!options.include_offsets);
        assert!(!options.include_types);
        assert!(!options.include_states);
        assert_eq!(options.changefeed_queue_size, 100_000);
    }
}
