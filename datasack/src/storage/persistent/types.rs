// Copyright (c) 2024-2025 Datasack Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Storage backend types and error handling
//!
//! This module defines the types, enums, and error handling used throughout
//! the key-value layer underneath the document store.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Storage backend type configuration
///
/// Specifies which underlying key-value technology holds the documents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// Sled - Pure Rust embedded database
    /// Best for: persistent single-process stores
    #[default]
    Sled,

    /// Memory - In-memory storage
    /// Best for: Unit testing, ephemeral stores
    Memory,
}

impl std::str::FromStr for BackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sled" => Ok(BackendType::Sled),
            "memory" => Ok(BackendType::Memory),
            _ => Err(format!(
                "Unknown backend type: {}. Valid options: sled, memory",
                s
            )),
        }
    }
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BackendType::Sled => "sled",
            BackendType::Memory => "memory",
        };
        write!(f, "{}", name)
    }
}

/// Error type for storage backend operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O related errors (file system)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored bytes could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Backend-specific error (Sled, etc.)
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Backend not compiled into this build
    #[error("Unsupported storage backend: {0}")]
    UnsupportedBackend(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

#[cfg(feature = "sled-backend")]
impl From<sled::Error> for StorageError {
    fn from(e: sled::Error) -> Self {
        StorageError::Backend(e.to_string())
    }
}

/// Result type for storage backend operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A key-value pair read back from a tree
pub type KvPair = (Vec<u8>, Vec<u8>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_type_parsing() {
        assert_eq!("sled".parse::<BackendType>().unwrap(), BackendType::Sled);
        assert_eq!("MEMORY".parse::<BackendType>().unwrap(), BackendType::Memory);
        assert!("rocksdb".parse::<BackendType>().is_err());
        assert_eq!(BackendType::Memory.to_string(), "memory");
        assert_eq!(BackendType::default(), BackendType::Sled);
    }
}
