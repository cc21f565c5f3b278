// Copyright (c) 2024-2025 Datasack Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Storage backend traits
//!
//! This module defines the core traits for storage backends and trees.
//! All backends must implement these traits to provide a consistent interface.

use super::types::{BackendType, KvPair, StorageResult};
use std::path::Path;

/// Trait for a tree in the storage backend
///
/// Represents a named collection of key-value pairs within a backend.
/// Every document table and the catalog each live in their own tree.
pub trait StorageTree: Send + Sync {
    /// Insert a key-value pair
    fn insert(&self, key: &[u8], value: &[u8]) -> StorageResult<()>;

    /// Get a value by key
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Remove a key-value pair
    fn remove(&self, key: &[u8]) -> StorageResult<()>;

    /// Check if a key exists
    fn contains_key(&self, key: &[u8]) -> StorageResult<bool>;

    /// Clear all data in the tree
    fn clear(&self) -> StorageResult<()>;

    /// Iterate over all key-value pairs in key order
    fn iter(&self) -> StorageResult<Box<dyn Iterator<Item = StorageResult<KvPair>> + '_>>;

    /// Get multiple values by keys (batch get)
    fn batch_get(&self, keys: &[&[u8]]) -> StorageResult<Vec<Option<Vec<u8>>>>;

    /// Insert multiple key-value pairs (batch insert)
    fn batch_insert(&self, entries: &[(&[u8], &[u8])]) -> StorageResult<()>;

    /// Remove multiple keys (batch remove)
    fn batch_remove(&self, keys: &[&[u8]]) -> StorageResult<()>;

    /// Flush any pending writes to disk
    fn flush(&self) -> StorageResult<()>;
}

/// Main storage backend trait
pub trait StorageBackend: Send + Sync {
    /// Open or create a backend at the given path
    fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self>
    where
        Self: Sized;

    /// Open or create a named tree
    fn open_tree(&self, name: &str) -> StorageResult<Box<dyn StorageTree>>;

    /// Drop a tree and everything in it
    fn drop_tree(&self, name: &str) -> StorageResult<()>;

    /// List all available trees
    fn list_trees(&self) -> StorageResult<Vec<String>>;

    /// Flush all pending writes to disk
    fn flush(&self) -> StorageResult<()>;

    /// Get backend type
    fn backend_type(&self) -> BackendType;

    /// Release the backend before it is dropped
    fn shutdown(&self) -> StorageResult<()> {
        self.flush()
    }
}
