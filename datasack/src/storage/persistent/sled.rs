// Copyright (c) 2024-2025 Datasack Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Sled storage backend implementation

use super::traits::{StorageBackend, StorageTree};
use super::types::{BackendType, KvPair, StorageError, StorageResult};
use std::path::Path;

/// Sled backend implementation
pub struct SledBackend {
    db: sled::Db,
}

/// Sled tree wrapper that implements StorageTree trait
pub struct SledTree {
    tree: sled::Tree,
}

impl StorageTree for SledTree {
    fn insert(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.tree.insert(key, value)?;
        Ok(())
    }

    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.tree.get(key)?.map(|v| v.to_vec()))
    }

    fn remove(&self, key: &[u8]) -> StorageResult<()> {
        self.tree.remove(key)?;
        Ok(())
    }

    fn contains_key(&self, key: &[u8]) -> StorageResult<bool> {
        Ok(self.tree.contains_key(key)?)
    }

    fn clear(&self) -> StorageResult<()> {
        Ok(self.tree.clear()?)
    }

    fn iter(&self) -> StorageResult<Box<dyn Iterator<Item = StorageResult<KvPair>> + '_>> {
        let iter = self.tree.iter().map(|result| {
            result
                .map(|(k, v)| (k.to_vec(), v.to_vec()))
                .map_err(StorageError::from)
        });
        Ok(Box::new(iter))
    }

    fn batch_get(&self, keys: &[&[u8]]) -> StorageResult<Vec<Option<Vec<u8>>>> {
        let mut results = Vec::with_capacity(keys.len());
        for key in keys {
            results.push(self.get(key)?);
        }
        Ok(results)
    }

    fn batch_insert(&self, entries: &[(&[u8], &[u8])]) -> StorageResult<()> {
        let mut batch = sled::Batch::default();
        for (key, value) in entries {
            batch.insert(*key, *value);
        }
        self.tree.apply_batch(batch)?;
        Ok(())
    }

    fn batch_remove(&self, keys: &[&[u8]]) -> StorageResult<()> {
        let mut batch = sled::Batch::default();
        for key in keys {
            batch.remove(*key);
        }
        self.tree.apply_batch(batch)?;
        Ok(())
    }

    fn flush(&self) -> StorageResult<()> {
        self.tree.flush()?;
        Ok(())
    }
}

impl StorageBackend for SledBackend {
    fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let db = sled::open(path)?;
        Ok(SledBackend { db })
    }

    fn open_tree(&self, name: &str) -> StorageResult<Box<dyn StorageTree>> {
        let tree = self.db.open_tree(name)?;
        Ok(Box::new(SledTree { tree }))
    }

    fn drop_tree(&self, name: &str) -> StorageResult<()> {
        self.db.drop_tree(name.as_bytes())?;
        Ok(())
    }

    fn list_trees(&self) -> StorageResult<Vec<String>> {
        // Skip sled's implicit default tree
        let tree_names = self
            .db
            .tree_names()
            .into_iter()
            .map(|name| String::from_utf8_lossy(&name).to_string())
            .filter(|name| name != "__sled__default")
            .collect();
        Ok(tree_names)
    }

    fn flush(&self) -> StorageResult<()> {
        self.db.flush()?;
        Ok(())
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Sled
    }
}
