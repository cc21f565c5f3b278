// Copyright (c) 2024-2025 Datasack Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Storage backend factory
//!
//! This module provides factory functions for creating storage backends based on configuration.

use super::memory::MemoryBackend;
use super::traits::StorageBackend;
use super::types::{BackendType, StorageResult};
use std::path::Path;

/// Factory function to create a storage backend based on configuration
///
/// # Arguments
/// * `backend_type` - The type of storage backend to create
/// * `path` - The filesystem path where the store lives (ignored by memory)
///
/// # Returns
/// A boxed trait object that implements StorageBackend
pub fn create_storage_backend<P: AsRef<Path>>(
    backend_type: BackendType,
    path: P,
) -> StorageResult<Box<dyn StorageBackend>> {
    match backend_type {
        BackendType::Sled => open_sled(path),
        BackendType::Memory => Ok(Box::new(MemoryBackend::open(path)?)),
    }
}

#[cfg(feature = "sled-backend")]
fn open_sled<P: AsRef<Path>>(path: P) -> StorageResult<Box<dyn StorageBackend>> {
    use super::sled::SledBackend;
    Ok(Box::new(SledBackend::open(path)?))
}

#[cfg(not(feature = "sled-backend"))]
fn open_sled<P: AsRef<Path>>(_path: P) -> StorageResult<Box<dyn StorageBackend>> {
    Err(super::types::StorageError::UnsupportedBackend(
        "sled support is not compiled in (enable the `sled-backend` feature)".to_string(),
    ))
}
