// Copyright (c) 2024-2025 Datasack Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Key-value storage underneath the document store
//!
//! This module provides:
//! - Pluggable backend trait for different KV stores
//! - Sled (on disk) and memory implementations
//! - Factory selecting a backend from configuration

mod persistent;

pub use persistent::{
    create_storage_backend, BackendType, KvPair, StorageBackend, StorageError, StorageResult,
    StorageTree,
};
