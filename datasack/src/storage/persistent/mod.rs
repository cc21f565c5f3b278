// Copyright (c) 2024-2025 Datasack Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Persistent storage backends
//!
//! This module provides trait-based abstractions for key-value storage,
//! allowing different backends (Sled, Memory) to be used interchangeably
//! underneath the document store.
//!
//! # Architecture
//!
//! ```text
//! Connection (catalog, documents as JSON)
//!     ↓
//! StorageBackend / StorageTree (key-value abstraction)
//!     ↓
//! Concrete Implementations (Sled, Memory)
//! ```

// Core modules
pub mod factory;
pub mod traits;
pub mod types;

// Backend implementations
pub mod memory;
#[cfg(feature = "sled-backend")]
pub mod sled;

// Public API re-exports
pub use factory::create_storage_backend;
pub use traits::{StorageBackend, StorageTree};
pub use types::{BackendType, KvPair, StorageError, StorageResult};
