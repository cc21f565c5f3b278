// Copyright (c) 2024-2025 Datasack Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Storage drivers
//!
//! # Architecture
//!
//! ```text
//! application code
//!     ↓
//! StorageDriver<E, F> (+ EventSource)
//!     ↓
//! DocumentDriver (one query per operation)
//!     ↓
//! query client → Connection → storage backend
//! ```

mod document;
mod traits;

pub use document::DocumentDriver;
pub use traits::StorageDriver;
