// Copyright (c) 2024-2025 Datasack Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Error types raised by the query client

use crate::storage::StorageError;
use thiserror::Error;

/// Errors produced while building or running a query
#[derive(Error, Debug)]
pub enum QueryError {
    /// The key-value backend failed underneath the query
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The connection was closed before the query ran
    #[error("Connection is closed")]
    ConnectionClosed,

    /// The server rejected the operation (missing table, duplicate database, ...)
    #[error("Operation failed: {0}")]
    OpFailed(String),

    /// A document or predicate had the wrong shape
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// A primary key was missing or not a string
    #[error("Primary key error: {0}")]
    PrimaryKey(String),

    /// Client-side encoding or decoding of documents failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The response did not have the shape the caller asked for
    #[error("Expected {expected} response but found {found}")]
    UnexpectedResponse {
        expected: &'static str,
        found: &'static str,
    },

    /// The blocking worker running the query went away
    #[error("Query aborted: {0}")]
    Aborted(String),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
