// Copyright (c) 2024-2025 Datasack Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Query responses

use super::error::{QueryError, QueryResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Counters reported by a write
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteResult {
    /// Documents written under a new primary key
    pub inserted: usize,
    /// Existing documents overwritten or merged
    pub replaced: usize,
    /// Writes that left the stored document identical
    pub unchanged: usize,
    /// Documents removed
    pub deleted: usize,
    /// Delete targets that did not exist
    pub skipped: usize,
    /// Documents rejected by the conflict policy
    pub errors: usize,
    /// Message of the first rejected document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_error: Option<String>,
    /// Primary keys generated for documents inserted without one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generated_keys: Vec<String>,
}

/// Result of running a query
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// A single value; `Null` when a point lookup found nothing
    Atom(Value),
    /// A stream of documents
    Sequence(Vec<Value>),
    /// Outcome of a write
    Write(WriteResult),
}

impl Response {
    /// Short name of the response shape
    pub fn kind(&self) -> &'static str {
        match self {
            Response::Atom(_) => "atom",
            Response::Sequence(_) => "sequence",
            Response::Write(_) => "write",
        }
    }

    /// Decode a point lookup; `None` when nothing was found
    pub fn into_optional<T: DeserializeOwned>(self) -> QueryResult<Option<T>> {
        match self {
            Response::Atom(Value::Null) => Ok(None),
            Response::Atom(value) => Ok(Some(serde_json::from_value(value)?)),
            other => Err(QueryError::UnexpectedResponse {
                expected: "atom",
                found: other.kind(),
            }),
        }
    }

    /// Decode every document of a sequence
    pub fn into_vec<T: DeserializeOwned>(self) -> QueryResult<Vec<T>> {
        let values = match self {
            Response::Sequence(values) => values,
            Response::Atom(Value::Array(values)) => values,
            other => {
                return Err(QueryError::UnexpectedResponse {
                    expected: "sequence",
                    found: other.kind(),
                })
            }
        };
        values
            .into_iter()
            .map(|value| serde_json::from_value(value).map_err(QueryError::from))
            .collect()
    }

    /// Counters of a write
    pub fn into_write(self) -> QueryResult<WriteResult> {
        match self {
            Response::Write(result) => Ok(result),
            other => Err(QueryError::UnexpectedResponse {
                expected: "write",
                found: other.kind(),
            }),
        }
    }

    /// Names returned by `db_list` / `table_list`
    pub fn into_names(self) -> QueryResult<Vec<String>> {
        self.into_vec()
    }
}
