// Copyright (c) 2024-2025 Datasack Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Document store query client
//!
//! Provides:
//! - Fluent builders (`r::db(..).table(..).get(..)` and friends)
//! - Insert conflict policies (error, replace, update)
//! - Typed decoding of responses
//!
//! Queries are evaluated against a [`Connection`](crate::Connection) on a
//! blocking worker, one round trip per `run`.

mod builder;
mod error;
pub(crate) mod exec;
pub mod r;
mod response;
pub(crate) mod term;

pub use builder::{Db, Filtered, MultiSelection, Query, SingleSelection, Table};
pub use error::{QueryError, QueryResult};
pub use response::{Response, WriteResult};
pub use term::{Conflict, InsertOptions, TableRef, PRIMARY_KEY};
