// Copyright (c) 2024-2025 Datasack Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Datasack - pluggable storage drivers over an embedded document store
//!
//! Application code persists entries through the [`StorageDriver`] contract.
//! [`DocumentDriver`] implements it on one table of a document store reached
//! through a [`Connection`] and the fluent query client in [`query`].
//!
//! # Usage
//!
//! ```ignore
//! use datasack::{r, Connection, ConnectionConfig, Document, DocumentDriver, StorageDriver};
//!
//! let conn = Connection::open(&ConnectionConfig::sled("./data"))?;
//! r::db_create("app").run(&conn).await?;
//! r::db("app").table_create("users").run(&conn).await?;
//!
//! let users: DocumentDriver<Document> = DocumentDriver::new(conn.clone(), "app", "users");
//! users.insert(&Document::with_id("alice").set("age", 30)).await?;
//! let alice = users.fetch("alice").await?;
//! ```
//!
//! # Features
//!
//! - **Driver contract**: fetch, insert, update, find, delete and their bulk
//!   variants, generic over the entry and filter types
//! - **Conflict policies**: insert replaces, update merges
//! - **Event subscriptions**: injected callback registry behind `on` / `off` / `handle`
//! - **Embedded storage**: Sled on disk or in memory

pub mod config;
pub mod connection;
pub mod driver;
pub mod entry;
pub mod events;
pub mod query;
pub mod storage;

pub use config::{ChangeFeedOptions, ConfigError, ConnectionConfig, DEFAULT_CHANGE_FEED_OPTIONS};
pub use connection::{Connection, DatabaseInfo, TableInfo};
pub use driver::{DocumentDriver, StorageDriver};
pub use entry::{Document, Entry, EntryRef, Filter};
pub use events::{handler, Event, EventEmitter, EventHandler, EventSource, HandlerUninstaller};
pub use query::{r, Conflict, InsertOptions, QueryError, QueryResult, Response, WriteResult};
pub use storage::BackendType;

/// Datasack version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Datasack crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
