// Copyright (c) 2024-2025 Datasack Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Storage driver contract
//!
//! Application code persists entries through [`StorageDriver`] and never
//! sees the backing store. Implementations map each operation onto their
//! backend and return the backend's own error type untouched.

use crate::entry::{Entry, EntryRef, Filter};
use crate::events::EventSource;
use async_trait::async_trait;
use serde::Serialize;

/// CRUD contract over a single collection of entries
///
/// `E` is the entry type, `F` the filter type accepted by [`find`](Self::find).
#[async_trait]
pub trait StorageDriver<E, F = Filter>: EventSource + Send + Sync
where
    E: Entry + 'static,
    F: Serialize + Send + Sync + 'static,
{
    /// Error reported by the backend
    type Error: std::error::Error + Send + Sync + 'static;

    /// Point lookup by id; `None` when no entry has that id
    async fn fetch(&self, id: &str) -> Result<Option<E>, Self::Error>;

    /// Write an entry, fully replacing any entry with the same id
    async fn insert(&self, input: &E) -> Result<(), Self::Error>;

    /// Write an entry, merging its fields into any entry with the same id
    async fn update(&self, input: &E) -> Result<(), Self::Error>;

    /// Entries matching every field of `filter`; all entries when `None`
    async fn find(&self, filter: Option<&F>) -> Result<Vec<E>, Self::Error>;

    /// Remove the entry addressed by an id or by the entry itself
    async fn delete(&self, input: EntryRef<'_, E>) -> Result<(), Self::Error>;

    /// Bulk [`insert`](Self::insert)
    async fn insert_collection(&self, input: &[E]) -> Result<(), Self::Error>;

    /// Bulk [`update`](Self::update)
    async fn update_collection(&self, input: &[E]) -> Result<(), Self::Error>;

    /// Bulk [`delete`](Self::delete)
    async fn delete_collection(&self, input: &[EntryRef<'_, E>]) -> Result<(), Self::Error>;

    /// Release driver resources
    async fn dispose(&self) -> Result<(), Self::Error>;
}
