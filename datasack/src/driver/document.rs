// Copyright (c) 2024-2025 Datasack Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Storage driver backed by a document store table
//!
//! Every operation is a single query against a fixed database/table pair.
//! Conflicts are resolved by the store's insert policies: `replace` for
//! inserts, `update` (field merge) for updates. Failures are returned as the
//! query client reported them.

use super::traits::StorageDriver;
use crate::config::{ChangeFeedOptions, DEFAULT_CHANGE_FEED_OPTIONS};
use crate::connection::Connection;
use crate::entry::{Entry, EntryRef, Filter};
use crate::events::{EventEmitter, EventHandler, EventSource, HandlerUninstaller};
use crate::query::{r, Conflict, InsertOptions, QueryError, Table};
use async_trait::async_trait;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;

/// [`StorageDriver`] over one table of a document store
///
/// The connection is shared with the caller, who stays responsible for
/// closing it; [`dispose`](StorageDriver::dispose) leaves it open.
pub struct DocumentDriver<E, F = Filter> {
    connection: Connection,
    database: String,
    table: String,
    emitter: Arc<EventEmitter>,
    _marker: PhantomData<fn() -> (E, F)>,
}

impl<E, F> DocumentDriver<E, F> {
    /// Driver with its own event registry
    pub fn new(
        connection: Connection,
        database: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self::with_emitter(connection, database, table, EventEmitter::new())
    }

    /// Driver whose subscriptions go to a shared registry
    pub fn with_emitter(
        connection: Connection,
        database: impl Into<String>,
        table: impl Into<String>,
        emitter: Arc<EventEmitter>,
    ) -> Self {
        let database = database.into();
        let table = table.into();
        log::debug!("Document driver bound to {}.{}", database, table);
        Self {
            connection,
            database,
            table,
            emitter,
            _marker: PhantomData,
        }
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn emitter(&self) -> &Arc<EventEmitter> {
        &self.emitter
    }

    /// Change-feed settings for this table; no operation opens a feed
    pub fn change_feed_options(&self) -> ChangeFeedOptions {
        DEFAULT_CHANGE_FEED_OPTIONS
    }

    fn query(&self) -> Table {
        r::db(self.database.as_str()).table(self.table.as_str())
    }
}

impl<E, F> std::fmt::Debug for DocumentDriver<E, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentDriver")
            .field("connection", &self.connection)
            .field("database", &self.database)
            .field("table", &self.table)
            .finish()
    }
}

#[async_trait]
impl<E, F> StorageDriver<E, F> for DocumentDriver<E, F>
where
    E: Entry + 'static,
    F: Serialize + Send + Sync + 'static,
{
    type Error = QueryError;

    async fn fetch(&self, id: &str) -> Result<Option<E>, QueryError> {
        self.query()
            .get(id)
            .run(&self.connection)
            .await?
            .into_optional()
    }

    async fn insert(&self, input: &E) -> Result<(), QueryError> {
        self.query()
            .insert(input, InsertOptions::conflict(Conflict::Replace))
            .run(&self.connection)
            .await
            .map(|_| ())
    }

    async fn update(&self, input: &E) -> Result<(), QueryError> {
        self.query()
            .insert(input, InsertOptions::conflict(Conflict::Update))
            .run(&self.connection)
            .await
            .map(|_| ())
    }

    async fn find(&self, filter: Option<&F>) -> Result<Vec<E>, QueryError> {
        let response = match filter {
            Some(filter) => self.query().filter(filter).run(&self.connection).await?,
            None => self.query().run(&self.connection).await?,
        };
        response.into_vec()
    }

    async fn delete(&self, input: EntryRef<'_, E>) -> Result<(), QueryError> {
        self.query()
            .get(input.key())
            .delete()
            .run(&self.connection)
            .await
            .map(|_| ())
    }

    async fn insert_collection(&self, input: &[E]) -> Result<(), QueryError> {
        self.query()
            .insert(input, InsertOptions::conflict(Conflict::Replace))
            .run(&self.connection)
            .await
            .map(|_| ())
    }

    async fn update_collection(&self, input: &[E]) -> Result<(), QueryError> {
        self.query()
            .insert(input, InsertOptions::conflict(Conflict::Update))
            .run(&self.connection)
            .await
            .map(|_| ())
    }

    async fn delete_collection(&self, input: &[EntryRef<'_, E>]) -> Result<(), QueryError> {
        self.query()
            .get_all(input.iter().map(EntryRef::key))
            .delete()
            .run(&self.connection)
            .await
            .map(|_| ())
    }

    async fn dispose(&self) -> Result<(), QueryError> {
        Ok(())
    }
}

impl<E, F> EventSource for DocumentDriver<E, F> {
    fn on(&self, name: &str, handler: EventHandler) -> &dyn EventSource {
        self.emitter.on(name, handler);
        self
    }

    fn off(&self, name: &str, handler: Option<&EventHandler>) -> &dyn EventSource {
        self.emitter.off(name, handler);
        self
    }

    fn handle(&self, name: &str, handler: EventHandler) -> HandlerUninstaller {
        self.emitter.handle(name, handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Document;
    use crate::events::{handler, Event};
    use serde_json::Value;

    #[test]
    fn test_identity_is_fixed_at_construction() {
        let conn = Connection::memory().unwrap();
        let driver: DocumentDriver<Document> = DocumentDriver::new(conn, "app", "users");
        assert_eq!(driver.database(), "app");
        assert_eq!(driver.table_name(), "users");
        assert_eq!(driver.change_feed_options(), ChangeFeedOptions::default());
    }

    #[test]
    fn test_subscriptions_go_to_injected_emitter() {
        let conn = Connection::memory().unwrap();
        let emitter = EventEmitter::new();
        let driver: DocumentDriver<Document> =
            DocumentDriver::with_emitter(conn, "app", "users", emitter.clone());

        let first = handler(|_| {});
        driver.on("changed", first.clone()).on("changed", handler(|_| {}));
        assert_eq!(emitter.handler_count("changed"), 2);

        driver.off("changed", Some(&first));
        assert_eq!(emitter.handler_count("changed"), 1);

        let uninstaller = driver.handle("removed", handler(|_| {}));
        assert_eq!(emitter.emit(&Event::new("removed", Value::Null)), 1);
        uninstaller.uninstall();
        assert_eq!(emitter.handler_count("removed"), 0);
    }
}
