// Copyright (c) 2024-2025 Datasack Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Connections to a document store
//!
//! A [`Connection`] owns the storage backend and the catalog of databases
//! and tables. It is a cheap, cloneable handle: every clone talks to the same
//! store, and closing any clone closes the store for all of them.

use crate::config::ConnectionConfig;
use crate::query::exec;
use crate::query::term::{TableRef, Term, PRIMARY_KEY};
use crate::query::{QueryError, QueryResult, Response};
use crate::storage::{create_storage_backend, BackendType, StorageBackend, StorageTree};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Tree holding database and table metadata
const CATALOG_TREE: &str = "__datasack_catalog";

/// Catalog record of a database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Catalog record of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    pub db: String,
    pub name: String,
    pub primary_key: String,
    pub created_at: DateTime<Utc>,
}

/// Handle to an open document store
#[derive(Clone)]
pub struct Connection {
    inner: Arc<ConnectionInner>,
}

struct ConnectionInner {
    id: Uuid,
    config: ConnectionConfig,
    backend: Box<dyn StorageBackend>,
    catalog: Box<dyn StorageTree>,
    /// Serializes catalog changes
    ddl_lock: Mutex<()>,
    /// One lock per table tree; held by a write term from its first read to its batch
    write_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    closed: AtomicBool,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.inner.id)
            .field("backend", &self.inner.config.backend)
            .field("path", &self.inner.config.path)
            .field("open", &self.is_open())
            .finish()
    }
}

impl Connection {
    /// Open the store described by `config`
    pub fn open(config: &ConnectionConfig) -> QueryResult<Self> {
        let backend = create_storage_backend(config.backend, &config.path)?;
        let catalog = backend.open_tree(CATALOG_TREE)?;
        let id = Uuid::new_v4();

        log::info!(
            "Opened {} connection {} at {}",
            config.backend,
            id,
            config.path.display()
        );

        Ok(Self {
            inner: Arc::new(ConnectionInner {
                id,
                config: config.clone(),
                backend,
                catalog,
                ddl_lock: Mutex::new(()),
                write_locks: Mutex::new(HashMap::new()),
                closed: AtomicBool::new(false),
            }),
        })
    }

    /// Open an ephemeral in-memory store
    pub fn memory() -> QueryResult<Self> {
        Self::open(&ConnectionConfig::memory())
    }

    /// Unique id of this connection, shared by its clones
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.inner.config
    }

    pub fn backend_type(&self) -> BackendType {
        self.inner.backend.backend_type()
    }

    pub fn is_open(&self) -> bool {
        !self.inner.closed.load(Ordering::Acquire)
    }

    /// Close the store; every later query fails with [`QueryError::ConnectionClosed`]
    ///
    /// Closing an already closed connection is a no-op.
    pub fn close(&self) -> QueryResult<()> {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        if self.inner.config.flush_on_close {
            self.inner.backend.shutdown()?;
        }
        log::info!("Closed connection {}", self.inner.id);
        Ok(())
    }

    /// Catalog record of a table, if it exists
    pub fn table_info(&self, table: &TableRef) -> QueryResult<Option<TableInfo>> {
        self.ensure_open()?;
        self.read_record(&table_key(&table.db, &table.table))
    }

    /// Run a term on a blocking worker
    pub(crate) async fn run(&self, term: Term) -> QueryResult<Response> {
        self.ensure_open()?;
        log::debug!("[{}] run {}", self.inner.id, term);

        let connection = self.clone();
        tokio::task::spawn_blocking(move || exec::execute(&connection, term))
            .await
            .map_err(|e| QueryError::Aborted(e.to_string()))?
    }

    pub(crate) fn ensure_open(&self) -> QueryResult<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(QueryError::ConnectionClosed)
        }
    }

    /// Storage tree of an existing table
    pub(crate) fn open_table(&self, table: &TableRef) -> QueryResult<Box<dyn StorageTree>> {
        self.ensure_open()?;
        self.require_db(&table.db)?;
        if !self
            .inner
            .catalog
            .contains_key(table_key(&table.db, &table.table).as_bytes())?
        {
            return Err(QueryError::OpFailed(format!(
                "Table `{}` does not exist.",
                table
            )));
        }
        Ok(self.inner.backend.open_tree(&table.tree_name())?)
    }

    /// Write lock of a table's tree
    ///
    /// Inserts and deletes read documents before writing them back, so terms
    /// writing the same table must not interleave.
    pub(crate) fn write_lock(&self, table: &TableRef) -> Arc<Mutex<()>> {
        self.inner
            .write_locks
            .lock()
            .entry(table.tree_name())
            .or_default()
            .clone()
    }

    pub(crate) fn create_db(&self, name: &str) -> QueryResult<Value> {
        validate_name("Database", name)?;
        let _guard = self.inner.ddl_lock.lock();

        let key = db_key(name);
        if self.inner.catalog.contains_key(key.as_bytes())? {
            return Err(QueryError::OpFailed(format!(
                "Database `{}` already exists.",
                name
            )));
        }
        let info = DatabaseInfo {
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.write_record(&key, &info)?;

        log::info!("Created database {}", name);
        Ok(json!({ "dbs_created": 1 }))
    }

    pub(crate) fn drop_db(&self, name: &str) -> QueryResult<Value> {
        let _guard = self.inner.ddl_lock.lock();
        self.require_db(name)?;

        let tables = self.table_names(name)?;
        for table in &tables {
            self.remove_table(&TableRef::new(name, table.as_str()))?;
        }
        self.inner.catalog.remove(db_key(name).as_bytes())?;

        log::info!("Dropped database {} with {} table(s)", name, tables.len());
        Ok(json!({ "dbs_dropped": 1, "tables_dropped": tables.len() }))
    }

    pub(crate) fn db_names(&self) -> QueryResult<Vec<String>> {
        self.names_with_prefix("db:")
    }

    pub(crate) fn create_table(&self, table: &TableRef) -> QueryResult<Value> {
        validate_name("Table", &table.table)?;
        let _guard = self.inner.ddl_lock.lock();
        self.require_db(&table.db)?;

        let key = table_key(&table.db, &table.table);
        if self.inner.catalog.contains_key(key.as_bytes())? {
            return Err(QueryError::OpFailed(format!(
                "Table `{}` already exists.",
                table
            )));
        }
        let info = TableInfo {
            db: table.db.clone(),
            name: table.table.clone(),
            primary_key: PRIMARY_KEY.to_string(),
            created_at: Utc::now(),
        };
        self.inner.backend.open_tree(&table.tree_name())?;
        self.write_record(&key, &info)?;

        log::info!("Created table {}", table);
        Ok(json!({ "tables_created": 1 }))
    }

    pub(crate) fn drop_table(&self, table: &TableRef) -> QueryResult<Value> {
        let _guard = self.inner.ddl_lock.lock();
        self.require_db(&table.db)?;
        if !self
            .inner
            .catalog
            .contains_key(table_key(&table.db, &table.table).as_bytes())?
        {
            return Err(QueryError::OpFailed(format!(
                "Table `{}` does not exist.",
                table
            )));
        }
        self.remove_table(table)?;

        log::info!("Dropped table {}", table);
        Ok(json!({ "tables_dropped": 1 }))
    }

    pub(crate) fn table_names(&self, db: &str) -> QueryResult<Vec<String>> {
        self.require_db(db)?;
        self.names_with_prefix(&format!("table:{}:", db))
    }

    fn remove_table(&self, table: &TableRef) -> QueryResult<()> {
        self.inner.backend.drop_tree(&table.tree_name())?;
        self.inner
            .catalog
            .remove(table_key(&table.db, &table.table).as_bytes())?;
        Ok(())
    }

    fn require_db(&self, name: &str) -> QueryResult<()> {
        if self.inner.catalog.contains_key(db_key(name).as_bytes())? {
            Ok(())
        } else {
            Err(QueryError::OpFailed(format!(
                "Database `{}` does not exist.",
                name
            )))
        }
    }

    fn names_with_prefix(&self, prefix: &str) -> QueryResult<Vec<String>> {
        let mut names = Vec::new();
        for item in self.inner.catalog.iter()? {
            let (key, _) = item?;
            let key = String::from_utf8_lossy(&key);
            if let Some(name) = key.strip_prefix(prefix) {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    fn read_record<T: serde::de::DeserializeOwned>(&self, key: &str) -> QueryResult<Option<T>> {
        match self.inner.catalog.get(key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write_record<T: Serialize>(&self, key: &str, record: &T) -> QueryResult<()> {
        let bytes = serde_json::to_vec(record)?;
        self.inner.catalog.insert(key.as_bytes(), &bytes)?;
        Ok(())
    }
}

fn db_key(name: &str) -> String {
    format!("db:{}", name)
}

fn table_key(db: &str, table: &str) -> String {
    format!("table:{}:{}", db, table)
}

/// Names are restricted so they stay unambiguous inside tree and catalog keys
fn validate_name(kind: &str, name: &str) -> QueryResult<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(QueryError::OpFailed(format!(
            "{} name `{}` invalid (Use A-Z, a-z, 0-9, _ and - only).",
            kind, name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lifecycle() {
        let conn = Connection::memory().unwrap();
        conn.create_db("app").unwrap();
        conn.create_table(&TableRef::new("app", "users")).unwrap();
        conn.create_table(&TableRef::new("app", "orders")).unwrap();

        assert_eq!(conn.db_names().unwrap(), vec!["app".to_string()]);
        assert_eq!(
            conn.table_names("app").unwrap(),
            vec!["orders".to_string(), "users".to_string()]
        );

        let info = conn
            .table_info(&TableRef::new("app", "users"))
            .unwrap()
            .unwrap();
        assert_eq!(info.primary_key, "id");

        conn.drop_db("app").unwrap();
        assert!(conn.db_names().unwrap().is_empty());
        assert!(conn.open_table(&TableRef::new("app", "users")).is_err());
    }

    #[test]
    fn test_duplicate_and_invalid_names() {
        let conn = Connection::memory().unwrap();
        conn.create_db("app").unwrap();

        let err = conn.create_db("app").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Operation failed: Database `app` already exists."
        );
        assert!(conn.create_db("bad.name").is_err());
        assert!(conn.create_table(&TableRef::new("app", "a:b")).is_err());
    }

    #[test]
    fn test_missing_table_message() {
        let conn = Connection::memory().unwrap();
        conn.create_db("app").unwrap();

        let err = conn
            .open_table(&TableRef::new("app", "ghosts"))
            .err().unwrap();
        assert_eq!(
            err.to_string(),
            "Operation failed: Table `app.ghosts` does not exist."
        );
    }

    #[test]
    fn test_write_lock_is_shared_per_table() {
        let conn = Connection::memory().unwrap();
        let users = TableRef::new("app", "users");

        let first = conn.write_lock(&users);
        let second = conn.clone().write_lock(&users);
        let orders = conn.write_lock(&TableRef::new("app", "orders"));

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &orders));

        let _guard = first.lock();
        assert!(second.try_lock().is_none());
        assert!(orders.try_lock().is_some());
    }

    #[test]
    fn test_close_is_idempotent_and_shared_by_clones() {
        let conn = Connection::memory().unwrap();
        let clone = conn.clone();

        conn.close().unwrap();
        conn.close().unwrap();

        assert!(!clone.is_open());
        assert!(matches!(
            clone.ensure_open(),
            Err(QueryError::ConnectionClosed)
        ));
        assert_eq!(clone.id(), conn.id());
    }
}
