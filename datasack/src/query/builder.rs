// Copyright (c) 2024-2025 Datasack Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Fluent query construction
//!
//! Queries are built from the entry points in [`r`](crate::query::r) and
//! executed with `run`:
//!
//! ```ignore
//! use datasack::query::r;
//!
//! r::db("app").table_create("users").run(&conn).await?;
//! r::db("app").table("users").insert(&doc, InsertOptions::default()).run(&conn).await?;
//! let user = r::db("app").table("users").get("alice").run(&conn).await?;
//! ```
//!
//! Encoding failures of documents or predicates are captured while building
//! and reported when the query runs.

use super::error::QueryResult;
use super::response::Response;
use super::term::{InsertOptions, Selection, TableRef, Term};
use crate::connection::Connection;
use serde::Serialize;

/// A query ready to run
#[derive(Debug)]
pub struct Query {
    term: QueryResult<Term>,
}

impl Query {
    pub(crate) fn new(term: Term) -> Self {
        Self { term: Ok(term) }
    }

    /// Run the query on `conn`
    pub async fn run(self, conn: &Connection) -> QueryResult<Response> {
        conn.run(self.term?).await
    }
}

/// A database reference
#[derive(Debug, Clone)]
pub struct Db {
    name: String,
}

impl Db {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Reference a table of this database
    pub fn table(&self, name: impl Into<String>) -> Table {
        Table {
            table: TableRef::new(self.name.clone(), name),
        }
    }

    pub fn table_create(&self, name: impl Into<String>) -> Query {
        Query::new(Term::TableCreate(TableRef::new(self.name.clone(), name)))
    }

    pub fn table_drop(&self, name: impl Into<String>) -> Query {
        Query::new(Term::TableDrop(TableRef::new(self.name.clone(), name)))
    }

    pub fn table_list(&self) -> Query {
        Query::new(Term::TableList(self.name.clone()))
    }
}

/// A table reference; running it scans every document
#[derive(Debug, Clone)]
pub struct Table {
    table: TableRef,
}

impl Table {
    pub fn location(&self) -> &TableRef {
        &self.table
    }

    /// Point lookup by primary key
    pub fn get(&self, key: impl Into<String>) -> SingleSelection {
        SingleSelection {
            table: self.table.clone(),
            key: key.into(),
        }
    }

    /// Lookup of several primary keys
    pub fn get_all<I, K>(&self, keys: I) -> MultiSelection
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        MultiSelection {
            table: self.table.clone(),
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Documents whose fields equal every field of `predicate`
    pub fn filter<P: Serialize + ?Sized>(&self, predicate: &P) -> Filtered {
        Filtered {
            table: self.table.clone(),
            predicate: serde_json::to_value(predicate).map_err(Into::into),
        }
    }

    /// Write one document, or each document of a sequence
    pub fn insert<D: Serialize + ?Sized>(&self, docs: &D, options: InsertOptions) -> Query {
        let term = serde_json::to_value(docs)
            .map(|docs| Term::Insert {
                table: self.table.clone(),
                docs,
                options,
            })
            .map_err(Into::into);
        Query { term }
    }

    /// Delete every document of the table
    pub fn delete(&self) -> Query {
        Query::new(Term::Delete(Selection::Table(self.table.clone())))
    }

    pub async fn run(&self, conn: &Connection) -> QueryResult<Response> {
        Query::new(Term::Read(Selection::Table(self.table.clone())))
            .run(conn)
            .await
    }
}

/// Result of [`Table::get`]
#[derive(Debug, Clone)]
pub struct SingleSelection {
    table: TableRef,
    key: String,
}

impl SingleSelection {
    pub fn delete(self) -> Query {
        Query::new(Term::Delete(Selection::Get(self.table, self.key)))
    }

    /// Runs to the document, or `Atom(Null)` when the key is absent
    pub async fn run(self, conn: &Connection) -> QueryResult<Response> {
        Query::new(Term::Read(Selection::Get(self.table, self.key)))
            .run(conn)
            .await
    }
}

/// Result of [`Table::get_all`]
#[derive(Debug, Clone)]
pub struct MultiSelection {
    table: TableRef,
    keys: Vec<String>,
}

impl MultiSelection {
    pub fn delete(self) -> Query {
        Query::new(Term::Delete(Selection::GetAll(self.table, self.keys)))
    }

    pub async fn run(self, conn: &Connection) -> QueryResult<Response> {
        Query::new(Term::Read(Selection::GetAll(self.table, self.keys)))
            .run(conn)
            .await
    }
}

/// Result of [`Table::filter`]
#[derive(Debug)]
pub struct Filtered {
    table: TableRef,
    predicate: QueryResult<serde_json::Value>,
}

impl Filtered {
    pub fn delete(self) -> Query {
        let table = self.table;
        Query {
            term: self
                .predicate
                .map(|predicate| Term::Delete(Selection::Filter(table, predicate))),
        }
    }

    pub async fn run(self, conn: &Connection) -> QueryResult<Response> {
        let table = self.table;
        Query {
            term: self
                .predicate
                .map(|predicate| Term::Read(Selection::Filter(table, predicate))),
        }
        .run(conn)
        .await
    }
}
