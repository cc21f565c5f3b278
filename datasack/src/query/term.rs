// Copyright (c) 2024-2025 Datasack Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Query terms sent to a connection
//!
//! Builders assemble a [`Term`]; the executor evaluates it against the
//! connection's catalog and storage.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Name of the primary key field of every table
pub const PRIMARY_KEY: &str = "id";

/// Fully qualified table location
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub db: String,
    pub table: String,
}

impl TableRef {
    pub fn new(db: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            db: db.into(),
            table: table.into(),
        }
    }

    /// Name of the storage tree holding the table's documents
    pub(crate) fn tree_name(&self) -> String {
        format!("{}.{}", self.db, self.table)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.db, self.table)
    }
}

/// What an insert does when a document with the same primary key exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conflict {
    /// Leave the stored document alone and count an error
    #[default]
    Error,
    /// Overwrite the stored document entirely
    Replace,
    /// Merge the new fields into the stored document
    Update,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Conflict::Error => "error",
            Conflict::Replace => "replace",
            Conflict::Update => "update",
        };
        write!(f, "{}", name)
    }
}

/// Options of an insert term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InsertOptions {
    pub conflict: Conflict,
}

impl InsertOptions {
    pub fn conflict(conflict: Conflict) -> Self {
        Self { conflict }
    }
}

/// A set of documents a term reads or deletes
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Selection {
    /// Every document of the table
    Table(TableRef),
    /// Point lookup by primary key
    Get(TableRef, String),
    /// Lookup of several primary keys
    GetAll(TableRef, Vec<String>),
    /// Documents matching a predicate
    Filter(TableRef, Value),
}

impl Selection {
    pub(crate) fn table(&self) -> &TableRef {
        match self {
            Selection::Table(table)
            | Selection::Get(table, _)
            | Selection::GetAll(table, _)
            | Selection::Filter(table, _) => table,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table();
        write!(f, "db({:?}).table({:?})", table.db, table.table)?;
        match self {
            Selection::Table(_) => Ok(()),
            Selection::Get(_, key) => write!(f, ".get({:?})", key),
            Selection::GetAll(_, keys) => write!(f, ".get_all({:?})", keys),
            Selection::Filter(_, predicate) => write!(f, ".filter({})", predicate),
        }
    }
}

/// A complete query
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Term {
    DbCreate(String),
    DbDrop(String),
    DbList,
    TableCreate(TableRef),
    TableDrop(TableRef),
    TableList(String),
    Read(Selection),
    Insert {
        table: TableRef,
        docs: Value,
        options: InsertOptions,
    },
    Delete(Selection),
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::DbCreate(name) => write!(f, "db_create({:?})", name),
            Term::DbDrop(name) => write!(f, "db_drop({:?})", name),
            Term::DbList => write!(f, "db_list()"),
            Term::TableCreate(table) => {
                write!(f, "db({:?}).table_create({:?})", table.db, table.table)
            }
            Term::TableDrop(table) => write!(f, "db({:?}).table_drop({:?})", table.db, table.table),
            Term::TableList(db) => write!(f, "db({:?}).table_list()", db),
            Term::Read(selection) => write!(f, "{}", selection),
            Term::Insert {
                table,
                docs,
                options,
            } => {
                let count = docs.as_array().map_or(1, Vec::len);
                write!(
                    f,
                    "db({:?}).table({:?}).insert(<{} document(s)>, conflict={})",
                    table.db, table.table, count, options.conflict
                )
            }
            Term::Delete(selection) => write!(f, "{}.delete()", selection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_term_display() {
        let users = TableRef::new("app", "users");
        let term = Term::Delete(Selection::GetAll(
            users.clone(),
            vec!["a".to_string(), "b".to_string()],
        ));
        assert_eq!(
            term.to_string(),
            r#"db("app").table("users").get_all(["a", "b"]).delete()"#
        );

        let insert = Term::Insert {
            table: users,
            docs: json!([{"id": "a"}, {"id": "b"}]),
            options: InsertOptions::conflict(Conflict::Update),
        };
        assert_eq!(
            insert.to_string(),
            r#"db("app").table("users").insert(<2 document(s)>, conflict=update)"#
        );
    }

    #[test]
    fn test_default_conflict_is_error() {
        assert_eq!(InsertOptions::default().conflict, Conflict::Error);
        assert_eq!(TableRef::new("app", "users").tree_name(), "app.users");
    }
}
