// Copyright (c) 2024-2025 Datasack Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Term evaluation
//!
//! Documents are stored as JSON bytes keyed by their primary key. Every
//! term runs synchronously against the connection's storage; writes of a
//! single term are staged first and applied as one batch.

use super::error::{QueryError, QueryResult};
use super::response::{Response, WriteResult};
use super::term::{Conflict, InsertOptions, Selection, TableRef, Term, PRIMARY_KEY};
use crate::connection::Connection;
use crate::storage::{StorageError, StorageTree};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

pub(crate) fn execute(conn: &Connection, term: Term) -> QueryResult<Response> {
    match term {
        Term::DbCreate(name) => conn.create_db(&name).map(Response::Atom),
        Term::DbDrop(name) => conn.drop_db(&name).map(Response::Atom),
        Term::DbList => Ok(names_response(conn.db_names()?)),
        Term::TableCreate(table) => conn.create_table(&table).map(Response::Atom),
        Term::TableDrop(table) => conn.drop_table(&table).map(Response::Atom),
        Term::TableList(db) => Ok(names_response(conn.table_names(&db)?)),
        Term::Read(selection) => read(conn, selection),
        Term::Insert {
            table,
            docs,
            options,
        } => insert(conn, &table, docs, options).map(Response::Write),
        Term::Delete(selection) => delete(conn, selection).map(Response::Write),
    }
}

fn names_response(names: Vec<String>) -> Response {
    Response::Atom(Value::Array(names.into_iter().map(Value::String).collect()))
}

fn read(conn: &Connection, selection: Selection) -> QueryResult<Response> {
    let tree = conn.open_table(selection.table())?;
    match selection {
        Selection::Get(_, key) => {
            let doc = load(tree.as_ref(), &key)?.unwrap_or(Value::Null);
            Ok(Response::Atom(doc))
        }
        Selection::GetAll(_, keys) => {
            let keys = dedup(keys);
            let raw: Vec<&[u8]> = keys.iter().map(|k| k.as_bytes()).collect();
            let mut docs = Vec::new();
            for bytes in tree.batch_get(&raw)?.into_iter().flatten() {
                docs.push(decode(&bytes)?);
            }
            Ok(Response::Sequence(docs))
        }
        Selection::Table(_) => Ok(Response::Sequence(
            scan(tree.as_ref(), None)?
                .into_iter()
                .map(|(_, doc)| doc)
                .collect(),
        )),
        Selection::Filter(_, predicate) => Ok(Response::Sequence(
            scan(tree.as_ref(), Some(&predicate))?
                .into_iter()
                .map(|(_, doc)| doc)
                .collect(),
        )),
    }
}

fn insert(
    conn: &Connection,
    table: &TableRef,
    docs: Value,
    options: InsertOptions,
) -> QueryResult<WriteResult> {
    let tree = conn.open_table(table)?;
    let lock = conn.write_lock(table);
    let _guard = lock.lock();

    let docs = match docs {
        Value::Array(items) => items,
        other => vec![other],
    };

    let mut result = WriteResult::default();
    let mut staged: BTreeMap<String, Value> = BTreeMap::new();

    for doc in docs {
        let mut object = match doc {
            Value::Object(object) => object,
            other => {
                return Err(QueryError::InvalidDocument(format!(
                    "Expected type OBJECT but found {}",
                    type_name(&other)
                )))
            }
        };

        let key = match object.get(PRIMARY_KEY) {
            Some(Value::String(key)) => key.clone(),
            Some(other) => {
                return Err(QueryError::PrimaryKey(format!(
                    "Primary key `{}` must be a STRING, found {}",
                    PRIMARY_KEY,
                    type_name(other)
                )))
            }
            None => {
                let key = Uuid::new_v4().to_string();
                object.insert(PRIMARY_KEY.to_string(), Value::String(key.clone()));
                result.generated_keys.push(key.clone());
                key
            }
        };

        let existing = match staged.get(&key) {
            Some(doc) => Some(doc.clone()),
            None => load(tree.as_ref(), &key)?,
        };
        let doc = Value::Object(object);

        match existing {
            None => {
                result.inserted += 1;
                staged.insert(key, doc);
            }
            Some(current) => {
                let next = match options.conflict {
                    Conflict::Error => {
                        result.errors += 1;
                        if result.first_error.is_none() {
                            result.first_error =
                                Some(format!("Duplicate primary key `{}`: {}", PRIMARY_KEY, key));
                        }
                        continue;
                    }
                    Conflict::Replace => doc,
                    Conflict::Update => merge(current.clone(), doc),
                };
                if next == current {
                    result.unchanged += 1;
                } else {
                    result.replaced += 1;
                    staged.insert(key, next);
                }
            }
        }
    }

    let encoded = staged
        .iter()
        .map(|(key, doc)| serde_json::to_vec(doc).map(|bytes| (key.as_bytes(), bytes)))
        .collect::<Result<Vec<_>, _>>()?;
    let entries: Vec<(&[u8], &[u8])> = encoded
        .iter()
        .map(|(key, bytes)| (*key, bytes.as_slice()))
        .collect();
    tree.batch_insert(&entries)?;

    log::debug!(
        "insert into {}: {} inserted, {} replaced, {} unchanged, {} errors",
        table,
        result.inserted,
        result.replaced,
        result.unchanged,
        result.errors
    );
    Ok(result)
}

fn delete(conn: &Connection, selection: Selection) -> QueryResult<WriteResult> {
    let tree = conn.open_table(selection.table())?;
    let lock = conn.write_lock(selection.table());
    let _guard = lock.lock();
    let mut result = WriteResult::default();

    let targets: Vec<String> = match &selection {
        Selection::Get(_, key) => vec![key.clone()],
        Selection::GetAll(_, keys) => dedup(keys.clone()),
        Selection::Table(_) => {
            let count = tree.iter()?.count();
            tree.clear()?;
            result.deleted = count;
            log::debug!("delete from {}: {} deleted", selection.table(), count);
            return Ok(result);
        }
        Selection::Filter(_, predicate) => scan(tree.as_ref(), Some(predicate))?
            .into_iter()
            .map(|(key, _)| key)
            .collect(),
    };

    let mut existing = Vec::with_capacity(targets.len());
    for key in &targets {
        if tree.contains_key(key.as_bytes())? {
            existing.push(key.as_bytes());
        } else {
            result.skipped += 1;
        }
    }
    tree.batch_remove(&existing)?;
    result.deleted = existing.len();

    log::debug!(
        "delete from {}: {} deleted, {} skipped",
        selection.table(),
        result.deleted,
        result.skipped
    );
    Ok(result)
}

/// Every document of the tree matching `predicate`, in key order
fn scan(tree: &dyn StorageTree, predicate: Option<&Value>) -> QueryResult<Vec<(String, Value)>> {
    let mut docs = Vec::new();
    for item in tree.iter()? {
        let (key, bytes) = item?;
        let doc = decode(&bytes)?;
        let keep = match predicate {
            Some(predicate) => matches(&doc, predicate)?,
            None => true,
        };
        if keep {
            docs.push((String::from_utf8_lossy(&key).into_owned(), doc));
        }
    }
    Ok(docs)
}

fn load(tree: &dyn StorageTree, key: &str) -> QueryResult<Option<Value>> {
    match tree.get(key.as_bytes())? {
        Some(bytes) => Ok(Some(decode(&bytes)?)),
        None => Ok(None),
    }
}

/// Stored bytes that are not JSON mean the store itself is damaged
fn decode(bytes: &[u8]) -> QueryResult<Value> {
    serde_json::from_slice(bytes).map_err(|e| QueryError::Storage(StorageError::from(e)))
}

fn dedup(keys: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    keys.into_iter()
        .filter(|key| seen.insert(key.clone()))
        .collect()
}

/// Recursive merge: objects merge field by field, anything else is overwritten
pub(crate) fn merge(current: Value, patch: Value) -> Value {
    match (current, patch) {
        (Value::Object(mut current), Value::Object(patch)) => {
            for (field, value) in patch {
                let merged = match current.remove(&field) {
                    Some(existing) => merge(existing, value),
                    None => value,
                };
                current.insert(field, merged);
            }
            Value::Object(current)
        }
        (_, patch) => patch,
    }
}

/// Whether `doc` satisfies a filter predicate
///
/// An object predicate matches when every field equals the document's field;
/// nested objects match as subsets. A boolean predicate keeps all or nothing.
pub(crate) fn matches(doc: &Value, predicate: &Value) -> QueryResult<bool> {
    match predicate {
        Value::Bool(keep) => Ok(*keep),
        Value::Object(fields) => Ok(object_matches(doc, fields)),
        other => Err(QueryError::InvalidDocument(format!(
            "Expected type OBJECT or BOOL as filter predicate but found {}",
            type_name(other)
        ))),
    }
}

fn object_matches(doc: &Value, fields: &Map<String, Value>) -> bool {
    fields.iter().all(|(field, expected)| match doc.get(field) {
        Some(actual) => match (actual, expected) {
            (Value::Object(_), Value::Object(nested)) => object_matches(actual, nested),
            _ => values_equal(actual, expected),
        },
        None => false,
    })
}

/// JSON equality where `1` and `1.0` are the same number
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NULL",
        Value::Bool(_) => "BOOL",
        Value::Number(_) => "NUMBER",
        Value::String(_) => "STRING",
        Value::Array(_) => "ARRAY",
        Value::Object(_) => "OBJECT",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_keeps_untouched_fields() {
        let merged = merge(
            json!({"id": "a", "x": 1, "nested": {"p": 1, "q": 2}}),
            json!({"id": "a", "y": 2, "nested": {"q": 3}}),
        );
        assert_eq!(
            merged,
            json!({"id": "a", "x": 1, "y": 2, "nested": {"p": 1, "q": 3}})
        );
    }

    #[test]
    fn test_merge_overwrites_non_objects() {
        assert_eq!(
            merge(json!({"tags": [1, 2]}), json!({"tags": [3]})),
            json!({"tags": [3]})
        );
        assert_eq!(merge(json!({"x": {"a": 1}}), json!({"x": 5})), json!({"x": 5}));
    }

    #[test]
    fn test_object_predicate_requires_every_field() {
        let doc = json!({"id": "a", "kind": "cat", "age": 3, "owner": {"name": "kim", "zip": "1"}});

        assert!(matches(&doc, &json!({})).unwrap());
        assert!(matches(&doc, &json!({"kind": "cat"})).unwrap());
        assert!(matches(&doc, &json!({"kind": "cat", "age": 3.0})).unwrap());
        assert!(!matches(&doc, &json!({"kind": "cat", "age": 4})).unwrap());
        assert!(!matches(&doc, &json!({"missing": null})).unwrap());
        assert!(matches(&doc, &json!({"owner": {"name": "kim"}})).unwrap());
        assert!(!matches(&doc, &json!({"owner": {"name": "lee"}})).unwrap());
    }

    #[test]
    fn test_boolean_and_invalid_predicates() {
        let doc = json!({"id": "a"});
        assert!(matches(&doc, &json!(true)).unwrap());
        assert!(!matches(&doc, &json!(false)).unwrap());
        assert!(matches!(
            matches(&doc, &json!("a")),
            Err(QueryError::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_dedup_keeps_first_occurrence_order() {
        let keys = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(dedup(keys), vec!["b".to_string(), "a".to_string()]);
    }
}
