// Copyright (c) 2024-2025 Datasack Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Entry and filter types handled by storage drivers

use crate::query::PRIMARY_KEY;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::{Deref, DerefMut};

/// A persisted record identified by a string id
///
/// Drivers impose no structure beyond the id; everything else is whatever
/// the record serializes to.
pub trait Entry: Serialize + DeserializeOwned + Send + Sync {
    fn id(&self) -> &str;
}

/// Target of a delete: a bare id or a whole entry
#[derive(Debug)]
pub enum EntryRef<'a, E> {
    Id(&'a str),
    Entry(&'a E),
}

impl<'a, E: Entry> EntryRef<'a, E> {
    /// Identifier addressed by this target
    pub fn key(&self) -> &'a str {
        match *self {
            EntryRef::Id(id) => id,
            EntryRef::Entry(entry) => entry.id(),
        }
    }
}

impl<E> Clone for EntryRef<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for EntryRef<'_, E> {}

/// Schemaless entry backed by a JSON object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document with only its id set
    pub fn with_id(id: impl Into<String>) -> Self {
        Self::new().set(PRIMARY_KEY, id.into())
    }

    /// Builder-style field assignment
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl Entry for Document {
    /// Documents without a string `id` report an empty id
    fn id(&self) -> &str {
        self.0
            .get(PRIMARY_KEY)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

impl Deref for Document {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Document {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Document {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value)
    }
}

/// Field-equality predicate passed verbatim to the backend
///
/// An empty filter matches every entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter(Map<String, Value>);

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl From<Map<String, Value>> for Filter {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
