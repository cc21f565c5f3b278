// Copyright (c) 2024-2025 Datasack Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Query entry points

use super::builder::{Db, Query};
use super::term::Term;

/// Reference a database
pub fn db(name: impl Into<String>) -> Db {
    Db::new(name)
}

pub fn db_create(name: impl Into<String>) -> Query {
    Query::new(Term::DbCreate(name.into()))
}

/// Drop a database together with all of its tables
pub fn db_drop(name: impl Into<String>) -> Query {
    Query::new(Term::DbDrop(name.into()))
}

pub fn db_list() -> Query {
    Query::new(Term::DbList)
}
