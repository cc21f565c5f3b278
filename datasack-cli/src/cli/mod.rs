// Copyright (c) 2024-2025 Datasack Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for datasack
//!
//! Provides one-shot commands for creating databases and tables and for
//! reading and writing entries through a document driver.

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{Cli, Commands};
pub use handlers::{
    handle_db_create, handle_delete, handle_fetch, handle_find, handle_insert, handle_table_create,
    handle_tables, handle_update,
};
