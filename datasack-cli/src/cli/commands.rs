// Copyright (c) 2024-2025 Datasack Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Command-line arguments

use clap::{Args, Parser, Subcommand, ValueEnum};
use datasack::config::DEFAULT_DATA_PATH;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "datasack", version, about = "Datasack document store CLI")]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<log::Level>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the store lives and which table commands address
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Store directory (sled)
    #[arg(long, global = true, default_value = DEFAULT_DATA_PATH)]
    pub path: PathBuf,

    /// Database name
    #[arg(long, global = true, default_value = "app")]
    pub db: String,

    /// Table name
    #[arg(long, global = true, default_value = "documents")]
    pub table: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version,

    /// Create the database given by --db
    DbCreate,

    /// Create the table given by --table
    TableCreate,

    /// List the tables of the database
    Tables,

    /// Fetch one entry by id
    Fetch { id: String },

    /// List entries, optionally filtered by field equality
    Find {
        /// Field condition as key=value; value is parsed as JSON when possible
        #[arg(long = "where", value_name = "KEY=VALUE")]
        conditions: Vec<String>,
    },

    /// Insert an entry, replacing any entry with the same id
    Insert { json: String },

    /// Merge an entry into any entry with the same id
    Update { json: String },

    /// Delete entries by id
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}
