// Copyright (c) 2024-2025 Datasack Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! datasack CLI entry point

use clap::Parser;
use colored::Colorize;

mod cli;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments first to get log level
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else if let Some(level) = cli.log_level {
        level.to_level_filter()
    } else {
        // Default to Warn (can still be overridden by RUST_LOG env var)
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    let store = cli.store;
    let format = cli.format;

    match cli.command {
        Commands::Version => {
            println!("{} {}", "datasack".bold().green(), datasack::VERSION);
            println!("Storage drivers over an embedded document store");
            Ok(())
        }

        Commands::DbCreate => cli::handle_db_create(store, format).await,

        Commands::TableCreate => cli::handle_table_create(store, format).await,

        Commands::Tables => cli::handle_tables(store, format).await,

        Commands::Fetch { id } => cli::handle_fetch(store, id, format).await,

        Commands::Find { conditions } => cli::handle_find(store, conditions, format).await,

        Commands::Insert { json } => cli::handle_insert(store, json, format).await,

        Commands::Update { json } => cli::handle_update(store, json, format).await,

        Commands::Delete { ids } => cli::handle_delete(store, ids, format).await,
    }
}
