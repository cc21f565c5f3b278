// Copyright (c) 2024-2025 Datasack Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Result formatting for CLI output

use super::commands::OutputFormat;
use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use datasack::Document;
use serde_json::Value;
use std::collections::BTreeSet;

/// Result formatter for different output formats
pub struct ResultFormatter;

impl ResultFormatter {
    /// Format entries, one row per entry and one column per field
    pub fn format_entries(entries: &[Document], format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => Self::entries_table(entries),
            OutputFormat::Json => Self::to_json(&serde_json::json!(entries)),
        }
    }

    /// Format a list of names (databases or tables)
    pub fn format_names(title: &str, names: &[String], format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => {
                if names.is_empty() {
                    return format!("{}\n", "No results found".yellow());
                }
                let mut table = Table::new();
                table.load_preset(UTF8_FULL);
                table.set_header(vec![Cell::new(title).fg(Color::Green)]);
                for name in names {
                    table.add_row(vec![name.as_str()]);
                }
                format!("{}\n", table)
            }
            OutputFormat::Json => Self::to_json(&serde_json::json!(names)),
        }
    }

    /// Format a success message
    pub fn format_message(message: &str, format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => format!("{}", format!("✅ {}", message).green()),
            OutputFormat::Json => Self::to_json(&serde_json::json!({
                "status": "success",
                "message": message,
            })),
        }
    }

    fn entries_table(entries: &[Document]) -> String {
        if entries.is_empty() {
            return format!("{}\n", "No results found".yellow());
        }

        // `id` first, remaining fields in sorted order
        let fields: BTreeSet<&String> = entries
            .iter()
            .flat_map(|entry| entry.keys())
            .filter(|field| field.as_str() != datasack::query::PRIMARY_KEY)
            .collect();
        let mut columns = vec![datasack::query::PRIMARY_KEY];
        columns.extend(fields.iter().map(|field| field.as_str()));

        let mut output = String::new();
        output.push_str(&format!("Entries returned: {}\n\n", entries.len()));

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(
            columns
                .iter()
                .map(|column| Cell::new(column).fg(Color::Green))
                .collect::<Vec<_>>(),
        );
        for entry in entries {
            let row: Vec<String> = columns
                .iter()
                .map(|column| {
                    entry
                        .get(*column)
                        .map(Self::value_to_string)
                        .unwrap_or_default()
                })
                .collect();
            table.add_row(row);
        }

        output.push_str(&table.to_string());
        output.push('\n');
        output
    }

    fn value_to_string(value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn to_json(value: &Value) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| {
            "{\"status\": \"error\", \"error\": \"Could not serialize results to JSON\"}"
                .to_string()
        })
    }
}
