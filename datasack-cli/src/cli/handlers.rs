// Copyright (c) 2024-2025 Datasack Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command handlers for datasack

use colored::Colorize;
use datasack::{
    r, Connection, ConnectionConfig, Document, DocumentDriver, EntryRef, Filter, StorageDriver,
};
use serde_json::Value;

use super::commands::{OutputFormat, StoreArgs};
use super::output::ResultFormatter;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open the store described by the global arguments
fn open_store(store: &StoreArgs) -> Result<Connection, Box<dyn std::error::Error>> {
    let conn = Connection::open(&ConnectionConfig::sled(store.path.clone()))
        .map_err(|e| format!("Failed to open store at {:?}: {}", store.path, e))?;
    log::debug!("Opened store at {:?}", store.path);
    Ok(conn)
}

fn driver(conn: &Connection, store: &StoreArgs) -> DocumentDriver<Document, Filter> {
    DocumentDriver::new(conn.clone(), store.db.as_str(), store.table.as_str())
}

/// Run `body` against an open store and close it afterwards, reporting errors in red
async fn with_store<F, Fut>(store: StoreArgs, body: F) -> CliResult
where
    F: FnOnce(Connection, StoreArgs) -> Fut,
    Fut: std::future::Future<Output = CliResult>,
{
    let conn = open_store(&store)?;
    let result = body(conn.clone(), store).await;
    let closed = conn.close();
    if let Err(e) = &result {
        eprintln!("{}", format!("Error: {}", e).red());
    }
    // The command's own error wins over a failed close
    result?;
    closed?;
    Ok(())
}

pub async fn handle_db_create(store: StoreArgs, format: OutputFormat) -> CliResult {
    with_store(store, |conn, store| async move {
        r::db_create(store.db.as_str()).run(&conn).await?;
        println!(
            "{}",
            ResultFormatter::format_message(&format!("Database `{}` created", store.db), format)
        );
        Ok(())
    })
    .await
}

pub async fn handle_table_create(store: StoreArgs, format: OutputFormat) -> CliResult {
    with_store(store, |conn, store| async move {
        r::db(store.db.as_str())
            .table_create(store.table.as_str())
            .run(&conn)
            .await?;
        println!(
            "{}",
            ResultFormatter::format_message(
                &format!("Table `{}.{}` created", store.db, store.table),
                format
            )
        );
        Ok(())
    })
    .await
}

pub async fn handle_tables(store: StoreArgs, format: OutputFormat) -> CliResult {
    with_store(store, |conn, store| async move {
        let mut tables = r::db(store.db.as_str())
            .table_list()
            .run(&conn)
            .await?
            .into_names()?;
        tables.sort();
        print!("{}", ResultFormatter::format_names("Tables", &tables, format));
        Ok(())
    })
    .await
}

pub async fn handle_fetch(store: StoreArgs, id: String, format: OutputFormat) -> CliResult {
    with_store(store, |conn, store| async move {
        match driver(&conn, &store).fetch(&id).await? {
            Some(entry) => print!("{}", ResultFormatter::format_entries(&[entry], format)),
            None => println!("{}", format!("No entry with id `{}`", id).yellow()),
        }
        Ok(())
    })
    .await
}

pub async fn handle_find(store: StoreArgs, conditions: Vec<String>, format: OutputFormat) -> CliResult {
    let filter = parse_filter(&conditions)?;
    with_store(store, |conn, store| async move {
        let entries = driver(&conn, &store).find(filter.as_ref()).await?;
        print!("{}", ResultFormatter::format_entries(&entries, format));
        Ok(())
    })
    .await
}

pub async fn handle_insert(store: StoreArgs, json: String, format: OutputFormat) -> CliResult {
    let entries = parse_entries(&json)?;
    with_store(store, |conn, store| async move {
        driver(&conn, &store).insert_collection(&entries).await?;
        println!(
            "{}",
            ResultFormatter::format_message(&format!("{} entry(ies) inserted", entries.len()), format)
        );
        Ok(())
    })
    .await
}

pub async fn handle_update(store: StoreArgs, json: String, format: OutputFormat) -> CliResult {
    let entries = parse_entries(&json)?;
    with_store(store, |conn, store| async move {
        driver(&conn, &store).update_collection(&entries).await?;
        println!(
            "{}",
            ResultFormatter::format_message(&format!("{} entry(ies) updated", entries.len()), format)
        );
        Ok(())
    })
    .await
}

pub async fn handle_delete(store: StoreArgs, ids: Vec<String>, format: OutputFormat) -> CliResult {
    with_store(store, |conn, store| async move {
        let targets: Vec<EntryRef<'_, Document>> =
            ids.iter().map(|id| EntryRef::Id(id.as_str())).collect();
        driver(&conn, &store).delete_collection(&targets).await?;
        println!(
            "{}",
            ResultFormatter::format_message(&format!("{} id(s) deleted", ids.len()), format)
        );
        Ok(())
    })
    .await
}

/// Parse `key=value` conditions; values are JSON when they parse, strings otherwise
fn parse_filter(conditions: &[String]) -> Result<Option<Filter>, String> {
    if conditions.is_empty() {
        return Ok(None);
    }
    let mut filter = Filter::new();
    for condition in conditions {
        let (key, raw) = condition
            .split_once('=')
            .ok_or_else(|| format!("Invalid condition `{}`, expected KEY=VALUE", condition))?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        filter = filter.where_eq(key, value);
    }
    Ok(Some(filter))
}

/// Parse one JSON object or an array of objects
fn parse_entries(json: &str) -> Result<Vec<Document>, Box<dyn std::error::Error>> {
    let value: Value = serde_json::from_str(json)?;
    let entries = match value {
        Value::Array(items) => items
            .into_iter()
            .map(Document::try_from)
            .collect::<Result<Vec<_>, _>>()?,
        other => vec![Document::try_from(other)?],
    };
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use datasack::Entry;
    use serde_json::json;

    #[test]
    fn test_parse_filter() {
        assert_eq!(parse_filter(&[]).unwrap(), None);

        let filter = parse_filter(&["kind=cat".to_string(), "age=3".to_string()])
            .unwrap()
            .unwrap();
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({"kind": "cat", "age": 3})
        );

        assert!(parse_filter(&["nokey".to_string()]).is_err());
    }

    #[tokio::test]
    async fn test_with_store_reports_command_error_after_closing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = StoreArgs {
            path: temp_dir.path().join("store"),
            db: "missing".to_string(),
            table: "documents".to_string(),
        };

        let mut used = None;
        let err = with_store(store, |conn, store| {
            used = Some(conn.clone());
            async move {
                r::db(store.db.as_str()).table_list().run(&conn).await?;
                Ok(())
            }
        })
        .await
        .unwrap_err();

        assert!(err.to_string().contains("Database `missing` does not exist."));
        assert!(!used.unwrap().is_open());
    }

    #[test]
    fn test_parse_entries() {
        let one = parse_entries(r#"{"id": "a"}"#).unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].id(), "a");

        let many = parse_entries(r#"[{"id": "a"}, {"id": "b"}]"#).unwrap();
        assert_eq!(many.len(), 2);

        assert!(parse_entries("[1]").is_err());
        assert!(parse_entries("not json").is_err());
    }
}
