//! Test fixture for datasack integration tests
//!
//! Uses only the public API: a connection, the query client for setup, and
//! drivers bound to freshly created tables.

use datasack::{r, Connection, ConnectionConfig, Document, DocumentDriver, Entry};

pub type FixtureResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Test fixture with an isolated store and database
pub struct TestFixture {
    pub conn: Connection,
    db_name: String,
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestFixture {
    /// Fixture over an in-memory store
    pub async fn memory() -> FixtureResult<Self> {
        Self::setup(Connection::memory()?, None).await
    }

    /// Fixture over a sled store in a temporary directory
    pub async fn sled() -> FixtureResult<Self> {
        let temp_dir = tempfile::tempdir()?;
        let conn = Connection::open(&ConnectionConfig::sled(temp_dir.path().join("store")))?;
        Self::setup(conn, Some(temp_dir)).await
    }

    async fn setup(conn: Connection, temp_dir: Option<tempfile::TempDir>) -> FixtureResult<Self> {
        // Unique database name per fixture
        let db_name = format!("test_db_{}", fastrand::u64(..));
        r::db_create(db_name.as_str()).run(&conn).await?;

        Ok(TestFixture {
            conn,
            db_name,
            _temp_dir: temp_dir,
        })
    }

    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    /// Create `table` and bind a schemaless driver to it
    pub async fn documents(&self, table: &str) -> FixtureResult<DocumentDriver<Document>> {
        self.driver(table).await
    }

    /// Create `table` and bind a typed driver to it
    pub async fn driver<E: Entry + 'static>(&self, table: &str) -> FixtureResult<DocumentDriver<E>> {
        r::db(self.db_name.as_str())
            .table_create(table)
            .run(&self.conn)
            .await?;
        Ok(DocumentDriver::new(
            self.conn.clone(),
            self.db_name.as_str(),
            table,
        ))
    }
}
