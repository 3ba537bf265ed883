//! Shared fixtures for integration tests.

#![allow(dead_code)]

use campaign_inspect::DbResult;
use campaign_inspect::db::{CatalogSource, DbConnection};
use campaign_inspect::models::{ColumnDescriptor, ConnectionTarget, SampleRow};
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// A SQLite file on disk that lives as long as the returned handle.
pub struct Fixture {
    pub file: NamedTempFile,
    pub url: String,
}

impl Fixture {
    pub fn target(&self) -> ConnectionTarget {
        ConnectionTarget::parse(&self.url).expect("fixture URL should parse")
    }

    /// Execute each statement on a fresh connection, then close it.
    pub async fn execute(&self, statements: &[&str]) {
        let mut conn = DbConnection::connect(&self.target())
            .await
            .expect("Failed to connect to fixture");
        if let DbConnection::SQLite(c) = &mut conn {
            for sql in statements {
                sqlx::query(sql)
                    .execute(&mut *c)
                    .await
                    .expect("Failed to prepare fixture");
            }
        }
        conn.close().await.expect("Failed to close fixture connection");
    }

    /// Switch the file to WAL journaling. The setting persists in the file.
    pub async fn use_wal(&self) {
        self.execute(&["PRAGMA journal_mode=WAL"]).await;
    }

    /// SQLite removes this file when the last connection to a WAL database closes.
    pub fn wal_path(&self) -> PathBuf {
        let mut path = self.file.path().as_os_str().to_owned();
        path.push("-wal");
        PathBuf::from(path)
    }

    /// Insert the `SEEDED` campaigns.
    pub async fn seed(&self) {
        let statements = seed_statements();
        let refs: Vec<&str> = statements.iter().map(String::as_str).collect();
        self.execute(&refs).await;
    }

    /// Count rows with a direct query, bypassing the inspector.
    pub async fn count(&self, table: &str) -> i64 {
        let mut conn = DbConnection::connect(&self.target()).await.unwrap();
        let count = match &mut conn {
            DbConnection::SQLite(c) => {
                sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
                    .fetch_one(&mut *c)
                    .await
                    .unwrap()
            }
            _ => unreachable!("fixtures are SQLite"),
        };
        conn.close().await.unwrap();
        count
    }
}

/// Create an empty SQLite database file.
pub fn empty_fixture() -> Fixture {
    let file = NamedTempFile::new().expect("Failed to create temp file");
    let url = format!("sqlite:{}?mode=rwc", file.path().display());
    Fixture { file, url }
}

pub const CREATE_CAMPAIGNS: &str = "CREATE TABLE campaigns (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    slug TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'draft',
    cover_image TEXT
)";

pub const CREATE_CAMPAIGNS_NO_COVER: &str = "CREATE TABLE campaigns (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    slug TEXT NOT NULL,
    Cover_Image TEXT
)";

/// Titles and slugs inserted by `seed_campaigns`.
pub const SEEDED: [(&str, &str); 5] = [
    ("Clean Water", "clean-water"),
    ("Solar Schools", "solar-schools"),
    ("Food Bank Drive", "food-bank-drive"),
    ("Library Books", "library-books"),
    ("Park Cleanup", "park-cleanup"),
];

pub fn seed_statements() -> Vec<String> {
    SEEDED
        .iter()
        .enumerate()
        .map(|(i, (title, slug))| {
            format!(
                "INSERT INTO campaigns (id, title, description, slug) VALUES ({}, '{}', 'About {}', '{}')",
                i + 1,
                title,
                title,
                slug
            )
        })
        .collect()
}

/// Wraps a real connection and records which queries the inspector issued.
pub struct CountingCatalog<'a> {
    pub inner: &'a mut DbConnection,
    pub calls: Vec<&'static str>,
}

impl<'a> CountingCatalog<'a> {
    pub fn new(inner: &'a mut DbConnection) -> Self {
        Self {
            inner,
            calls: Vec::new(),
        }
    }
}

impl CatalogSource for CountingCatalog<'_> {
    async fn table_exists(&mut self, table: &str) -> DbResult<bool> {
        self.calls.push("exists");
        self.inner.table_exists(table).await
    }

    async fn columns(&mut self, table: &str) -> DbResult<Vec<ColumnDescriptor>> {
        self.calls.push("columns");
        self.inner.columns(table).await
    }

    async fn row_count(&mut self, table: &str) -> DbResult<i64> {
        self.calls.push("count");
        self.inner.row_count(table).await
    }

    async fn sample_rows(&mut self, table: &str, limit: i64) -> DbResult<Vec<SampleRow>> {
        self.calls.push("sample");
        self.inner.sample_rows(table, limit).await
    }
}
