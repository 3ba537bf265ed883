//! Catalog queries issued by an inspection pass.
//!
//! This module provides the four read-only queries the inspector needs:
//! an existence predicate, ordered column metadata, a row count and a bounded
//! sample. They are the operations of the `CatalogSource` trait so the
//! inspector can run against anything that answers them.
//!
//! # Architecture
//!
//! SQL is organized in the `queries` submodule with constants for each
//! database type. Backend-specific implementations are in their respective
//! submodules (postgres, mysql, sqlite), each providing the same interface.

use crate::db::DbConnection;
use crate::error::DbResult;
use crate::models::{ColumnDescriptor, DatabaseType, SampleRow};
use tracing::debug;

/// Read-only catalog access for a single table.
#[allow(async_fn_in_trait)]
pub trait CatalogSource {
    /// Whether the catalog lists a table with exactly this name.
    async fn table_exists(&mut self, table: &str) -> DbResult<bool>;

    /// Column descriptors in ordinal-position order.
    async fn columns(&mut self, table: &str) -> DbResult<Vec<ColumnDescriptor>>;

    /// `COUNT(*)` over the table.
    async fn row_count(&mut self, table: &str) -> DbResult<i64>;

    /// Up to `limit` rows of the `(id, title, description, slug)` projection,
    /// in whatever order the database returns them.
    async fn sample_rows(&mut self, table: &str, limit: i64) -> DbResult<Vec<SampleRow>>;
}

impl CatalogSource for DbConnection {
    async fn table_exists(&mut self, table: &str) -> DbResult<bool> {
        let exists = impl_db_dispatch!(self, {
            MySql(c) => mysql::table_exists(c, table).await?,
            Postgres(c) => postgres::table_exists(c, table).await?,
            SQLite(c) => sqlite::table_exists(c, table).await?,
        });
        debug!(table, exists, "Checked table existence");
        Ok(exists)
    }

    async fn columns(&mut self, table: &str) -> DbResult<Vec<ColumnDescriptor>> {
        let columns = impl_db_dispatch!(self, {
            MySql(c) => mysql::columns(c, table).await?,
            Postgres(c) => postgres::columns(c, table).await?,
            SQLite(c) => sqlite::columns(c, table).await?,
        });
        debug!(table, count = columns.len(), "Fetched column metadata");
        Ok(columns)
    }

    async fn row_count(&mut self, table: &str) -> DbResult<i64> {
        let sql = queries::count_rows(self.db_type(), table);
        let count = impl_db_dispatch!(self, {
            MySql(c) => sqlx::query_scalar::<_, i64>(&sql).fetch_one(&mut *c).await?,
            Postgres(c) => sqlx::query_scalar::<_, i64>(&sql).fetch_one(&mut *c).await?,
            SQLite(c) => sqlx::query_scalar::<_, i64>(&sql).fetch_one(&mut *c).await?,
        });
        debug!(table, count, "Counted rows");
        Ok(count)
    }

    async fn sample_rows(&mut self, table: &str, limit: i64) -> DbResult<Vec<SampleRow>> {
        let sql = queries::sample_rows(self.db_type(), table);
        let rows = impl_db_dispatch!(self, {
            MySql(c) => mysql::sample_rows(c, &sql, limit).await?,
            Postgres(c) => postgres::sample_rows(c, &sql, limit).await?,
            SQLite(c) => sqlite::sample_rows(c, &sql, limit).await?,
        });
        debug!(table, limit, count = rows.len(), "Fetched sample rows");
        Ok(rows)
    }
}

// =============================================================================
// SQL Query Templates
// =============================================================================

mod queries {
    use super::DatabaseType;

    pub mod postgres {
        pub const TABLE_EXISTS: &str = r#"
            SELECT EXISTS (
                SELECT FROM information_schema.tables
                WHERE table_name = $1
            ) AS table_exists
            "#;

        pub const COLUMNS: &str = r#"
            SELECT
                column_name::text AS column_name,
                data_type::text AS data_type,
                is_nullable::text AS is_nullable,
                column_default::text AS column_default
            FROM information_schema.columns
            WHERE table_name = $1
            ORDER BY ordinal_position
            "#;
    }

    pub mod mysql {
        pub const TABLE_EXISTS: &str = r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.TABLES
                WHERE TABLE_SCHEMA = DATABASE()
                AND TABLE_NAME = ?
            ) AS table_exists
            "#;

        pub const COLUMNS: &str = r#"
            SELECT
                CONVERT(COLUMN_NAME USING utf8) AS COLUMN_NAME,
                CONVERT(DATA_TYPE USING utf8) AS DATA_TYPE,
                CONVERT(IS_NULLABLE USING utf8) AS IS_NULLABLE,
                CONVERT(COLUMN_DEFAULT USING utf8) AS COLUMN_DEFAULT
            FROM information_schema.COLUMNS
            WHERE TABLE_SCHEMA = DATABASE()
            AND TABLE_NAME = ?
            ORDER BY ORDINAL_POSITION
            "#;
    }

    pub mod sqlite {
        pub const TABLE_EXISTS: &str = r#"
            SELECT EXISTS (
                SELECT 1 FROM sqlite_master
                WHERE type = 'table'
                AND name = ?
            ) AS table_exists
            "#;

        pub const COLUMNS: &str = r#"
            SELECT name, type, "notnull" AS not_null, dflt_value
            FROM pragma_table_info(?)
            ORDER BY cid
            "#;
    }

    /// Quote an identifier for the given dialect, doubling embedded quotes.
    pub fn quote_ident(db: DatabaseType, ident: &str) -> String {
        match db {
            DatabaseType::MySQL => format!("`{}`", ident.replace('`', "``")),
            DatabaseType::PostgreSQL | DatabaseType::SQLite => {
                format!("\"{}\"", ident.replace('"', "\"\""))
            }
        }
    }

    pub fn count_rows(db: DatabaseType, table: &str) -> String {
        format!(
            "SELECT COUNT(*) AS row_count FROM {}",
            quote_ident(db, table)
        )
    }

    /// Fixed four-column projection, every column read as text. No ORDER BY.
    pub fn sample_rows(db: DatabaseType, table: &str) -> String {
        let (text, limit) = match db {
            DatabaseType::PostgreSQL => ("TEXT", "$1"),
            DatabaseType::MySQL => ("CHAR", "?"),
            DatabaseType::SQLite => ("TEXT", "?"),
        };
        format!(
            "SELECT CAST(id AS {text}) AS id, CAST(title AS {text}) AS title, \
             CAST(description AS {text}) AS description, CAST(slug AS {text}) AS slug \
             FROM {} LIMIT {limit}",
            quote_ident(db, table)
        )
    }
}

// =============================================================================
// Database-Specific Implementations
// =============================================================================

mod postgres {
    use super::*;
    use sqlx::{PgConnection, Row};

    pub async fn table_exists(conn: &mut PgConnection, table: &str) -> DbResult<bool> {
        let exists: bool = sqlx::query_scalar(queries::postgres::TABLE_EXISTS)
            .bind(table)
            .fetch_one(&mut *conn)
            .await?;
        Ok(exists)
    }

    pub async fn columns(conn: &mut PgConnection, table: &str) -> DbResult<Vec<ColumnDescriptor>> {
        let rows = sqlx::query(queries::postgres::COLUMNS)
            .bind(table)
            .fetch_all(&mut *conn)
            .await?;

        rows.iter()
            .map(|row| -> DbResult<ColumnDescriptor> {
                let name: String = row.try_get("column_name")?;
                let data_type: String = row.try_get("data_type")?;
                let nullable: String = row.try_get("is_nullable")?;
                let default: Option<String> = row.try_get("column_default")?;
                Ok(ColumnDescriptor::new(name, data_type, nullable).with_default(default))
            })
            .collect()
    }

    pub async fn sample_rows(
        conn: &mut PgConnection,
        sql: &str,
        limit: i64,
    ) -> DbResult<Vec<SampleRow>> {
        let rows = sqlx::query(sql).bind(limit).fetch_all(&mut *conn).await?;

        rows.iter()
            .map(|row| -> DbResult<SampleRow> {
                Ok(SampleRow {
                    id: row.try_get("id")?,
                    title: row.try_get("title")?,
                    description: row.try_get("description")?,
                    slug: row.try_get("slug")?,
                })
            })
            .collect()
    }
}

mod mysql {
    use super::*;
    use sqlx::{MySqlConnection, Row};

    /// Safely get a string from a MySQL row.
    /// Catalog columns may come back as VARBINARY depending on server collation.
    fn get_string(row: &sqlx::mysql::MySqlRow, column: &str) -> String {
        row.try_get::<String, _>(column)
            .ok()
            .or_else(|| {
                row.try_get::<Vec<u8>, _>(column)
                    .ok()
                    .and_then(|bytes| String::from_utf8(bytes).ok())
            })
            .unwrap_or_default()
    }

    /// Safely get an optional string from a MySQL row.
    fn get_optional_string(row: &sqlx::mysql::MySqlRow, column: &str) -> Option<String> {
        row.try_get::<Option<String>, _>(column)
            .ok()
            .flatten()
            .or_else(|| {
                row.try_get::<Option<Vec<u8>>, _>(column)
                    .ok()
                    .flatten()
                    .and_then(|bytes| String::from_utf8(bytes).ok())
            })
    }

    pub async fn table_exists(conn: &mut MySqlConnection, table: &str) -> DbResult<bool> {
        let exists: i64 = sqlx::query_scalar(queries::mysql::TABLE_EXISTS)
            .bind(table)
            .fetch_one(&mut *conn)
            .await?;
        Ok(exists != 0)
    }

    pub async fn columns(
        conn: &mut MySqlConnection,
        table: &str,
    ) -> DbResult<Vec<ColumnDescriptor>> {
        let rows = sqlx::query(queries::mysql::COLUMNS)
            .bind(table)
            .fetch_all(&mut *conn)
            .await?;

        Ok(rows
            .iter()
            .map(|row| {
                ColumnDescriptor::new(
                    get_string(row, "COLUMN_NAME"),
                    get_string(row, "DATA_TYPE"),
                    get_string(row, "IS_NULLABLE"),
                )
                .with_default(get_optional_string(row, "COLUMN_DEFAULT"))
            })
            .collect())
    }

    pub async fn sample_rows(
        conn: &mut MySqlConnection,
        sql: &str,
        limit: i64,
    ) -> DbResult<Vec<SampleRow>> {
        let rows = sqlx::query(sql).bind(limit).fetch_all(&mut *conn).await?;

        Ok(rows
            .iter()
            .map(|row| SampleRow {
                id: get_optional_string(row, "id"),
                title: get_optional_string(row, "title"),
                description: get_optional_string(row, "description"),
                slug: get_optional_string(row, "slug"),
            })
            .collect())
    }
}

mod sqlite {
    use super::*;
    use sqlx::{Row, SqliteConnection};

    pub async fn table_exists(conn: &mut SqliteConnection, table: &str) -> DbResult<bool> {
        let exists: i64 = sqlx::query_scalar(queries::sqlite::TABLE_EXISTS)
            .bind(table)
            .fetch_one(&mut *conn)
            .await?;
        Ok(exists != 0)
    }

    pub async fn columns(
        conn: &mut SqliteConnection,
        table: &str,
    ) -> DbResult<Vec<ColumnDescriptor>> {
        let rows = sqlx::query(queries::sqlite::COLUMNS)
            .bind(table)
            .fetch_all(&mut *conn)
            .await?;

        rows.iter()
            .map(|row| -> DbResult<ColumnDescriptor> {
                let name: String = row.try_get("name")?;
                let data_type: String = row.try_get("type")?;
                let not_null: i64 = row.try_get("not_null")?;
                let default: Option<String> = row.try_get("dflt_value")?;
                let nullable = if not_null == 0 { "YES" } else { "NO" };
                Ok(ColumnDescriptor::new(name, data_type, nullable).with_default(default))
            })
            .collect()
    }

    pub async fn sample_rows(
        conn: &mut SqliteConnection,
        sql: &str,
        limit: i64,
    ) -> DbResult<Vec<SampleRow>> {
        let rows = sqlx::query(sql).bind(limit).fetch_all(&mut *conn).await?;

        rows.iter()
            .map(|row| -> DbResult<SampleRow> {
                Ok(SampleRow {
                    id: row.try_get("id")?,
                    title: row.try_get("title")?,
                    description: row.try_get("description")?,
                    slug: row.try_get("slug")?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident_postgres() {
        assert_eq!(
            queries::quote_ident(DatabaseType::PostgreSQL, "campaigns"),
            "\"campaigns\""
        );
        assert_eq!(
            queries::quote_ident(DatabaseType::SQLite, "we\"ird"),
            "\"we\"\"ird\""
        );
    }

    #[test]
    fn test_quote_ident_mysql() {
        assert_eq!(
            queries::quote_ident(DatabaseType::MySQL, "camp`aigns"),
            "`camp``aigns`"
        );
    }

    #[test]
    fn test_sample_rows_sql_has_no_order_by() {
        for db in [
            DatabaseType::PostgreSQL,
            DatabaseType::MySQL,
            DatabaseType::SQLite,
        ] {
            let sql = queries::sample_rows(db, "campaigns");
            assert!(!sql.to_uppercase().contains("ORDER BY"));
            assert!(sql.contains("LIMIT"));
        }
        assert!(queries::sample_rows(DatabaseType::PostgreSQL, "campaigns").ends_with("LIMIT $1"));
        assert!(queries::sample_rows(DatabaseType::MySQL, "campaigns").contains("AS CHAR"));
    }

    async fn fixture() -> DbConnection {
        let target = crate::models::ConnectionTarget::parse("sqlite::memory:").unwrap();
        let mut conn = DbConnection::connect(&target).await.unwrap();
        if let DbConnection::SQLite(c) = &mut conn {
            sqlx::query(
                "CREATE TABLE campaigns (
                    id INTEGER PRIMARY KEY,
                    title TEXT NOT NULL,
                    description TEXT,
                    slug TEXT NOT NULL DEFAULT 'untitled',
                    cover_image TEXT
                )",
            )
            .execute(&mut *c)
            .await
            .unwrap();
            sqlx::query(
                "INSERT INTO campaigns (id, title, description, slug) VALUES
                    (1, 'Clean Water', NULL, 'clean-water'),
                    (2, 'Solar Schools', 'Panels for rural schools', 'solar-schools')",
            )
            .execute(&mut *c)
            .await
            .unwrap();
        }
        conn
    }

    #[tokio::test]
    async fn test_sqlite_table_exists() {
        let mut conn = fixture().await;
        assert!(conn.table_exists("campaigns").await.unwrap());
        assert!(!conn.table_exists("Campaigns").await.unwrap());
        assert!(!conn.table_exists("users").await.unwrap());
        conn.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_sqlite_columns_in_ordinal_order() {
        let mut conn = fixture().await;
        let columns = conn.columns("campaigns").await.unwrap();

        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["id", "title", "description", "slug", "cover_image"]
        );
        assert_eq!(columns[1].data_type, "TEXT");
        assert_eq!(columns[1].is_nullable, "NO");
        assert_eq!(columns[2].is_nullable, "YES");
        assert_eq!(columns[3].default.as_deref(), Some("'untitled'"));
        assert!(columns[4].default.is_none());
        conn.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_sqlite_row_count_and_samples() {
        let mut conn = fixture().await;
        assert_eq!(conn.row_count("campaigns").await.unwrap(), 2);

        let mut rows = conn.sample_rows("campaigns", 3).await.unwrap();
        rows.sort();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id.as_deref(), Some("1"));
        assert_eq!(rows[0].description, None);
        assert_eq!(rows[1].slug.as_deref(), Some("solar-schools"));

        let limited = conn.sample_rows("campaigns", 1).await.unwrap();
        assert_eq!(limited.len(), 1);
        conn.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_row_count_on_missing_table_fails() {
        let mut conn = fixture().await;
        assert!(conn.row_count("missing").await.is_err());
        conn.close().await.unwrap();
    }
}
