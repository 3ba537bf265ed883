//! Single database connection management.
//!
//! An inspection pass owns exactly one connection. Backend-specific connection
//! types (`PgConnection`, `MySqlConnection`, `SqliteConnection`) are kept in an
//! enum so every driver decodes with its full type support.

use crate::error::{DbError, DbResult};
use crate::models::{ConnectionTarget, DatabaseType};
use sqlx::{Connection, MySqlConnection, PgConnection, SqliteConnection};
use std::time::Instant;
use tracing::{debug, info};

/// One open connection to one backend.
#[derive(Debug)]
pub enum DbConnection {
    MySql(MySqlConnection),
    Postgres(PgConnection),
    SQLite(SqliteConnection),
}

impl DbConnection {
    /// Open a connection to the target.
    ///
    /// Every driver failure here (unreachable host, rejected credentials,
    /// TLS negotiation, missing SQLite file) becomes `DbError::Connection`.
    pub async fn connect(target: &ConnectionTarget) -> DbResult<Self> {
        info!(
            db_type = %target.db_type,
            target = %target.masked_connection_string(),
            database = target.database.as_deref().unwrap_or("-"),
            "Connecting to database"
        );
        let started = Instant::now();
        let url = target.connection_string.as_str();

        let conn = match target.db_type {
            DatabaseType::PostgreSQL => PgConnection::connect(url)
                .await
                .map(DbConnection::Postgres),
            DatabaseType::MySQL => MySqlConnection::connect(url)
                .await
                .map(DbConnection::MySql),
            DatabaseType::SQLite => SqliteConnection::connect(url)
                .await
                .map(DbConnection::SQLite),
        }
        .map_err(|e| connect_error(target.db_type, e))?;

        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Connection established"
        );
        Ok(conn)
    }

    /// Get the database type for this connection.
    pub fn db_type(&self) -> DatabaseType {
        impl_db_dispatch!(self, {
            MySql(_c) => DatabaseType::MySQL,
            Postgres(_c) => DatabaseType::PostgreSQL,
            SQLite(_c) => DatabaseType::SQLite,
        })
    }

    /// Gracefully close the connection, consuming it.
    pub async fn close(self) -> DbResult<()> {
        let db_type = self.db_type();
        impl_db_dispatch!(self, {
            MySql(c) => c.close().await?,
            Postgres(c) => c.close().await?,
            SQLite(c) => c.close().await?,
        });
        debug!(db_type = %db_type, "Connection closed");
        Ok(())
    }
}

fn connect_error(db_type: DatabaseType, err: sqlx::Error) -> DbError {
    let suggestion = match &err {
        sqlx::Error::Tls(_) => "Verify TLS configuration and the sslmode parameter",
        sqlx::Error::Io(_) => "Check network connectivity and database server status",
        _ if db_type == DatabaseType::SQLite => "Check that the database file exists",
        _ => "Check the connection string format and credentials",
    };
    DbError::connection(err.to_string(), suggestion)
}
