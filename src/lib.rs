//! Campaign Inspector Library
//!
//! This library connects to a SQL database (PostgreSQL, MySQL, SQLite) and
//! reports on its `campaigns` table: existence, columns, row count and a few
//! sample rows.

pub mod config;
pub mod db;
pub mod error;
pub mod inspector;
pub mod models;

pub use config::Config;
pub use error::{DbError, DbResult};
pub use inspector::DatabaseInspector;
