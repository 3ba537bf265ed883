//! Database access layer.
//!
//! This module provides database access functionality:
//! - Database dispatch macros for reducing code duplication
//! - A single owned connection per backend
//! - Catalog queries for table existence, columns, row count and samples

#[macro_use]
pub mod macros;
pub mod catalog;
pub mod connection;

pub use catalog::CatalogSource;
pub use connection::DbConnection;
