//! Data models for the campaign inspector.
//!
//! This module re-exports all model types used throughout the application.

pub mod connection;
pub mod report;
pub mod schema;

// Re-export commonly used types
pub use connection::{ConnectionTarget, DatabaseType};
pub use report::{InspectionReport, has_column};
pub use schema::{ColumnDescriptor, SampleRow};
