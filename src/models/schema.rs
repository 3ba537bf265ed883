//! Schema-related data models.
//!
//! These types describe external state the inspector observes but never owns.

use std::fmt;

/// Placeholder printed for SQL `NULL`.
const NULL_TEXT: &str = "null";

/// One column of the inspected table, as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Declared type as the catalog spells it (e.g., `character varying`, `INTEGER`)
    pub data_type: String,
    /// Catalog's own nullability text, `YES` or `NO`
    pub is_nullable: String,
    /// Default expression, if any
    pub default: Option<String>,
}

impl ColumnDescriptor {
    /// Create a new column descriptor.
    pub fn new(
        name: impl Into<String>,
        data_type: impl Into<String>,
        is_nullable: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_nullable: is_nullable.into(),
            default: None,
        }
    }

    /// Set the default expression.
    pub fn with_default(mut self, default: Option<String>) -> Self {
        self.default = default;
        self
    }
}

impl fmt::Display for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} (nullable: {}, default: {})",
            self.name,
            self.data_type,
            self.is_nullable,
            self.default.as_deref().unwrap_or(NULL_TEXT)
        )
    }
}

/// Fixed `(id, title, description, slug)` projection of one table row.
///
/// Every field is read as text so that any id type renders.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SampleRow {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
}

impl fmt::Display for SampleRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (slug: {})",
            self.title.as_deref().unwrap_or(NULL_TEXT),
            self.slug.as_deref().unwrap_or(NULL_TEXT)
        )
    }
}
