//! Inspection report model.

use crate::models::{ColumnDescriptor, SampleRow};

/// Everything one inspection pass observed.
///
/// Fields after `table_exists` are `None` when the table is absent, since the
/// inspector stops querying at that point. `samples` is also `None` when the
/// table is empty because no sample query is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectionReport {
    pub table: String,
    pub table_exists: bool,
    pub columns: Option<Vec<ColumnDescriptor>>,
    pub cover_image_exists: Option<bool>,
    pub row_count: Option<i64>,
    pub samples: Option<Vec<SampleRow>>,
}

impl InspectionReport {
    /// Report for a table the catalog does not know.
    pub fn absent(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            table_exists: false,
            columns: None,
            cover_image_exists: None,
            row_count: None,
            samples: None,
        }
    }

    /// Column names in ordinal order, empty when the table is absent.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .flatten()
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// Exact, case-sensitive check for a column name.
pub fn has_column(columns: &[ColumnDescriptor], name: &str) -> bool {
    columns.iter().any(|c| c.name == name)
}
