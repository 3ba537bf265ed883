//! The inspection pass.
//!
//! `DatabaseInspector` runs one linear sequence against the `campaigns` table:
//! existence check, column listing, row count and a bounded sample. Report
//! lines are written as each step completes, so a failure midway still leaves
//! the earlier findings on screen.

use crate::db::{CatalogSource, DbConnection};
use crate::error::DbResult;
use crate::models::{ConnectionTarget, InspectionReport, has_column};
use std::io::Write;
use std::time::Instant;
use tracing::{info, warn};

/// Table every pass inspects.
pub const TARGET_TABLE: &str = "campaigns";

/// Column whose presence is reported on its own line.
pub const COVER_IMAGE_COLUMN: &str = "cover_image";

/// Maximum rows fetched by the sample query.
pub const SAMPLE_LIMIT: i64 = 3;

/// Runs inspection passes and writes human-readable findings to `out`.
pub struct DatabaseInspector<W: Write> {
    out: W,
}

impl<W: Write> DatabaseInspector<W> {
    /// Create a new inspector writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the inspector and return its writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Connect to `target`, inspect, and release the connection.
    ///
    /// The connection is closed on every path once it has been opened,
    /// including when a query or a report write fails.
    pub async fn run(&mut self, target: &ConnectionTarget) -> DbResult<InspectionReport> {
        let start = Instant::now();
        let mut conn = DbConnection::connect(target).await?;

        let result = self.connected(&mut conn).await;
        let closed = conn.close().await;

        let report = match (result, closed) {
            (Ok(report), Ok(())) => report,
            (Ok(_), Err(e)) => return Err(e),
            (Err(e), closed) => {
                if let Err(close_err) = closed {
                    warn!(error = %close_err, "Failed to close connection after error");
                }
                return Err(e);
            }
        };

        writeln!(self.out, "\n✅ Database check completed!")?;
        info!(
            table = %report.table,
            table_exists = report.table_exists,
            row_count = ?report.row_count,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Inspection completed"
        );
        Ok(report)
    }

    async fn connected(&mut self, conn: &mut DbConnection) -> DbResult<InspectionReport> {
        writeln!(self.out, "🔗 Connected to {} successfully!", conn.db_type())?;
        self.inspect(conn).await
    }

    /// Inspect the `campaigns` table through any catalog source.
    ///
    /// Issues one query when the table is absent, three when it is empty and
    /// four otherwise.
    pub async fn inspect<C: CatalogSource>(&mut self, source: &mut C) -> DbResult<InspectionReport> {
        let table_exists = source.table_exists(TARGET_TABLE).await?;
        writeln!(self.out, "📋 Campaigns table exists: {}", table_exists)?;

        if !table_exists {
            return Ok(InspectionReport::absent(TARGET_TABLE));
        }

        let columns = source.columns(TARGET_TABLE).await?;
        writeln!(self.out, "\n📊 Campaigns table structure:")?;
        for column in &columns {
            writeln!(self.out, "   - {}", column)?;
        }

        let cover_image_exists = has_column(&columns, COVER_IMAGE_COLUMN);
        writeln!(
            self.out,
            "\n🖼️  {} column exists: {}",
            COVER_IMAGE_COLUMN, cover_image_exists
        )?;

        let row_count = source.row_count(TARGET_TABLE).await?;
        writeln!(self.out, "📊 Total campaigns: {}", row_count)?;

        let samples = if row_count > 0 {
            let rows = source.sample_rows(TARGET_TABLE, SAMPLE_LIMIT).await?;
            writeln!(self.out, "\n📝 Sample campaigns:")?;
            for row in &rows {
                writeln!(self.out, "   - {}", row)?;
            }
            Some(rows)
        } else {
            writeln!(self.out, "\n📝 No campaigns found in database")?;
            None
        };

        Ok(InspectionReport {
            table: TARGET_TABLE.to_string(),
            table_exists,
            columns: Some(columns),
            cover_image_exists: Some(cover_image_exists),
            row_count: Some(row_count),
            samples,
        })
    }
}
