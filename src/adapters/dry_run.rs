use crate::domain::model::Row;
use crate::domain::ports::BatchWriter;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Accepts every batch without contacting a database.
#[derive(Debug, Clone, Default)]
pub struct DryRunWriter;

impl DryRunWriter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BatchWriter for DryRunWriter {
    async fn write(&self, table: &str, columns: &[String], rows: &[Row]) -> Result<usize> {
        tracing::info!(
            "🔍 DRY RUN: would insert {} rows into {} ({} columns), lines {}..={}",
            rows.len(),
            table,
            columns.len(),
            rows.first().map(|r| r.line).unwrap_or_default(),
            rows.last().map(|r| r.line).unwrap_or_default()
        );
        Ok(rows.len())
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}
