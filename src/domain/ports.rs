use crate::domain::model::Row;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Destination for batches of rows.
///
/// Each call is one all-or-nothing insert: either every row in `rows` is
/// committed or none is. Nothing is shared between calls, so a failed call
/// leaves earlier batches committed. Returns the number of rows written.
#[async_trait]
pub trait BatchWriter: Send + Sync {
    async fn write(&self, table: &str, columns: &[String], rows: &[Row]) -> Result<usize>;

    /// True when `write` only pretends to insert.
    fn is_dry_run(&self) -> bool {
        false
    }
}
