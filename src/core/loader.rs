use crate::adapters::CsvRowSource;
use crate::config::{DestinationConfig, LoaderConfig, SourceConfig};
use crate::core::accumulator::BatchAccumulator;
use crate::domain::model::{Batch, BatchFailure, LoadReport, LoadState, BATCH_SIZE};
use crate::domain::ports::BatchWriter;
use crate::utils::error::{EtlError, Result};
use std::time::{Duration, Instant};

/// Streams a CSV file into a table, one bounded batch at a time.
///
/// A failed batch is logged and recorded in the report; the load carries on
/// with the next one. Only an unreadable source aborts the run.
pub struct Loader<W: BatchWriter> {
    writer: W,
    source: SourceConfig,
    destination: DestinationConfig,
    batch_size: usize,
}

impl<W: BatchWriter> Loader<W> {
    pub fn new(writer: W, source: SourceConfig, destination: DestinationConfig) -> Self {
        Self {
            writer,
            source,
            destination,
            batch_size: BATCH_SIZE,
        }
    }

    pub fn from_config(writer: W, config: &LoaderConfig) -> Self {
        Self::new(writer, config.source.clone(), config.destination.clone())
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub async fn run(&self) -> Result<LoadReport> {
        let started = Instant::now();
        let mut state = LoadState::NotStarted;
        let mut report = LoadReport::default();

        let rows = CsvRowSource::open(&self.source.path)?;
        let expected = self.destination.columns.len();
        if rows.header_len() != expected {
            tracing::warn!(
                "Header of {} has {} columns but {} are configured for {}",
                self.source.path.display(),
                rows.header_len(),
                expected,
                self.destination.table
            );
        }

        advance(&mut state, LoadState::Streaming);
        let mut accumulator = BatchAccumulator::new(self.batch_size);
        for row in rows {
            let row = row?;
            report.rows_read += 1;

            if row.len() != expected {
                tracing::warn!(
                    "Skipping line {}: expected {} fields, found {}",
                    row.line,
                    expected,
                    row.len()
                );
                report.rows_skipped += 1;
                continue;
            }

            if let Some(batch) = accumulator.add(row) {
                self.submit(batch, &mut report).await;
            }
        }

        advance(&mut state, LoadState::FlushingFinal);
        if let Some(batch) = accumulator.flush() {
            self.submit(batch, &mut report).await;
        }

        advance(&mut state, LoadState::Done);
        report.elapsed = started.elapsed();

        tracing::info!(
            "✅ Loaded {} of {} rows into {} ({} batches, {} failed, {} rows skipped)",
            report.rows_written,
            report.rows_read,
            self.destination.table,
            report.batches_attempted,
            report.batches_failed(),
            report.rows_skipped
        );
        println!("{}", completion_message(report.elapsed));

        Ok(report)
    }

    async fn submit(&self, batch: Batch, report: &mut LoadReport) {
        report.batches_attempted += 1;
        let number = report.batches_attempted;
        let rows = batch.len();
        let first_line = batch.first().map(|r| r.line).unwrap_or_default();

        let started = Instant::now();
        let result = self
            .writer
            .write(&self.destination.table, &self.destination.columns, &batch)
            .await;

        match result {
            Ok(written) => {
                tracing::debug!("Batch {} committed in {:?}", number, started.elapsed());
                report.rows_written += written;
                println!("{}", inserted_message(written, self.writer.is_dry_run()));
            }
            Err(cause) => {
                println!("{}", insert_error_message(&cause));
                report.failures.push(BatchFailure {
                    batch: number,
                    rows,
                    first_line,
                    error: cause.to_string(),
                });

                let err = EtlError::BatchWriteError {
                    batch: number,
                    rows,
                    source: Box::new(cause),
                };
                tracing::error!(
                    "❌ {} (starting at line {}, category: {:?})",
                    err,
                    first_line,
                    err.category()
                );
            }
        }
    }
}

fn inserted_message(rows: usize, dry_run: bool) -> String {
    if dry_run {
        format!("Would insert {} rows (dry run)", rows)
    } else {
        format!("Inserted {} rows successfully", rows)
    }
}

fn insert_error_message(cause: &EtlError) -> String {
    format!("Error inserting rows: {}", cause)
}

fn completion_message(elapsed: Duration) -> String {
    format!("Data load complete in {:.2} seconds", elapsed.as_secs_f64())
}

fn advance(state: &mut LoadState, next: LoadState) {
    tracing::debug!("Load state: {:?} -> {:?}", state, next);
    *state = next;
}
