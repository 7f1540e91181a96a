// Adapters: the CSV row source and the BatchWriter implementations.

pub mod csv_source;
pub mod dry_run;
pub mod spanner;

pub use csv_source::CsvRowSource;
pub use dry_run::DryRunWriter;
pub use spanner::{MutationBatch, SpannerClient};
