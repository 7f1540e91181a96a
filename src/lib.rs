pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::{CsvRowSource, DryRunWriter, SpannerClient};
pub use config::LoaderConfig;
pub use crate::core::{accumulator::BatchAccumulator, loader::Loader};
pub use domain::model::{LoadReport, Row, BATCH_SIZE};
pub use domain::ports::BatchWriter;
pub use utils::error::{EtlError, Result};
