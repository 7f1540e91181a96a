pub mod accumulator;
pub mod loader;

pub use crate::domain::model::{Batch, LoadReport, LoadState, Row};
pub use crate::domain::ports::BatchWriter;
pub use crate::utils::error::Result;
