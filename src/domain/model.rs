use std::time::Duration;

/// Rows per transactional write.
pub const BATCH_SIZE: usize = 500;

pub const DEFAULT_COLUMNS: [&str; 10] = [
    "transaction_id",
    "account_id",
    "timestamp",
    "location",
    "device_type",
    "ip_address",
    "transaction_amount",
    "transaction_type",
    "successful_login",
    "unusual_activity",
];

/// One data record from the source file. Values are passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// 1-based line in the source file, for diagnostics only.
    pub line: u64,
    pub fields: Vec<String>,
}

impl Row {
    pub fn new(line: u64, fields: Vec<String>) -> Self {
        Self { line, fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

pub type Batch = Vec<Row>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotStarted,
    Streaming,
    FlushingFinal,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    /// 1-based position of the batch within the load.
    pub batch: usize,
    pub rows: usize,
    pub first_line: u64,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub rows_written: usize,
    pub batches_attempted: usize,
    pub failures: Vec<BatchFailure>,
    pub elapsed: Duration,
}

impl LoadReport {
    pub fn batches_failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty() && self.rows_skipped == 0
    }
}
