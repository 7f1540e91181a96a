use crate::domain::model::{Batch, Row, BATCH_SIZE};

/// Buffers rows and hands them out in batches of at most `threshold` rows.
///
/// Never yields an empty batch.
#[derive(Debug)]
pub struct BatchAccumulator {
    threshold: usize,
    buffer: Batch,
}

impl BatchAccumulator {
    /// # Panics
    ///
    /// Panics if `threshold` is zero.
    pub fn new(threshold: usize) -> Self {
        assert!(threshold > 0, "batch threshold must be positive");
        Self {
            threshold,
            buffer: Vec::with_capacity(threshold),
        }
    }

    /// Appends `row`, returning the full batch once the threshold is reached.
    pub fn add(&mut self, row: Row) -> Option<Batch> {
        self.buffer.push(row);
        if self.buffer.len() >= self.threshold {
            Some(self.take())
        } else {
            None
        }
    }

    /// Returns whatever is buffered, or `None` if nothing is.
    pub fn flush(&mut self) -> Option<Batch> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(self.take())
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    fn take(&mut self) -> Batch {
        std::mem::replace(&mut self.buffer, Vec::with_capacity(self.threshold))
    }
}

impl Default for BatchAccumulator {
    fn default() -> Self {
        Self::new(BATCH_SIZE)
    }
}
