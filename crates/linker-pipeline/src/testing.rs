//! Recording test doubles for the cursor and sink contracts.

use std::collections::VecDeque;

use crate::cursor::{CursorSource, SourceRecord};
use crate::sink::Sink;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestRecord {
    pub id: u32,
}

impl TestRecord {
    pub fn new(id: u32) -> Self {
        Self { id }
    }
}

impl SourceRecord for TestRecord {
    fn identity(&self) -> String {
        format!("rec_{}", self.id)
    }
}

/// Records `1..=n`.
pub fn records(n: u32) -> Vec<TestRecord> {
    (1..=n).map(TestRecord::new).collect()
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct TestError(pub String);

pub struct RecordingCursor {
    records: VecDeque<TestRecord>,
    fail_at: Option<usize>,
    pub reads: usize,
    pub closes: usize,
}

impl RecordingCursor {
    pub fn new(records: Vec<TestRecord>) -> Self {
        Self {
            records: records.into(),
            fail_at: None,
            reads: 0,
            closes: 0,
        }
    }

    /// The `read`-th call to `next` (1-based) fails.
    pub fn failing_at(records: Vec<TestRecord>, read: usize) -> Self {
        Self {
            fail_at: Some(read),
            ..Self::new(records)
        }
    }
}

impl CursorSource for RecordingCursor {
    type Record = TestRecord;
    type Error = TestError;

    fn next(&mut self) -> Result<Option<TestRecord>, TestError> {
        if self.closes > 0 {
            return Err(TestError("read after close".into()));
        }
        self.reads += 1;
        if self.fail_at == Some(self.reads) {
            return Err(TestError("connection reset".into()));
        }
        Ok(self.records.pop_front())
    }

    fn close(&mut self) {
        self.closes += 1;
    }
}

pub struct RecordingSink<T> {
    fail_on: Option<usize>,
    calls: usize,
    pub batches: Vec<Vec<T>>,
}

impl<T> RecordingSink<T> {
    pub fn new() -> Self {
        Self {
            fail_on: None,
            calls: 0,
            batches: Vec::new(),
        }
    }

    /// The `call`-th `persist` (1-based) fails.
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on: Some(call),
            ..Self::new()
        }
    }

    pub fn persisted(&self) -> Vec<&T> {
        self.batches.iter().flatten().collect()
    }
}

impl<T: Clone> Sink for RecordingSink<T> {
    type Record = T;
    type Error = TestError;

    fn persist(&mut self, batch: &[T]) -> Result<(), TestError> {
        self.calls += 1;
        if self.fail_on == Some(self.calls) {
            return Err(TestError("write rejected".into()));
        }
        self.batches.push(batch.to_vec());
        Ok(())
    }
}
