//! Event log collection

use crate::error::{VmError, VmResult};
use bytes::Bytes;
use slotvm_primitives::{Address, Word};

/// Max topics per record
pub const MAX_TOPICS: usize = 4;

/// One emitted event
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRecord {
    /// Emitting contract
    pub address: Address,
    /// Indexed topics, at most [`MAX_TOPICS`]
    pub topics: Vec<Word>,
    /// Non-indexed payload
    pub data: Bytes,
}

impl LogRecord {
    /// Create a record, rejecting more than [`MAX_TOPICS`] topics
    pub fn new(address: Address, topics: Vec<Word>, data: impl Into<Bytes>) -> VmResult<Self> {
        if topics.len() > MAX_TOPICS {
            return Err(VmError::HandlerFault(format!(
                "{} topics, at most {MAX_TOPICS} allowed",
                topics.len()
            )));
        }
        Ok(Self {
            address,
            topics,
            data: data.into(),
        })
    }

    /// First topic, conventionally the event signature hash
    pub fn signature(&self) -> Option<&Word> {
        self.topics.first()
    }
}

/// Append-only buffer of records for one invocation.
///
/// Frames take a [`mark`](LogSink::mark) when they start and
/// [`truncate`](LogSink::truncate) back to it when they fail, so a failed
/// frame's records (and those of its callees) never reach the caller.
#[derive(Clone, Debug, Default)]
pub struct LogSink {
    records: Vec<LogRecord>,
}

impl LogSink {
    /// Empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record
    pub fn emit(&mut self, record: LogRecord) {
        tracing::debug!(address = %record.address, topics = record.topics.len(), "log emitted");
        self.records.push(record);
    }

    /// Current position
    pub fn mark(&self) -> usize {
        self.records.len()
    }

    /// Drop every record after `mark`
    pub fn truncate(&mut self, mark: usize) {
        self.records.truncate(mark);
    }

    /// Records in emission order
    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing was emitted
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Take the records
    pub fn into_records(self) -> Vec<LogRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(n: u64) -> LogRecord {
        LogRecord::new(Address::from_low_u64(n), vec![Word::from(n)], vec![n as u8]).unwrap()
    }

    #[test]
    fn test_too_many_topics() {
        let topics = vec![Word::one(); MAX_TOPICS + 1];
        let err = LogRecord::new(Address::from_low_u64(1), topics, Bytes::new()).unwrap_err();
        assert!(matches!(err, VmError::HandlerFault(_)));
        assert!(LogRecord::new(Address::from_low_u64(1), vec![Word::one(); MAX_TOPICS], Bytes::new()).is_ok());
    }

    #[test]
    fn test_mark_and_truncate() {
        let mut sink = LogSink::new();
        sink.emit(record(1));
        let mark = sink.mark();
        sink.emit(record(2));
        sink.emit(record(3));
        assert_eq!(sink.len(), 3);
        sink.truncate(mark);
        assert_eq!(sink.records(), &[record(1)]);
    }

    #[test]
    fn test_emission_order() {
        let mut sink = LogSink::new();
        for n in 0..5 {
            sink.emit(record(n));
        }
        let addresses: Vec<Address> = sink.into_records().into_iter().map(|r| r.address).collect();
        assert_eq!(addresses, (0..5).map(Address::from_low_u64).collect::<Vec<_>>());
    }

    #[test]
    fn test_signature() {
        assert_eq!(record(7).signature(), Some(&Word::from(7u64)));
    }
}
