//! Log buffer service
//!
//! Collects the diagnostic log of a run. The pipeline only ever writes to it;
//! readers (the server's log endpoint, the CLI) take snapshots or drain it.

use neuroscan_core::domain::log::LogEntry;
use std::sync::{Arc, Mutex};

/// Service for managing a run's diagnostic log
pub trait LogBufferService: Send + Sync {
    /// Adds a log entry to the buffer
    fn add_entry(&self, entry: LogEntry);

    /// Copies every buffered entry, leaving the buffer untouched
    fn entries(&self) -> Vec<LogEntry>;

    /// Returns all buffered entries and clears the buffer
    fn drain(&self) -> Vec<LogEntry>;
}

/// In-memory implementation of LogBufferService
///
/// Uses Arc<Mutex<Vec<LogEntry>>> for thread-safe access across tasks.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLogBuffer {
    buffer: Arc<Mutex<Vec<LogEntry>>>,
}

impl InMemoryLogBuffer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LogBufferService for InMemoryLogBuffer {
    fn add_entry(&self, entry: LogEntry) {
        let mut buffer = self.buffer.lock().unwrap();
        buffer.push(entry);
    }

    fn entries(&self) -> Vec<LogEntry> {
        self.buffer.lock().unwrap().clone()
    }

    fn drain(&self) -> Vec<LogEntry> {
        let mut buffer = self.buffer.lock().unwrap();
        buffer.drain(..).collect()
    }
}

/// Log buffer that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogBuffer;

impl LogBufferService for NullLogBuffer {
    fn add_entry(&self, _entry: LogEntry) {}

    fn entries(&self) -> Vec<LogEntry> {
        Vec::new()
    }

    fn drain(&self) -> Vec<LogEntry> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuroscan_core::domain::stage::StageId;

    #[test]
    fn test_entries_then_drain() {
        let buffer = InMemoryLogBuffer::new();
        buffer.add_entry(LogEntry::info(Some(StageId::Classification), "started"));
        buffer.add_entry(LogEntry::info(None, "done"));

        assert_eq!(buffer.entries().len(), 2);
        assert_eq!(buffer.drain().len(), 2);
        assert!(buffer.entries().is_empty());
    }
}
