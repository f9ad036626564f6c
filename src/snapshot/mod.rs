//! Snapshot management for time-travel stepping

use crate::engine::errors::Fault;
use crate::memory::{approximate_size, OperandStack, Slots};
use crate::program::CodePath;

/// Trace of successfully computed intermediate values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceLog {
    pub lines: Vec<TraceLine>,
}

impl TraceLog {
    pub fn new() -> Self {
        TraceLog { lines: Vec::new() }
    }

    /// Append a line produced by the instruction at `path`
    pub fn record(&mut self, text: String, path: CodePath) {
        self.lines.push(TraceLine { text, path });
    }

    /// Get all lines as strings
    pub fn get_output(&self) -> Vec<&str> {
        self.lines.iter().map(|line| line.text.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// A trace line with the instruction that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct TraceLine {
    pub text: String,
    pub path: CodePath,
}

/// Snapshot of execution state
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub stack: OperandStack,
    pub slots: Slots,
    pub trace: TraceLog,
    /// Instruction that just completed (`None` before the first one)
    pub executed: Option<CodePath>,
    pub result: Option<String>,
}

impl Snapshot {
    /// Estimate the memory usage of this snapshot in bytes
    pub fn estimated_size(&self) -> usize {
        let stack_size: usize = self.stack.values().iter().map(approximate_size).sum();

        let slot_size: usize = self
            .slots
            .iter()
            .map(|(name, value)| name.len() + value.map_or(8, approximate_size))
            .sum();

        // Trace: text plus a small fixed overhead per line
        let trace_size: usize = self.trace.lines.iter().map(|l| l.text.len() + 32).sum();

        stack_size + slot_size + trace_size + self.result.as_ref().map_or(0, String::len)
    }
}

/// Manages execution history for time-travel stepping
#[derive(Debug)]
pub struct SnapshotManager {
    snapshots: Vec<Snapshot>,
    max_memory: usize,
    current_memory: usize,
}

impl SnapshotManager {
    pub fn new(max_memory: usize) -> Self {
        SnapshotManager {
            snapshots: Vec::new(),
            max_memory,
            current_memory: 0,
        }
    }

    /// Add a snapshot to history
    pub fn push(&mut self, snapshot: Snapshot) -> Result<(), Fault> {
        let snapshot_size = snapshot.estimated_size();

        if self.current_memory + snapshot_size > self.max_memory {
            return Err(Fault::SnapshotLimitExceeded {
                current: self.current_memory,
                requested: snapshot_size,
                limit: self.max_memory,
            });
        }

        self.current_memory += snapshot_size;
        self.snapshots.push(snapshot);
        Ok(())
    }

    /// Get a snapshot by index
    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    /// Get the number of snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Get current memory usage
    pub fn memory_usage(&self) -> usize {
        self.current_memory
    }

    /// Get max memory limit
    pub fn memory_limit(&self) -> usize {
        self.max_memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Value;

    fn snapshot(text: &str) -> Snapshot {
        let mut trace = TraceLog::new();
        trace.record(text.to_string(), CodePath::root(0));
        let mut stack = OperandStack::new();
        stack.push(Value::str(text));
        Snapshot {
            stack,
            slots: Slots::new(vec!["f".to_string()]),
            trace,
            executed: Some(CodePath::root(0)),
            result: None,
        }
    }

    #[test]
    fn test_memory_accounting() {
        let mut manager = SnapshotManager::new(1024 * 1024);
        manager.push(snapshot("f = 72")).unwrap();
        manager.push(snapshot("a = 'apts_c'")).unwrap();

        assert_eq!(manager.len(), 2);
        assert!(manager.memory_usage() > 0);
        assert_eq!(manager.memory_limit(), 1024 * 1024);
        assert_eq!(manager.get(1).unwrap().trace.get_output(), vec!["a = 'apts_c'"]);
    }

    #[test]
    fn test_limit_exceeded() {
        let mut manager = SnapshotManager::new(16);
        let err = manager.push(snapshot("f = 72")).unwrap_err();
        assert!(matches!(err, Fault::SnapshotLimitExceeded { current: 0, limit: 16, .. }));
        assert!(manager.is_empty());
    }
}
