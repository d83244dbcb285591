//! Input history
//!
//! Every executed line is recorded with its outcome, for the `history`
//! command. This is separate from undo: failed and read-only commands are
//! listed here too.

use std::collections::VecDeque;

use serde::Serialize;

/// Maximum number of lines kept by default
pub const DEFAULT_MAX_HISTORY: usize = 1000;

/// One executed line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub line: String,
    pub success: bool,
}

/// Bounded list of executed lines, oldest first
#[derive(Debug, Clone)]
pub struct CommandHistory {
    entries: VecDeque<HistoryEntry>,
    max_size: usize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_HISTORY)
    }

    pub fn with_capacity(max_size: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_size.min(1024)),
            max_size: max_size.max(1),
        }
    }

    /// Record a line
    ///
    /// Empty lines and exact repeats of the previous entry are skipped.
    pub fn push(&mut self, line: &str, success: bool) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        if self
            .entries
            .back()
            .is_some_and(|e| e.line == line && e.success == success)
        {
            return;
        }
        self.entries.push_back(HistoryEntry {
            line: line.to_string(),
            success,
        });
        self.trim();
    }

    /// Change the capacity, dropping the oldest entries if needed
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size.max(1);
        self.trim();
    }

    fn trim(&mut self) {
        while self.entries.len() > self.max_size {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// Iterate over all entries (oldest first)
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Get the last N entries with their 1-based index
    pub fn last_n(&self, n: usize) -> impl Iterator<Item = (usize, &HistoryEntry)> {
        let start = self.entries.len().saturating_sub(n);
        self.entries
            .iter()
            .enumerate()
            .skip(start)
            .map(|(i, e)| (i + 1, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_skips_blank_and_repeats() {
        let mut history = CommandHistory::new();
        history.push("wall 0,0 5,0", true);
        history.push("wall 0,0 5,0", true);
        history.push("   ", true);
        history.push("undo", true);
        assert_eq!(history.len(), 2);
        assert_eq!(history.get(1).unwrap().line, "undo");
    }

    #[test]
    fn test_failed_lines_recorded() {
        let mut history = CommandHistory::new();
        history.push("wal", false);
        assert!(!history.get(0).unwrap().success);
    }

    #[test]
    fn test_max_capacity() {
        let mut history = CommandHistory::with_capacity(3);
        for line in ["status", "list", "undo", "redo"] {
            history.push(line, true);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.get(0).unwrap().line, "list");

        history.set_max_size(1);
        assert_eq!(history.iter().map(|e| e.line.as_str()).collect::<Vec<_>>(), ["redo"]);
    }

    #[test]
    fn test_last_n_indexes() {
        let mut history = CommandHistory::new();
        for line in ["a", "b", "c"] {
            history.push(line, true);
        }
        let last: Vec<(usize, &str)> = history.last_n(2).map(|(i, e)| (i, e.line.as_str())).collect();
        assert_eq!(last, [(2, "b"), (3, "c")]);
    }
}
