// Adapters layer: concrete Notifier implementations.

use crate::domain::events::Notice;
use crate::domain::ports::Notifier;
use chrono::{DateTime, Local};
use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub at: DateTime<Local>,
    pub line: String,
    pub rejected: bool,
}

/// Append-only bench log kept in memory, in the order notices arrive.
#[derive(Debug, Default)]
pub struct EventLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        // entries are pushed whole, so a poisoned log is still consistent
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.guard().clone()
    }

    /// Entries appended after the first `cursor` ones.
    pub fn entries_since(&self, cursor: usize) -> Vec<LogEntry> {
        self.guard().iter().skip(cursor).cloned().collect()
    }

    pub fn lines(&self) -> Vec<String> {
        self.guard().iter().map(|e| e.line.clone()).collect()
    }
}

impl Notifier for EventLog {
    fn notify(&self, notice: &Notice) {
        self.guard().push(LogEntry {
            at: Local::now(),
            line: notice.to_string(),
            rejected: notice.is_rejection(),
        });
    }
}

/// Writes every notice as `> line`, the way the bench log panel shows it.
#[derive(Debug)]
pub struct ConsoleLog<W: Write + Send> {
    out: Mutex<W>,
}

impl ConsoleLog<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleLog<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> Notifier for ConsoleLog<W> {
    fn notify(&self, notice: &Notice) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "> {}", notice).and_then(|_| out.flush()) {
            tracing::warn!("Failed to write bench log line: {}", e);
        }
    }
}
