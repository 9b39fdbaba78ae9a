//! Status text reported by the OLED plugin
//!
//! The reporter appends one line per panel shown and one per failed render.
//! The log starts over when the rotation wraps, and only the newest
//! [`STATUS_LINES`] lines are kept so a display that keeps failing cannot
//! grow it without bound.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Lines kept in the status log
pub(crate) const STATUS_LINES: usize = 32;

/// Running log of what the reporter has shown since the rotation last wrapped
#[derive(Debug, Clone, Default)]
pub(crate) struct StatusLog {
    lines: Arc<Mutex<VecDeque<String>>>,
}

impl StatusLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lines(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.lines.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a line, dropping the oldest once full
    pub fn push(&self, msg: &str) {
        let mut lines = self.lines();
        if lines.len() == STATUS_LINES {
            lines.pop_front();
        }
        lines.push_back(msg.to_string());
    }

    pub fn clear(&self) {
        self.lines().clear();
    }

    /// The log as newline separated text
    pub fn get(&self) -> String {
        let lines = self.lines();
        lines.iter().map(String::as_str).collect::<Vec<_>>().join("\n")
    }
}
