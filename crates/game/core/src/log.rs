//! Append-only action log.
//!
//! The log is the single source of truth for a game: state at position `n`
//! is a pure function of the initial state and the first `n` entries.
//! Sequence numbers are 0-based and contiguous; the entry with sequence `k`
//! turns state `k` into state `k + 1`.

use crate::action::Action;
use crate::error::{ErrorSeverity, GameError};

/// One accepted action and its position in the log.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoggedAction {
    pub sequence: u64,
    pub action: Action,
}

impl LoggedAction {
    pub fn new(sequence: u64, action: Action) -> Self {
        Self { sequence, action }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LogError {
    #[error("log sequence gap: expected {expected}, found {found}")]
    SequenceGap { expected: u64, found: u64 },
}

impl GameError for LogError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::SequenceGap { .. } => "LOG_SEQUENCE_GAP",
        }
    }
}

/// Ordered, gap-free sequence of accepted actions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionLog {
    entries: Vec<LoggedAction>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a log from persisted entries, checking contiguity from 0.
    pub fn from_entries(entries: Vec<LoggedAction>) -> Result<Self, LogError> {
        for (index, entry) in entries.iter().enumerate() {
            let expected = index as u64;
            if entry.sequence != expected {
                return Err(LogError::SequenceGap {
                    expected,
                    found: entry.sequence,
                });
            }
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> u64 {
        self.entries.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends `action` with the next sequence number.
    pub fn append(&mut self, action: Action) -> &LoggedAction {
        let sequence = self.len();
        self.entries.push(LoggedAction::new(sequence, action));
        &self.entries[self.entries.len() - 1]
    }

    /// Discards every entry after position `len`.
    pub fn truncate(&mut self, len: u64) {
        self.entries.truncate(len as usize);
    }

    pub fn entries(&self) -> &[LoggedAction] {
        &self.entries
    }

    /// Entries with `sequence >= from`.
    pub fn tail(&self, from: u64) -> &[LoggedAction] {
        let start = (from as usize).min(self.entries.len());
        &self.entries[start..]
    }

    pub fn get(&self, sequence: u64) -> Option<&LoggedAction> {
        self.entries.get(usize::try_from(sequence).ok()?)
    }

    pub fn last(&self) -> Option<&LoggedAction> {
        self.entries.last()
    }
}

impl<'a> IntoIterator for &'a ActionLog {
    type Item = &'a LoggedAction;
    type IntoIter = std::slice::Iter<'a, LoggedAction>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_assigns_contiguous_sequences() {
        let mut log = ActionLog::new();
        assert_eq!(log.append(Action::pass("PRR")).sequence, 0);
        assert_eq!(log.append(Action::pass("NYC")).sequence, 1);
        assert_eq!(log.len(), 2);
        assert_eq!(log.get(1).map(|entry| entry.action.entity().as_str()), Some("NYC"));
        assert_eq!(log.get(2), None);
    }

    #[test]
    fn truncate_then_append_reuses_sequences() {
        let mut log = ActionLog::new();
        log.append(Action::pass("PRR"));
        log.append(Action::pass("NYC"));
        log.append(Action::pass("Erie"));

        log.truncate(1);
        assert_eq!(log.len(), 1);
        assert_eq!(log.append(Action::resign("NYC")).sequence, 1);
        assert_eq!(log.tail(1).len(), 1);
        assert!(log.tail(10).is_empty());
    }

    #[test]
    fn from_entries_rejects_gaps() {
        let entries = vec![
            LoggedAction::new(0, Action::pass("PRR")),
            LoggedAction::new(2, Action::pass("NYC")),
        ];
        let error = ActionLog::from_entries(entries).unwrap_err();
        assert_eq!(
            error,
            LogError::SequenceGap {
                expected: 1,
                found: 2
            }
        );
        assert_eq!(error.severity(), ErrorSeverity::Fatal);
        assert_eq!(error.error_code(), "LOG_SEQUENCE_GAP");
    }
}
