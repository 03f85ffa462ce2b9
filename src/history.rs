//! Bounded command history and `!` references into it.
//!
//! Every recorded line gets the next sequence number, starting at zero.
//! The store keeps only the newest `capacity` lines, so older sequence
//! numbers eventually stop resolving.

use std::collections::VecDeque;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::ShellError;

/// How many commands are kept unless configured otherwise.
pub const DEFAULT_CAPACITY: usize = 10;

static BANG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^!(?:(?P<previous>!)|(?P<seq>[0-9]+))$").expect("valid regex"));

/// A single submitted command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub seq: u64,
    pub text: String,
}

/// The last `capacity` command lines, newest first.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
    submitted: u64,
}

impl HistoryStore {
    /// Create an empty store holding at most `capacity` entries.
    ///
    /// # Panics
    /// If `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "history capacity must be positive");
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            submitted: 0,
        }
    }

    /// Record `text` as the newest entry, evicting the oldest one when full.
    ///
    /// Returns the sequence number assigned to it.
    pub fn record(&mut self, text: impl Into<String>) -> u64 {
        let seq = self.submitted;
        if self.entries.len() == self.capacity {
            if let Some(evicted) = self.entries.pop_back() {
                debug!(seq = evicted.seq, "evicted history entry");
            }
        }
        self.entries.push_front(HistoryEntry {
            seq,
            text: text.into(),
        });
        self.submitted += 1;
        seq
    }

    /// Text of the entry with sequence number `seq`.
    pub fn lookup(&self, seq: u64) -> Result<&str, ShellError> {
        self.entries
            .iter()
            .find(|entry| entry.seq == seq)
            .map(|entry| entry.text.as_str())
            .ok_or_else(|| self.index_error())
    }

    /// Resolve a `!` reference to the text it re-runs.
    pub fn resolve(&self, reference: BangRef) -> Result<String, ShellError> {
        let seq = match reference {
            BangRef::Previous => self
                .submitted
                .checked_sub(1)
                .ok_or_else(|| self.index_error())?,
            BangRef::Sequence(seq) => seq,
        };
        if !self.is_retained(seq) {
            return Err(self.index_error());
        }
        self.lookup(seq).map(str::to_owned)
    }

    /// Whether `seq` has been assigned and not yet evicted.
    pub fn is_retained(&self, seq: u64) -> bool {
        seq < self.submitted && seq.saturating_add(self.capacity as u64) >= self.submitted
    }

    /// Stored entries as `"<seq>\t<text>"`, newest first.
    pub fn render(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| format!("{}\t{}", entry.seq, entry.text))
            .collect()
    }

    /// Entries, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Total number of lines ever recorded.
    pub fn submitted(&self) -> u64 {
        self.submitted
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn index_error(&self) -> ShellError {
        ShellError::Index {
            capacity: self.capacity,
        }
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

/// A parsed `!` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BangRef {
    /// `!!`: the most recently recorded command.
    Previous,
    /// `!N`: the command with sequence number `N`. `!0` is not special.
    Sequence(u64),
}

impl BangRef {
    /// Parse a token starting with `!`.
    ///
    /// Returns `None` for anything other than `!!` or `!` followed by
    /// decimal digits, including digit strings too large for a `u64`.
    pub fn parse(token: &str) -> Option<Self> {
        let caps = BANG_PATTERN.captures(token)?;
        if caps.name("previous").is_some() {
            return Some(BangRef::Previous);
        }
        caps.name("seq")?.as_str().parse().ok().map(BangRef::Sequence)
    }
}
