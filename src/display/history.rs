//! Session word history - an append-only log of completed words.
//!
//! History outlives the visible buffer: clearing the screen does not erase
//! it. It exists for the session only and is never persisted.

use std::time::SystemTime;

// ---------------------------------------------------------------------------
// WordHistoryEntry
// ---------------------------------------------------------------------------

/// One completed word and when it was typed.
#[derive(Debug, Clone, PartialEq)]
pub struct WordHistoryEntry {
    /// The word, trimmed and lowercased.
    pub word: String,
    /// Wall-clock time the word boundary fired.
    pub recorded_at: SystemTime,
}

// ---------------------------------------------------------------------------
// WordHistory
// ---------------------------------------------------------------------------

/// Append-only session log. Entries are never mutated or removed.
#[derive(Debug, Default)]
pub struct WordHistory {
    entries: Vec<WordHistoryEntry>,
}

impl WordHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed word. Blank input is ignored; the stored form is
    /// trimmed and lowercased.
    pub fn record(&mut self, word: &str) {
        let normalized = word.trim().to_lowercase();
        if normalized.is_empty() {
            return;
        }
        self.entries.push(WordHistoryEntry {
            word: normalized,
            recorded_at: SystemTime::now(),
        });
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[WordHistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let history = WordHistory::new();
        assert!(history.is_empty());
        assert_eq!(history.len(), 0);
    }

    #[test]
    fn records_normalized_words() {
        let mut history = WordHistory::new();
        history.record("  CaT ");
        assert_eq!(history.len(), 1);
        assert_eq!(history.entries()[0].word, "cat");
    }

    #[test]
    fn ignores_blank_words() {
        let mut history = WordHistory::new();
        history.record("");
        history.record("   ");
        assert!(history.is_empty());
    }

    #[test]
    fn preserves_order_and_duplicates() {
        let mut history = WordHistory::new();
        history.record("cat");
        history.record("dog");
        history.record("cat");

        let words: Vec<&str> = history.entries().iter().map(|e| e.word.as_str()).collect();
        assert_eq!(words, vec!["cat", "dog", "cat"]);
    }
}
