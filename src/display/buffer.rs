//! Text buffer state machine: committed lines, the live line, and word
//! boundaries.
//!
//! The buffer is a pure model - it performs no rendering and no speech. Its
//! operations return what happened (removed character, completed word) and
//! the caller dispatches feedback. Completed words are recorded into the
//! owned [`WordHistory`] as a side effect of the word boundary firing, so a
//! screen clear never loses history.

use crate::display::history::WordHistory;

// ---------------------------------------------------------------------------
// TypingBuffer
// ---------------------------------------------------------------------------

/// Committed lines plus the in-progress line.
///
/// `committed` is unbounded - the visible projection is a view of the most
/// recent lines, taken at render time via [`TypingBuffer::visible_lines`].
#[derive(Debug, Default)]
pub struct TypingBuffer {
    committed: Vec<String>,
    current: String,
    history: WordHistory,
}

impl TypingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Append a character to the live line. Always succeeds.
    pub fn add_character(&mut self, c: char) {
        self.current.push(c);
    }

    /// Remove the last character of the live line.
    ///
    /// Returns the removed character, or `None` when the line was already
    /// empty (no-op, never underflows).
    pub fn remove_character(&mut self) -> Option<char> {
        self.current.pop()
    }

    /// Handle the space bar.
    ///
    /// When the live line already ends with a space this is a no-op (space
    /// collapsing) and no word completes. Otherwise a single space is
    /// appended and the just-finished word, if any, is returned and recorded
    /// into history.
    pub fn handle_space(&mut self) -> Option<String> {
        if self.current.ends_with(' ') {
            return None;
        }

        let word = self.current_word();
        self.current.push(' ');

        if word.is_empty() {
            return None;
        }
        self.history.record(&word);
        Some(word)
    }

    /// Commit the live line (Enter).
    ///
    /// The line moves to the committed list even when empty (a blank line is
    /// a valid line). Returns the final word of the committed line, if any,
    /// after recording it into history.
    pub fn commit_line(&mut self) -> Option<String> {
        let word = self.current_word();
        self.committed.push(std::mem::take(&mut self.current));

        if word.is_empty() {
            return None;
        }
        self.history.record(&word);
        Some(word)
    }

    /// Discard all committed lines and the live line. History is kept -
    /// it is session-scoped, independent of the visible buffer.
    pub fn clear(&mut self) {
        self.committed.clear();
        self.current.clear();
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The trailing whitespace-delimited token of the live line, or `""`.
    pub fn current_word(&self) -> String {
        self.current
            .split_whitespace()
            .next_back()
            .unwrap_or("")
            .to_string()
    }

    /// The live line as typed.
    pub fn current_line(&self) -> &str {
        &self.current
    }

    /// All committed lines, oldest first.
    pub fn committed_lines(&self) -> &[String] {
        &self.committed
    }

    /// The most recent `max` committed lines - the render projection.
    pub fn visible_lines(&self, max: usize) -> &[String] {
        let start = self.committed.len().saturating_sub(max);
        &self.committed[start..]
    }

    /// The session word history.
    pub fn history(&self) -> &WordHistory {
        &self.history
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
