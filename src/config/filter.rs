//! Image show/hide policy for typed words.
//!
//! Three layers, checked in precedence order:
//!
//! 1. Block list - always wins; a listed word never shows an image.
//! 2. Allow list - when enabled, only listed words show images.
//! 3. Profanity filter - denies by exact or substring match against a
//!    built-in list.
//!
//! A word that passes every enabled layer is allowed an image lookup; the
//! word itself is still displayed and spoken either way.

use serde::{Deserialize, Serialize};

/// Built-in profanity list used when `filter_profanity` is on.
///
/// Substring matching catches compounds ("bullshit") at the cost of the
/// occasional clbuttic false positive ("class" contains "ass"), which is an
/// acceptable trade for this audience.
const PROFANITY: &[&str] = &[
    "damn", "hell", "crap", "shit", "fuck", "bitch", "ass", "bastard", "piss",
    "cock", "dick", "pussy", "whore", "slut",
];

// ---------------------------------------------------------------------------
// FilterConfig
// ---------------------------------------------------------------------------

/// Image-filtering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Deny words matching the built-in profanity list.
    pub filter_profanity: bool,
    /// When `true`, only words on `allow_list` get images.
    pub allow_list_enabled: bool,
    /// Comma-separated allow list (checked only when enabled).
    pub allow_list: String,
    /// Comma-separated block list; overrides everything else.
    pub block_list: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            filter_profanity: true,
            allow_list_enabled: false,
            allow_list: String::new(),
            block_list: String::new(),
        }
    }
}

impl FilterConfig {
    /// Decide whether `word` may trigger an image lookup.
    ///
    /// `word` is normalised (trimmed, lowercased) before matching; a blank
    /// word is never allowed.
    pub fn allows_image(&self, word: &str) -> bool {
        let normalized = word.trim().to_lowercase();
        if normalized.is_empty() {
            return false;
        }

        // 1. Block list wins over everything.
        if parse_word_list(&self.block_list)
            .iter()
            .any(|w| *w == normalized)
        {
            return false;
        }

        // 2. Allow-list-only mode.
        if self.allow_list_enabled {
            return parse_word_list(&self.allow_list)
                .iter()
                .any(|w| *w == normalized);
        }

        // 3. Profanity filter.
        if self.filter_profanity
            && PROFANITY
                .iter()
                .any(|p| normalized == *p || normalized.contains(p))
        {
            return false;
        }

        true
    }
}

/// Split a comma-separated word list into trimmed, lowercased, non-empty
/// entries.
pub fn parse_word_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
