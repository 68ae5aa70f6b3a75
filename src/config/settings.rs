//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//!
//! Components never hold onto a config snapshot between operations - they
//! read through a [`SharedConfig`] on every keystroke/lookup so a settings
//! change saved by the host takes effect immediately.

use std::sync::{Arc, RwLock};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::filter::FilterConfig;
use super::AppPaths;

// ---------------------------------------------------------------------------
// InputConfig
// ---------------------------------------------------------------------------

/// Settings for the keystroke admission gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Minimum milliseconds between two admitted keystrokes. An event
    /// arriving earlier than this after the last admission is suppressed.
    pub min_key_interval_ms: u64,
    /// Maximum keystrokes admitted within any trailing one-second window.
    pub max_keys_per_second: u32,
    /// Whether digit keys are admitted in addition to letters.
    pub admit_digits: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            min_key_interval_ms: 150,
            max_keys_per_second: 10,
            admit_digits: true,
        }
    }
}

// ---------------------------------------------------------------------------
// ImageConfig
// ---------------------------------------------------------------------------

/// Settings for image resolution and pre-loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Run resolved photos through the background-removal pipeline.
    pub remove_background: bool,
    /// Comma-separated word list warmed into the image cache at startup.
    pub preload_words: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            remove_background: false,
            preload_words: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// DisplayConfig
// ---------------------------------------------------------------------------

/// Settings for the text display projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// How many committed lines stay visible above the live line. Older
    /// lines scroll out of view but are retained in the buffer model.
    pub visible_lines: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { visible_lines: 5 }
    }
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Settings consumed by speech-sink implementations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Master switch - a disabled sink must drop all speak requests.
    pub enabled: bool,
    /// Word/utterance rate multiplier (1.0 = natural).
    pub rate: f32,
    /// Voice pitch multiplier (1.0 = natural).
    pub pitch: f32,
    /// Output volume in `[0.0, 1.0]`.
    pub volume: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use type_talker::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Keystroke admission settings.
    pub input: InputConfig,
    /// Image show/hide policy (block list, allow list, profanity filter).
    pub filter: FilterConfig,
    /// Image resolution / pre-loading settings.
    pub images: ImageConfig,
    /// Text display settings.
    pub display: DisplayConfig,
    /// Speech sink settings.
    pub speech: SpeechConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.sanitize();
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Clamp out-of-range values to safe ones. A malformed settings file
    /// degrades to usable behaviour instead of raising.
    pub fn sanitize(&mut self) {
        if self.input.max_keys_per_second == 0 {
            self.input.max_keys_per_second = 1;
        }
        if self.display.visible_lines == 0 {
            self.display.visible_lines = 1;
        }
        self.speech.rate = self.speech.rate.clamp(0.1, 10.0);
        self.speech.pitch = self.speech.pitch.clamp(0.0, 2.0);
        self.speech.volume = self.speech.volume.clamp(0.0, 1.0);
    }

    /// Wrap this config for cross-component sharing.
    pub fn into_shared(self) -> SharedConfig {
        Arc::new(RwLock::new(self))
    }
}

// ---------------------------------------------------------------------------
// SharedConfig
// ---------------------------------------------------------------------------

/// Thread-safe handle to the live [`AppConfig`].
///
/// Cheap to clone (`Arc` clone). Components take a read lock for the
/// duration of a single operation; the host takes a write lock when the
/// settings panel saves.
pub type SharedConfig = Arc<RwLock<AppConfig>>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
