//! Configuration module for type-talker.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem,
//! `AppPaths` for cross-platform data directories, and TOML persistence via
//! `AppConfig::load` / `AppConfig::save`. The live config is shared between
//! components as a [`SharedConfig`] so saved settings changes apply on the
//! next keystroke or lookup.

pub mod filter;
pub mod paths;
pub mod settings;

pub use filter::{parse_word_list, FilterConfig};
pub use paths::AppPaths;
pub use settings::{
    AppConfig, DisplayConfig, ImageConfig, InputConfig, SharedConfig, SpeechConfig,
};
