//! type-talker - assistive typing feedback core.
//!
//! Turns keystrokes into spoken letters/words and, for completed words, a
//! photographic cue, for learners with cortical visual impairment.
//!
//! # Pipeline
//!
//! ```text
//! keystroke ──▶ InputGate ──▶ TypingBuffer ──┬─▶ WordHistory
//!                                            └─▶ ImageResolver ──▶ BackgroundRemoval
//!                                                     │
//!                                      render sink ◀──┴──▶ speech sink
//! ```
//!
//! The crate is a library with no process entry point: the host shell owns
//! the window, keyboard events, actual rendering and speech synthesis, and
//! talks to the core through [`session::Session`] plus the sink traits
//! ([`display::RenderSink`], [`speech::SpeechSink`]).
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use type_talker::config::AppConfig;
//! use type_talker::images::{DictionaryApiLookup, ImageResolver, WikimediaSource};
//! use type_talker::session::Session;
//! # use type_talker::display::{ImageState, RenderSink};
//! # use type_talker::speech::SpeechSink;
//! # struct Shell;
//! # impl RenderSink for Shell {
//! #     fn set_lines(&self, _: &[String], _: &str) {}
//! #     fn set_image_state(&self, _: &ImageState) {}
//! #     fn set_attribution(&self, _: &str) {}
//! #     fn set_navigation(&self, _: bool) {}
//! #     fn set_status(&self, _: &str) {}
//! #     fn set_preload_status(&self, _: &str) {}
//! # }
//! # impl SpeechSink for Shell {
//! #     fn speak_letter(&self, _: char) {}
//! #     fn speak_word(&self, _: &str) {}
//! #     fn speak_system(&self, _: &str) {}
//! #     fn stop(&self) {}
//! # }
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::load().unwrap_or_default().into_shared();
//!     let shell = Arc::new(Shell);
//!
//!     let resolver = Arc::new(ImageResolver::new(
//!         Arc::clone(&config),
//!         Arc::new(WikimediaSource::new()),
//!         Arc::new(DictionaryApiLookup::new()),
//!         shell.clone(),
//!     ));
//!
//!     let mut session = Session::new(config, resolver, shell.clone(), shell);
//!     // for each host key event: session.handle_event(&event).await;
//! }
//! ```

pub mod config;
pub mod display;
pub mod images;
pub mod input;
pub mod removal;
pub mod session;
pub mod speech;

pub use config::{AppConfig, SharedConfig};
pub use session::{HostCommand, Session};
