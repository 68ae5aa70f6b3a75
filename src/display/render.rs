//! Render sink - the interface to whatever draws the screen.
//!
//! The core pushes state; the sink draws it. Implementations must be pure
//! projections: calling a setter twice with the same value must be
//! idempotent. All styling (fonts, colours, bubble letters) lives on the
//! implementor's side and is out of scope here.

// ---------------------------------------------------------------------------
// ImageState
// ---------------------------------------------------------------------------

/// What the image panel should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageState {
    /// Initial / cleared state ("Type a word!").
    Default,
    /// A lookup for `word` is in flight.
    Loading { word: String },
    /// Show `word` as large text; no image available or allowed.
    TextOnly { word: String },
    /// `word` failed dictionary validation.
    Nonsense { word: String },
    /// Show a photo for `word`.
    Photo {
        word: String,
        /// Image reference - an http(s) url or a `blob:` ref from the
        /// background-removal pipeline.
        url: String,
        title: String,
    },
}

impl ImageState {
    /// The word this state is about, when there is one.
    pub fn word(&self) -> Option<&str> {
        match self {
            ImageState::Default => None,
            ImageState::Loading { word }
            | ImageState::TextOnly { word }
            | ImageState::Nonsense { word }
            | ImageState::Photo { word, .. } => Some(word),
        }
    }
}

// ---------------------------------------------------------------------------
// RenderSink trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface to the display layer.
///
/// Held behind `Arc<dyn RenderSink>` and shared by the session, the image
/// resolver, the preloader and the background-removal pipeline.
pub trait RenderSink: Send + Sync {
    /// Replace the visible committed lines and the live line.
    fn set_lines(&self, committed: &[String], current: &str);

    /// Replace the image panel state.
    fn set_image_state(&self, state: &ImageState);

    /// Replace the attribution line under the image.
    fn set_attribution(&self, text: &str);

    /// Show or hide the previous/next navigation controls.
    fn set_navigation(&self, visible: bool);

    /// Replace the status bar text ("You typed: CAT").
    fn set_status(&self, text: &str);

    /// Replace the pre-load progress counter ("Pre-loaded 3 / 7").
    fn set_preload_status(&self, text: &str);
}
