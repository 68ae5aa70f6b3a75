//! Image resolver - decides what the image panel shows for a typed word.
//!
//! Resolution short-circuits in a fixed order: blank word, single letter,
//! show/hide policy, cache, dictionary validation, network fetch. The cache
//! path never touches the network - pre-loaded words render instantly.
//!
//! # Supersession
//!
//! Typing faster than the image source responds creates overlapping
//! fetches. Each fetch takes a ticket from a monotonically increasing
//! request token; on completion the result is committed only when the
//! ticket still equals the token. A stale result - success or failure - is
//! discarded without rendering or caching, so the most recently issued
//! request always wins regardless of network completion order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::SharedConfig;
use crate::display::render::{ImageState, RenderSink};
use crate::images::dictionary::DictionaryLookup;
use crate::images::source::{ImageSource, ImageSourceError, Photo};
use crate::removal::BackgroundRemoval;

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Outcome of a [`ImageResolver::resolve`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Blank input; the panel was reset.
    Default,
    /// The word is shown as large text only.
    TextOnly,
    /// The word failed dictionary validation.
    Nonsense,
    /// Photos are displayed; carries the carousel size.
    Photos(usize),
    /// A newer request superseded this one; nothing was changed.
    Superseded,
}

// ---------------------------------------------------------------------------
// Carousel
// ---------------------------------------------------------------------------

/// The displayed word's photo set and position. Replaced wholesale on each
/// new word, never partially mutated across words.
#[derive(Debug, Clone)]
struct Carousel {
    word: String,
    photos: Vec<Photo>,
    index: usize,
}

// ---------------------------------------------------------------------------
// ImageResolver
// ---------------------------------------------------------------------------

/// Owns the photo cache, the validity cache, the request token and the
/// carousel. Shared behind an `Arc`; all methods take `&self` and keep lock
/// sections short and free of `.await`.
pub struct ImageResolver {
    config: SharedConfig,
    source: Arc<dyn ImageSource>,
    dictionary: Arc<dyn DictionaryLookup>,
    render: Arc<dyn RenderSink>,
    removal: Option<Arc<BackgroundRemoval>>,
    /// word -> photo set. An empty set is a negative entry: "looked it up,
    /// nothing usable" - re-resolving must not re-fetch.
    cache: Mutex<HashMap<String, Vec<Photo>>>,
    /// word -> dictionary verdict, write-once per session.
    validity: Mutex<HashMap<String, bool>>,
    /// The shared "latest request" marker.
    token: AtomicU64,
    carousel: Mutex<Option<Carousel>>,
}

impl ImageResolver {
    pub fn new(
        config: SharedConfig,
        source: Arc<dyn ImageSource>,
        dictionary: Arc<dyn DictionaryLookup>,
        render: Arc<dyn RenderSink>,
    ) -> Self {
        Self {
            config,
            source,
            dictionary,
            render,
            removal: None,
            cache: Mutex::new(HashMap::new()),
            validity: Mutex::new(HashMap::new()),
            token: AtomicU64::new(0),
            carousel: Mutex::new(None),
        }
    }

    /// Attach the background-removal pipeline. Resolved photos are then run
    /// through it (when enabled in settings) after the initial render.
    pub fn with_background_removal(mut self, removal: Arc<BackgroundRemoval>) -> Self {
        self.removal = Some(removal);
        self
    }

    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------

    /// Resolve `word` into a panel state. See the module docs for the
    /// short-circuit order and the supersession protocol.
    pub async fn resolve(&self, word: &str) -> Resolution {
        let normalized = word.trim().to_lowercase();

        if normalized.is_empty() {
            self.show_default();
            return Resolution::Default;
        }

        // Single letters never get an image lookup.
        if normalized.chars().count() == 1 {
            self.show_text_only(&normalized);
            return Resolution::TextOnly;
        }

        let (allowed, allow_list_only) = {
            let cfg = self.config.read().unwrap();
            (
                cfg.filter.allows_image(&normalized),
                cfg.filter.allow_list_enabled,
            )
        };
        if !allowed {
            self.show_text_only(&normalized);
            return Resolution::TextOnly;
        }

        // Cache fast path - no network I/O on a hit, which is what makes
        // pre-loading worthwhile.
        let cached = self.cache.lock().unwrap().get(&normalized).cloned();
        if let Some(photos) = cached {
            if photos.is_empty() {
                self.show_text_only(&normalized);
                return Resolution::TextOnly;
            }
            let count = photos.len();
            let ticket = self.token.load(Ordering::SeqCst);
            self.show_photos(&normalized, photos, ticket).await;
            return Resolution::Photos(count);
        }

        // Dictionary validation, skipped entirely in allow-list-only mode
        // (the allow list is the vocabulary).
        if !allow_list_only && !self.is_real_word(&normalized).await {
            self.show_nonsense(&normalized);
            return Resolution::Nonsense;
        }

        self.show_loading(&normalized);

        let ticket = self.token.fetch_add(1, Ordering::SeqCst) + 1;

        match self.source.search(&normalized).await {
            Ok(candidates) => {
                if self.token.load(Ordering::SeqCst) != ticket {
                    return Resolution::Superseded;
                }
                let photos: Vec<Photo> = candidates
                    .into_iter()
                    .filter(|c| c.is_photograph())
                    .map(Photo::from)
                    .collect();
                self.cache
                    .lock()
                    .unwrap()
                    .insert(normalized.clone(), photos.clone());

                if photos.is_empty() {
                    self.show_text_only(&normalized);
                    Resolution::TextOnly
                } else {
                    let count = photos.len();
                    self.show_photos(&normalized, photos, ticket).await;
                    Resolution::Photos(count)
                }
            }
            Err(e) => {
                if self.token.load(Ordering::SeqCst) != ticket {
                    return Resolution::Superseded;
                }
                log::warn!("image search for {normalized:?} failed: {e}");
                // Negative entry: do not retry a word the source cannot serve.
                self.cache
                    .lock()
                    .unwrap()
                    .insert(normalized.clone(), Vec::new());
                self.show_text_only(&normalized);
                Resolution::TextOnly
            }
        }
    }

    /// Check the validity cache, then the dictionary service. Transport
    /// failure fails open: the word is treated (and cached) as valid.
    async fn is_real_word(&self, word: &str) -> bool {
        if let Some(&valid) = self.validity.lock().unwrap().get(word) {
            return valid;
        }

        let valid = match self.dictionary.lookup(word).await {
            Ok(found) => found,
            Err(e) => {
                log::warn!("dictionary lookup for {word:?} failed (treating as valid): {e}");
                true
            }
        };
        self.validity.lock().unwrap().insert(word.to_string(), valid);
        valid
    }

    // -----------------------------------------------------------------------
    // Carousel navigation
    // -----------------------------------------------------------------------

    /// Advance to the next photo, wrapping at the end.
    pub async fn next_photo(&self) {
        self.step_carousel(1).await;
    }

    /// Step back to the previous photo, wrapping at the start.
    pub async fn prev_photo(&self) {
        self.step_carousel(-1).await;
    }

    async fn step_carousel(&self, delta: isize) {
        let shown = {
            let mut guard = self.carousel.lock().unwrap();
            let Some(carousel) = guard.as_mut() else {
                return;
            };
            if carousel.photos.len() <= 1 {
                return;
            }
            let len = carousel.photos.len() as isize;
            carousel.index = (carousel.index as isize + delta).rem_euclid(len) as usize;
            (
                carousel.word.clone(),
                carousel.photos[carousel.index].clone(),
                carousel.index,
                carousel.photos.len(),
            )
        };

        let (word, photo, index, count) = shown;
        self.render_photo(&word, &photo, index, count);
        let ticket = self.token.load(Ordering::SeqCst);
        self.apply_background_removal(&word, &photo, ticket).await;
    }

    /// Current carousel position as `(index, count)`, when photos are shown.
    pub fn carousel_position(&self) -> Option<(usize, usize)> {
        self.carousel
            .lock()
            .unwrap()
            .as_ref()
            .map(|c| (c.index, c.photos.len()))
    }

    // -----------------------------------------------------------------------
    // Cache maintenance / pre-load support
    // -----------------------------------------------------------------------

    /// Whether `word` already has a cache entry (positive or negative).
    pub fn is_cached(&self, word: &str) -> bool {
        self.cache
            .lock()
            .unwrap()
            .contains_key(&word.trim().to_lowercase())
    }

    /// Fetch and cache `word`'s photo set without touching the visible
    /// display or the request token - the pre-loader's path. Words with
    /// photos are also marked dictionary-valid so later resolution skips
    /// the validation call. Returns the first photo url when any were found.
    pub async fn warm_cache(&self, word: &str) -> Result<Option<String>, ImageSourceError> {
        let normalized = word.trim().to_lowercase();
        let candidates = self.source.search(&normalized).await?;
        let photos: Vec<Photo> = candidates
            .into_iter()
            .filter(|c| c.is_photograph())
            .map(Photo::from)
            .collect();

        let first = photos.first().map(|p| p.url.clone());
        if !photos.is_empty() {
            self.validity.lock().unwrap().insert(normalized.clone(), true);
        }
        self.cache.lock().unwrap().insert(normalized, photos);
        Ok(first)
    }

    /// Drop both caches. Exposed to the host for long sessions; there is no
    /// automatic eviction.
    pub fn clear_caches(&self) {
        self.cache.lock().unwrap().clear();
        self.validity.lock().unwrap().clear();
    }

    // -----------------------------------------------------------------------
    // Panel states
    // -----------------------------------------------------------------------

    /// Reset the panel to its initial state.
    pub fn show_default(&self) {
        *self.carousel.lock().unwrap() = None;
        self.render.set_image_state(&ImageState::Default);
        self.render.set_attribution("");
        self.render.set_navigation(false);
    }

    fn show_text_only(&self, word: &str) {
        *self.carousel.lock().unwrap() = None;
        self.render.set_image_state(&ImageState::TextOnly { word: word.into() });
        self.render.set_attribution("");
        self.render.set_navigation(false);
    }

    fn show_nonsense(&self, word: &str) {
        *self.carousel.lock().unwrap() = None;
        self.render
            .set_image_state(&ImageState::Nonsense { word: word.into() });
        self.render
            .set_attribution("Not a real word — no image shown");
        self.render.set_navigation(false);
    }

    fn show_loading(&self, word: &str) {
        *self.carousel.lock().unwrap() = None;
        self.render
            .set_image_state(&ImageState::Loading { word: word.into() });
        self.render.set_attribution("Searching for image...");
        self.render.set_navigation(false);
    }

    async fn show_photos(&self, word: &str, photos: Vec<Photo>, ticket: u64) {
        let first = photos[0].clone();
        let count = photos.len();
        *self.carousel.lock().unwrap() = Some(Carousel {
            word: word.to_string(),
            photos,
            index: 0,
        });
        self.render_photo(word, &first, 0, count);
        self.apply_background_removal(word, &first, ticket).await;
    }

    fn render_photo(&self, word: &str, photo: &Photo, index: usize, count: usize) {
        self.render.set_image_state(&ImageState::Photo {
            word: word.into(),
            url: photo.url.clone(),
            title: photo.title.clone(),
        });
        self.render.set_attribution(&attribution(index, count));
        self.render.set_navigation(count > 1);
    }

    /// Run the displayed photo through background removal and swap in the
    /// processed image - unless a newer request started or the carousel
    /// moved on while inference ran.
    async fn apply_background_removal(&self, word: &str, photo: &Photo, ticket: u64) {
        let Some(removal) = &self.removal else {
            return;
        };

        let processed = removal.process(&photo.url, word, false).await;
        if processed == photo.url {
            return;
        }
        if self.token.load(Ordering::SeqCst) != ticket {
            return;
        }
        let still_shown = self
            .carousel
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|c| c.photos[c.index].url == photo.url);
        if !still_shown {
            return;
        }

        self.render.set_image_state(&ImageState::Photo {
            word: word.into(),
            url: processed,
            title: photo.title.clone(),
        });
    }
}

/// Attribution line for a displayed photo.
fn attribution(index: usize, count: usize) -> String {
    if count > 1 {
        format!("Image {} of {} — Wikimedia Commons", index + 1, count)
    } else {
        "Image from Wikimedia Commons".to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
