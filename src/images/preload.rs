//! Pre-loader - warms the image cache from a configured word list.
//!
//! Words are fetched sequentially with a stagger between requests so the
//! image source never sees a burst. Each word is cached exactly as the
//! resolver would cache it (including marking it dictionary-valid), so a
//! learner typing a pre-loaded word gets an instant, network-free render.
//! Per-word failures are logged and skipped; the queue always runs to the
//! end.

use std::sync::Arc;
use std::time::Duration;

use crate::config::SharedConfig;
use crate::display::render::RenderSink;
use crate::images::resolver::ImageResolver;
use crate::removal::BackgroundRemoval;

/// Pause between consecutive fetches.
const STAGGER: Duration = Duration::from_millis(350);

/// How long the completion message stays up before clearing.
const CLEAR_DELAY: Duration = Duration::from_secs(4);

// ---------------------------------------------------------------------------
// Preloader
// ---------------------------------------------------------------------------

pub struct Preloader {
    config: SharedConfig,
    resolver: Arc<ImageResolver>,
    removal: Option<Arc<BackgroundRemoval>>,
    render: Arc<dyn RenderSink>,
}

impl Preloader {
    pub fn new(
        config: SharedConfig,
        resolver: Arc<ImageResolver>,
        render: Arc<dyn RenderSink>,
    ) -> Self {
        Self {
            config,
            resolver,
            removal: None,
            render,
        }
    }

    /// Attach the background-removal pipeline; pre-loaded first photos are
    /// then processed ahead of time in silent mode.
    pub fn with_background_removal(mut self, removal: Arc<BackgroundRemoval>) -> Self {
        self.removal = Some(removal);
        self
    }

    /// Warm the cache from the word list configured in settings.
    pub async fn preload_configured(&self) {
        let words = self.config.read().unwrap().images.preload_words.clone();
        self.preload(&words).await;
    }

    /// Warm the cache for every word in a comma-separated list.
    ///
    /// Blanks and single characters are dropped, duplicates collapse to
    /// their first occurrence, already-cached words are skipped without a
    /// fetch. Progress is published to the render sink's pre-load counter
    /// and cleared a few seconds after completion.
    pub async fn preload(&self, word_list: &str) {
        let words = parse_preload_list(word_list);
        if words.is_empty() {
            return;
        }

        let total = words.len();
        self.render
            .set_preload_status(&format!("Pre-loading {total} {}…", plural(total)));

        let mut loaded = 0;
        for (i, word) in words.iter().enumerate() {
            if self.resolver.is_cached(word) {
                loaded += 1;
                self.render
                    .set_preload_status(&format!("Pre-loaded {loaded} / {total}"));
                continue;
            }

            // Stagger requests - wait before each fetch except the first word.
            if i > 0 {
                tokio::time::sleep(STAGGER).await;
            }

            match self.resolver.warm_cache(word).await {
                Ok(Some(first_url)) => {
                    self.process_ahead(&first_url, word).await;
                }
                Ok(None) => {}
                Err(e) => {
                    log::warn!("pre-load fetch for {word:?} failed: {e}");
                }
            }

            loaded += 1;
            self.render
                .set_preload_status(&format!("Pre-loaded {loaded} / {total}"));
        }

        self.render
            .set_preload_status(&format!("✓ All {total} {} pre-loaded", plural(total)));

        // Clear the message after a few seconds without holding up the caller.
        let render = Arc::clone(&self.render);
        tokio::spawn(async move {
            tokio::time::sleep(CLEAR_DELAY).await;
            render.set_preload_status("");
        });
    }

    /// Run a pre-loaded photo through background removal in silent mode so
    /// the processed version is cached before the learner types the word.
    async fn process_ahead(&self, url: &str, word: &str) {
        let Some(removal) = &self.removal else {
            return;
        };
        if !self.config.read().unwrap().images.remove_background {
            return;
        }
        // Best-effort: the original image still shows instantly on failure.
        let _ = removal.process(url, word, true).await;
    }
}

/// Split a comma-separated pre-load list into normalised candidate words:
/// trimmed, lowercased, blanks and single characters dropped, duplicates
/// collapsed to the first occurrence.
pub fn parse_preload_list(word_list: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    word_list
        .split(',')
        .map(|w| w.trim().to_lowercase())
        .filter(|w| w.chars().count() > 1)
        .filter(|w| seen.insert(w.clone()))
        .collect()
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        "word"
    } else {
        "words"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
