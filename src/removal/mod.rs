//! Background-removal pipeline - strips photo backgrounds, best-effort.
//!
//! The heavy inference library is an external collaborator behind
//! [`RemovalEngine`]; it is loaded on first use only, and concurrent first
//! callers share the same in-flight load (a memoised async initialiser via
//! `tokio::sync::OnceCell`). A failed load is retried on the next call.
//!
//! Processing never breaks the primary display: any failure - load, fetch,
//! decode, inference - falls back to returning the original image reference,
//! and failures are never cached as processed.
//!
//! Processed images live in an in-memory blob store addressed by `blob:`
//! refs; [`BackgroundRemoval::clear_cache`] releases them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::config::SharedConfig;
use crate::display::render::RenderSink;

// ---------------------------------------------------------------------------
// RemovalError
// ---------------------------------------------------------------------------

/// Errors from any stage of the removal pipeline.
#[derive(Debug, Error)]
pub enum RemovalError {
    /// The inference library could not be obtained.
    #[error("removal library failed to load: {0}")]
    LibraryLoad(String),

    /// The source image bytes could not be fetched.
    #[error("image fetch failed: {0}")]
    Fetch(String),

    /// The fetched bytes are not a decodable image.
    #[error("image decode failed: {0}")]
    Decode(String),

    /// The inference pass itself failed.
    #[error("background removal inference failed: {0}")]
    Inference(String),
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Which stage a progress event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalStage {
    /// The engine is downloading model weights.
    ModelDownload,
    /// The compute-heavy inference pass.
    Inference,
}

/// A progress event emitted by the engine during processing.
#[derive(Debug, Clone, Copy)]
pub struct RemovalProgress {
    pub stage: RemovalStage,
    pub current: u64,
    pub total: u64,
}

/// Callback the engine invokes with progress events.
pub type ProgressFn = Arc<dyn Fn(RemovalProgress) + Send + Sync>;

// ---------------------------------------------------------------------------
// External seams
// ---------------------------------------------------------------------------

/// The external inference library: one operation, remove the background
/// from an encoded image, reporting progress along the way.
#[async_trait]
pub trait RemovalEngine: Send + Sync {
    async fn remove_background(
        &self,
        image: &[u8],
        progress: ProgressFn,
    ) -> Result<Vec<u8>, RemovalError>;
}

/// Obtains the engine. Called at most once per successful load; the result
/// is memoised for the session.
#[async_trait]
pub trait EngineLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn RemovalEngine>, RemovalError>;
}

/// Fetches source image bytes by url.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, RemovalError>;
}

/// Production fetcher using reqwest.
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }
}

impl Default for HttpImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, RemovalError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RemovalError::Fetch(e.to_string()))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RemovalError::Fetch(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

// ---------------------------------------------------------------------------
// BackgroundRemoval
// ---------------------------------------------------------------------------

/// The pipeline: lazy engine load, per-url result cache, blob store and
/// fallback behaviour.
pub struct BackgroundRemoval {
    config: SharedConfig,
    loader: Arc<dyn EngineLoader>,
    fetcher: Arc<dyn ImageFetcher>,
    render: Arc<dyn RenderSink>,
    engine: OnceCell<Arc<dyn RemovalEngine>>,
    /// source url -> processed blob ref. Only successes are stored.
    cache: Mutex<HashMap<String, String>>,
    /// blob ref -> processed bytes. Released by [`Self::clear_cache`].
    blobs: Mutex<HashMap<String, Arc<Vec<u8>>>>,
    next_blob: AtomicU64,
}

impl BackgroundRemoval {
    pub fn new(
        config: SharedConfig,
        loader: Arc<dyn EngineLoader>,
        fetcher: Arc<dyn ImageFetcher>,
        render: Arc<dyn RenderSink>,
    ) -> Self {
        Self {
            config,
            loader,
            fetcher,
            render,
            engine: OnceCell::new(),
            cache: Mutex::new(HashMap::new()),
            blobs: Mutex::new(HashMap::new()),
            next_blob: AtomicU64::new(0),
        }
    }

    /// Process `image_url` and return a displayable reference: a `blob:`
    /// ref to the processed image on success, the original url otherwise.
    ///
    /// `silent` suppresses every user-visible status update (the
    /// pre-loader's mode); interactive callers get attribution-line progress
    /// during inference.
    pub async fn process(&self, image_url: &str, word: &str, silent: bool) -> String {
        if !self.config.read().unwrap().images.remove_background {
            return image_url.to_string();
        }

        if let Some(processed) = self.cache.lock().unwrap().get(image_url) {
            return processed.clone();
        }

        match self.process_uncached(image_url, silent).await {
            Ok(blob_ref) => {
                if !silent {
                    self.render
                        .set_attribution("Background removed — Wikimedia Commons");
                }
                blob_ref
            }
            Err(e) => {
                log::warn!("background removal for {word:?} failed: {e}");
                if !silent {
                    self.render.set_attribution("Image from Wikimedia Commons");
                }
                image_url.to_string()
            }
        }
    }

    async fn process_uncached(&self, image_url: &str, silent: bool) -> Result<String, RemovalError> {
        if !silent {
            self.render
                .set_attribution("Loading background removal model...");
        }

        // First caller triggers the load; concurrent callers await the same
        // in-flight future. A failed load leaves the cell empty for retry.
        let engine = Arc::clone(
            self.engine
                .get_or_try_init(|| self.loader.load())
                .await?,
        );

        if !silent {
            self.render.set_attribution("Removing background...");
        }

        let image = self.fetcher.fetch(image_url).await?;

        let progress: ProgressFn = if silent {
            Arc::new(|_| {})
        } else {
            let render = Arc::clone(&self.render);
            Arc::new(move |p: RemovalProgress| {
                if p.stage == RemovalStage::Inference && p.total > 0 {
                    let pct = (p.current * 100 / p.total).min(100);
                    render.set_attribution(&format!("Removing background... {pct}%"));
                }
            })
        };

        let processed = engine.remove_background(&image, progress).await?;

        let blob_ref = self.store_blob(processed);
        self.cache
            .lock()
            .unwrap()
            .insert(image_url.to_string(), blob_ref.clone());
        Ok(blob_ref)
    }

    fn store_blob(&self, bytes: Vec<u8>) -> String {
        let id = self.next_blob.fetch_add(1, Ordering::SeqCst) + 1;
        let blob_ref = format!("blob:type-talker/{id}");
        self.blobs
            .lock()
            .unwrap()
            .insert(blob_ref.clone(), Arc::new(bytes));
        blob_ref
    }

    /// Resolve a `blob:` ref produced by [`Self::process`].
    pub fn processed_bytes(&self, blob_ref: &str) -> Option<Arc<Vec<u8>>> {
        self.blobs.lock().unwrap().get(blob_ref).cloned()
    }

    /// Drop all processed results and their backing bytes.
    pub fn clear_cache(&self) {
        self.cache.lock().unwrap().clear();
        self.blobs.lock().unwrap().clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use crate::config::AppConfig;
    use crate::display::render::ImageState;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    #[derive(Default)]
    struct CaptureRender {
        attributions: Mutex<Vec<String>>,
    }

    impl RenderSink for CaptureRender {
        fn set_lines(&self, _committed: &[String], _current: &str) {}
        fn set_image_state(&self, _state: &ImageState) {}
        fn set_attribution(&self, text: &str) {
            self.attributions.lock().unwrap().push(text.to_string());
        }
        fn set_navigation(&self, _visible: bool) {}
        fn set_status(&self, _text: &str) {}
        fn set_preload_status(&self, _text: &str) {}
    }

    /// Engine producing fixed output, optionally failing, counting calls and
    /// emitting a mid-inference progress event.
    struct FakeEngine {
        fail: bool,
        calls: AtomicUsize,
    }

    impl FakeEngine {
        fn ok() -> Self {
            Self {
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RemovalEngine for FakeEngine {
        async fn remove_background(
            &self,
            image: &[u8],
            progress: ProgressFn,
        ) -> Result<Vec<u8>, RemovalError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            progress(RemovalProgress {
                stage: RemovalStage::Inference,
                current: 50,
                total: 100,
            });
            if self.fail {
                return Err(RemovalError::Inference("model exploded".into()));
            }
            // "Processed" output: the input without its first byte.
            Ok(image[1..].to_vec())
        }
    }

    /// Loader handing out a shared engine, counting loads, optionally
    /// failing the first attempt.
    struct FakeLoader {
        engine: Arc<FakeEngine>,
        fail_first: Mutex<bool>,
        loads: AtomicUsize,
    }

    impl FakeLoader {
        fn new(engine: FakeEngine) -> Self {
            Self {
                engine: Arc::new(engine),
                fail_first: Mutex::new(false),
                loads: AtomicUsize::new(0),
            }
        }

        fn failing_once(engine: FakeEngine) -> Self {
            let loader = Self::new(engine);
            *loader.fail_first.lock().unwrap() = true;
            loader
        }

        fn load_count(&self) -> usize {
            self.loads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EngineLoader for FakeLoader {
        async fn load(&self) -> Result<Arc<dyn RemovalEngine>, RemovalError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            let mut fail_first = self.fail_first.lock().unwrap();
            if *fail_first {
                *fail_first = false;
                return Err(RemovalError::LibraryLoad("cdn unreachable".into()));
            }
            Ok(Arc::clone(&self.engine) as Arc<dyn RemovalEngine>)
        }
    }

    struct StaticFetcher;

    #[async_trait]
    impl ImageFetcher for StaticFetcher {
        async fn fetch(&self, _url: &str) -> Result<Vec<u8>, RemovalError> {
            Ok(vec![0xFF, 1, 2, 3])
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl ImageFetcher for FailingFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, RemovalError> {
            Err(RemovalError::Fetch(format!("unreachable: {url}")))
        }
    }

    struct Fixture {
        removal: BackgroundRemoval,
        render: Arc<CaptureRender>,
        loader: Arc<FakeLoader>,
    }

    fn fixture(loader: FakeLoader, enabled: bool) -> Fixture {
        fixture_with_fetcher(loader, enabled, Arc::new(StaticFetcher))
    }

    fn fixture_with_fetcher(
        loader: FakeLoader,
        enabled: bool,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> Fixture {
        let mut config = AppConfig::default();
        config.images.remove_background = enabled;
        let render = Arc::new(CaptureRender::default());
        let loader = Arc::new(loader);
        let removal = BackgroundRemoval::new(
            config.into_shared(),
            Arc::clone(&loader) as Arc<dyn EngineLoader>,
            fetcher,
            Arc::clone(&render) as Arc<dyn RenderSink>,
        );
        Fixture {
            removal,
            render,
            loader,
        }
    }

    const URL: &str = "https://img.example/cat.jpg";

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn disabled_returns_original_without_loading() {
        let f = fixture(FakeLoader::new(FakeEngine::ok()), false);
        assert_eq!(f.removal.process(URL, "cat", false).await, URL);
        assert_eq!(f.loader.load_count(), 0);
    }

    #[tokio::test]
    async fn success_returns_blob_ref_and_caches() {
        let f = fixture(FakeLoader::new(FakeEngine::ok()), true);

        let first = f.removal.process(URL, "cat", false).await;
        assert!(first.starts_with("blob:"));
        assert_eq!(
            f.removal.processed_bytes(&first).as_deref(),
            Some(&vec![1, 2, 3])
        );

        // Second call is a cache hit: same ref, no second inference.
        let second = f.removal.process(URL, "cat", false).await;
        assert_eq!(first, second);
        assert_eq!(f.loader.engine.calls.load(Ordering::SeqCst), 1);
    }

    /// Any stage failure returns the original reference, never an error,
    /// and the failure is not cached as processed.
    #[tokio::test]
    async fn inference_failure_falls_back_to_original() {
        let f = fixture(FakeLoader::new(FakeEngine::failing()), true);

        assert_eq!(f.removal.process(URL, "cat", false).await, URL);
        assert!(f.removal.cache.lock().unwrap().is_empty());

        // Each attempt retries the inference (nothing was negatively cached).
        assert_eq!(f.removal.process(URL, "cat", false).await, URL);
        assert_eq!(f.loader.engine.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn fetch_failure_falls_back_to_original() {
        let f = fixture_with_fetcher(
            FakeLoader::new(FakeEngine::ok()),
            true,
            Arc::new(FailingFetcher),
        );
        assert_eq!(f.removal.process(URL, "cat", false).await, URL);
    }

    /// A failed library load falls back, then succeeds on the next call -
    /// the memoised cell does not pin the failure.
    #[tokio::test]
    async fn failed_load_is_retried() {
        let f = fixture(FakeLoader::failing_once(FakeEngine::ok()), true);

        assert_eq!(f.removal.process(URL, "cat", false).await, URL);
        let second = f.removal.process(URL, "cat", false).await;
        assert!(second.starts_with("blob:"));
        assert_eq!(f.loader.load_count(), 2);
    }

    /// Concurrent first callers share one in-flight load.
    #[tokio::test]
    async fn concurrent_callers_share_one_load() {
        let f = fixture(FakeLoader::new(FakeEngine::ok()), true);

        let (a, b) = tokio::join!(
            f.removal.process("https://img.example/a.jpg", "a", true),
            f.removal.process("https://img.example/b.jpg", "b", true),
        );

        assert!(a.starts_with("blob:"));
        assert!(b.starts_with("blob:"));
        assert_ne!(a, b);
        assert_eq!(f.loader.load_count(), 1);
    }

    #[tokio::test]
    async fn interactive_mode_publishes_inference_progress() {
        let f = fixture(FakeLoader::new(FakeEngine::ok()), true);
        f.removal.process(URL, "cat", false).await;

        let attributions = f.render.attributions.lock().unwrap();
        assert!(attributions.contains(&"Loading background removal model...".to_string()));
        assert!(attributions.contains(&"Removing background... 50%".to_string()));
        assert_eq!(
            attributions.last().map(String::as_str),
            Some("Background removed — Wikimedia Commons")
        );
    }

    #[tokio::test]
    async fn silent_mode_publishes_nothing() {
        let f = fixture(FakeLoader::new(FakeEngine::ok()), true);
        f.removal.process(URL, "cat", true).await;
        assert!(f.render.attributions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failure_restores_attribution() {
        let f = fixture(FakeLoader::new(FakeEngine::failing()), true);
        f.removal.process(URL, "cat", false).await;

        let attributions = f.render.attributions.lock().unwrap();
        assert_eq!(
            attributions.last().map(String::as_str),
            Some("Image from Wikimedia Commons")
        );
    }

    #[tokio::test]
    async fn clear_cache_releases_blobs_and_mappings() {
        let f = fixture(FakeLoader::new(FakeEngine::ok()), true);

        let blob_ref = f.removal.process(URL, "cat", false).await;
        assert!(f.removal.processed_bytes(&blob_ref).is_some());

        f.removal.clear_cache();
        assert!(f.removal.processed_bytes(&blob_ref).is_none());

        // A re-process runs inference again.
        let again = f.removal.process(URL, "cat", false).await;
        assert!(again.starts_with("blob:"));
        assert_eq!(f.loader.engine.calls.load(Ordering::SeqCst), 2);
    }
}
