//! Image source - querying Wikimedia Commons for candidate photos.
//!
//! [`ImageSource`] is the async seam the resolver and preloader fetch
//! through; [`WikimediaSource`] is the production implementation. It returns
//! every candidate the query surfaced, including vector/animated media - the
//! photographic-only policy is applied by the caller via
//! [`ImageCandidate::is_photograph`].

use async_trait::async_trait;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ImageSourceError
// ---------------------------------------------------------------------------

/// Errors that can occur while querying the image source.
#[derive(Debug, Error)]
pub enum ImageSourceError {
    /// HTTP transport or connection error.
    #[error("image search request failed: {0}")]
    Request(String),

    /// The request did not complete within the client timeout.
    #[error("image search timed out")]
    Timeout,

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse image search response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ImageSourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ImageSourceError::Timeout
        } else {
            ImageSourceError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// ImageCandidate / Photo
// ---------------------------------------------------------------------------

/// MIME types accepted as photographs. Vector and animated formats are
/// excluded - line art defeats the photographic-cue purpose.
const PHOTO_MIMES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// One search result as returned by the image source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub url: String,
    pub title: String,
    /// MIME type reported by the source ("image/jpeg", "image/svg+xml", …).
    pub media_type: String,
}

impl ImageCandidate {
    /// Whether this candidate is a photographic raster image.
    pub fn is_photograph(&self) -> bool {
        PHOTO_MIMES.contains(&self.media_type.as_str())
    }
}

/// A retained photo: what the cache stores and the carousel cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub url: String,
    pub title: String,
}

impl From<ImageCandidate> for Photo {
    fn from(candidate: ImageCandidate) -> Self {
        Self {
            url: candidate.url,
            title: candidate.title,
        }
    }
}

// ---------------------------------------------------------------------------
// ImageSource trait
// ---------------------------------------------------------------------------

/// Async trait for image search backends.
///
/// Implementors must be `Send + Sync` so they can be shared behind an
/// `Arc<dyn ImageSource>`.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Search for images matching `word`. An empty result is a valid
    /// outcome, distinct from an `Err`.
    async fn search(&self, word: &str) -> Result<Vec<ImageCandidate>, ImageSourceError>;
}

// ---------------------------------------------------------------------------
// WikimediaSource
// ---------------------------------------------------------------------------

/// Queries the Wikimedia Commons search API (file namespace, up to 10
/// results, 400px thumbnails).
pub struct WikimediaSource {
    client: reqwest::Client,
    base_url: String,
}

impl WikimediaSource {
    const DEFAULT_BASE_URL: &'static str = "https://commons.wikimedia.org/w/api.php";

    pub fn new() -> Self {
        Self::with_base_url(Self::DEFAULT_BASE_URL.into())
    }

    /// Point the source at a different endpoint (useful for tests).
    pub fn with_base_url(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, base_url }
    }
}

impl Default for WikimediaSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageSource for WikimediaSource {
    async fn search(&self, word: &str) -> Result<Vec<ImageCandidate>, ImageSourceError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("action", "query"),
                ("generator", "search"),
                ("gsrsearch", word),
                ("gsrnamespace", "6"),
                ("gsrlimit", "10"),
                ("prop", "imageinfo"),
                ("iiprop", "url|mime|extmetadata"),
                ("iiurlwidth", "400"),
                ("format", "json"),
                ("origin", "*"),
            ])
            .send()
            .await?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ImageSourceError::Parse(e.to_string()))?;

        Ok(parse_response(&json, word))
    }
}

/// Walk a Commons `query.pages` response into candidates.
///
/// Pages without image info or a usable url are skipped. The thumbnail url
/// is preferred over the original (400px is plenty for the display and far
/// cheaper to fetch).
pub fn parse_response(json: &serde_json::Value, word: &str) -> Vec<ImageCandidate> {
    let Some(pages) = json["query"]["pages"].as_object() else {
        return Vec::new();
    };

    pages
        .values()
        .filter_map(|page| {
            let info = &page["imageinfo"][0];
            let url = info["thumburl"]
                .as_str()
                .or_else(|| info["url"].as_str())?;
            let media_type = info["mime"].as_str().unwrap_or_default();
            let title = clean_title(page["title"].as_str(), word);
            Some(ImageCandidate {
                url: url.to_string(),
                title,
                media_type: media_type.to_string(),
            })
        })
        .collect()
}

/// Turn a Commons file title ("File:Tabby cat.jpg") into a display title
/// ("Tabby cat"). Falls back to the search word.
fn clean_title(raw: Option<&str>, word: &str) -> String {
    let Some(raw) = raw else {
        return word.to_string();
    };
    let stripped = raw.strip_prefix("File:").unwrap_or(raw);
    let stripped = match stripped.rfind('.') {
        Some(dot) if dot > 0 => &stripped[..dot],
        _ => stripped,
    };
    if stripped.is_empty() {
        word.to_string()
    } else {
        stripped.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
