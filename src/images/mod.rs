//! Image lookup: source querying, dictionary validation, race-safe
//! resolution, carousel navigation and cache pre-loading.
//!
//! This module provides:
//! * [`ImageSource`] / [`WikimediaSource`] - async search seam + production
//!   Wikimedia Commons implementation.
//! * [`DictionaryLookup`] / [`DictionaryApiLookup`] - word validation seam.
//! * [`ImageResolver`] - the word → panel-state decision procedure, with
//!   caching and the request-token supersession protocol.
//! * [`Preloader`] - staggered cache warming from a configured word list.

pub mod dictionary;
pub mod preload;
pub mod resolver;
pub mod source;

pub use dictionary::{DictionaryApiLookup, DictionaryError, DictionaryLookup};
pub use preload::{parse_preload_list, Preloader};
pub use resolver::{ImageResolver, Resolution};
pub use source::{ImageCandidate, ImageSource, ImageSourceError, Photo, WikimediaSource};
