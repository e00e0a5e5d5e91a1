//! Overlay Asset Manager
//!
//! Tracks the currently selected glasses image and its load state.
//! Every selection gets a fresh generation token; only the completion
//! carrying the current token may change the state, so a slow load of a
//! superseded selection can never overwrite a newer one.

mod loader;
mod manager;

pub use loader::{load_asset, AssetSource};
pub use manager::{AssetManager, AssetSnapshot, LoadHandle, LoadState, LoadToken, FALLBACK_ASPECT_RATIO};

use thiserror::Error;

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Unsupported asset source: {0}")]
    UnsupportedSource(String),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Asset image {0} has zero size")]
    Empty(String),

    #[error("Load task failed: {0}")]
    Task(String),

    #[error("No async runtime available to load {0}")]
    NoRuntime(String),
}
