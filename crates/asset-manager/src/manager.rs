//! Asset Manager Implementation

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use image::RgbaImage;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::loader::{load_asset, AssetSource};
use crate::AssetError;

/// Height/width ratio used while the real dimensions are unknown
pub const FALLBACK_ASPECT_RATIO: f64 = 0.5;

/// Generation number of one `select` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LoadToken(u64);

impl LoadToken {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Load state of the current selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Nothing selected yet
    #[default]
    Empty,
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Default)]
struct Slot {
    token: LoadToken,
    source: Option<AssetSource>,
    state: LoadState,
    image: Option<Arc<RgbaImage>>,
}

/// Point-in-time view of the current selection
#[derive(Debug, Clone, Default)]
pub struct AssetSnapshot {
    pub token: LoadToken,
    pub source: Option<AssetSource>,
    pub state: LoadState,
    /// Decoded image; only present once the selection is ready
    pub image: Option<Arc<RgbaImage>>,
}

impl AssetSnapshot {
    pub fn ready(&self) -> bool {
        self.state == LoadState::Ready && self.image.is_some()
    }

    /// Natural pixel size, once decoded
    pub fn natural_size(&self) -> Option<(u32, u32)> {
        self.image.as_ref().map(|img| img.dimensions())
    }

    /// Height over width, or the fallback while the size is unknown
    pub fn aspect_ratio(&self) -> f64 {
        match self.natural_size() {
            Some((w, h)) if w > 0 => f64::from(h) / f64::from(w),
            _ => FALLBACK_ASPECT_RATIO,
        }
    }
}

/// Completion handle of an in-flight load
pub struct LoadHandle {
    pub token: LoadToken,
    task: Option<JoinHandle<bool>>,
}

impl LoadHandle {
    /// Wait for the load to finish; true if its result was applied
    pub async fn wait(self) -> bool {
        match self.task {
            Some(task) => task.await.unwrap_or(false),
            None => false,
        }
    }
}

/// Shared handle to the current overlay selection
#[derive(Debug, Clone, Default)]
pub struct AssetManager {
    slot: Arc<Mutex<Slot>>,
}

impl AssetManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        // The slot is updated in single assignments, a poisoned lock still holds a consistent value
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Select `source` and load it in the background.
    ///
    /// The new selection is current (and not ready) as soon as this returns.
    pub fn select(&self, source: impl Into<AssetSource>) -> LoadHandle {
        let source = source.into();
        let token = self.begin(source.clone());

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                self.complete(token, Err(AssetError::NoRuntime(source.to_string())));
                return LoadHandle { token, task: None };
            }
        };

        let manager = self.clone();
        let task = handle.spawn(async move {
            let result = load_asset(&source).await;
            manager.complete(token, result)
        });

        LoadHandle {
            token,
            task: Some(task),
        }
    }

    /// Start a new selection without loading anything
    pub fn begin(&self, source: AssetSource) -> LoadToken {
        let mut slot = self.lock();
        let token = LoadToken(slot.token.0 + 1);
        info!(
            "Selecting overlay asset {} (generation {})",
            source,
            token.generation()
        );

        *slot = Slot {
            token,
            source: Some(source),
            state: LoadState::Loading,
            image: None,
        };
        token
    }

    /// Apply the outcome of the load started under `token`.
    ///
    /// Returns false, leaving the state untouched, when a newer selection
    /// has been made since.
    pub fn complete(&self, token: LoadToken, result: Result<RgbaImage, AssetError>) -> bool {
        let mut slot = self.lock();
        if slot.token != token {
            debug!(
                "Discarding stale load of generation {} (current {})",
                token.generation(),
                slot.token.generation()
            );
            return false;
        }

        let source = slot
            .source
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();

        match result {
            Ok(image) => {
                info!(
                    "Overlay asset loaded: {} ({}x{})",
                    source,
                    image.width(),
                    image.height()
                );
                slot.image = Some(Arc::new(image));
                slot.state = LoadState::Ready;
            }
            Err(e) => {
                error!("Failed to load overlay asset {}: {}", source, e);
                slot.image = None;
                slot.state = LoadState::Failed;
            }
        }
        true
    }

    /// Snapshot of the current selection
    pub fn current(&self) -> AssetSnapshot {
        let slot = self.lock();
        AssetSnapshot {
            token: slot.token,
            source: slot.source.clone(),
            state: slot.state,
            image: slot.image.clone(),
        }
    }
}
