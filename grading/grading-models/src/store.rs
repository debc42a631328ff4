//! Shared holder of the active model bundle.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use crate::bundle::ModelBundle;
use crate::checkpoint::{load_bundle, save_bundle};
use crate::error::{ModelError, Result};

/// The currently active [`ModelBundle`], replaced atomically.
///
/// Readers take an `Arc` snapshot and keep using it even if a newer bundle
/// is published meanwhile; no reader ever sees a half-replaced model.
///
/// # Example
///
/// ```
/// use grading_models::ModelStore;
///
/// let store = ModelStore::new();
/// assert!(!store.is_loaded());
/// assert!(store.require().is_err());
/// ```
#[derive(Debug, Default)]
pub struct ModelStore {
    current: RwLock<Option<Arc<ModelBundle>>>,
}

impl ModelStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding a bundle.
    #[must_use]
    pub fn with_bundle(bundle: ModelBundle) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(bundle))),
        }
    }

    /// Replaces the active bundle and returns the new snapshot.
    pub fn publish(&self, bundle: ModelBundle) -> Arc<ModelBundle> {
        let bundle = Arc::new(bundle);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(Arc::clone(&bundle));
        drop(guard);
        info!(k = bundle.num_grades(), "model published");
        bundle
    }

    /// Returns a snapshot of the active bundle.
    #[must_use]
    pub fn current(&self) -> Option<Arc<ModelBundle>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns a snapshot of the active bundle or [`ModelError::NotLoaded`].
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotLoaded`] if no bundle is active.
    pub fn require(&self) -> Result<Arc<ModelBundle>> {
        self.current().ok_or(ModelError::NotLoaded)
    }

    /// Returns `true` if a bundle is active.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Removes the active bundle, returning it.
    pub fn unload(&self) -> Option<Arc<ModelBundle>> {
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Loads a bundle from disk and publishes it.
    ///
    /// The active bundle is left untouched if loading fails.
    ///
    /// # Errors
    ///
    /// Any error from [`load_bundle`].
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Arc<ModelBundle>> {
        let bundle = load_bundle(path)?;
        Ok(self.publish(bundle))
    }

    /// Writes the active bundle to disk.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotLoaded`] if no bundle is active, or any
    /// error from [`save_bundle`].
    pub fn save_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let bundle = self.require()?;
        save_bundle(&bundle, path)
    }
}
