//! The shared "current model" cell read by predictions and replaced by retrains.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::training::domain::FittedPipeline;

/// Handle to the active fitted pipeline. Clones share the same cell.
///
/// The lock only guards the pointer: readers clone the inner `Arc` and release
/// it immediately, so a swap never waits on a running prediction and a
/// prediction never sees a half-built pipeline.
#[derive(Clone, Default)]
pub struct ActiveModel {
    inner: Arc<RwLock<Option<Arc<FittedPipeline>>>>,
}

impl ActiveModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point-in-time view of the active model.
    pub fn snapshot(&self) -> Option<Arc<FittedPipeline>> {
        self.inner.read().clone()
    }

    /// Publish a new model, returning the one it replaced.
    pub fn swap(&self, next: Arc<FittedPipeline>) -> Option<Arc<FittedPipeline>> {
        self.inner.write().replace(next)
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.read().is_some()
    }
}

impl std::fmt::Debug for ActiveModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveModel")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
