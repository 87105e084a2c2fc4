//! Application state shared across request handlers.

use std::sync::Arc;

use crate::store::ScheduleStore;

/// Shared application state.
///
/// This is passed to all request handlers via Axum's state extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: ScheduleStore,
    strategy: &'static str,
}

impl AppState {
    /// Create a new application state.
    pub fn new(store: ScheduleStore, strategy: &'static str) -> Self {
        Self {
            inner: Arc::new(AppStateInner { store, strategy }),
        }
    }

    /// Get a reference to the schedule store.
    pub fn store(&self) -> &ScheduleStore {
        &self.inner.store
    }

    /// Name of the distribution strategy in use.
    pub fn strategy(&self) -> &'static str {
        self.inner.strategy
    }
}
