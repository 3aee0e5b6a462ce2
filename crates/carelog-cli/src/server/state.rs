//! Application state for the web server.

use std::sync::Arc;

use carelog::Tagger;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Tagger shared read-only by every request.
    pub tagger: Arc<Tagger>,
}

impl AppState {
    /// Create new application state.
    pub fn new(tagger: Tagger) -> Self {
        Self {
            tagger: Arc::new(tagger),
        }
    }
}
