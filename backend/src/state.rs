use std::sync::Arc;

use crate::cache::ArtifactCache;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub calendars: Arc<ArtifactCache>,
}

impl AppState {
    pub fn new(calendars: Arc<ArtifactCache>) -> Self {
        Self { calendars }
    }
}
