//! Shared WebSocket adapter state.
//!
//! The feed entry point depends on the domain event bus port instead of a
//! concrete broadcast implementation so the adapter stays testable with
//! deterministic test doubles.

use std::sync::Arc;

use url::Url;

use crate::domain::ports::CaseEventBus;

/// Dependency bundle for the WebSocket feed.
#[derive(Clone)]
pub struct WsState {
    pub events: Arc<dyn CaseEventBus>,
    pub allowed_origins: Arc<Vec<Url>>,
}

impl WsState {
    /// Construct state from the event bus and the upgrade origin allow-list.
    pub fn new(events: Arc<dyn CaseEventBus>, allowed_origins: Vec<Url>) -> Self {
        Self {
            events,
            allowed_origins: Arc::new(allowed_origins),
        }
    }
}
