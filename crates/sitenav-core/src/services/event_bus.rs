//! Event channel for cross-component notification
//!
//! Handed into the service explicitly; consumers subscribe rather than
//! listening on an ambient global signal.

use serde::Serialize;
use sitenav_shared::EntityId;
use tokio::sync::broadcast;
use tracing::warn;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload")]
#[serde(rename_all = "snake_case")]
pub enum MenuEvent {
    TreeRefreshed { site_id: EntityId, count: usize },
    ReorderApplied { menu_id: EntityId, updated: usize },
    ReorderFailed { menu_id: EntityId, error: String },
    MenuDeleted { menu_id: EntityId, promoted: usize },
    SelectionChanged { menu_id: Option<EntityId> },
    SessionExpired,
}

pub struct EventBus {
    tx: broadcast::Sender<MenuEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, event: MenuEvent) {
        if let Err(e) = self.tx.send(event) {
            warn!("Failed to publish event (maybe no subscribers): {}", e);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MenuEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(sitenav_shared::constants::DEFAULT_EVENT_CHANNEL_CAPACITY)
    }
}
