//! InMemoryEventSink - テスト用のイベント記録

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ExpiryEvent, ItemId};
use crate::ports::EventSink;

#[derive(Debug, Clone, Default)]
pub struct InMemoryEventSink {
    events: Arc<Mutex<Vec<ExpiryEvent>>>,
}

impl InMemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<ExpiryEvent> {
        self.events.lock().await.clone()
    }

    pub async fn events_for(&self, item: ItemId) -> Vec<ExpiryEvent> {
        self.events
            .lock()
            .await
            .iter()
            .filter(|event| event.item == item)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EventSink for InMemoryEventSink {
    async fn emit(&self, event: ExpiryEvent) {
        self.events.lock().await.push(event);
    }
}
