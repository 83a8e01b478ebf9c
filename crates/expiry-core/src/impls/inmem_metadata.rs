//! InMemoryMetadataStore - 開発用のメタデータストア

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{HostError, ItemId};
use crate::ports::MetadataStore;

#[derive(Debug, Clone, Default)]
pub struct InMemoryMetadataStore {
    values: Arc<Mutex<HashMap<(ItemId, String), String>>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn get(&self, item: ItemId, key: &str) -> Result<Option<String>, HostError> {
        let values = self.values.lock().await;
        Ok(values.get(&(item, key.to_string())).cloned())
    }

    async fn set(&self, item: ItemId, key: &str, value: String) -> Result<(), HostError> {
        let mut values = self.values.lock().await;
        values.insert((item, key.to_string()), value);
        Ok(())
    }

    async fn delete(&self, item: ItemId, key: &str) -> Result<(), HostError> {
        let mut values = self.values.lock().await;
        values.remove(&(item, key.to_string()));
        Ok(())
    }

    async fn items_with(&self, key: &str) -> Result<Vec<(ItemId, String)>, HostError> {
        let values = self.values.lock().await;
        let mut found: Vec<(ItemId, String)> = values
            .iter()
            .filter(|((_, k), _)| k == key)
            .map(|((item, _), value)| (*item, value.clone()))
            .collect();
        found.sort_by_key(|(item, _)| *item);
        Ok(found)
    }
}
