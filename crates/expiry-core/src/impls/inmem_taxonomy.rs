//! InMemoryTaxonomy - 開発用のカテゴリ管理

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{CategoryId, HostError, ItemId};
use crate::ports::Taxonomy;

#[derive(Debug)]
struct TaxonomyState {
    by_name: HashMap<String, CategoryId>,
    assigned: HashMap<ItemId, BTreeSet<CategoryId>>,
    next_id: u64,
}

#[derive(Debug, Clone)]
pub struct InMemoryTaxonomy {
    state: Arc<Mutex<TaxonomyState>>,
}

impl InMemoryTaxonomy {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(TaxonomyState {
                by_name: HashMap::new(),
                assigned: HashMap::new(),
                next_id: 1,
            })),
        }
    }
}

impl Default for InMemoryTaxonomy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Taxonomy for InMemoryTaxonomy {
    async fn ensure_category(&self, name: &str) -> Result<CategoryId, HostError> {
        let mut state = self.state.lock().await;
        if let Some(id) = state.by_name.get(name) {
            return Ok(*id);
        }
        let id = CategoryId::new(state.next_id);
        state.next_id += 1;
        state.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    async fn category_id(&self, name: &str) -> Result<Option<CategoryId>, HostError> {
        let state = self.state.lock().await;
        Ok(state.by_name.get(name).copied())
    }

    async fn set_categories(
        &self,
        item: ItemId,
        categories: &[CategoryId],
        replace: bool,
    ) -> Result<(), HostError> {
        let mut state = self.state.lock().await;
        let assigned = state.assigned.entry(item).or_default();
        if replace {
            assigned.clear();
        }
        assigned.extend(categories.iter().copied());
        Ok(())
    }

    async fn categories_of(&self, item: ItemId) -> Result<Vec<CategoryId>, HostError> {
        let state = self.state.lock().await;
        Ok(state
            .assigned
            .get(&item)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default())
    }
}
