//! Taxonomy port - カテゴリの作成・検索・付与

use async_trait::async_trait;

use crate::domain::{CategoryId, HostError, ItemId};

#[async_trait]
pub trait Taxonomy: Send + Sync {
    /// Create the category if it is absent; return its id either way.
    async fn ensure_category(&self, name: &str) -> Result<CategoryId, HostError>;

    async fn category_id(&self, name: &str) -> Result<Option<CategoryId>, HostError>;

    /// Assign categories to an item. With `replace` the item's set becomes
    /// exactly `categories`, otherwise they are added to it.
    async fn set_categories(
        &self,
        item: ItemId,
        categories: &[CategoryId],
        replace: bool,
    ) -> Result<(), HostError>;

    async fn categories_of(&self, item: ItemId) -> Result<Vec<CategoryId>, HostError>;
}
