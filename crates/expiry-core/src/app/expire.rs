//! ExpiryHandler - 期限到来時のコールバック
//!
//! item を `expired` カテゴリに付け替える。付け替え方（置換 / 追加）は
//! `CategoryPolicy` で決まる。期限日のメタデータは残す（編集画面に日付が出続ける）。

use std::sync::Arc;

use async_trait::async_trait;

use super::hooks::HookHandler;
use super::scheduler::ExpiryScheduler;
use crate::domain::{
    CategoryId, CategoryPolicy, ExpiryError, ExpiryEventKind, ItemId, ScheduledEvent, Timestamp,
};
use crate::ports::Taxonomy;

pub struct ExpiryHandler {
    scheduler: Arc<ExpiryScheduler>,
    taxonomy: Arc<dyn Taxonomy>,
    category: String,
    policy: CategoryPolicy,
}

impl ExpiryHandler {
    pub fn new(
        scheduler: Arc<ExpiryScheduler>,
        taxonomy: Arc<dyn Taxonomy>,
        category: impl Into<String>,
        policy: CategoryPolicy,
    ) -> Self {
        Self {
            scheduler,
            taxonomy,
            category: category.into(),
            policy,
        }
    }

    pub fn policy(&self) -> CategoryPolicy {
        self.policy
    }

    /// Create the `expired` category if it is missing.
    pub async fn ensure_category(&self) -> Result<CategoryId, ExpiryError> {
        self.taxonomy
            .ensure_category(&self.category)
            .await
            .map_err(ExpiryError::Taxonomy)
    }

    /// Whether `item` already carries the `expired` category.
    pub async fn is_expired(&self, item: ItemId) -> Result<bool, ExpiryError> {
        let Some(expired) = self
            .taxonomy
            .category_id(&self.category)
            .await
            .map_err(ExpiryError::Taxonomy)?
        else {
            return Ok(false);
        };
        let categories = self
            .taxonomy
            .categories_of(item)
            .await
            .map_err(ExpiryError::Taxonomy)?;
        Ok(categories.contains(&expired))
    }

    /// Move `item` into the `expired` category.
    pub async fn expire(&self, item: ItemId, at: Timestamp) -> Result<CategoryId, ExpiryError> {
        let _guard = self.scheduler.locks().acquire(item).await;

        let expired = self.ensure_category().await?;
        self.taxonomy
            .set_categories(item, &[expired], self.policy.replaces())
            .await
            .map_err(ExpiryError::Taxonomy)?;

        tracing::info!(item = %item, at = %at, policy = ?self.policy, "item expired");
        self.scheduler
            .journal()
            .record(item, ExpiryEventKind::Expired { at })
            .await;
        Ok(expired)
    }
}

#[async_trait]
impl HookHandler for ExpiryHandler {
    async fn handle(&self, event: &ScheduledEvent) -> Result<(), ExpiryError> {
        self.expire(event.item, event.at).await?;
        self.scheduler.mark_fired(event).await;
        Ok(())
    }
}
