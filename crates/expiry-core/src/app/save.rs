//! SaveHandler - 編集フォーム保存のエントリポイント
//!
//! 1. EditGuard（nonce / 権限）
//! 2. フォーム値を Timestamp に変換（失敗したら何も変更しない）
//! 3. リビジョンなら親 item に読み替える
//! 4. ExpiryScheduler に渡す

use std::sync::Arc;

use super::scheduler::ExpiryScheduler;
use crate::domain::{ExpiryError, ItemId, SaveRequest, TimestampParser, Transition};
use crate::ports::{ContentItems, EditGuard};

pub struct SaveHandler {
    scheduler: Arc<ExpiryScheduler>,
    content: Arc<dyn ContentItems>,
    guard: Arc<dyn EditGuard>,
    parser: TimestampParser,
}

impl SaveHandler {
    pub fn new(
        scheduler: Arc<ExpiryScheduler>,
        content: Arc<dyn ContentItems>,
        guard: Arc<dyn EditGuard>,
        parser: TimestampParser,
    ) -> Self {
        Self {
            scheduler,
            content,
            guard,
            parser,
        }
    }

    pub async fn save(&self, request: &SaveRequest) -> Result<Transition, ExpiryError> {
        if !self.guard.allows(request) {
            tracing::warn!(item = %request.item, "save rejected by edit guard");
            return Err(ExpiryError::AuthorizationFailure(request.item));
        }

        // The form field carries the same name as the metadata key.
        let raw = request.field(self.scheduler.meta_key()).unwrap_or_default();
        let submitted = self.parser.parse(raw).inspect_err(|err| {
            tracing::warn!(item = %request.item, error = %err, "rejected expiry date");
        })?;

        let item = self.resolve(request.item).await?;
        self.scheduler.apply(item, submitted).await
    }

    /// Stored expiry rendered for the edit form, empty when unset.
    pub async fn display_value(&self, item: ItemId) -> Result<String, ExpiryError> {
        let item = self.resolve(item).await?;
        Ok(self
            .scheduler
            .stored_expiry(item)
            .await?
            .map(|ts| self.parser.display(ts))
            .unwrap_or_default())
    }

    async fn resolve(&self, item: ItemId) -> Result<ItemId, ExpiryError> {
        let parent = self
            .content
            .revision_parent(item)
            .await
            .map_err(ExpiryError::Host)?;
        Ok(parent.unwrap_or(item))
    }
}
