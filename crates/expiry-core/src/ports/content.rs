//! Content ports - item の解決と編集権限

use async_trait::async_trait;

use crate::domain::{HostError, ItemId};

#[async_trait]
pub trait ContentItems: Send + Sync {
    /// Parent item when `item` is a revision, `None` otherwise.
    async fn revision_parent(&self, item: ItemId) -> Result<Option<ItemId>, HostError>;
}

/// EditGuard は保存前の真正性・権限チェック（nonce, capability）
pub trait EditGuard: Send + Sync {
    fn allows(&self, request: &crate::domain::SaveRequest) -> bool;
}

/// Items never have revisions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRevisions;

#[async_trait]
impl ContentItems for NoRevisions {
    async fn revision_parent(&self, _item: ItemId) -> Result<Option<ItemId>, HostError> {
        Ok(None)
    }
}

/// Accepts every save; for hosts that check before calling in.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl EditGuard for AllowAll {
    fn allows(&self, _request: &crate::domain::SaveRequest) -> bool {
        true
    }
}
