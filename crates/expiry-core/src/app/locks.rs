//! ItemLocks - item 単位の排他
//!
//! 同じ item への保存・削除・期限切れ処理を直列化する。
//! 無効化すると、同時保存は last-write-wins になる（ホストのリクエストモデルそのまま）。

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::ItemId;

#[derive(Debug)]
pub struct ItemLocks {
    enabled: bool,
    locks: Mutex<HashMap<ItemId, Arc<Mutex<()>>>>,
}

impl ItemLocks {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Wait for exclusive access to `item`. `None` when locking is disabled.
    ///
    /// Not reentrant: a holder must not acquire the same item again.
    pub async fn acquire(&self, item: ItemId) -> Option<OwnedMutexGuard<()>> {
        if !self.enabled {
            return None;
        }
        let lock = {
            let mut locks = self.locks.lock().await;
            // Drop entries nobody holds or waits on.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(item).or_default())
        };
        Some(lock.lock_owned().await)
    }
}
