//! ExpiryScheduler - 期限日の保存をスケジューラ登録に反映する
//!
//! # フロー
//! 1. item ロックを取る
//! 2. 保存済みの期限日を MetadataStore から読む
//! 3. `Transition::decide` で遷移を決める
//! 4. メタデータ更新 → 旧登録の unschedule → 新登録の schedule（この順）
//!
//! 登録済みの時刻は `tracked` に持つ。unschedule の対象はここから決め、
//! 無い場合（プロセス再起動後など）だけ保存値にフォールバックする。
//! 新しく登録する前に、tracked に残った別時刻の登録（unschedule 失敗の残り）を外す。

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::journal::Journal;
use super::locks::ItemLocks;
use crate::domain::{
    ExpiryError, ExpiryEventKind, HookName, ItemId, ScheduledEvent, Timestamp, Transition,
};
use crate::ports::{DeferredScheduler, MetadataStore};

pub struct ExpiryScheduler {
    metadata: Arc<dyn MetadataStore>,
    scheduler: Arc<dyn DeferredScheduler>,
    journal: Journal,
    locks: ItemLocks,
    tracked: Mutex<HashMap<ItemId, Timestamp>>,
    meta_key: String,
    hook: HookName,
}

impl ExpiryScheduler {
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        scheduler: Arc<dyn DeferredScheduler>,
        journal: Journal,
        locks: ItemLocks,
        meta_key: impl Into<String>,
        hook: HookName,
    ) -> Self {
        Self {
            metadata,
            scheduler,
            journal,
            locks,
            tracked: Mutex::new(HashMap::new()),
            meta_key: meta_key.into(),
            hook,
        }
    }

    pub fn meta_key(&self) -> &str {
        &self.meta_key
    }

    pub fn hook(&self) -> &HookName {
        &self.hook
    }

    pub fn locks(&self) -> &ItemLocks {
        &self.locks
    }

    pub(crate) fn journal(&self) -> &Journal {
        &self.journal
    }

    /// The registration tuple for `item` expiring at `at`.
    pub fn event_for(&self, item: ItemId, at: Timestamp) -> ScheduledEvent {
        ScheduledEvent::new(at, self.hook.clone(), item)
    }

    /// Expiry currently persisted for `item`.
    pub async fn stored_expiry(&self, item: ItemId) -> Result<Option<Timestamp>, ExpiryError> {
        let raw = self
            .metadata
            .get(item, &self.meta_key)
            .await
            .map_err(|source| ExpiryError::Metadata { item, source })?;

        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => Timestamp::from_stored(value)
                .map(Some)
                .map_err(|source| ExpiryError::CorruptRecord { item, source }),
        }
    }

    /// Timestamp this scheduler registered for `item`, if any.
    pub async fn tracked(&self, item: ItemId) -> Option<Timestamp> {
        self.tracked.lock().await.get(&item).copied()
    }

    pub(crate) async fn tracked_items(&self) -> Vec<(ItemId, Timestamp)> {
        let tracked = self.tracked.lock().await;
        let mut items: Vec<(ItemId, Timestamp)> = tracked.iter().map(|(i, t)| (*i, *t)).collect();
        items.sort_by_key(|(item, _)| *item);
        items
    }

    pub(crate) async fn track(&self, item: ItemId, at: Timestamp) {
        self.tracked.lock().await.insert(item, at);
    }

    /// Apply a save of the expiry field.
    ///
    /// `submitted` is `None` when the field was cleared back to its default.
    pub async fn apply(
        &self,
        item: ItemId,
        submitted: Option<Timestamp>,
    ) -> Result<Transition, ExpiryError> {
        let _guard = self.locks.acquire(item).await;
        self.apply_locked(item, submitted).await
    }

    /// Drop the expiry of an item the host deleted.
    pub async fn forget(&self, item: ItemId) -> Result<Transition, ExpiryError> {
        let _guard = self.locks.acquire(item).await;
        let transition = self.apply_locked(item, None).await?;
        // Registration made before a restart may only be known to the tracker.
        if transition.is_noop()
            && let Some(at) = self.tracked(item).await
        {
            self.retire(item, at).await?;
        }
        Ok(transition)
    }

    async fn apply_locked(
        &self,
        item: ItemId,
        submitted: Option<Timestamp>,
    ) -> Result<Transition, ExpiryError> {
        let stored = self.stored_expiry(item).await?;
        let transition = Transition::decide(submitted, stored);

        match transition {
            Transition::Create { at } => {
                self.write(item, at).await?;
                self.register(item, at).await?;
            }
            Transition::Reschedule { from, to } => {
                self.write(item, to).await?;
                self.retire(item, from).await?;
                self.register(item, to).await?;
            }
            Transition::Clear { from } => {
                self.metadata
                    .delete(item, &self.meta_key)
                    .await
                    .map_err(|source| ExpiryError::Metadata { item, source })?;
                self.retire(item, from).await?;
                self.journal.record(item, ExpiryEventKind::Cleared).await;
            }
            Transition::Unchanged => {
                tracing::debug!(item = %item, "expiry unchanged");
                return Ok(transition);
            }
        }

        tracing::info!(item = %item, transition = transition.name(), "expiry saved");
        Ok(transition)
    }

    async fn write(&self, item: ItemId, at: Timestamp) -> Result<(), ExpiryError> {
        self.metadata
            .set(item, &self.meta_key, at.to_stored())
            .await
            .map_err(|source| ExpiryError::Metadata { item, source })
    }

    /// Register the deferred callback and start tracking it.
    ///
    /// On failure the metadata stays as written and a `ScheduleFailed` event is
    /// recorded for reconciliation.
    pub(crate) async fn register(&self, item: ItemId, at: Timestamp) -> Result<(), ExpiryError> {
        self.retire_stale(item, at).await?;

        let event = self.event_for(item, at);
        if let Err(source) = self.scheduler.schedule_once(event).await {
            tracing::warn!(item = %item, at = %at, error = %source, "failed to schedule expiry");
            self.journal
                .record(
                    item,
                    ExpiryEventKind::ScheduleFailed {
                        at,
                        error: source.to_string(),
                    },
                )
                .await;
            return Err(ExpiryError::SchedulerUnavailable { item, source });
        }

        self.track(item, at).await;
        self.journal.record(item, ExpiryEventKind::Scheduled { at }).await;
        Ok(())
    }

    /// Unschedule the callback previously registered for `item`.
    ///
    /// Targets the tracked timestamp and the stored one when they differ. A
    /// target that is not found has most likely fired already.
    pub(crate) async fn retire(&self, item: ItemId, stored: Timestamp) -> Result<(), ExpiryError> {
        let mut targets = vec![stored];
        if let Some(tracked) = self.tracked(item).await
            && tracked != stored
        {
            targets.insert(0, tracked);
        }

        for at in targets {
            let event = self.event_for(item, at);
            let found = self
                .scheduler
                .unschedule(&event)
                .await
                .map_err(|source| ExpiryError::SchedulerUnavailable { item, source })?;
            if !found {
                tracing::debug!(item = %item, at = %at, "no registration to unschedule");
            }
            self.journal
                .record(item, ExpiryEventKind::Unscheduled { at, found })
                .await;
        }

        self.tracked.lock().await.remove(&item);
        Ok(())
    }

    /// Unschedule a tracked registration at any timestamp other than `keep`.
    ///
    /// Such an entry survives when an earlier unschedule failed. Returns
    /// whether one was tracked.
    pub(crate) async fn retire_stale(&self, item: ItemId, keep: Timestamp) -> Result<bool, ExpiryError> {
        let Some(stale) = self.tracked(item).await.filter(|at| *at != keep) else {
            return Ok(false);
        };

        let found = self
            .scheduler
            .unschedule(&self.event_for(item, stale))
            .await
            .map_err(|source| ExpiryError::SchedulerUnavailable { item, source })?;
        tracing::info!(item = %item, at = %stale, found, "retired stale registration");
        self.journal
            .record(item, ExpiryEventKind::Unscheduled { at: stale, found })
            .await;

        self.tracked.lock().await.remove(&item);
        Ok(true)
    }

    pub(crate) async fn is_registered(&self, item: ItemId, at: Timestamp) -> Result<bool, ExpiryError> {
        self.scheduler
            .is_scheduled(&self.event_for(item, at))
            .await
            .map_err(|source| ExpiryError::SchedulerUnavailable { item, source })
    }

    /// Forget the tracked registration once its callback has fired.
    pub(crate) async fn mark_fired(&self, event: &ScheduledEvent) {
        let mut tracked = self.tracked.lock().await;
        if tracked.get(&event.item) == Some(&event.at) {
            tracked.remove(&event.item);
        }
    }
}
