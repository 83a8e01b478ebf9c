//! Reconciler - 保存済み期限日とスケジューラ登録のずれを直す
//!
//! スケジューラ登録の失敗はメタデータを巻き戻さないので、ここで拾う。

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::expire::ExpiryHandler;
use super::scheduler::ExpiryScheduler;
use crate::domain::{ExpiryError, ExpiryEventKind, ItemId, Timestamp};
use crate::ports::{Clock, MetadataStore};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Items with stored expiry that were looked at.
    pub checked: usize,
    /// Future expiry without a registration; registered again.
    pub rescheduled: Vec<ItemId>,
    /// Tracked registrations at an outdated timestamp; unscheduled.
    pub stale: Vec<ItemId>,
    /// Past expiry that never fired; expired now.
    pub expired_late: Vec<ItemId>,
    /// Registrations whose item no longer has stored expiry; unscheduled.
    pub orphaned: Vec<ItemId>,
    /// Stored values not in the persisted layout; left untouched.
    pub corrupt: Vec<ItemId>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.rescheduled.is_empty()
            && self.stale.is_empty()
            && self.expired_late.is_empty()
            && self.orphaned.is_empty()
            && self.corrupt.is_empty()
    }
}

pub struct Reconciler {
    scheduler: Arc<ExpiryScheduler>,
    expiry: Arc<ExpiryHandler>,
    metadata: Arc<dyn MetadataStore>,
    clock: Arc<dyn Clock>,
}

enum Drift {
    InSync,
    Rescheduled,
    Overdue(Timestamp),
}

impl Reconciler {
    pub fn new(
        scheduler: Arc<ExpiryScheduler>,
        expiry: Arc<ExpiryHandler>,
        metadata: Arc<dyn MetadataStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            scheduler,
            expiry,
            metadata,
            clock,
        }
    }

    pub async fn sweep(&self) -> Result<ReconcileReport, ExpiryError> {
        let now = self.clock.now_timestamp();
        let mut report = ReconcileReport::default();

        let stored = self
            .metadata
            .items_with(self.scheduler.meta_key())
            .await
            .map_err(ExpiryError::Host)?;
        let mut with_expiry = HashSet::new();

        for (item, raw) in stored {
            report.checked += 1;
            with_expiry.insert(item);

            let at = match Timestamp::from_stored(&raw) {
                Ok(at) => at,
                Err(err) => {
                    tracing::warn!(item = %item, error = %err, "skipping corrupt expiry");
                    report.corrupt.push(item);
                    continue;
                }
            };

            let (stale, drift) = self.check(item, at, now).await?;
            if stale {
                report.stale.push(item);
            }
            match drift {
                Drift::InSync => {}
                Drift::Rescheduled => report.rescheduled.push(item),
                Drift::Overdue(at) => {
                    if !self.expiry.is_expired(item).await? {
                        self.expiry.expire(item, at).await?;
                        report.expired_late.push(item);
                    }
                }
            }
        }

        for (item, at) in self.scheduler.tracked_items().await {
            if with_expiry.contains(&item) {
                continue;
            }
            let _guard = self.scheduler.locks().acquire(item).await;
            // A save may have landed between the snapshot and the lock.
            if self.scheduler.tracked(item).await != Some(at) {
                continue;
            }
            match self.scheduler.stored_expiry(item).await {
                Ok(None) => {}
                Ok(Some(_)) | Err(ExpiryError::CorruptRecord { .. }) => continue,
                Err(err) => return Err(err),
            }
            self.scheduler.retire(item, at).await?;
            report.orphaned.push(item);
        }

        if report.is_clean() {
            tracing::debug!(checked = report.checked, "reconciliation found no drift");
        } else {
            tracing::info!(
                checked = report.checked,
                rescheduled = report.rescheduled.len(),
                stale = report.stale.len(),
                expired_late = report.expired_late.len(),
                orphaned = report.orphaned.len(),
                corrupt = report.corrupt.len(),
                "reconciliation repaired drift"
            );
        }
        Ok(report)
    }

    /// Returns whether a stale registration was retired, and the drift of `at`.
    async fn check(
        &self,
        item: ItemId,
        at: Timestamp,
        now: Timestamp,
    ) -> Result<(bool, Drift), ExpiryError> {
        let _guard = self.scheduler.locks().acquire(item).await;
        let stale = self.scheduler.retire_stale(item, at).await?;

        if self.scheduler.is_registered(item, at).await? {
            self.scheduler.track(item, at).await;
            return Ok((stale, Drift::InSync));
        }
        if at <= now {
            return Ok((stale, Drift::Overdue(at)));
        }

        self.scheduler.register(item, at).await?;
        self.scheduler
            .journal()
            .record(item, ExpiryEventKind::Reconciled { at })
            .await;
        Ok((stale, Drift::Rescheduled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::app::journal::Journal;
    use crate::app::locks::ItemLocks;
    use crate::domain::{CategoryPolicy, HookName};
    use crate::impls::{InMemoryEventSink, InMemoryMetadataStore, InMemoryScheduler, InMemoryTaxonomy};
    use crate::ports::{DeferredScheduler, FixedClock, UlidGenerator};

    const KEY: &str = "_post_expiry_date";
    const A: Timestamp = Timestamp::from_secs(1_700_000_000);
    const B: Timestamp = Timestamp::from_secs(1_700_050_000);

    struct Fixture {
        metadata: InMemoryMetadataStore,
        deferred: InMemoryScheduler,
        scheduler: Arc<ExpiryScheduler>,
        reconciler: Arc<Reconciler>,
    }

    fn fixture() -> Fixture {
        let metadata = InMemoryMetadataStore::new();
        let deferred = InMemoryScheduler::new();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::at(Timestamp::from_secs(1_690_000_000)));
        let journal = Journal::new(
            Arc::new(InMemoryEventSink::new()),
            Arc::new(UlidGenerator::new(Arc::clone(&clock))),
            Arc::clone(&clock),
        );
        let scheduler = Arc::new(ExpiryScheduler::new(
            Arc::new(metadata.clone()),
            Arc::new(deferred.clone()),
            journal,
            ItemLocks::new(true),
            KEY,
            HookName::new("post_expiry"),
        ));
        let expiry = Arc::new(ExpiryHandler::new(
            Arc::clone(&scheduler),
            Arc::new(InMemoryTaxonomy::new()),
            "expired",
            CategoryPolicy::Replace,
        ));
        let reconciler = Arc::new(Reconciler::new(
            Arc::clone(&scheduler),
            expiry,
            Arc::new(metadata.clone()),
            clock,
        ));
        Fixture {
            metadata,
            deferred,
            scheduler,
            reconciler,
        }
    }

    #[tokio::test]
    async fn in_sync_items_are_clean() {
        let f = fixture();
        f.scheduler.apply(ItemId::new(42), Some(A)).await.unwrap();

        let report = f.reconciler.sweep().await.unwrap();

        assert_eq!(report.checked, 1);
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn stale_registration_is_retired_even_when_current_one_is_live() {
        let f = fixture();
        let item = ItemId::new(42);
        f.scheduler.apply(item, Some(A)).await.unwrap();
        // The current value got registered by someone else; A is still tracked.
        f.metadata.set(item, KEY, B.to_stored()).await.unwrap();
        f.deferred
            .schedule_once(f.scheduler.event_for(item, B))
            .await
            .unwrap();

        let report = f.reconciler.sweep().await.unwrap();

        assert_eq!(report.stale, vec![item]);
        assert!(report.rescheduled.is_empty());
        assert_eq!(f.deferred.registrations_for(item).await, vec![f.scheduler.event_for(item, B)]);
        assert_eq!(f.scheduler.tracked(item).await, Some(B));
    }

    #[tokio::test]
    async fn orphan_pass_skips_items_saved_after_the_snapshot() {
        let f = fixture();
        let item = ItemId::new(42);
        f.scheduler.apply(item, Some(A)).await.unwrap();
        f.metadata.delete(item, KEY).await.unwrap();

        let guard = f.scheduler.locks().acquire(item).await;
        let sweep = tokio::spawn({
            let reconciler = Arc::clone(&f.reconciler);
            async move { reconciler.sweep().await }
        });
        // The sweep has taken its snapshot and now waits for the item lock.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!sweep.is_finished());

        // Same effects as a save of B holding the lock.
        f.metadata.set(item, KEY, B.to_stored()).await.unwrap();
        f.scheduler.register(item, B).await.unwrap();
        drop(guard);

        let report = sweep.await.unwrap().unwrap();

        assert!(report.orphaned.is_empty());
        assert_eq!(f.deferred.registrations_for(item).await, vec![f.scheduler.event_for(item, B)]);
        assert_eq!(f.scheduler.tracked(item).await, Some(B));
    }
}
