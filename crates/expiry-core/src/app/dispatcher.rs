//! Dispatcher - 期限が来たイベントを取り出してハンドラを実行する
//!
//! # フロー
//! 1. DeferredScheduler::take_due(now) で期限到来分を取得
//! 2. HookRegistry で hook 名からハンドラを引いて実行
//! 3. 失敗はログに残して次へ（バッチは止めない）

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::hooks::HookRegistry;
use crate::domain::ExpiryError;
use crate::ports::{Clock, DeferredScheduler};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSummary {
    pub fired: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct Dispatcher {
    scheduler: Arc<dyn DeferredScheduler>,
    hooks: Arc<HookRegistry>,
    clock: Arc<dyn Clock>,
    tick: Duration,
}

impl Dispatcher {
    pub fn new(
        scheduler: Arc<dyn DeferredScheduler>,
        hooks: Arc<HookRegistry>,
        clock: Arc<dyn Clock>,
        tick: Duration,
    ) -> Self {
        Self {
            scheduler,
            hooks,
            clock,
            tick,
        }
    }

    /// Fire everything due now.
    pub async fn run_once(&self) -> Result<DispatchSummary, ExpiryError> {
        let due = self
            .scheduler
            .take_due(self.clock.now_timestamp())
            .await
            .map_err(ExpiryError::Host)?;

        let mut summary = DispatchSummary::default();
        for event in due {
            match self.hooks.dispatch(&event).await {
                Ok(()) => summary.fired += 1,
                Err(err) => {
                    tracing::warn!(event = %event, error = %err, "deferred event failed");
                    summary.failed += 1;
                }
            }
        }
        Ok(summary)
    }

    /// Tick until `shutdown` turns true or its sender is dropped.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(err) = self.run_once().await {
                        tracing::warn!(error = %err, "dispatch tick failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::debug!("dispatcher stopping");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::hooks::HookHandler;
    use crate::domain::{HookName, ItemId, ScheduledEvent, Timestamp};
    use crate::impls::InMemoryScheduler;
    use crate::ports::FixedClock;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<ItemId>>,
    }

    #[async_trait]
    impl HookHandler for Recorder {
        async fn handle(&self, event: &ScheduledEvent) -> Result<(), ExpiryError> {
            self.seen.lock().await.push(event.item);
            Ok(())
        }
    }

    fn event(hook: &str, item: u64, at: i64) -> ScheduledEvent {
        ScheduledEvent::new(Timestamp::from_secs(at), HookName::new(hook), ItemId::new(item))
    }

    #[tokio::test]
    async fn fires_only_due_events() {
        let cron = InMemoryScheduler::new();
        let recorder = Arc::new(Recorder::default());
        let mut hooks = HookRegistry::new();
        hooks.register(HookName::new("post_expiry"), recorder.clone()).unwrap();
        let clock = FixedClock::at(Timestamp::from_secs(100));
        let dispatcher = Dispatcher::new(
            Arc::new(cron.clone()),
            Arc::new(hooks),
            Arc::new(clock.clone()),
            Duration::from_millis(10),
        );
        cron.schedule_once(event("post_expiry", 1, 50)).await.unwrap();
        cron.schedule_once(event("post_expiry", 2, 200)).await.unwrap();

        let summary = dispatcher.run_once().await.unwrap();

        assert_eq!(summary, DispatchSummary { fired: 1, failed: 0 });
        assert_eq!(*recorder.seen.lock().await, vec![ItemId::new(1)]);
        assert_eq!(cron.len().await, 1);
    }

    #[tokio::test]
    async fn unknown_hook_counts_as_failure() {
        let cron = InMemoryScheduler::new();
        let dispatcher = Dispatcher::new(
            Arc::new(cron.clone()),
            Arc::new(HookRegistry::new()),
            Arc::new(FixedClock::at(Timestamp::from_secs(100))),
            Duration::from_millis(10),
        );
        cron.schedule_once(event("digest_mail", 1, 50)).await.unwrap();

        let summary = dispatcher.run_once().await.unwrap();

        assert_eq!(summary, DispatchSummary { fired: 0, failed: 1 });
        assert!(cron.is_empty().await);
    }
}
