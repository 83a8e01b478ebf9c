//! InMemoryScheduler - 開発用の単発遅延スケジューラ
//!
//! # 実装詳細
//! - BinaryHeap（min-heap）で発火時刻順に並べる
//! - HashSet で現在有効な登録を持つ。unschedule は HashSet から消すだけで、
//!   heap に残ったエントリは take_due で読み飛ばす
//! - 読み飛ばし待ちが増えすぎたら unschedule 時に heap を作り直す

use std::cmp::Ordering as CmpOrdering;
use std::collections::{BinaryHeap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{HostError, ItemId, ScheduledEvent, Timestamp};
use crate::ports::DeferredScheduler;

/// Heap entry. Reverse ordering so BinaryHeap acts as a min-heap (earliest first).
#[derive(Debug, Clone, PartialEq, Eq)]
struct Pending {
    seq: u64,
    event: ScheduledEvent,
}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        other
            .event
            .at
            .cmp(&self.event.at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Dead heap entries tolerated before `unschedule` rebuilds the heap.
const PRUNE_SLACK: usize = 64;

#[derive(Debug, Default)]
struct SchedulerState {
    heap: BinaryHeap<Pending>,
    live: HashSet<ScheduledEvent>,
    next_seq: u64,
}

impl SchedulerState {
    /// Drop unscheduled entries once they outnumber live ones by the slack.
    fn prune(&mut self) {
        if self.heap.len() <= 2 * self.live.len() + PRUNE_SLACK {
            return;
        }
        let live = &self.live;
        self.heap.retain(|entry| live.contains(&entry.event));
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryScheduler {
    state: Arc<Mutex<SchedulerState>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with `HostError::Unavailable` until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Live registrations for one item, earliest first.
    pub async fn registrations_for(&self, item: ItemId) -> Vec<ScheduledEvent> {
        let state = self.state.lock().await;
        let mut events: Vec<ScheduledEvent> = state
            .live
            .iter()
            .filter(|event| event.item == item)
            .cloned()
            .collect();
        events.sort_by_key(|event| event.at);
        events
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.live.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_available(&self) -> Result<(), HostError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(HostError::unavailable("scheduler", "in-memory scheduler switched off"));
        }
        Ok(())
    }
}

#[async_trait]
impl DeferredScheduler for InMemoryScheduler {
    async fn schedule_once(&self, event: ScheduledEvent) -> Result<(), HostError> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        // Identical tuple already pending: keep the single registration.
        if !state.live.insert(event.clone()) {
            return Ok(());
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        state.heap.push(Pending { seq, event });
        Ok(())
    }

    async fn unschedule(&self, event: &ScheduledEvent) -> Result<bool, HostError> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        let found = state.live.remove(event);
        state.prune();
        Ok(found)
    }

    async fn is_scheduled(&self, event: &ScheduledEvent) -> Result<bool, HostError> {
        self.check_available()?;
        let state = self.state.lock().await;
        Ok(state.live.contains(event))
    }

    async fn take_due(&self, now: Timestamp) -> Result<Vec<ScheduledEvent>, HostError> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        let mut due = Vec::new();
        while let Some(entry) = state.heap.peek() {
            if entry.event.at > now {
                break; // Heap is sorted, so we can stop
            }
            let Some(entry) = state.heap.pop() else {
                break;
            };
            // Unscheduled entries stay in the heap until they surface here.
            if state.live.remove(&entry.event) {
                due.push(entry.event);
            }
        }
        Ok(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HookName;

    fn event(at: i64, item: u64) -> ScheduledEvent {
        ScheduledEvent::new(Timestamp::from_secs(at), HookName::new("post_expiry"), ItemId::new(item))
    }

    #[tokio::test]
    async fn take_due_returns_earliest_first() {
        let scheduler = InMemoryScheduler::new();
        scheduler.schedule_once(event(300, 1)).await.unwrap();
        scheduler.schedule_once(event(100, 2)).await.unwrap();
        scheduler.schedule_once(event(200, 3)).await.unwrap();
        scheduler.schedule_once(event(900, 4)).await.unwrap();

        let due = scheduler.take_due(Timestamp::from_secs(300)).await.unwrap();

        assert_eq!(due, vec![event(100, 2), event(200, 3), event(300, 1)]);
        assert_eq!(scheduler.len().await, 1);
    }

    #[tokio::test]
    async fn unschedule_needs_the_exact_tuple() {
        let scheduler = InMemoryScheduler::new();
        scheduler.schedule_once(event(100, 1)).await.unwrap();

        assert!(!scheduler.unschedule(&event(101, 1)).await.unwrap());
        assert!(!scheduler.unschedule(&event(100, 2)).await.unwrap());
        assert!(scheduler.unschedule(&event(100, 1)).await.unwrap());
        assert!(!scheduler.unschedule(&event(100, 1)).await.unwrap());

        assert!(scheduler.take_due(Timestamp::from_secs(1_000)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn identical_registration_is_kept_once() {
        let scheduler = InMemoryScheduler::new();
        scheduler.schedule_once(event(100, 1)).await.unwrap();
        scheduler.schedule_once(event(100, 1)).await.unwrap();

        assert_eq!(scheduler.registrations_for(ItemId::new(1)).await.len(), 1);
        assert_eq!(scheduler.take_due(Timestamp::from_secs(100)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rescheduled_after_unschedule_fires_once() {
        let scheduler = InMemoryScheduler::new();
        scheduler.schedule_once(event(100, 1)).await.unwrap();
        scheduler.unschedule(&event(100, 1)).await.unwrap();
        scheduler.schedule_once(event(100, 1)).await.unwrap();

        let due = scheduler.take_due(Timestamp::from_secs(100)).await.unwrap();
        assert_eq!(due, vec![event(100, 1)]);
    }

    #[tokio::test]
    async fn far_future_reschedules_do_not_pile_up() {
        let scheduler = InMemoryScheduler::new();
        for at in 0..1_000 {
            scheduler.schedule_once(event(4_000_000_000 + at, 1)).await.unwrap();
            scheduler.unschedule(&event(4_000_000_000 + at, 1)).await.unwrap();
        }
        scheduler.schedule_once(event(4_000_001_000, 1)).await.unwrap();

        assert!(scheduler.state.lock().await.heap.len() <= PRUNE_SLACK + 1);
        let due = scheduler.take_due(Timestamp::from_secs(i64::MAX)).await.unwrap();
        assert_eq!(due, vec![event(4_000_001_000, 1)]);
    }

    #[tokio::test]
    async fn unavailable_scheduler_fails_every_call() {
        let scheduler = InMemoryScheduler::new();
        scheduler.set_unavailable(true);

        let err = scheduler.schedule_once(event(100, 1)).await.unwrap_err();
        assert!(matches!(err, HostError::Unavailable { service: "scheduler", .. }));

        scheduler.set_unavailable(false);
        scheduler.schedule_once(event(100, 1)).await.unwrap();
    }
}
