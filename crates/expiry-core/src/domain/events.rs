//! Events - ドメインイベント
//!
//! EventSink に送る監査用イベント。スケジューラ登録のずれを後から追えるようにする。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EventId, ItemId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpiryEventKind {
    Scheduled { at: Timestamp },
    Unscheduled { at: Timestamp, found: bool },
    ScheduleFailed { at: Timestamp, error: String },
    Cleared,
    Expired { at: Timestamp },
    /// Reconciliation repaired a registration that should have existed.
    Reconciled { at: Timestamp },
}

/// ExpiryEvent はドメインで発生したイベント
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryEvent {
    pub id: EventId,
    pub item: ItemId,
    pub occurred_at: DateTime<Utc>,
    pub kind: ExpiryEventKind,
}

impl ExpiryEvent {
    pub fn new(
        id: EventId,
        item: ItemId,
        occurred_at: DateTime<Utc>,
        kind: ExpiryEventKind,
    ) -> Self {
        Self {
            id,
            item,
            occurred_at,
            kind,
        }
    }
}
