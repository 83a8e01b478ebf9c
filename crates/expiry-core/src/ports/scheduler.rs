//! DeferredScheduler port - ホストの単発遅延タスク
//!
//! 登録はハンドルを返さない。`(at, hook, item)` のタプル全体が識別子。

use async_trait::async_trait;

use crate::domain::{HostError, ScheduledEvent, Timestamp};

/// DeferredScheduler は一度だけ発火するイベントを管理
///
/// # 設計原則
/// - unschedule はタプル完全一致で対象を決める
/// - 見つからない unschedule はエラーではなく `Ok(false)`（すでに発火済みの可能性）
/// - 配送は at-least-once（ホストのリトライ方針に従う）
#[async_trait]
pub trait DeferredScheduler: Send + Sync {
    async fn schedule_once(&self, event: ScheduledEvent) -> Result<(), HostError>;

    /// Returns whether a matching registration was removed.
    async fn unschedule(&self, event: &ScheduledEvent) -> Result<bool, HostError>;

    async fn is_scheduled(&self, event: &ScheduledEvent) -> Result<bool, HostError>;

    /// Remove and return every registration due at or before `now`, earliest first.
    async fn take_due(&self, now: Timestamp) -> Result<Vec<ScheduledEvent>, HostError>;
}
