//! EventSink port - イベント記録の抽象化
//!
//! # 実装
//! - **TracingEventSink**: tracing にログ出力（デフォルト）
//! - **InMemoryEventSink**: テスト用（impls/）

use async_trait::async_trait;

use crate::domain::ExpiryEvent;

/// EventSink はドメインイベントを記録
///
/// 記録の失敗で保存処理を止めないため、戻り値は持たない。
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: ExpiryEvent);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn emit(&self, event: ExpiryEvent) {
        tracing::info!(
            event_id = %event.id,
            item = %event.item,
            kind = ?event.kind,
            "expiry event"
        );
    }
}
