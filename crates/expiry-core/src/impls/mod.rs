//! Impls - ports の実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **InMemoryMetadataStore**: メタデータ
//! - **InMemoryScheduler**: 単発遅延スケジューラ
//! - **InMemoryTaxonomy**: カテゴリ
//! - **InMemoryEventSink**: 監査イベント
//! - **PostQuery / StaticContext / InMemoryContent**: ホスト側スタブ
//!
//! 本番ではホスト CMS 側のアダプタがこれらの ports を実装します。

pub mod host;
pub mod inmem_events;
pub mod inmem_metadata;
pub mod inmem_scheduler;
pub mod inmem_taxonomy;

pub use self::host::{InMemoryContent, PostQuery, StaticContext};
pub use self::inmem_events::InMemoryEventSink;
pub use self::inmem_metadata::InMemoryMetadataStore;
pub use self::inmem_scheduler::InMemoryScheduler;
pub use self::inmem_taxonomy::InMemoryTaxonomy;
