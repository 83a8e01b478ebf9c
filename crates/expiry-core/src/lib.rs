//! expiry-core
//!
//! Moves content items into an `expired` category once their expiry date passes.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, timestamp, transition, events, errors）
//! - **ports**: ホスト CMS への抽象化（MetadataStore, DeferredScheduler, Taxonomy, など）
//! - **app**: アプリケーションロジック（scheduler, save, expire, listing, reconcile, dispatcher, builder）
//! - **impls**: ports の in-memory 実装（開発・テスト用）
//! - **config**: 設定

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{AppBuilder, ExpiryApp};
pub use config::{ConfigError, ExpiryConfig};
