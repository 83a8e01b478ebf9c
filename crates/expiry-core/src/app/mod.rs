//! App - アプリケーション層
//!
//! ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder / ExpiryApp**: ワイヤリングとホスト向けエントリポイント
//! - **ExpiryScheduler**: 期限日保存の状態遷移（create / reschedule / clear）
//! - **SaveHandler**: フォーム保存
//! - **ExpiryHandler**: 期限到来時のカテゴリ付け替え
//! - **ListingFilter**: 一覧から `expired` を除外
//! - **Reconciler**: 保存値とスケジューラ登録のずれの修復
//! - **Dispatcher**: 期限到来イベントの配送ループ

pub mod builder;
pub mod dispatcher;
pub mod expire;
pub mod hooks;
pub mod journal;
pub mod listing;
pub mod locks;
pub mod reconcile;
pub mod save;
pub mod scheduler;

pub use self::builder::{AppBuilder, BuildError, ExpiryApp};
pub use self::dispatcher::{DispatchSummary, Dispatcher};
pub use self::expire::ExpiryHandler;
pub use self::hooks::{HookHandler, HookRegistry};
pub use self::journal::Journal;
pub use self::listing::ListingFilter;
pub use self::locks::ItemLocks;
pub use self::reconcile::{ReconcileReport, Reconciler};
pub use self::save::SaveHandler;
pub use self::scheduler::ExpiryScheduler;
