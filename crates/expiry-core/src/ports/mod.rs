//! Ports - 抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」。ホスト CMS の各サービス
//! （メタデータ、遅延スケジューラ、タクソノミー、一覧クエリ）への
//! インターフェースを定義し、実装の詳細を隠蔽します。

pub mod clock;
pub mod content;
pub mod event_sink;
pub mod id_generator;
pub mod listing;
pub mod metadata_store;
pub mod scheduler;
pub mod taxonomy;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::content::{AllowAll, ContentItems, EditGuard, NoRevisions};
pub use self::event_sink::{EventSink, TracingEventSink};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::listing::{ListingQuery, RequestContext};
pub use self::metadata_store::MetadataStore;
pub use self::scheduler::DeferredScheduler;
pub use self::taxonomy::Taxonomy;
