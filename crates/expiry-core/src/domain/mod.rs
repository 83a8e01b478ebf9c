//! Domain model (IDs, timestamps, transitions, events, errors).

pub mod errors;
pub mod events;
pub mod hook;
pub mod ids;
pub mod policy;
pub mod request;
pub mod timestamp;
pub mod transition;

pub use self::errors::{ExpiryError, HostError};
pub use self::events::{ExpiryEvent, ExpiryEventKind};
pub use self::hook::{HookName, ScheduledEvent};
pub use self::ids::{CategoryId, EventId, ItemId};
pub use self::policy::CategoryPolicy;
pub use self::request::SaveRequest;
pub use self::timestamp::{Timestamp, TimestampError, TimestampParser};
pub use self::transition::Transition;
