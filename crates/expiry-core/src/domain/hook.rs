//! Hook names and the deferred-event tuple registered with the scheduler.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ItemId, Timestamp};

/// Name of an extension point that deferred events are delivered to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HookName(String);

impl HookName {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HookName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A one-shot registration with the deferred scheduler.
///
/// The scheduler hands out no handle: the whole tuple is the identity, so an
/// unschedule has to name the exact due time, hook and item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub at: Timestamp,
    pub hook: HookName,
    pub item: ItemId,
}

impl ScheduledEvent {
    pub fn new(at: Timestamp, hook: HookName, item: ItemId) -> Self {
        Self { at, hook, item }
    }
}

impl fmt::Display for ScheduledEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}) at {}", self.hook, self.item, self.at)
    }
}
