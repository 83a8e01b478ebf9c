//! Domain identifiers (strongly-typed IDs).
//!
//! ホスト側の content item / category は整数 ID で識別されます。
//! Phantom type パターンで `ItemId` と `CategoryId` を別の型にしつつ、
//! 実装は `Id<T>` 一つにまとめています。
//!
//! 監査イベントだけは ULID（時刻でソート可能）を使います。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
///
/// Display で使うプレフィックス（"item-", "category-"）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// ホストの整数 ID をラップするジェネリック ID 型
///
/// ```ignore
/// let item = ItemId::new(42);
/// let category = CategoryId::new(42);
/// // item と category は異なる型なので、混同できない
/// ```
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id<T: IdMarker> {
    value: u64,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub const fn new(value: u64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub const fn get(&self) -> u64 {
        self.value
    }
}

impl<T: IdMarker> From<u64> for Id<T> {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.value)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// Content item のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Item {}

impl IdMarker for Item {
    fn prefix() -> &'static str {
        "item-"
    }
}

/// Category のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {}

impl IdMarker for Category {
    fn prefix() -> &'static str {
        "category-"
    }
}

/// Identifier of a content item (post, page, ...).
pub type ItemId = Id<Item>;

/// Identifier of a taxonomy category.
pub type CategoryId = Id<Category>;

/// Identifier of an audit event.
///
/// ULID なので生成順にソートできる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(Ulid);

impl EventId {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl From<Ulid> for EventId {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_with_prefix() {
        assert_eq!(ItemId::new(42).to_string(), "item-42");
        assert_eq!(CategoryId::new(7).to_string(), "category-7");
        assert!(EventId::from_ulid(Ulid::new()).to_string().starts_with("event-"));

        // let _: CategoryId = ItemId::new(42); // <- does not compile
    }

    #[test]
    fn ids_can_be_serialized() {
        let item = ItemId::new(42);
        let serialized = serde_json::to_string(&item).unwrap();
        let deserialized: ItemId = serde_json::from_str(&serialized).unwrap();
        assert_eq!(item, deserialized);
    }

    #[test]
    fn phantom_data_does_not_consume_memory() {
        use std::mem::size_of;

        assert_eq!(size_of::<ItemId>(), size_of::<u64>());
        assert_eq!(size_of::<CategoryId>(), size_of::<u64>());
    }
}
