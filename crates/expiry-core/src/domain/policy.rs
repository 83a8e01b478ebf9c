//! CategoryPolicy - 期限切れ時のカテゴリ付け替え方針

use serde::{Deserialize, Serialize};

/// How the `expired` category is applied when an item's expiry fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryPolicy {
    /// The item's category set becomes exactly `{expired}`; prior categories are dropped.
    #[default]
    Replace,

    /// `expired` is added next to the item's existing categories.
    Append,
}

impl CategoryPolicy {
    /// Value of the taxonomy port's `replace` flag.
    pub fn replaces(&self) -> bool {
        matches!(self, CategoryPolicy::Replace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_replaces() {
        assert_eq!(CategoryPolicy::default(), CategoryPolicy::Replace);
        assert!(CategoryPolicy::Replace.replaces());
        assert!(!CategoryPolicy::Append.replaces());
    }

    #[test]
    fn deserializes_from_snake_case() {
        let policy: CategoryPolicy = serde_json::from_str("\"append\"").unwrap();
        assert_eq!(policy, CategoryPolicy::Append);
    }
}
