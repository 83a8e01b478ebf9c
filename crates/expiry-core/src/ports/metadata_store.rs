//! MetadataStore port - item ごとのメタデータ（key-value）
//!
//! 値はホストの保存形式のまま文字列で扱う。解釈は呼び出し側の責務。

use async_trait::async_trait;

use crate::domain::{HostError, ItemId};

#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn get(&self, item: ItemId, key: &str) -> Result<Option<String>, HostError>;

    async fn set(&self, item: ItemId, key: &str, value: String) -> Result<(), HostError>;

    /// Deleting a key that does not exist is not an error.
    async fn delete(&self, item: ItemId, key: &str) -> Result<(), HostError>;

    /// Every item holding `key`, with its value. Used by the reconciliation sweep.
    async fn items_with(&self, key: &str) -> Result<Vec<(ItemId, String)>, HostError>;
}
