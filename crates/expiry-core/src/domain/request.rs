//! SaveRequest - 編集フォームから届く保存リクエスト

use std::collections::HashMap;

use super::ItemId;

/// A submitted edit form, after the host has decoded it into fields.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub item: ItemId,
    pub fields: HashMap<String, String>,
}

impl SaveRequest {
    pub fn new(item: ItemId) -> Self {
        Self {
            item,
            fields: HashMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}
