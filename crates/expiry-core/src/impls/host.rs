//! 開発用のホスト側スタブ（一覧クエリ、リクエスト文脈、リビジョン）

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{CategoryId, HostError, ItemId};
use crate::ports::{ContentItems, ListingQuery, RequestContext};

/// A listing query as the host would hand it over before execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    pub single_item: bool,
    pub main_query: bool,
    pub excluded_categories: Vec<CategoryId>,
}

impl PostQuery {
    /// Archive, search or front-page listing.
    pub fn listing() -> Self {
        Self {
            single_item: false,
            main_query: true,
            excluded_categories: Vec::new(),
        }
    }

    /// The main query of a single-item view.
    pub fn single() -> Self {
        Self {
            single_item: true,
            main_query: true,
            excluded_categories: Vec::new(),
        }
    }

    /// A secondary query (sidebar, related items) on a single-item view.
    pub fn secondary_on_single() -> Self {
        Self {
            single_item: true,
            main_query: false,
            excluded_categories: Vec::new(),
        }
    }
}

impl ListingQuery for PostQuery {
    fn is_single_item(&self) -> bool {
        self.single_item
    }

    fn is_main_query(&self) -> bool {
        self.main_query
    }

    fn exclude_category(&mut self, category: CategoryId) {
        if !self.excluded_categories.contains(&category) {
            self.excluded_categories.push(category);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StaticContext {
    pub admin: bool,
}

impl StaticContext {
    pub fn admin() -> Self {
        Self { admin: true }
    }

    pub fn public() -> Self {
        Self { admin: false }
    }
}

impl RequestContext for StaticContext {
    fn is_admin(&self) -> bool {
        self.admin
    }
}

/// Revision → parent table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContent {
    revisions: HashMap<ItemId, ItemId>,
}

impl InMemoryContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_revision(mut self, revision: ItemId, parent: ItemId) -> Self {
        self.revisions.insert(revision, parent);
        self
    }
}

#[async_trait]
impl ContentItems for InMemoryContent {
    async fn revision_parent(&self, item: ItemId) -> Result<Option<ItemId>, HostError> {
        Ok(self.revisions.get(&item).copied())
    }
}
