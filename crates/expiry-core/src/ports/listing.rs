//! Listing ports - 一覧クエリとリクエスト文脈

use crate::domain::CategoryId;

/// In-flight listing query, before the host executes it.
pub trait ListingQuery: Send {
    /// Query for one specific item (a permalink view).
    fn is_single_item(&self) -> bool;

    /// The page's primary query, as opposed to a widget or sidebar query.
    fn is_main_query(&self) -> bool;

    fn exclude_category(&mut self, category: CategoryId);
}

pub trait RequestContext: Send + Sync {
    fn is_admin(&self) -> bool;
}
