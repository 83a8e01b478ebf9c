//! ListingFilter - 一覧クエリから `expired` カテゴリを除外する
//!
//! - 管理画面では何もしない
//! - 単一 item 表示のメインクエリでは何もしない（期限切れ item も直リンクでは見える）
//! - それ以外（アーカイブ、検索、サイドバーなど）では除外フィルタを付ける

use std::sync::Arc;

use crate::domain::{CategoryId, ExpiryError};
use crate::ports::{ListingQuery, RequestContext, Taxonomy};

pub struct ListingFilter {
    taxonomy: Arc<dyn Taxonomy>,
    category: String,
}

impl ListingFilter {
    pub fn new(taxonomy: Arc<dyn Taxonomy>, category: impl Into<String>) -> Self {
        Self {
            taxonomy,
            category: category.into(),
        }
    }

    /// Returns the excluded category id, or `None` when the query was left alone.
    pub async fn apply<Q>(
        &self,
        query: &mut Q,
        context: &dyn RequestContext,
    ) -> Result<Option<CategoryId>, ExpiryError>
    where
        Q: ListingQuery + ?Sized,
    {
        if context.is_admin() {
            return Ok(None);
        }
        if query.is_single_item() && query.is_main_query() {
            return Ok(None);
        }

        let Some(expired) = self
            .taxonomy
            .category_id(&self.category)
            .await
            .map_err(ExpiryError::Taxonomy)?
        else {
            tracing::debug!(category = %self.category, "no expired category to exclude");
            return Ok(None);
        };

        query.exclude_category(expired);
        Ok(Some(expired))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{InMemoryTaxonomy, PostQuery, StaticContext};
    use rstest::rstest;

    async fn filter_with_category() -> (ListingFilter, CategoryId) {
        let taxonomy = InMemoryTaxonomy::new();
        let expired = taxonomy.ensure_category("expired").await.unwrap();
        (ListingFilter::new(Arc::new(taxonomy), "expired"), expired)
    }

    #[rstest]
    #[case::archive(PostQuery::listing(), true)]
    #[case::secondary_on_single(PostQuery::secondary_on_single(), true)]
    #[case::single(PostQuery::single(), false)]
    #[tokio::test]
    async fn public_queries(#[case] mut query: PostQuery, #[case] excluded: bool) {
        let (filter, expired) = filter_with_category().await;

        let result = filter.apply(&mut query, &StaticContext::public()).await.unwrap();

        assert_eq!(result.is_some(), excluded);
        assert_eq!(query.excluded_categories.contains(&expired), excluded);
    }

    #[tokio::test]
    async fn admin_queries_are_untouched() {
        let (filter, _) = filter_with_category().await;
        let mut query = PostQuery::listing();

        let result = filter.apply(&mut query, &StaticContext::admin()).await.unwrap();

        assert_eq!(result, None);
        assert!(query.excluded_categories.is_empty());
    }

    #[tokio::test]
    async fn missing_category_leaves_query_alone() {
        let filter = ListingFilter::new(Arc::new(InMemoryTaxonomy::new()), "expired");
        let mut query = PostQuery::listing();

        let result = filter.apply(&mut query, &StaticContext::public()).await.unwrap();

        assert_eq!(result, None);
        assert!(query.excluded_categories.is_empty());
    }
}
