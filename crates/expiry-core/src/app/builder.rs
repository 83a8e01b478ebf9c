//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! # Fail-fast 設計
//! - 必須の port（MetadataStore, DeferredScheduler, Taxonomy）が無ければ build() でエラー
//! - hook の二重登録も build() でエラー
//! - 任意の port はデフォルト実装で埋める

use std::sync::Arc;

use super::dispatcher::Dispatcher;
use super::expire::ExpiryHandler;
use super::hooks::{HookHandler, HookRegistry};
use super::journal::Journal;
use super::listing::ListingFilter;
use super::locks::ItemLocks;
use super::reconcile::{ReconcileReport, Reconciler};
use super::save::SaveHandler;
use super::scheduler::ExpiryScheduler;
use crate::config::{ConfigError, ExpiryConfig};
use crate::domain::{
    CategoryId, ExpiryError, HookName, ItemId, SaveRequest, Transition,
};
use crate::ports::{
    AllowAll, Clock, ContentItems, DeferredScheduler, EditGuard, EventSink, ListingQuery,
    MetadataStore, NoRevisions, RequestContext, SystemClock, Taxonomy, TracingEventSink,
    UlidGenerator,
};

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing port: {0}. Register it on the builder before build().")]
    MissingPort(&'static str),

    #[error("invalid config")]
    Config(#[from] ConfigError),

    #[error("hook registration failed")]
    Hook(#[source] ExpiryError),
}

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new(ExpiryConfig::default())
///     .metadata(store)
///     .scheduler(cron)
///     .taxonomy(categories)
///     .build()?;
/// ```
pub struct AppBuilder {
    config: ExpiryConfig,
    metadata: Option<Arc<dyn MetadataStore>>,
    scheduler: Option<Arc<dyn DeferredScheduler>>,
    taxonomy: Option<Arc<dyn Taxonomy>>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventSink>,
    content: Arc<dyn ContentItems>,
    guard: Arc<dyn EditGuard>,
    extra_hooks: Vec<(HookName, Arc<dyn HookHandler>)>,
}

impl AppBuilder {
    pub fn new(config: ExpiryConfig) -> Self {
        Self {
            config,
            metadata: None,
            scheduler: None,
            taxonomy: None,
            clock: Arc::new(SystemClock),
            events: Arc::new(TracingEventSink),
            content: Arc::new(NoRevisions),
            guard: Arc::new(AllowAll),
            extra_hooks: Vec::new(),
        }
    }

    pub fn metadata(mut self, store: impl MetadataStore + 'static) -> Self {
        self.metadata = Some(Arc::new(store));
        self
    }

    pub fn scheduler(mut self, scheduler: impl DeferredScheduler + 'static) -> Self {
        self.scheduler = Some(Arc::new(scheduler));
        self
    }

    pub fn taxonomy(mut self, taxonomy: impl Taxonomy + 'static) -> Self {
        self.taxonomy = Some(Arc::new(taxonomy));
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn events(mut self, sink: impl EventSink + 'static) -> Self {
        self.events = Arc::new(sink);
        self
    }

    pub fn content(mut self, content: impl ContentItems + 'static) -> Self {
        self.content = Arc::new(content);
        self
    }

    pub fn guard(mut self, guard: impl EditGuard + 'static) -> Self {
        self.guard = Arc::new(guard);
        self
    }

    /// Register another handler next to the expiry handler.
    pub fn hook(mut self, hook: HookName, handler: impl HookHandler + 'static) -> Self {
        self.extra_hooks.push((hook, Arc::new(handler)));
        self
    }

    pub fn build(self) -> Result<ExpiryApp, BuildError> {
        self.config.validate()?;
        let parser = self.config.parser()?;

        let metadata = self.metadata.ok_or(BuildError::MissingPort("metadata store"))?;
        let deferred = self.scheduler.ok_or(BuildError::MissingPort("deferred scheduler"))?;
        let taxonomy = self.taxonomy.ok_or(BuildError::MissingPort("taxonomy"))?;

        let journal = Journal::new(
            self.events,
            Arc::new(UlidGenerator::new(Arc::clone(&self.clock))),
            Arc::clone(&self.clock),
        );
        let scheduler = Arc::new(ExpiryScheduler::new(
            Arc::clone(&metadata),
            Arc::clone(&deferred),
            journal,
            ItemLocks::new(self.config.item_locks),
            self.config.meta_key.clone(),
            self.config.hook(),
        ));
        let expiry = Arc::new(ExpiryHandler::new(
            Arc::clone(&scheduler),
            Arc::clone(&taxonomy),
            self.config.expired_category.clone(),
            self.config.category_policy,
        ));

        let mut hooks = HookRegistry::new();
        hooks
            .register(self.config.hook(), expiry.clone())
            .map_err(BuildError::Hook)?;
        for (hook, handler) in self.extra_hooks {
            hooks.register(hook, handler).map_err(BuildError::Hook)?;
        }

        let save = SaveHandler::new(Arc::clone(&scheduler), self.content, self.guard, parser);
        let listing = ListingFilter::new(Arc::clone(&taxonomy), self.config.expired_category.clone());
        let reconciler = Reconciler::new(
            Arc::clone(&scheduler),
            Arc::clone(&expiry),
            metadata,
            Arc::clone(&self.clock),
        );

        tracing::debug!(hooks = ?hooks.hooks(), "expiry app built");
        Ok(ExpiryApp {
            config: self.config,
            scheduler,
            expiry,
            save,
            listing,
            reconciler,
            hooks: Arc::new(hooks),
            deferred,
            clock: self.clock,
        })
    }
}

/// ExpiryApp はホストに公開するエントリポイントの集まり
pub struct ExpiryApp {
    config: ExpiryConfig,
    scheduler: Arc<ExpiryScheduler>,
    expiry: Arc<ExpiryHandler>,
    save: SaveHandler,
    listing: ListingFilter,
    reconciler: Reconciler,
    hooks: Arc<HookRegistry>,
    deferred: Arc<dyn DeferredScheduler>,
    clock: Arc<dyn Clock>,
}

impl ExpiryApp {
    pub fn config(&self) -> &ExpiryConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &ExpiryScheduler {
        &self.scheduler
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Plugin activation: make sure the `expired` category exists.
    pub async fn activate(&self) -> Result<CategoryId, ExpiryError> {
        let id = self.expiry.ensure_category().await?;
        tracing::info!(category = %id, name = %self.config.expired_category, "expired category ready");
        Ok(id)
    }

    /// Save-handler entry point.
    pub async fn save(&self, request: &SaveRequest) -> Result<Transition, ExpiryError> {
        self.save.save(request).await
    }

    /// The host deleted `item`.
    pub async fn delete_item(&self, item: ItemId) -> Result<Transition, ExpiryError> {
        self.scheduler.forget(item).await
    }

    /// Listing-filter entry point.
    pub async fn filter_listing<Q>(
        &self,
        query: &mut Q,
        context: &dyn RequestContext,
    ) -> Result<Option<CategoryId>, ExpiryError>
    where
        Q: ListingQuery + ?Sized,
    {
        self.listing.apply(query, context).await
    }

    pub async fn display_value(&self, item: ItemId) -> Result<String, ExpiryError> {
        self.save.display_value(item).await
    }

    pub async fn reconcile(&self) -> Result<ReconcileReport, ExpiryError> {
        self.reconciler.sweep().await
    }

    /// Loop that fires due events through the hook registry.
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(
            Arc::clone(&self.deferred),
            Arc::clone(&self.hooks),
            Arc::clone(&self.clock),
            self.config.tick_interval(),
        )
    }
}
