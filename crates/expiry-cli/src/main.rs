use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tokio::time::sleep;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use expiry_core::domain::{ItemId, SaveRequest, Timestamp};
use expiry_core::impls::{
    InMemoryMetadataStore, InMemoryScheduler, InMemoryTaxonomy, PostQuery, StaticContext,
};
use expiry_core::ports::{Clock, SystemClock, Taxonomy};
use expiry_core::{AppBuilder, ExpiryConfig};

fn load_config() -> Result<ExpiryConfig> {
    match std::env::var_os("EXPIRY_CONFIG") {
        Some(path) => ExpiryConfig::from_path(&path)
            .with_context(|| format!("loading {}", path.to_string_lossy())),
        None => Ok(ExpiryConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,expiry_core=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let config = load_config()?;
    tracing::info!(hook = %config.hook_name, offset = config.utc_offset_seconds, "config loaded");
    let meta_key = config.meta_key.clone();
    let expired_category = config.expired_category.clone();

    // (A) in-memory host と app を用意
    let metadata = InMemoryMetadataStore::new();
    let cron = InMemoryScheduler::new();
    let taxonomy = InMemoryTaxonomy::new();
    let app = AppBuilder::new(config)
        .metadata(metadata)
        .scheduler(cron.clone())
        .taxonomy(taxonomy.clone())
        .build()?;

    let expired = app.activate().await?;
    let news = taxonomy.ensure_category("news").await?;
    let item = ItemId::new(42);
    taxonomy.set_categories(item, &[news], true).await?;

    // (B) dispatcher を起動
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let dispatcher = app.dispatcher();
    let worker = tokio::spawn(async move { dispatcher.run(shutdown_rx).await });

    // (C) 2 秒後に期限切れになるよう保存
    let at = Timestamp::from_secs(SystemClock.now_timestamp().as_secs() + 2);
    let request = SaveRequest::new(item).with_field(meta_key, at.to_stored());
    let transition = app.save(&request).await?;
    println!("saved {item}: {}", serde_json::to_string(&transition)?);
    println!("form shows: {:?}", app.display_value(item).await?);
    println!("pending registrations: {}", cron.len().await);

    // (D) 期限切れを待つ
    let mut waited = Duration::ZERO;
    while !taxonomy.categories_of(item).await?.contains(&expired) {
        if waited >= Duration::from_secs(10) {
            anyhow::bail!("{item} did not expire in time");
        }
        sleep(Duration::from_millis(100)).await;
        waited += Duration::from_millis(100);
    }
    println!(
        "{item} is now in {:?} ({expired_category} = {expired})",
        taxonomy.categories_of(item).await?
    );

    // (E) 公開側の一覧クエリから除外されることを確認
    let mut query = PostQuery::listing();
    app.filter_listing(&mut query, &StaticContext::public()).await?;
    println!("listing excludes: {:?}", query.excluded_categories);

    let report = app.reconcile().await?;
    println!("reconcile: {}", serde_json::to_string_pretty(&report)?);

    shutdown_tx.send(true)?;
    worker.await?;
    tracing::info!("demo finished");
    Ok(())
}
