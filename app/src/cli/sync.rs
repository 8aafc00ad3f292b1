//! `proxydex sync <url>` — fetch one subscription and store its configs.

use crate::cli::SyncArgs;
use crate::report;
use anyhow::{Context, Result};
use pdx_store::{ProfileType, Store};
use pdx_subscribe::names::profile_name_from_source;
use std::path::Path;

pub async fn run(db: &Path, args: SyncArgs) -> Result<()> {
    let store = Store::open(db).context("sync: open store")?;
    let (fetched, inserted) = sync_one(&store, &args.url).await?;
    report::print_sync_report(&args.url, fetched, inserted, store.count_configs()?);
    Ok(())
}

/// Fetch, normalize, and store one subscription; bumps `last_synced_at`.
/// Returns (valid configs, newly inserted).
pub(crate) async fn sync_one(store: &Store, url: &str) -> Result<(usize, usize)> {
    let raws = pdx_subscribe::fetch_subscription(url)
        .await
        .with_context(|| format!("sync {url}"))?;
    let configs = pdx_subscribe::normalize_all(raws);

    let name = profile_name_from_source(url);
    let profile = store
        .get_or_create_profile(&name, url, ProfileType::Subscription)
        .context("sync: create profile")?;
    let inserted = store
        .insert_configs_batch(&configs, profile)
        .context("sync: store configs")?;
    store
        .touch_profile_sync(profile)
        .context("sync: touch profile")?;

    Ok((configs.len(), inserted))
}
