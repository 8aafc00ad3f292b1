//! `proxydex add <source>` — ingest from a URL, a file, or pasted text.

use crate::cli::AddArgs;
use crate::report;
use anyhow::{ensure, Context, Result};
use pdx_store::{ProfileType, Store};
use pdx_subscribe::names::profile_name_from_source;
use std::path::Path;

pub async fn run(db: &Path, args: AddArgs) -> Result<()> {
    let source = args.source.trim().to_string();
    let is_url = source.starts_with("http://") || source.starts_with("https://");

    let (input, source_key, profile_type) = if !is_url && Path::new(&source).is_file() {
        let text =
            std::fs::read_to_string(&source).with_context(|| format!("read file {source}"))?;
        (text, format!("file:{source}"), ProfileType::Mixed)
    } else if is_url {
        (source.clone(), source.clone(), ProfileType::Subscription)
    } else {
        (source.clone(), "manual".to_string(), ProfileType::Manual)
    };

    let raws = pdx_subscribe::ingest_source(&input)
        .await
        .context("add: ingest source")?;
    let configs = pdx_subscribe::normalize_all(raws);
    ensure!(!configs.is_empty(), "add: no valid configs found in source");

    let store = Store::open(db).context("add: open store")?;
    let name = args
        .name
        .unwrap_or_else(|| profile_name_from_source(&source));
    let profile = store
        .get_or_create_profile(&name, &source_key, profile_type)
        .context("add: create profile")?;
    let inserted = store
        .insert_configs_batch(&configs, profile)
        .context("add: store configs")?;
    if matches!(profile_type, ProfileType::Subscription) {
        store.touch_profile_sync(profile).context("add: touch profile")?;
    }

    report::print_sync_report(&source, configs.len(), inserted, store.count_configs()?);
    Ok(())
}
