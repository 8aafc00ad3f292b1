//! `proxydex sub` — saved subscription URLs.

use crate::cli::{SubArgs, SubCommands};
use crate::report;
use anyhow::{bail, Context, Result};
use pdx_store::Store;
use std::path::Path;
use tracing::warn;

pub async fn run(db: &Path, args: SubArgs) -> Result<()> {
    let store = Store::open(db).context("sub: open store")?;

    match args.command {
        SubCommands::Add { url } => {
            if store.add_subscription(&url).context("sub: add")? {
                println!("  Saved {url}.");
            } else {
                println!("  Already saved: {url}.");
            }
        }
        SubCommands::List => {
            let urls = store.list_subscriptions().context("sub: list")?;
            if urls.is_empty() {
                println!("  No subscriptions saved.");
            }
            for url in urls {
                println!("  {url}");
            }
        }
        SubCommands::Sync { url } => {
            let (fetched, inserted) = super::sync::sync_one(&store, &url).await?;
            report::print_sync_report(&url, fetched, inserted, store.count_configs()?);
        }
        SubCommands::SyncAll => {
            let urls = store.list_subscriptions().context("sub: list")?;
            if urls.is_empty() {
                bail!("sub sync-all: no subscriptions saved");
            }

            let mut synced = 0usize;
            for url in &urls {
                match super::sync::sync_one(&store, url).await {
                    Ok((fetched, inserted)) => {
                        synced += 1;
                        report::print_sync_report(url, fetched, inserted, store.count_configs()?);
                    }
                    Err(err) => {
                        warn!(%url, %err, "subscription sync failed, continuing");
                    }
                }
            }
            println!("  Synced {synced}/{} subscription(s).", urls.len());
        }
        SubCommands::Remove { url } => {
            if store.remove_subscription(&url).context("sub: remove")? {
                println!("  Removed {url}.");
            } else {
                bail!("sub remove: {url} is not saved");
            }
        }
    }
    Ok(())
}
