//! `proxydex test` — probe stored configs and persist the outcome.

use crate::cli::TestArgs;
use crate::report;
use anyhow::{bail, Context, Result};
use pdx_probe::Prober;
use pdx_store::{ConfigRow, Store};
use pdx_types::{Config, PingResult};
use std::path::Path;
use tracing::info;

pub async fn run(db: &Path, args: TestArgs) -> Result<()> {
    let store = Store::open(db).context("test: open store")?;

    let rows: Vec<ConfigRow> = if let Some(id) = args.id {
        let row = store
            .get_config(id)
            .context("test: load config")?
            .with_context(|| format!("test: config id={id} not found"))?;
        vec![row]
    } else if let Some(profile) = args.profile {
        store
            .get_profile(profile)
            .context("test: load profile")?
            .with_context(|| format!("test: profile id={profile} not found"))?;
        store
            .list_configs_by_profile(profile)
            .context("test: list configs")?
    } else if args.all {
        store.list_configs(None).context("test: list configs")?
    } else {
        bail!("test: use --all, --profile <ID>, or --id <N>");
    };

    if rows.is_empty() {
        println!("  Nothing to test. Add configs first with `proxydex add` or `proxydex sync`.");
        return Ok(());
    }

    let probe_cfg = args.probe.to_config();
    info!(
        count = rows.len(),
        concurrency = probe_cfg.concurrency,
        attempts = probe_cfg.attempts,
        "starting probe round"
    );

    let configs: Vec<Config> = rows.iter().map(ConfigRow::to_config).collect();
    let prober = Prober::new(probe_cfg);
    let results = prober.probe_all(&configs).await;

    let updates: Vec<(i64, PingResult)> = rows
        .iter()
        .zip(&results)
        .map(|(row, result)| (row.id, result.clone()))
        .collect();
    store
        .update_ping_batch(&updates)
        .context("test: save results")?;

    // Summary is presented best-first; the persisted results above keep
    // their original association by id.
    let mut entries: Vec<(ConfigRow, PingResult)> = rows.into_iter().zip(results).collect();
    pdx_probe::sort_ranked(&mut entries);
    report::print_test_summary(&entries);
    Ok(())
}
