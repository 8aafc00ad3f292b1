//! `proxydex rank` — alive configs, fastest first.

use crate::cli::RankArgs;
use crate::report;
use anyhow::{Context, Result};
use std::path::Path;

pub fn run(db: &Path, args: RankArgs) -> Result<()> {
    let store = pdx_store::Store::open(db).context("rank: open store")?;
    let mut rows = store.list_alive().context("rank: load configs")?;

    if rows.is_empty() {
        println!("  No alive configs. Run `proxydex test --all` first.");
        return Ok(());
    }
    if let Some(top) = args.top {
        rows.truncate(top);
    }

    report::print_config_table(&rows);
    Ok(())
}
