//! `proxydex list` — show stored configs or profiles.

use crate::cli::ListArgs;
use crate::report;
use anyhow::{anyhow, Context, Result};
use pdx_store::Store;
use pdx_types::Protocol;
use std::path::Path;

pub fn run(db: &Path, args: ListArgs) -> Result<()> {
    let store = Store::open(db).context("list: open store")?;

    if args.profiles {
        let profiles = store.list_profiles().context("list: load profiles")?;
        report::print_profile_table(&profiles);
        return Ok(());
    }

    let rows = if let Some(profile) = args.profile {
        store
            .list_configs_by_profile(profile)
            .context("list: load configs")?
    } else {
        let protocol = args
            .protocol
            .as_deref()
            .map(str::parse::<Protocol>)
            .transpose()
            .map_err(|e| anyhow!("list: {e}"))?;
        store.list_configs(protocol).context("list: load configs")?
    };

    report::print_config_table(&rows);
    Ok(())
}
