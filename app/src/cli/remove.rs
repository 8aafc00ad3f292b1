//! `proxydex remove` — delete a config, a profile, or everything.

use crate::cli::RemoveArgs;
use anyhow::{bail, Context, Result};
use pdx_store::Store;
use std::path::Path;
use tracing::info;

pub fn run(db: &Path, args: RemoveArgs) -> Result<()> {
    let store = Store::open(db).context("remove: open store")?;

    if let Some(id) = args.id {
        if store.delete_config(id).context("remove: delete config")? {
            println!("  Removed config #{id}.");
        } else {
            bail!("remove: config id={id} not found");
        }
        return Ok(());
    }

    if let Some(profile) = args.profile {
        if store
            .delete_profile(profile)
            .context("remove: delete profile")?
        {
            info!(profile, "profile removed with its configs");
            println!("  Removed profile #{profile} and its configs.");
        } else {
            bail!("remove: profile id={profile} not found");
        }
        return Ok(());
    }

    if args.all {
        let profiles = store
            .delete_all_profiles()
            .context("remove: delete all")?;
        println!("  Removed {profiles} profile(s) and all their configs.");
        return Ok(());
    }

    bail!("remove: pass a config id, --profile <ID>, or --all");
}
