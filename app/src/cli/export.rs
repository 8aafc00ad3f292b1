//! `proxydex export` — emit a client-runtime document for a profile.

use crate::cli::{ExportArgs, ExportFormat};
use anyhow::{ensure, Context, Result};
use pdx_store::Store;
use std::path::Path;

pub fn run(db: &Path, args: ExportArgs) -> Result<()> {
    let store = Store::open(db).context("export: open store")?;
    store
        .get_profile(args.profile)
        .context("export: load profile")?
        .with_context(|| format!("export: profile id={} not found", args.profile))?;

    // Alive-first, fastest-first: the exporter treats row order as ranking.
    let rows = store
        .list_configs_by_profile(args.profile)
        .context("export: load configs")?;
    ensure!(!rows.is_empty(), "export: profile has no configs");

    let document = match args.format {
        ExportFormat::SingBox => pdx_export::to_singbox(&rows).context("export: sing-box")?,
        ExportFormat::Xray => pdx_export::to_xray(&rows, args.stats).context("export: xray")?,
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, &document)
                .with_context(|| format!("export: write {}", path.display()))?;
            println!("  Wrote {}.", path.display());
        }
        None => println!("{document}"),
    }
    Ok(())
}
