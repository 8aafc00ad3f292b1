//! On-disk layout: everything lives under `~/.proxydex`.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Resolve the database path: explicit `--db` wins, else
/// `~/.proxydex/proxydex.db` (directory created on demand).
pub fn db_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }

    let home = dirs::home_dir().context("home directory is unavailable")?;
    let data_dir = home.join(".proxydex");
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("create data dir {}", data_dir.display()))?;
    Ok(data_dir.join("proxydex.db"))
}
