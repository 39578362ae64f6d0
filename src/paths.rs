use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "ranno").context("Unable to determine OS app directories")
}

/// `<config dir>/ranno/config.toml`. The directory is not created.
pub fn default_config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

pub fn default_db_path() -> Result<PathBuf> {
    let proj = project_dirs()?;
    let dir = proj.data_local_dir();
    std::fs::create_dir_all(dir).context("Unable to create app data directory")?;

    Ok(dir.join("ranno_cache.sqlite"))
}

pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Unable to create directory: {}", parent.display()))?;
    }
    Ok(())
}
