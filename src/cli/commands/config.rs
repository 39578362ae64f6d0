use std::path::Path;

use anyhow::Result;

use ranno::config::PlannerConfig;
use ranno::ui::info;

pub fn path(config_path: &Path) -> Result<()> {
    println!("{}", config_path.display());
    if !config_path.exists() {
        info("File does not exist yet; built-in defaults are in use.");
    }
    Ok(())
}

pub fn show(config: &PlannerConfig) -> Result<()> {
    print!("{}", config.to_toml_string()?);
    Ok(())
}
