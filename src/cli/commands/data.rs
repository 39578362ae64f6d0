use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use ranno::config::PlannerConfig;
use ranno::db::sync::sync as sync_cache;
use ranno::ui::success;

pub async fn sync(config: &PlannerConfig, db_path: &Path) -> Result<()> {
    ranno::paths::ensure_parent_dir(db_path)?;
    let source = ranno::providers::sfgov_data(config)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner} {msg} [{elapsed_precise}]")?);
    pb.set_message("Downloading incidents and amenities...");
    pb.enable_steady_tick(Duration::from_millis(120));

    let result = sync_cache(
        db_path,
        &source,
        &source,
        config.incidents.limit,
        config.amenities.limit,
    )
    .await;
    pb.finish_and_clear();

    let report = result?;
    success(format!(
        "Cache updated at {}: {} incidents, {} water fountains, {} restrooms",
        db_path.display(),
        report.incidents,
        report.water,
        report.restrooms
    ));
    Ok(())
}
