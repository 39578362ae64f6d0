use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use ranno::capability::IncidentSource;
use ranno::config::PlannerConfig;
use ranno::db::CachedDataSource;
use ranno::routing::Bounds;
use ranno::routing::risk::summarize_route_risk;
use ranno::ui::{Style, warning};
use ranno::utils::formatting::print_kv_block_colored_keys;

use crate::cli::color::Colors;

pub async fn run(config: &PlannerConfig, bounds: Bounds, cached: bool, db_path: &Path) -> Result<()> {
    let source: Arc<dyn IncidentSource> = if cached {
        Arc::new(CachedDataSource::new(db_path))
    } else {
        Arc::new(ranno::providers::sfgov_data(config)?)
    };

    let incidents = match source.fetch_incidents(config.incidents.limit).await {
        Ok(v) => v,
        Err(e) => {
            warning(format!("Incidents unavailable: {e}"));
            Vec::new()
        }
    };
    let summary = summarize_route_risk(Some(bounds), &incidents);

    let c = Colors::new(&Style::default());
    print_kv_block_colored_keys(
        &[
            (
                "Level",
                c.risk(summary.level, summary.estimated, summary.level.as_str()),
            ),
            (
                "Incidents",
                format!(
                    "{} of {} sampled ({:.1}%)",
                    summary.incidents_along_route,
                    summary.incidents_sampled,
                    summary.density() * 100.0
                ),
            ),
            ("Message", summary.message.clone()),
        ],
        |k| c.dim(k),
    );
    Ok(())
}
