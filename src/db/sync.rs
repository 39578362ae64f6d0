//! Refresh the local cache from the open-data sources.

use std::path::Path;

use crate::capability::{AmenitySource, IncidentSource};
use crate::db::cache::{record_sync, replace_amenities, replace_incidents};
use crate::db::core::open_db;
use crate::error::Result;
use crate::model::AmenityKind;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub incidents: usize,
    pub water: usize,
    pub restrooms: usize,
}

/// Fetch all three layers, then replace the cached rows.
///
/// Nothing is written unless every fetch succeeded, so a failed sync leaves
/// the previous snapshot intact.
pub async fn sync(
    db_path: &Path,
    incidents: &dyn IncidentSource,
    amenities: &dyn AmenitySource,
    incident_limit: usize,
    amenity_limit: usize,
) -> Result<SyncReport> {
    let (inc, water, rest) = tokio::join!(
        incidents.fetch_incidents(incident_limit),
        amenities.fetch_amenities(AmenityKind::Water, amenity_limit),
        amenities.fetch_amenities(AmenityKind::Restroom, amenity_limit),
    );
    let (inc, water, rest) = (inc?, water?, rest?);

    let path = db_path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let mut con = open_db(&path)?;
        let report = SyncReport {
            incidents: replace_incidents(&mut con, &inc)?,
            water: replace_amenities(&mut con, AmenityKind::Water, &water)?,
            restrooms: replace_amenities(&mut con, AmenityKind::Restroom, &rest)?,
        };
        record_sync(&con)?;
        log::info!("Cache synced: {report:?}");
        Ok(report)
    })
    .await
    .map_err(|e| crate::error::PlannerError::Cache(format!("sync task failed: {e}")))?
}
