use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use ranno::model::AmenityStop;
use ranno::routing::{RoutePlan, RouteRiskSummary};

/// Stable JSON shape for `plan --json` and `plan --out`.
#[derive(Debug, Serialize)]
pub struct PlanExport<'a> {
    pub origin: String,
    pub destination: String,
    pub travel_mode: &'static str,
    pub distance_m: f64,
    pub duration_s: f64,
    pub risk: &'a RouteRiskSummary,
    pub max_grade_percent: Option<f64>,
    pub water_stops: &'a [AmenityStop],
    pub restroom_stops: &'a [AmenityStop],
    pub highlights: &'a [String],
    /// `[lat, lng]` pairs.
    pub path: Vec<[f64; 2]>,
}

impl<'a> From<&'a RoutePlan> for PlanExport<'a> {
    fn from(plan: &'a RoutePlan) -> Self {
        let r = &plan.route;
        Self {
            origin: r.endpoints.origin.description.clone(),
            destination: r.endpoints.destination.description.clone(),
            travel_mode: r.travel_mode.as_str(),
            distance_m: r.distance_m,
            duration_s: r.duration_s,
            risk: &r.risk_summary,
            max_grade_percent: r.max_grade_percent,
            water_stops: &r.water_stops,
            restroom_stops: &r.restroom_stops,
            highlights: &plan.summary.highlights,
            path: r.path.iter().map(|p| [p.lat, p.lng]).collect(),
        }
    }
}

pub fn to_json(plan: &RoutePlan) -> Result<String> {
    serde_json::to_string_pretty(&PlanExport::from(plan)).context("Failed to serialize route plan")
}

pub fn write_json(plan: &RoutePlan, out: &Path) -> Result<()> {
    ranno::paths::ensure_parent_dir(out)?;
    std::fs::write(out, to_json(plan)?)
        .with_context(|| format!("Failed to write {}", out.display()))
}
