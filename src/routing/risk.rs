//! Incident-density risk scoring.
//!
//! The score is a coarse bounding-box heuristic: the share of sampled
//! incidents that fall inside the route's bounding box. It is not a corridor
//! test along the polyline.

use serde::Serialize;

use crate::model::IncidentPoint;
use crate::routing::geometry::Bounds;

pub const HIGH_DENSITY: f64 = 0.25;
pub const MEDIUM_DENSITY: f64 = 0.12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Strict comparisons: a density exactly on a threshold stays in the lower tier.
    pub fn from_density(density: f64) -> Self {
        if density > HIGH_DENSITY {
            RiskLevel::High
        } else if density > MEDIUM_DENSITY {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            RiskLevel::Low => "Route stays clear of most recent incidents. Suitable for planned run.",
            RiskLevel::Medium => {
                "Route overlaps with a moderate number of incidents. Stay alert and consider alternatives."
            }
            RiskLevel::High => {
                "Route intersects with concentrated incidents. Strongly consider replanning or changing schedule."
            }
        }
    }
}

pub const BOUNDS_UNAVAILABLE_MESSAGE: &str = "Route bounds unavailable, skipping risk estimation.";
pub const INCIDENTS_UNAVAILABLE_MESSAGE: &str =
    "Incident data unavailable, risk could not be estimated.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteRiskSummary {
    pub incidents_along_route: usize,
    pub incidents_sampled: usize,
    pub level: RiskLevel,
    pub message: String,
    /// False when no estimate could be made. `level` is then `Low` by
    /// convention and must not be read as a finding.
    pub estimated: bool,
}

impl RouteRiskSummary {
    pub fn not_estimated(message: &str) -> Self {
        Self {
            incidents_along_route: 0,
            incidents_sampled: 0,
            level: RiskLevel::Low,
            message: message.to_string(),
            estimated: false,
        }
    }

    pub fn density(&self) -> f64 {
        density(self.incidents_along_route, self.incidents_sampled)
    }
}

pub fn density(along: usize, sampled: usize) -> f64 {
    if sampled == 0 {
        0.0
    } else {
        along as f64 / sampled as f64
    }
}

/// Tier a pre-counted overlap.
pub fn summarize_counts(incidents_along_route: usize, incidents_sampled: usize) -> RouteRiskSummary {
    let level = RiskLevel::from_density(density(incidents_along_route, incidents_sampled));
    RouteRiskSummary {
        incidents_along_route,
        incidents_sampled,
        level,
        message: level.message().to_string(),
        estimated: true,
    }
}

/// Score a route's bounding box against a set of incidents.
pub fn summarize_route_risk(bounds: Option<Bounds>, incidents: &[IncidentPoint]) -> RouteRiskSummary {
    let Some(b) = bounds else {
        return RouteRiskSummary::not_estimated(BOUNDS_UNAVAILABLE_MESSAGE);
    };

    let along = incidents
        .iter()
        .filter(|p| b.contains(p.latitude, p.longitude))
        .count();

    summarize_counts(along, incidents.len())
}
