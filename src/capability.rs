//! Contracts between the planning core and its external collaborators.
//!
//! Nothing here reads ambient global state: every handle is injected through
//! [`Capabilities`] when a session starts.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::model::{AmenityKind, AmenityPoint, Endpoint, IncidentPoint, PlaceCandidate};
use crate::routing::geometry::{Bounds, LatLng};
use crate::routing::slope::ElevationSample;

/// Availability of an on-demand capability (typically a language model).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityStatus {
    Unavailable,
    Downloadable,
    Downloading,
    Available,
    Error(String),
}

impl CapabilityStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, CapabilityStatus::Available)
    }
}

impl fmt::Display for CapabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityStatus::Unavailable => f.write_str("unavailable"),
            CapabilityStatus::Downloadable => f.write_str("downloadable"),
            CapabilityStatus::Downloading => f.write_str("downloading"),
            CapabilityStatus::Available => f.write_str("available"),
            CapabilityStatus::Error(e) => write!(f, "error ({e})"),
        }
    }
}

#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn status(&self) -> CapabilityStatus;

    async fn complete(&self, system_instructions: &str, user_text: &str) -> Result<String>;
}

#[async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Ranked by relevance; callers cap the list.
    async fn search(
        &self,
        query: &str,
        bias: LatLng,
        radius_m: f64,
    ) -> Result<Vec<PlaceCandidate>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Walking,
    Driving,
    Bicycling,
}

impl TravelMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "walking" | "walk" | "foot" => Some(Self::Walking),
            "driving" | "drive" | "car" => Some(Self::Driving),
            "bicycling" | "cycling" | "bike" => Some(Self::Bicycling),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TravelMode::Walking => "walking",
            TravelMode::Driving => "driving",
            TravelMode::Bicycling => "bicycling",
        }
    }
}

/// How an endpoint is handed to the routing service.
#[derive(Debug, Clone, PartialEq)]
pub enum EndpointSpec {
    PlaceId(String),
    Coordinate(LatLng),
    Text(String),
}

impl EndpointSpec {
    /// Precedence: place id, then coordinate, then free text.
    pub fn from_endpoint(e: &Endpoint) -> Self {
        if let Some(id) = &e.place_id {
            EndpointSpec::PlaceId(id.clone())
        } else if let Some(loc) = e.location {
            EndpointSpec::Coordinate(loc)
        } else {
            EndpointSpec::Text(e.description.clone())
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub origin: EndpointSpec,
    pub destination: EndpointSpec,
    pub travel_mode: TravelMode,
    pub want_alternatives: bool,
    /// Intermediate points, in order. Empty for plain A -> B requests.
    pub via: Vec<LatLng>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RouteLeg {
    pub distance_m: Option<f64>,
    pub duration_s: Option<f64>,
    pub start_address: Option<String>,
    pub end_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoutePath {
    pub legs: Vec<RouteLeg>,
    pub bounds: Option<Bounds>,
    pub overview_path: Vec<LatLng>,
    pub summary: String,
    pub distance_m: Option<f64>,
    pub duration_s: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoutingResponse {
    pub paths: Vec<RoutePath>,
}

#[async_trait]
pub trait RoutingService: Send + Sync {
    /// Non-OK provider statuses surface as `PlannerError::RoutingFailure`.
    async fn route(&self, request: &RouteRequest) -> Result<RoutingResponse>;
}

#[async_trait]
pub trait ElevationService: Send + Sync {
    async fn sample_elevation(
        &self,
        path: &[LatLng],
        samples: usize,
    ) -> Result<Vec<ElevationSample>>;
}

#[async_trait]
pub trait IncidentSource: Send + Sync {
    /// Most recent first, at most `limit` rows.
    async fn fetch_incidents(&self, limit: usize) -> Result<Vec<IncidentPoint>>;
}

#[async_trait]
pub trait AmenitySource: Send + Sync {
    async fn fetch_amenities(&self, kind: AmenityKind, limit: usize) -> Result<Vec<AmenityPoint>>;
}

/// Handles injected into a planning session.
#[derive(Clone)]
pub struct Capabilities {
    pub completion: Arc<dyn TextCompletion>,
    pub places: Arc<dyn PlaceSearch>,
    pub routing: Arc<dyn RoutingService>,
    pub elevation: Option<Arc<dyn ElevationService>>,
    pub incidents: Arc<dyn IncidentSource>,
    pub amenities: Arc<dyn AmenitySource>,
}
