#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use ranno::capability::{
    AmenitySource, Capabilities, CapabilityStatus, ElevationService, IncidentSource, PlaceSearch,
    RoutePath, RouteRequest, RoutingResponse, RoutingService, TextCompletion,
};
use ranno::config::PlannerConfig;
use ranno::model::{AmenityKind, AmenityPoint, IncidentPoint, PlaceCandidate};
use ranno::routing::geometry::{Bounds, LatLng, destination_point};
use ranno::routing::slope::ElevationSample;
use ranno::session::{GenerationHandle, PlanningSession};
use ranno::{PlannerError, Result};

pub const FERRY_BUILDING: LatLng = LatLng {
    lat: 37.7955,
    lng: -122.3937,
};

/// Replies with a fixed JSON document.
pub struct CannedCompletion {
    pub status: CapabilityStatus,
    pub reply: Result<String>,
}

impl CannedCompletion {
    pub fn json(reply: &str) -> Self {
        Self {
            status: CapabilityStatus::Available,
            reply: Ok(reply.to_string()),
        }
    }
}

#[async_trait]
impl TextCompletion for CannedCompletion {
    async fn status(&self) -> CapabilityStatus {
        self.status.clone()
    }

    async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        self.reply.clone()
    }
}

/// Exact-match query table; unknown queries return nothing.
#[derive(Default)]
pub struct FixedPlaces {
    pub table: Vec<(String, Vec<PlaceCandidate>)>,
    pub queries: Mutex<Vec<String>>,
}

impl FixedPlaces {
    pub fn with(mut self, query: &str, candidates: Vec<PlaceCandidate>) -> Self {
        self.table.push((query.to_string(), candidates));
        self
    }
}

#[async_trait]
impl PlaceSearch for FixedPlaces {
    async fn search(&self, query: &str, _bias: LatLng, _radius_m: f64) -> Result<Vec<PlaceCandidate>> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self
            .table
            .iter()
            .find(|(q, _)| q == query)
            .map(|(_, c)| c.clone())
            .unwrap_or_default())
    }
}

pub fn candidate(name: &str, id: &str, at: LatLng) -> PlaceCandidate {
    PlaceCandidate {
        description: name.to_string(),
        place_id: Some(id.to_string()),
        location: Some(at),
    }
}

/// Hands out queued replies in order and records every request. When
/// `invalidate` is set, each call starts a newer generation before replying,
/// as if the user had typed again while the route was in flight.
#[derive(Default)]
pub struct ScriptedRouting {
    pub replies: Mutex<VecDeque<Result<RoutingResponse>>>,
    pub requests: Mutex<Vec<RouteRequest>>,
    pub invalidate: Mutex<Option<GenerationHandle>>,
}

impl ScriptedRouting {
    pub fn push(&self, reply: Result<RoutingResponse>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn requests(&self) -> Vec<RouteRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RoutingService for ScriptedRouting {
    async fn route(&self, request: &RouteRequest) -> Result<RoutingResponse> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(g) = self.invalidate.lock().unwrap().as_ref() {
            g.invalidate();
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PlannerError::RoutingFailure("no scripted reply".into())))
    }
}

/// A straight path from `from`, `meters` long, heading east.
pub fn straight_path(from: LatLng, meters: f64, points: usize) -> Vec<LatLng> {
    (0..points)
        .map(|i| destination_point(from, meters * i as f64 / (points - 1) as f64, 90.0))
        .collect()
}

pub fn ok_route(path: Vec<LatLng>, distance_m: f64, duration_s: f64) -> Result<RoutingResponse> {
    Ok(RoutingResponse {
        paths: vec![RoutePath {
            bounds: Bounds::from_points(&path),
            overview_path: path,
            summary: "Embarcadero".into(),
            distance_m: Some(distance_m),
            duration_s: Some(duration_s),
            legs: Vec::new(),
        }],
    })
}

/// Constant elevation gain per sample.
pub struct RampElevation {
    pub rise_per_sample_m: f64,
}

#[async_trait]
impl ElevationService for RampElevation {
    async fn sample_elevation(&self, path: &[LatLng], samples: usize) -> Result<Vec<ElevationSample>> {
        let pts = ranno::routing::geometry::sample_path(path, samples);
        Ok(pts
            .into_iter()
            .enumerate()
            .map(|(i, p)| ElevationSample {
                location: Some(p),
                elevation: i as f64 * self.rise_per_sample_m,
            })
            .collect())
    }
}

/// In-memory incident and amenity layers; `None` makes the fetch fail.
#[derive(Default)]
pub struct StaticData {
    pub incidents: Option<Vec<IncidentPoint>>,
    pub water: Option<Vec<AmenityPoint>>,
    pub restrooms: Option<Vec<AmenityPoint>>,
}

#[async_trait]
impl IncidentSource for StaticData {
    async fn fetch_incidents(&self, limit: usize) -> Result<Vec<IncidentPoint>> {
        let mut v = self
            .incidents
            .clone()
            .ok_or_else(|| PlannerError::DataSource("incident feed offline".into()))?;
        v.truncate(limit);
        Ok(v)
    }
}

#[async_trait]
impl AmenitySource for StaticData {
    async fn fetch_amenities(&self, kind: AmenityKind, limit: usize) -> Result<Vec<AmenityPoint>> {
        let layer = match kind {
            AmenityKind::Water => &self.water,
            AmenityKind::Restroom => &self.restrooms,
        };
        let mut v = layer
            .clone()
            .ok_or_else(|| PlannerError::DataSource(format!("{} feed offline", kind.as_str())))?;
        v.truncate(limit);
        Ok(v)
    }
}

pub fn incident(id: &str, at: LatLng) -> IncidentPoint {
    IncidentPoint {
        id: id.to_string(),
        latitude: at.lat,
        longitude: at.lng,
        category: Some("Larceny Theft".into()),
        occurred_at: Some("2024-05-01T22:00:00".into()),
    }
}

pub fn amenity(id: &str, name: &str, at: LatLng) -> AmenityPoint {
    AmenityPoint {
        id: id.to_string(),
        latitude: at.lat,
        longitude: at.lng,
        name: Some(name.to_string()),
        address: None,
    }
}

pub struct Harness {
    pub session: PlanningSession,
    pub places: Arc<FixedPlaces>,
    pub routing: Arc<ScriptedRouting>,
}

pub fn harness(
    completion: CannedCompletion,
    places: FixedPlaces,
    data: StaticData,
    config: PlannerConfig,
) -> Harness {
    let places = Arc::new(places);
    let routing = Arc::new(ScriptedRouting::default());
    let data = Arc::new(data);
    let caps = Capabilities {
        completion: Arc::new(completion),
        places: places.clone(),
        routing: routing.clone(),
        elevation: None,
        incidents: data.clone(),
        amenities: data,
    };
    Harness {
        session: PlanningSession::new(caps, config),
        places,
        routing,
    }
}
