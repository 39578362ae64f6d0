use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::capability::{
    EndpointSpec, PlaceSearch, RouteLeg, RoutePath, RouteRequest, RoutingResponse, RoutingService,
    TravelMode,
};
use crate::error::{PlannerError, Result};
use crate::providers::http::{send_json, trim_base};
use crate::providers::nominatim::NominatimPlaces;
use crate::routing::geometry::{Bounds, LatLng};

/// Routing against an OSRM server. Place ids and free text are turned into
/// coordinates through Nominatim first.
pub struct OsrmRouting {
    client: Client,
    base_url: String,
    places: Arc<NominatimPlaces>,
    bias: LatLng,
    radius_m: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
    #[serde(default)]
    waypoints: Vec<OsrmWaypoint>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: Option<f64>,
    duration: Option<f64>,
    geometry: Option<GeoJsonLine>,
    #[serde(default)]
    legs: Vec<OsrmLeg>,
}

#[derive(Debug, Deserialize)]
struct GeoJsonLine {
    #[serde(default)]
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct OsrmLeg {
    distance: Option<f64>,
    duration: Option<f64>,
    #[serde(default)]
    summary: String,
}

#[derive(Debug, Deserialize)]
struct OsrmWaypoint {
    #[serde(default)]
    name: String,
}

fn profile(mode: TravelMode) -> &'static str {
    match mode {
        TravelMode::Walking => "foot",
        TravelMode::Driving => "driving",
        TravelMode::Bicycling => "bike",
    }
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

fn into_response(raw: OsrmResponse) -> Result<RoutingResponse> {
    if raw.code != "Ok" {
        let detail = raw.message.map(|m| format!(": {m}")).unwrap_or_default();
        return Err(PlannerError::RoutingFailure(format!("{}{detail}", raw.code)));
    }

    let start = raw.waypoints.first().and_then(|w| non_empty(&w.name));
    let end = raw.waypoints.last().and_then(|w| non_empty(&w.name));

    let paths = raw
        .routes
        .into_iter()
        .map(|r| {
            let overview_path: Vec<LatLng> = r
                .geometry
                .map(|g| g.coordinates)
                .unwrap_or_default()
                .into_iter()
                .map(|[lng, lat]| LatLng::new(lat, lng))
                .collect();
            let n = r.legs.len();
            let summary = r
                .legs
                .iter()
                .map(|l| l.summary.as_str())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", ");
            let legs = r
                .legs
                .into_iter()
                .enumerate()
                .map(|(i, l)| RouteLeg {
                    distance_m: l.distance,
                    duration_s: l.duration,
                    start_address: if i == 0 { start.clone() } else { None },
                    end_address: if i + 1 == n { end.clone() } else { None },
                })
                .collect();
            RoutePath {
                legs,
                bounds: Bounds::from_points(&overview_path),
                overview_path,
                summary,
                distance_m: r.distance,
                duration_s: r.duration,
            }
        })
        .collect();

    Ok(RoutingResponse { paths })
}

impl OsrmRouting {
    pub fn new(
        client: Client,
        base_url: &str,
        places: Arc<NominatimPlaces>,
        bias: LatLng,
        radius_m: f64,
    ) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
            places,
            bias,
            radius_m,
        }
    }

    async fn coordinate(&self, spec: &EndpointSpec) -> Result<LatLng> {
        let found = match spec {
            EndpointSpec::Coordinate(p) => return Ok(*p),
            EndpointSpec::PlaceId(id) => self.places.lookup(id).await?,
            EndpointSpec::Text(text) => self
                .places
                .search(text, self.bias, self.radius_m)
                .await?
                .into_iter()
                .find_map(|c| c.location),
        };
        found.ok_or_else(|| PlannerError::RoutingFailure(format!("NOT_FOUND: {spec:?}")))
    }
}

#[async_trait]
impl RoutingService for OsrmRouting {
    async fn route(&self, request: &RouteRequest) -> Result<RoutingResponse> {
        let mut points = vec![self.coordinate(&request.origin).await?];
        points.extend(request.via.iter().copied());
        points.push(self.coordinate(&request.destination).await?);

        let coords = points
            .iter()
            .map(|p| format!("{:.6},{:.6}", p.lng, p.lat))
            .collect::<Vec<_>>()
            .join(";");
        let url = format!(
            "{}/route/v1/{}/{coords}",
            self.base_url,
            profile(request.travel_mode)
        );
        let alternatives = if request.want_alternatives { "true" } else { "false" };
        let req = self.client.get(url).query(&[
            ("alternatives", alternatives),
            ("overview", "full"),
            ("geometries", "geojson"),
            ("steps", "false"),
        ]);

        let raw: OsrmResponse = send_json(req)
            .await
            .map_err(|e| PlannerError::RoutingFailure(e.to_string()))?;
        into_response(raw)
    }
}
