//! Turns a finished [`PlanDraft`] into a routed, scored and summarised plan.

use std::sync::Arc;

use serde::Serialize;

use crate::capability::{
    ElevationService, EndpointSpec, RouteLeg, RouteRequest, RoutingService, TravelMode,
};
use crate::config::RouteConfig;
use crate::dialogue::question::PlanDraft;
use crate::error::{PlannerError, Result};
use crate::intent::schema::{
    AMENITY_RESTROOMS, AMENITY_WATER, ENV_LOW_TRAFFIC, Intent, RouteType, SAFETY_AVOID_CRIME,
    SAFETY_WELL_LIT,
};
use crate::model::{AmenityKind, AmenityStop, DataLayers, Endpoint, RouteEndpoints};
use crate::routing::amenities::{AmenityOptions, nearest_amenities};
use crate::routing::geometry::{Bounds, LatLng, destination_point};
use crate::routing::risk::{
    INCIDENTS_UNAVAILABLE_MESSAGE, RiskLevel, RouteRiskSummary, summarize_route_risk,
};
use crate::routing::slope::{SlopeBucket, elevation_sample_count, max_grade_percent};
use crate::utils::formatting::{format_distance, format_duration, paced_seconds};

pub const NO_PATHS_MESSAGE: &str = "Route generation did not return any paths.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedRoute {
    pub endpoints: RouteEndpoints,
    pub travel_mode: TravelMode,
    pub path: Vec<LatLng>,
    pub legs: Vec<RouteLeg>,
    pub bounds: Option<Bounds>,
    pub distance_m: f64,
    pub duration_s: f64,
    pub risk_summary: RouteRiskSummary,
    pub water_stops: Vec<AmenityStop>,
    pub restroom_stops: Vec<AmenityStop>,
    pub max_grade_percent: Option<f64>,
}

/// Display strings for a generated route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    pub origin: String,
    pub destination: String,
    pub distance: String,
    pub walking_duration: String,
    pub running_duration: String,
    pub slope: String,
    pub safety: String,
    pub highlights: Vec<String>,
    pub water_stops: Vec<String>,
    pub restroom_stops: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub route: GeneratedRoute,
    pub summary: RouteSummary,
}

impl RoutePlan {
    pub fn ready_message(&self) -> String {
        let s = &self.summary;
        format!(
            "Route ready: {} -> {}. Walking about {}, running about {}.",
            s.origin, s.destination, s.walking_duration, s.running_duration
        )
    }
}

#[derive(Clone)]
pub struct RouteFinalizer {
    routing: Arc<dyn RoutingService>,
    elevation: Option<Arc<dyn ElevationService>>,
    route: RouteConfig,
    amenities: AmenityOptions,
}

impl RouteFinalizer {
    pub fn new(
        routing: Arc<dyn RoutingService>,
        elevation: Option<Arc<dyn ElevationService>>,
        route: RouteConfig,
        amenities: AmenityOptions,
    ) -> Self {
        Self {
            routing,
            elevation,
            route,
            amenities,
        }
    }

    pub fn travel_mode(&self, intent: &Intent) -> TravelMode {
        match intent.preferences.route_type {
            Some(RouteType::PointToPoint) => self
                .route
                .point_to_point_travel_mode()
                .unwrap_or(TravelMode::Walking),
            _ => TravelMode::Walking,
        }
    }

    /// Placeholder destination for loop requests with a target distance and
    /// a located origin, unless the destination is already authoritative.
    pub fn loop_destination(&self, draft: &PlanDraft) -> Option<Endpoint> {
        if !draft.intent.wants_loop() {
            return None;
        }
        let km = draft.intent.constraints.distance_km?;
        let origin = &draft.endpoints.origin;
        let at = origin.location?;
        if draft.endpoints.destination.is_authoritative() {
            return None;
        }

        let meters = (km * 1000.0 * self.route.loop_offset_factor).max(self.route.loop_min_offset_m);
        Some(Endpoint {
            description: format!("Route near {}", origin.description),
            place_id: None,
            location: Some(destination_point(at, meters, self.route.loop_bearing_deg)),
        })
    }

    pub fn adjusted_endpoints(&self, draft: &PlanDraft) -> RouteEndpoints {
        match self.loop_destination(draft) {
            Some(dest) => RouteEndpoints {
                origin: draft.endpoints.origin.clone(),
                destination: dest,
            },
            None => draft.endpoints.clone(),
        }
    }

    pub async fn finalize(&self, draft: &PlanDraft, data: &DataLayers) -> Result<RoutePlan> {
        let intent = &draft.intent;
        let endpoints = self.adjusted_endpoints(draft);
        let travel_mode = self.travel_mode(intent);

        let request = RouteRequest {
            origin: EndpointSpec::from_endpoint(&endpoints.origin),
            destination: EndpointSpec::from_endpoint(&endpoints.destination),
            travel_mode,
            want_alternatives: true,
            via: Vec::new(),
        };
        log::info!(
            "Routing '{}' -> '{}' ({})",
            endpoints.origin.description,
            endpoints.destination.description,
            travel_mode.as_str()
        );

        let response = self.routing.route(&request).await?;
        let path = response
            .paths
            .into_iter()
            .next()
            .ok_or_else(|| PlannerError::RoutingFailure(NO_PATHS_MESSAGE.into()))?;

        let distance_m = path
            .distance_m
            .unwrap_or_else(|| sum_legs(&path.legs, |l| l.distance_m));
        let duration_s = path
            .duration_s
            .unwrap_or_else(|| sum_legs(&path.legs, |l| l.duration_s));

        let risk_summary = match path.bounds {
            Some(_) if data.incidents.is_degraded() => {
                RouteRiskSummary::not_estimated(INCIDENTS_UNAVAILABLE_MESSAGE)
            }
            bounds => summarize_route_risk(bounds, &data.incidents.points),
        };

        let water_stops = nearest_amenities(
            &path.overview_path,
            &data.water.points,
            AmenityKind::Water,
            self.amenities,
        );
        let restroom_stops = nearest_amenities(
            &path.overview_path,
            &data.restrooms.points,
            AmenityKind::Restroom,
            self.amenities,
        );

        let max_grade = self.evaluate_slope(&path.overview_path).await;

        let first_leg = path.legs.first();
        let last_leg = path.legs.last();
        let origin = first_leg
            .and_then(|l| l.start_address.clone())
            .unwrap_or_else(|| endpoints.origin.description.clone());
        let destination = last_leg
            .and_then(|l| l.end_address.clone())
            .unwrap_or_else(|| endpoints.destination.description.clone());

        let route = GeneratedRoute {
            endpoints,
            travel_mode,
            path: path.overview_path,
            legs: path.legs,
            bounds: path.bounds,
            distance_m,
            duration_s,
            risk_summary,
            water_stops,
            restroom_stops,
            max_grade_percent: max_grade,
        };
        let summary = self.summarize(intent, &route, origin, destination);
        Ok(RoutePlan { route, summary })
    }

    async fn evaluate_slope(&self, path: &[LatLng]) -> Option<f64> {
        let svc = self.elevation.as_ref()?;
        if path.len() < 2 {
            return None;
        }
        match svc
            .sample_elevation(path, elevation_sample_count(path.len()))
            .await
        {
            Ok(samples) => max_grade_percent(&samples),
            Err(e) => {
                log::warn!("Elevation lookup failed: {e}");
                None
            }
        }
    }

    fn summarize(
        &self,
        intent: &Intent,
        route: &GeneratedRoute,
        origin: String,
        destination: String,
    ) -> RouteSummary {
        let walking = paced_seconds(route.distance_m, self.route.walking_pace_min_per_km)
            .or((route.duration_s > 0.0).then_some(route.duration_s))
            .map(format_duration)
            .unwrap_or_else(|| "Unknown".to_string());
        let running = paced_seconds(route.distance_m, self.route.running_pace_min_per_km)
            .map(|s| {
                format!(
                    "{} (estimated at {} min/km)",
                    format_duration(s),
                    self.route.running_pace_min_per_km
                )
            })
            .unwrap_or_else(|| "Unknown".to_string());

        let slope = match route.max_grade_percent {
            Some(g) => format!("Max grade about {g:.1}%"),
            None => "Slope information currently unavailable".to_string(),
        };
        let risk = &route.risk_summary;
        let safety = format!("{} - {}", risk.level.as_str().to_uppercase(), risk.message);

        RouteSummary {
            origin,
            destination,
            distance: format_distance(route.distance_m),
            walking_duration: walking,
            running_duration: running,
            slope,
            safety,
            highlights: build_highlights(intent, route),
            water_stops: stop_lines(&route.water_stops),
            restroom_stops: stop_lines(&route.restroom_stops),
        }
    }
}

fn sum_legs(legs: &[RouteLeg], field: impl Fn(&RouteLeg) -> Option<f64>) -> f64 {
    legs.iter().filter_map(field).sum()
}

fn stop_lines(stops: &[AmenityStop]) -> Vec<String> {
    stops
        .iter()
        .map(|s| format!("{} ({})", s.name, format_distance(s.distance_meters)))
        .collect()
}

/// Highlight lines for a route, driven by the intent's preferences and the
/// computed risk, slope and amenity results.
pub fn build_highlights(intent: &Intent, route: &GeneratedRoute) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();

    if intent.has_safety(SAFETY_WELL_LIT) {
        out.push("Prioritizes well-lit segments.".into());
    }
    if intent.has_safety(SAFETY_AVOID_CRIME) {
        out.push("Avoids recently high-risk areas.".into());
    }
    if intent.preferences.route_type == Some(RouteType::Loop) {
        out.push("Loop route that returns to the start.".into());
    }
    if intent.has_environment(ENV_LOW_TRAFFIC) {
        out.push("Sticks to lower-traffic streets when possible.".into());
    }
    if route.risk_summary.estimated && route.risk_summary.level == RiskLevel::Low {
        out.push("Area has had fewer recent incidents - lower risk.".into());
    }
    if let Some(g) = route.max_grade_percent {
        out.push(SlopeBucket::from_grade(g).highlight().into());
    }

    match route.water_stops.first() {
        Some(s) => out.push(format!(
            "Water fountain nearby: {} ({} away)",
            s.name,
            format_distance(s.distance_meters)
        )),
        None if intent.has_amenity(AMENITY_WATER) => {
            out.push("No water fountains detected along this route. Consider carrying water.".into())
        }
        None => {}
    }
    match route.restroom_stops.first() {
        Some(s) => out.push(format!(
            "Restroom nearby: {} ({} away)",
            s.name,
            format_distance(s.distance_meters)
        )),
        None if intent.has_amenity(AMENITY_RESTROOMS) => out.push(
            "No restrooms detected along this route. Plan a pit stop before your run.".into(),
        ),
        None => {}
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{RoutePath, RoutingResponse};
    use crate::intent::schema::PlaceText;
    use crate::model::{AmenityPoint, DataLayer, IncidentPoint};
    use crate::routing::geometry::haversine_m;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Recorder {
        reply: Result<RoutingResponse>,
        seen: Mutex<Vec<RouteRequest>>,
    }

    #[async_trait]
    impl RoutingService for Recorder {
        async fn route(&self, request: &RouteRequest) -> Result<RoutingResponse> {
            self.seen.lock().unwrap().push(request.clone());
            self.reply.clone()
        }
    }

    fn ferry() -> LatLng {
        LatLng::new(37.7955, -122.3937)
    }

    fn straight_path() -> RoutePath {
        let a = ferry();
        let b = destination_point(a, 2500.0, 60.0);
        let path = vec![a, destination_point(a, 1250.0, 60.0), b];
        RoutePath {
            legs: vec![
                RouteLeg {
                    distance_m: Some(3000.0),
                    duration_s: Some(600.0),
                    start_address: Some("Ferry Building".into()),
                    end_address: None,
                },
                RouteLeg {
                    distance_m: Some(2000.0),
                    duration_s: Some(400.0),
                    start_address: None,
                    end_address: Some("Embarcadero".into()),
                },
            ],
            bounds: Bounds::from_points(&path),
            overview_path: path,
            summary: "The Embarcadero".into(),
            distance_m: None,
            duration_s: None,
        }
    }

    fn finalizer(reply: Result<RoutingResponse>) -> (RouteFinalizer, Arc<Recorder>) {
        let rec = Arc::new(Recorder {
            reply,
            seen: Mutex::new(Vec::new()),
        });
        let f = RouteFinalizer::new(
            rec.clone(),
            None,
            RouteConfig::default(),
            AmenityOptions::default(),
        );
        (f, rec)
    }

    fn loop_draft(km: f64) -> PlanDraft {
        let mut d = PlanDraft::default();
        d.intent.location.origin = Some(PlaceText {
            text: "Ferry Building".into(),
        });
        d.intent.preferences.route_type = Some(RouteType::Loop);
        d.intent.constraints.distance_km = Some(km);
        d.endpoints.origin = Endpoint {
            description: "Ferry Building".into(),
            place_id: Some("p1".into()),
            location: Some(ferry()),
        };
        d.endpoints.destination = Endpoint::text("Ferry Building");
        d
    }

    #[test]
    fn loop_destination_offset() {
        let (f, _) = finalizer(Ok(RoutingResponse::default()));

        let dest = f.loop_destination(&loop_draft(5.0)).unwrap();
        assert_eq!(dest.description, "Route near Ferry Building");
        let d = haversine_m(ferry(), dest.location.unwrap());
        assert!((d - 3000.0).abs() < 1.0, "got {d}");

        let short = f.loop_destination(&loop_draft(1.0)).unwrap();
        let d = haversine_m(ferry(), short.location.unwrap());
        assert!((d - 800.0).abs() < 1.0, "got {d}");
    }

    #[test]
    fn no_synthesis_without_distance_or_location() {
        let (f, _) = finalizer(Ok(RoutingResponse::default()));

        let mut d = loop_draft(5.0);
        d.intent.constraints.distance_km = None;
        assert!(f.loop_destination(&d).is_none());

        let mut d = loop_draft(5.0);
        d.endpoints.origin.location = None;
        assert!(f.loop_destination(&d).is_none());

        let mut d = loop_draft(5.0);
        d.endpoints.destination.place_id = Some("p2".into());
        assert!(f.loop_destination(&d).is_none());
    }

    #[test]
    fn travel_mode_mapping() {
        let (f, _) = finalizer(Ok(RoutingResponse::default()));
        let mut i = Intent::default();
        assert_eq!(f.travel_mode(&i), TravelMode::Walking);
        i.preferences.route_type = Some(RouteType::PointToPoint);
        assert_eq!(f.travel_mode(&i), TravelMode::Driving);
    }

    #[tokio::test]
    async fn finalize_aggregates_legs_and_scores() {
        let (f, rec) = finalizer(Ok(RoutingResponse {
            paths: vec![straight_path()],
        }));
        let mut draft = loop_draft(5.0);
        draft.intent.add_safety(SAFETY_AVOID_CRIME);
        draft.intent.preferences.amenities = Some(vec![AMENITY_RESTROOMS.into()]);

        let near = destination_point(ferry(), 100.0, 150.0);
        let data = DataLayers {
            incidents: DataLayer::loaded(vec![IncidentPoint {
                id: "far".into(),
                latitude: 37.70,
                longitude: -122.50,
                category: None,
                occurred_at: None,
            }]),
            water: DataLayer::loaded(vec![AmenityPoint {
                id: "w1".into(),
                latitude: near.lat,
                longitude: near.lng,
                name: Some("Plaza fountain".into()),
                address: None,
            }]),
            restrooms: DataLayer::default(),
        };

        let plan = f.finalize(&draft, &data).await.unwrap();
        let seen = rec.seen.lock().unwrap();
        assert!(seen[0].want_alternatives);
        assert!(matches!(seen[0].origin, EndpointSpec::PlaceId(_)));
        assert!(matches!(seen[0].destination, EndpointSpec::Coordinate(_)));

        assert_eq!(plan.route.distance_m, 5000.0);
        assert_eq!(plan.route.duration_s, 1000.0);
        assert_eq!(plan.route.legs, straight_path().legs);
        assert_eq!(plan.route.risk_summary.level, RiskLevel::Low);
        assert!(plan.route.risk_summary.estimated);

        let s = &plan.summary;
        assert_eq!(s.origin, "Ferry Building");
        assert_eq!(s.destination, "Embarcadero");
        assert_eq!(s.distance, "5.0 km (3.1 mi)");
        assert_eq!(s.walking_duration, "50 mins");
        assert_eq!(s.running_duration, "30 mins (estimated at 6 min/km)");
        assert_eq!(s.slope, "Slope information currently unavailable");
        assert!(s.safety.starts_with("LOW - "));
        assert!(s.highlights.contains(&"Avoids recently high-risk areas.".to_string()));
        assert!(s.highlights.iter().any(|h| h.starts_with("Water fountain nearby: Plaza fountain")));
        assert!(s.highlights.iter().any(|h| h.starts_with("No restrooms detected")));
        assert_eq!(
            plan.ready_message(),
            "Route ready: Ferry Building -> Embarcadero. Walking about 50 mins, running about 30 mins (estimated at 6 min/km)."
        );
    }

    #[tokio::test]
    async fn degraded_incidents_are_not_a_low_finding() {
        let (f, _) = finalizer(Ok(RoutingResponse {
            paths: vec![straight_path()],
        }));
        let data = DataLayers {
            incidents: DataLayer::failed("HTTP 503"),
            ..DataLayers::default()
        };
        let plan = f.finalize(&loop_draft(5.0), &data).await.unwrap();
        assert!(!plan.route.risk_summary.estimated);
        assert_eq!(plan.route.risk_summary.message, INCIDENTS_UNAVAILABLE_MESSAGE);
        assert!(!plan.summary.highlights.iter().any(|h| h.contains("lower risk")));
    }

    #[tokio::test]
    async fn empty_response_is_a_routing_failure() {
        let (f, _) = finalizer(Ok(RoutingResponse::default()));
        let err = f
            .finalize(&loop_draft(5.0), &DataLayers::default())
            .await
            .unwrap_err();
        assert_eq!(err, PlannerError::RoutingFailure(NO_PATHS_MESSAGE.into()));
    }
}
