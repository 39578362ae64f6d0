mod common;

use std::sync::Arc;

use common::*;
use ranno::config::RouteConfig;
use ranno::dialogue::question::PlanDraft;
use ranno::intent::schema::PlaceText;
use ranno::intent::{Intent, RouteType};
use ranno::model::{Endpoint, RouteEndpoints};
use ranno::routing::RouteFinalizer;
use ranno::routing::amenities::AmenityOptions;
use ranno::routing::geometry::{haversine_m, initial_bearing_deg, path_length_m};
use ranno::routing::loop_geometry::{DEFAULT_LOOP_POINTS, generate_loop_waypoints};

#[test]
fn loop_waypoints_sit_on_a_circle_of_the_requested_length() {
    let km = 5.0;
    let pts = generate_loop_waypoints(FERRY_BUILDING, km, DEFAULT_LOOP_POINTS);
    assert_eq!(pts.len(), DEFAULT_LOOP_POINTS);

    let radius = km * 1000.0 / (2.0 * std::f64::consts::PI);
    for p in &pts {
        assert!((haversine_m(FERRY_BUILDING, *p) - radius).abs() < 0.5);
    }

    // first point due north, the rest clockwise in equal steps
    let b0 = initial_bearing_deg(FERRY_BUILDING, pts[0]);
    assert!(b0 < 0.01 || b0 > 359.99, "{b0}");
    let b1 = initial_bearing_deg(FERRY_BUILDING, pts[1]);
    assert!((b1 - 60.0).abs() < 0.01, "{b1}");

    // a hexagon inscribed in the circle is a bit shorter than the circle
    let mut ring = pts.clone();
    ring.push(pts[0]);
    let len = path_length_m(&ring);
    assert!(len < km * 1000.0 && len > km * 1000.0 * 0.9, "{len}");
}

fn loop_draft(km: Option<f64>) -> PlanDraft {
    let mut intent = Intent::default();
    intent.location.origin = Some(PlaceText {
        text: "Ferry Building".into(),
    });
    intent.preferences.route_type = Some(RouteType::Loop);
    intent.constraints.distance_km = km;
    PlanDraft {
        intent,
        endpoints: RouteEndpoints {
            origin: Endpoint {
                description: "Ferry Building".into(),
                place_id: Some("W123".into()),
                location: Some(FERRY_BUILDING),
            },
            destination: Endpoint::text("Ferry Building"),
        },
    }
}

fn finalizer() -> RouteFinalizer {
    RouteFinalizer::new(
        Arc::new(ScriptedRouting::default()),
        None,
        RouteConfig::default(),
        AmenityOptions::default(),
    )
}

#[test]
fn short_loops_use_the_minimum_offset() {
    let dest = finalizer().loop_destination(&loop_draft(Some(1.0))).unwrap();
    let at = dest.location.unwrap();
    assert!((haversine_m(FERRY_BUILDING, at) - 800.0).abs() < 1.0);
    assert!((initial_bearing_deg(FERRY_BUILDING, at) - 60.0).abs() < 0.1);
}

#[test]
fn loops_without_distance_keep_their_destination() {
    let f = finalizer();
    let draft = loop_draft(None);
    assert!(f.loop_destination(&draft).is_none());
    assert_eq!(f.adjusted_endpoints(&draft), draft.endpoints);
}

#[test]
fn authoritative_destination_is_not_replaced() {
    let mut draft = loop_draft(Some(5.0));
    draft.endpoints.destination = Endpoint {
        description: "Crissy Field".into(),
        place_id: Some("W9".into()),
        location: None,
    };
    assert!(finalizer().loop_destination(&draft).is_none());
}

#[test]
fn destination_equal_to_origin_becomes_a_loop() {
    let mut draft = loop_draft(Some(5.0));
    draft.intent.preferences.route_type = None;
    draft.intent.location.destination = Some(PlaceText {
        text: "Ferry Building".into(),
    });
    assert!(draft.intent.wants_loop());

    let dest = finalizer().loop_destination(&draft).unwrap();
    let d = haversine_m(FERRY_BUILDING, dest.location.unwrap());
    assert!((d - 3000.0).abs() < 1.0, "got {d}");
    assert_eq!(dest.description, "Route near Ferry Building");
}

#[test]
fn point_to_point_without_destination_still_loops() {
    let mut draft = loop_draft(Some(5.0));
    draft.intent.preferences.route_type = Some(RouteType::PointToPoint);
    draft.intent.location.destination = None;
    assert!(draft.intent.wants_loop());
    assert!(finalizer().loop_destination(&draft).is_some());
}

#[test]
fn distinct_destination_text_is_left_alone() {
    let mut draft = loop_draft(Some(5.0));
    draft.intent.preferences.route_type = None;
    draft.intent.location.destination = Some(PlaceText {
        text: "Crissy Field".into(),
    });
    draft.endpoints.destination = Endpoint::text("Crissy Field");
    assert!(!draft.intent.wants_loop());

    let f = finalizer();
    assert!(f.loop_destination(&draft).is_none());
    assert_eq!(
        f.adjusted_endpoints(&draft).destination.description,
        "Crissy Field"
    );
}
