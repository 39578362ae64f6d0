mod common;

use common::*;
use ranno::model::IncidentPoint;
use ranno::routing::geometry::{Bounds, LatLng};
use ranno::routing::risk::{
    BOUNDS_UNAVAILABLE_MESSAGE, summarize_counts, summarize_route_risk,
};
use ranno::routing::RiskLevel;

fn box_around_ferry() -> Bounds {
    Bounds::new(37.790, -122.400, 37.800, -122.390)
}

/// `inside` incidents in the box and `outside` well away from it.
fn incidents(inside: usize, outside: usize) -> Vec<IncidentPoint> {
    let mut v: Vec<IncidentPoint> = (0..inside)
        .map(|i| incident(&format!("in-{i}"), FERRY_BUILDING))
        .collect();
    v.extend((0..outside).map(|i| incident(&format!("out-{i}"), LatLng::new(37.72, -122.47))));
    v
}

#[test]
fn density_tiers() {
    let b = Some(box_around_ferry());
    assert_eq!(summarize_route_risk(b, &incidents(1, 9)).level, RiskLevel::Low);
    assert_eq!(summarize_route_risk(b, &incidents(2, 8)).level, RiskLevel::Medium);
    assert_eq!(summarize_route_risk(b, &incidents(3, 7)).level, RiskLevel::High);
}

#[test]
fn tier_boundaries_fall_to_the_lower_level() {
    // exactly 25% and 12% are not above the thresholds
    assert_eq!(summarize_counts(25, 100).level, RiskLevel::Medium);
    assert_eq!(summarize_counts(12, 100).level, RiskLevel::Low);
    assert_eq!(summarize_counts(26, 100).level, RiskLevel::High);
}

#[test]
fn every_level_carries_its_message() {
    for (along, level) in [(1, RiskLevel::Low), (2, RiskLevel::Medium), (5, RiskLevel::High)] {
        let s = summarize_counts(along, 10);
        assert_eq!(s.level, level);
        assert_eq!(s.message, level.message());
        assert!(s.estimated);
    }
}

#[test]
fn missing_bounds_skip_estimation() {
    let s = summarize_route_risk(None, &incidents(5, 5));
    assert!(!s.estimated);
    assert_eq!(s.message, BOUNDS_UNAVAILABLE_MESSAGE);
    assert_eq!(s.incidents_sampled, 0);
    assert_eq!(s.incidents_along_route, 0);
    assert_eq!(s.level, RiskLevel::Low);
}

#[test]
fn incidents_on_the_edge_count() {
    let b = box_around_ferry();
    let edge = vec![incident("edge", LatLng::new(b.north, b.east))];
    assert_eq!(summarize_route_risk(Some(b), &edge).incidents_along_route, 1);
}

#[test]
fn more_incidents_never_lower_the_level() {
    let mut prev = RiskLevel::Low;
    for along in 0..=40 {
        let level = summarize_counts(along, 40).level;
        assert!(level >= prev, "{along}/40 dropped to {level:?}");
        prev = level;
    }
}
