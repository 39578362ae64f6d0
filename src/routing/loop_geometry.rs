//! Loop waypoint generation.
//!
//! A loop of length `L` is approximated by a circle of circumference `L`
//! centred on the origin; waypoints are placed on that circle at evenly
//! spaced compass bearings.

use std::f64::consts::PI;

use crate::routing::geometry::{LatLng, destination_point};

pub const DEFAULT_LOOP_POINTS: usize = 6;

/// Smallest loop radius (km). Keeps degenerate requests away from a
/// zero-length path.
pub const MIN_LOOP_RADIUS_KM: f64 = 0.05;

pub fn loop_radius_km(desired_distance_km: f64) -> f64 {
    let r = desired_distance_km / (2.0 * PI);
    if r.is_finite() {
        r.max(MIN_LOOP_RADIUS_KM)
    } else {
        MIN_LOOP_RADIUS_KM
    }
}

/// Bearing (degrees) of the `i`-th of `count` loop points.
pub fn loop_bearing_deg(i: usize, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    i as f64 * 360.0 / count as f64
}

/// `count` points around `origin` whose circle has circumference
/// `desired_distance_km` (radius floored at 50 m).
pub fn generate_loop_waypoints(
    origin: LatLng,
    desired_distance_km: f64,
    count: usize,
) -> Vec<LatLng> {
    let radius_m = loop_radius_km(desired_distance_km) * 1000.0;

    (0..count)
        .map(|i| destination_point(origin, radius_m, loop_bearing_deg(i, count)))
        .collect()
}
