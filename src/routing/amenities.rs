use std::cmp::Ordering;

use crate::model::{AmenityKind, AmenityPoint, AmenityStop};
use crate::routing::geometry::{LatLng, haversine_m, sample_path};

/// Path points considered when measuring amenity distance.
pub const MAX_PATH_SAMPLES: usize = 256;

#[derive(Debug, Clone, Copy)]
pub struct AmenityOptions {
    /// Inclusion window around the route (meters).
    pub max_distance_m: f64,
    pub max_stops: usize,
}

impl Default for AmenityOptions {
    fn default() -> Self {
        Self {
            max_distance_m: 500.0,
            max_stops: 3,
        }
    }
}

fn distance_to_path(p: LatLng, samples: &[LatLng]) -> Option<f64> {
    samples
        .iter()
        .map(|s| haversine_m(p, *s))
        .min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
}

/// Nearest amenities of one kind within `opts.max_distance_m` of the path,
/// closest first. Ties are broken by name then coordinates so the output is
/// stable for identical inputs.
pub fn nearest_amenities(
    path: &[LatLng],
    amenities: &[AmenityPoint],
    kind: AmenityKind,
    opts: AmenityOptions,
) -> Vec<AmenityStop> {
    if path.is_empty() || amenities.is_empty() || opts.max_stops == 0 {
        return Vec::new();
    }

    let samples = sample_path(path, MAX_PATH_SAMPLES);

    let mut stops: Vec<AmenityStop> = amenities
        .iter()
        .filter_map(|a| {
            let loc = LatLng::new(a.latitude, a.longitude);
            if !loc.is_valid() {
                return None;
            }
            let d = distance_to_path(loc, &samples)?;
            if d > opts.max_distance_m {
                return None;
            }
            Some(AmenityStop {
                lat: a.latitude,
                lng: a.longitude,
                name: a
                    .name
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .unwrap_or(kind.default_name())
                    .to_string(),
                distance_meters: d,
            })
        })
        .collect();

    stops.sort_by(|a, b| {
        a.distance_meters
            .partial_cmp(&b.distance_meters)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.lat.partial_cmp(&b.lat).unwrap_or(Ordering::Equal))
            .then_with(|| a.lng.partial_cmp(&b.lng).unwrap_or(Ordering::Equal))
    });
    stops.truncate(opts.max_stops);
    stops
}
