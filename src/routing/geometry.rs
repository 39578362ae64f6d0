use serde::{Deserialize, Serialize};

/// Mean Earth radius used by every spherical helper (meters).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Route bounding box (inclusive on every side).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// Smallest box containing all points; `None` for an empty path.
    pub fn from_points(points: &[LatLng]) -> Option<Self> {
        let first = points.first()?;
        let mut b = Bounds::new(first.lat, first.lng, first.lat, first.lng);
        for p in &points[1..] {
            b.south = b.south.min(p.lat);
            b.north = b.north.max(p.lat);
            b.west = b.west.min(p.lng);
            b.east = b.east.max(p.lng);
        }
        Some(b)
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.south && lat <= self.north && lng >= self.west && lng <= self.east
    }
}

pub fn to_rad(deg: f64) -> f64 {
    deg.to_radians()
}

pub fn to_deg(rad: f64) -> f64 {
    rad.to_degrees()
}

/// Great-circle distance in meters (haversine).
pub fn haversine_m(a: LatLng, b: LatLng) -> f64 {
    let phi1 = to_rad(a.lat);
    let phi2 = to_rad(b.lat);
    let dphi = to_rad(b.lat - a.lat);
    let dlambda = to_rad(b.lng - a.lng);

    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().clamp(0.0, 1.0).asin()
}

/// Initial compass bearing from `a` to `b`, degrees in [0, 360).
pub fn initial_bearing_deg(a: LatLng, b: LatLng) -> f64 {
    let phi1 = to_rad(a.lat);
    let phi2 = to_rad(b.lat);
    let dlambda = to_rad(b.lng - a.lng);

    let y = dlambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos();
    (to_deg(y.atan2(x)) + 360.0) % 360.0
}

/// Point reached by travelling `distance_m` from `origin` along `bearing_deg`
/// on a sphere (standard destination-point formula).
pub fn destination_point(origin: LatLng, distance_m: f64, bearing_deg: f64) -> LatLng {
    let delta = distance_m / EARTH_RADIUS_M;
    let theta = to_rad(bearing_deg);
    let phi1 = to_rad(origin.lat);
    let lambda1 = to_rad(origin.lng);

    let sin_phi2 = phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos();
    let phi2 = sin_phi2.clamp(-1.0, 1.0).asin();
    let y = theta.sin() * delta.sin() * phi1.cos();
    let x = delta.cos() - phi1.sin() * sin_phi2;
    let lambda2 = lambda1 + y.atan2(x);

    // normalise longitude to [-180, 180)
    let lng = (to_deg(lambda2) + 540.0) % 360.0 - 180.0;
    LatLng::new(to_deg(phi2), lng)
}

/// Total great-circle length of a polyline in meters.
pub fn path_length_m(path: &[LatLng]) -> f64 {
    path.windows(2).map(|w| haversine_m(w[0], w[1])).sum()
}

/// Every `stride`-th point of a path, always keeping the last one.
pub fn sample_path(path: &[LatLng], max_points: usize) -> Vec<LatLng> {
    if max_points == 0 || path.len() <= max_points {
        return path.to_vec();
    }
    let stride = path.len().div_ceil(max_points);
    let mut out: Vec<LatLng> = path.iter().step_by(stride).copied().collect();
    if let Some(last) = path.last()
        && out.last() != Some(last)
    {
        out.push(*last);
    }
    out
}
