pub mod amenities;
pub mod finalizer;
pub mod geometry;
pub mod loop_geometry;
pub mod risk;
pub mod slope;

pub use finalizer::{GeneratedRoute, RouteFinalizer, RoutePlan, RouteSummary};
pub use geometry::{Bounds, LatLng};
pub use risk::{RiskLevel, RouteRiskSummary};
