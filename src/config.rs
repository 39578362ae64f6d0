//! TOML configuration.
//!
//! Every key is optional; a missing file means all defaults.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::capability::TravelMode;
use crate::dialogue::resolver::{MAX_CANDIDATES, SearchBias};
use crate::error::PlannerError;
use crate::routing::amenities::AmenityOptions;
use crate::routing::geometry::LatLng;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Stop asking after this many answers. Absent means no limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_follow_up: Option<usize>,
    pub default_origin: String,
    pub default_destination: String,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            max_follow_up: None,
            default_origin: "Ferry Building, San Francisco, CA".into(),
            default_destination: "Crissy Field, San Francisco, CA".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacesConfig {
    pub bias_lat: f64,
    pub bias_lng: f64,
    pub radius_m: f64,
    pub max_candidates: usize,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        let bias = SearchBias::default();
        Self {
            bias_lat: bias.center.lat,
            bias_lng: bias.center.lng,
            radius_m: bias.radius_m,
            max_candidates: MAX_CANDIDATES,
        }
    }
}

impl PlacesConfig {
    pub fn bias(&self) -> SearchBias {
        SearchBias {
            center: LatLng::new(self.bias_lat, self.bias_lng),
            radius_m: self.radius_m,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Travel mode used for point-to-point requests.
    pub point_to_point_mode: String,
    pub loop_offset_factor: f64,
    pub loop_min_offset_m: f64,
    pub loop_bearing_deg: f64,
    pub walking_pace_min_per_km: f64,
    pub running_pace_min_per_km: f64,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            point_to_point_mode: "driving".into(),
            loop_offset_factor: 0.6,
            loop_min_offset_m: 800.0,
            loop_bearing_deg: 60.0,
            walking_pace_min_per_km: 10.0,
            running_pace_min_per_km: 6.0,
        }
    }
}

impl RouteConfig {
    pub fn point_to_point_travel_mode(&self) -> Option<TravelMode> {
        TravelMode::parse(&self.point_to_point_mode)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmenitiesConfig {
    pub max_distance_m: f64,
    pub max_stops: usize,
    pub limit: usize,
}

impl Default for AmenitiesConfig {
    fn default() -> Self {
        let opts = AmenityOptions::default();
        Self {
            max_distance_m: opts.max_distance_m,
            max_stops: opts.max_stops,
            limit: 500,
        }
    }
}

impl AmenitiesConfig {
    pub fn options(&self) -> AmenityOptions {
        AmenityOptions {
            max_distance_m: self.max_distance_m,
            max_stops: self.max_stops,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncidentsConfig {
    pub limit: usize,
}

impl Default for IncidentsConfig {
    fn default() -> Self {
        Self { limit: 1000 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub ollama_url: String,
    pub ollama_model: String,
    pub nominatim_url: String,
    pub osrm_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation_url: Option<String>,
    pub incidents_url: String,
    pub amenities_url: String,
    /// Open-data app token. `SFGOV_APP_TOKEN` is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_token: Option<String>,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".into(),
            ollama_model: "llama3.2".into(),
            nominatim_url: "https://nominatim.openstreetmap.org".into(),
            osrm_url: "https://router.project-osrm.org".into(),
            elevation_url: Some("https://api.open-elevation.com".into()),
            incidents_url: "https://data.sfgov.org/resource/wg3w-h783.json".into(),
            amenities_url: "https://data.sfgov.org/resource/wfq4-upmv.json".into(),
            app_token: None,
            user_agent: concat!("ranno/", env!("CARGO_PKG_VERSION")).into(),
            timeout_secs: 30,
        }
    }
}

impl ProvidersConfig {
    pub fn resolved_app_token(&self) -> Option<String> {
        self.app_token
            .clone()
            .or_else(|| std::env::var("SFGOV_APP_TOKEN").ok())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub dialogue: DialogueConfig,
    pub places: PlacesConfig,
    pub route: RouteConfig,
    pub amenities: AmenitiesConfig,
    pub incidents: IncidentsConfig,
    pub providers: ProvidersConfig,
}

impl PlannerConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: PlannerConfig = toml::from_str(s).context("Invalid TOML configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load `path`, or defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Unable to read config: {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("Config file: {}", path.display()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Unable to serialize configuration")
    }

    pub fn validate(&self) -> std::result::Result<(), PlannerError> {
        let bad = |msg: String| Err(PlannerError::Config(msg));
        let r = &self.route;

        if !(r.walking_pace_min_per_km > 0.0 && r.running_pace_min_per_km > 0.0) {
            return bad("route paces must be > 0".into());
        }
        if !(r.loop_offset_factor > 0.0 && r.loop_min_offset_m >= 0.0) {
            return bad("loop offset factor must be > 0 and minimum offset >= 0".into());
        }
        if r.point_to_point_travel_mode().is_none() {
            return bad(format!("unknown travel mode '{}'", r.point_to_point_mode));
        }
        if !(self.amenities.max_distance_m > 0.0) {
            return bad("amenities.max_distance_m must be > 0".into());
        }
        if !(1..=MAX_CANDIDATES).contains(&self.places.max_candidates) {
            return bad(format!("places.max_candidates must be in 1..={MAX_CANDIDATES}"));
        }
        if !LatLng::new(self.places.bias_lat, self.places.bias_lng).is_valid() {
            return bad("places bias coordinates are out of range".into());
        }
        Ok(())
    }
}
