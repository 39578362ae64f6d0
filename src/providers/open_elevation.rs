use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::capability::ElevationService;
use crate::error::{PlannerError, Result};
use crate::providers::http::{send_json, trim_base};
use crate::routing::geometry::{LatLng, sample_path};
use crate::routing::slope::ElevationSample;

pub struct OpenElevation {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct LookupRequest {
    locations: Vec<Location>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Location {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    results: Vec<LookupResult>,
}

#[derive(Debug, Deserialize)]
struct LookupResult {
    latitude: Option<f64>,
    longitude: Option<f64>,
    elevation: f64,
}

impl OpenElevation {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
        }
    }
}

#[async_trait]
impl ElevationService for OpenElevation {
    async fn sample_elevation(&self, path: &[LatLng], samples: usize) -> Result<Vec<ElevationSample>> {
        let locations = sample_path(path, samples)
            .into_iter()
            .map(|p| Location {
                latitude: p.lat,
                longitude: p.lng,
            })
            .collect();
        let req = self
            .client
            .post(format!("{}/api/v1/lookup", self.base_url))
            .json(&LookupRequest { locations });

        let resp: LookupResponse = send_json(req)
            .await
            .map_err(|e| PlannerError::DataSource(format!("elevation: {e}")))?;

        Ok(resp
            .results
            .into_iter()
            .map(|r| ElevationSample {
                location: r.latitude.zip(r.longitude).map(|(lat, lng)| LatLng::new(lat, lng)),
                elevation: r.elevation,
            })
            .collect())
    }
}
