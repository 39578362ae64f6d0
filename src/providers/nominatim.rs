use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::capability::PlaceSearch;
use crate::dialogue::resolver::MAX_CANDIDATES;
use crate::error::{PlannerError, Result};
use crate::model::PlaceCandidate;
use crate::providers::http::{send_json, trim_base};
use crate::routing::geometry::{LatLng, to_rad};

const METERS_PER_DEG_LAT: f64 = 111_320.0;

/// Place search against a Nominatim instance.
///
/// Place ids are Nominatim lookup ids (`N123`, `W456`, `R789`), so they can
/// be turned back into coordinates with [`NominatimPlaces::lookup`].
pub struct NominatimPlaces {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Place {
    osm_type: Option<String>,
    osm_id: Option<u64>,
    display_name: String,
    lat: String,
    lon: String,
}

impl Place {
    fn lookup_id(&self) -> Option<String> {
        let prefix = match self.osm_type.as_deref()? {
            "node" => 'N',
            "way" => 'W',
            "relation" => 'R',
            _ => return None,
        };
        Some(format!("{prefix}{}", self.osm_id?))
    }

    fn location(&self) -> Option<LatLng> {
        let p = LatLng::new(self.lat.parse().ok()?, self.lon.parse().ok()?);
        p.is_valid().then_some(p)
    }

    fn into_candidate(self) -> PlaceCandidate {
        PlaceCandidate {
            place_id: self.lookup_id(),
            location: self.location(),
            description: self.display_name,
        }
    }
}

/// `left,top,right,bottom` box around `center`.
pub fn viewbox(center: LatLng, radius_m: f64) -> String {
    let dlat = radius_m / METERS_PER_DEG_LAT;
    let dlng = radius_m / (METERS_PER_DEG_LAT * to_rad(center.lat).cos().max(0.01));
    format!(
        "{:.5},{:.5},{:.5},{:.5}",
        center.lng - dlng,
        center.lat + dlat,
        center.lng + dlng,
        center.lat - dlat
    )
}

impl NominatimPlaces {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
        }
    }

    /// Coordinates for a lookup id returned by [`PlaceSearch::search`].
    pub async fn lookup(&self, place_id: &str) -> Result<Option<LatLng>> {
        let req = self
            .client
            .get(format!("{}/lookup", self.base_url))
            .query(&[("osm_ids", place_id), ("format", "jsonv2")]);
        let places: Vec<Place> = send_json(req)
            .await
            .map_err(|e| PlannerError::DataSource(format!("place lookup: {e}")))?;
        Ok(places.first().and_then(Place::location))
    }
}

#[async_trait]
impl PlaceSearch for NominatimPlaces {
    async fn search(&self, query: &str, bias: LatLng, radius_m: f64) -> Result<Vec<PlaceCandidate>> {
        let limit = MAX_CANDIDATES.to_string();
        let vb = viewbox(bias, radius_m);
        let req = self.client.get(format!("{}/search", self.base_url)).query(&[
            ("q", query),
            ("format", "jsonv2"),
            ("limit", limit.as_str()),
            ("viewbox", vb.as_str()),
            ("bounded", "0"),
        ]);

        let places: Vec<Place> = send_json(req)
            .await
            .map_err(|e| PlannerError::DataSource(format!("place search: {e}")))?;
        Ok(places.into_iter().map(Place::into_candidate).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_search_rows() {
        let raw = r#"[{"place_id": 1, "osm_type": "way", "osm_id": 42,
                      "display_name": "Ferry Building, San Francisco",
                      "lat": "37.7955", "lon": "-122.3937"}]"#;
        let places: Vec<Place> = serde_json::from_str(raw).unwrap();
        let c = places.into_iter().next().unwrap().into_candidate();
        assert_eq!(c.place_id.as_deref(), Some("W42"));
        assert_eq!(c.location, Some(LatLng::new(37.7955, -122.3937)));
    }

    #[test]
    fn viewbox_is_centered() {
        let vb = viewbox(LatLng::new(0.0, 0.0), METERS_PER_DEG_LAT);
        assert_eq!(vb, "-1.00000,1.00000,1.00000,-1.00000");
    }
}
