//! San Francisco open-data (Socrata) incident and amenity datasets.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::capability::{AmenitySource, IncidentSource};
use crate::error::{PlannerError, Result};
use crate::model::{AmenityKind, AmenityPoint, IncidentPoint};
use crate::providers::http::{HttpError, send_json};
use crate::routing::geometry::LatLng;

pub struct SfGovData {
    client: Client,
    incidents_url: String,
    amenities_url: String,
    app_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawIncident {
    incident_id: Option<String>,
    incident_category: Option<String>,
    incident_datetime: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    latitude: Option<String>,
    longitude: Option<String>,
    human_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAmenity {
    objectid: Option<String>,
    name: Option<String>,
    location_name: Option<String>,
    location: Option<RawLocation>,
    latitude: Option<String>,
    longitude: Option<String>,
    address: Option<String>,
}

fn coord(lat: Option<&str>, lng: Option<&str>) -> Option<LatLng> {
    let p = LatLng::new(lat?.trim().parse().ok()?, lng?.trim().parse().ok()?);
    p.is_valid().then_some(p)
}

fn resource_type(kind: AmenityKind) -> &'static str {
    match kind {
        AmenityKind::Water => "drinking_water",
        AmenityKind::Restroom => "restroom",
    }
}

fn incidents_from_raw(raw: Vec<RawIncident>) -> Vec<IncidentPoint> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(i, r)| {
            let p = coord(r.latitude.as_deref(), r.longitude.as_deref())?;
            Some(IncidentPoint {
                id: r.incident_id.unwrap_or_else(|| format!("incident-{i}")),
                latitude: p.lat,
                longitude: p.lng,
                category: r.incident_category,
                occurred_at: r.incident_datetime,
            })
        })
        .collect()
}

fn amenities_from_raw(kind: AmenityKind, raw: Vec<RawAmenity>) -> Vec<AmenityPoint> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(i, r)| {
            let loc = r.location.as_ref();
            let p = coord(
                r.latitude
                    .as_deref()
                    .or(loc.and_then(|l| l.latitude.as_deref())),
                r.longitude
                    .as_deref()
                    .or(loc.and_then(|l| l.longitude.as_deref())),
            )?;
            let address = r
                .address
                .clone()
                .or_else(|| loc.and_then(|l| l.human_address.clone()));
            Some(AmenityPoint {
                id: r
                    .objectid
                    .unwrap_or_else(|| format!("{}-{i}", resource_type(kind))),
                latitude: p.lat,
                longitude: p.lng,
                name: r.name.or(r.location_name),
                address,
            })
        })
        .collect()
}

impl SfGovData {
    pub fn new(
        client: Client,
        incidents_url: &str,
        amenities_url: &str,
        app_token: Option<String>,
    ) -> Self {
        Self {
            client,
            incidents_url: incidents_url.to_string(),
            amenities_url: amenities_url.to_string(),
            app_token,
        }
    }

    /// GET with the app token; a 403 with a token is retried once without it.
    async fn fetch<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> std::result::Result<Vec<T>, HttpError> {
        let build = |with_token: bool| {
            let mut req = self.client.get(url).query(query);
            if with_token && let Some(token) = &self.app_token {
                req = req.header("X-App-Token", token);
            }
            req
        };

        let first = send_json(build(true)).await;
        match first {
            Err(HttpError::Status(StatusCode::FORBIDDEN)) if self.app_token.is_some() => {
                log::warn!("Open data API answered 403 with the app token, retrying without it");
                send_json(build(false)).await
            }
            other => other,
        }
    }
}

fn describe(e: &HttpError, on_forbidden: &str) -> String {
    match e.status() {
        Some(StatusCode::FORBIDDEN) => on_forbidden.to_string(),
        _ => e.to_string(),
    }
}

#[async_trait]
impl IncidentSource for SfGovData {
    async fn fetch_incidents(&self, limit: usize) -> Result<Vec<IncidentPoint>> {
        let query = [
            ("$limit", limit.to_string()),
            ("$order", "incident_datetime DESC".to_string()),
        ];
        let raw: Vec<RawIncident> = self.fetch(&self.incidents_url, &query).await.map_err(|e| {
            PlannerError::DataSource(format!(
                "Failed to fetch incident data: {}",
                describe(
                    &e,
                    "Access denied. Check whether the app token is valid and has not been revoked."
                )
            ))
        })?;
        Ok(incidents_from_raw(raw))
    }
}

#[async_trait]
impl AmenitySource for SfGovData {
    async fn fetch_amenities(&self, kind: AmenityKind, limit: usize) -> Result<Vec<AmenityPoint>> {
        let query = [
            ("resource_type", resource_type(kind).to_string()),
            ("$limit", limit.to_string()),
        ];
        let what = match kind {
            AmenityKind::Water => "water fountains",
            AmenityKind::Restroom => "restrooms",
        };
        let raw: Vec<RawAmenity> = self.fetch(&self.amenities_url, &query).await.map_err(|e| {
            PlannerError::DataSource(format!(
                "Failed to fetch {what}: {}",
                describe(
                    &e,
                    "Access denied. Confirm the app token has access to this dataset or remove it for public access."
                )
            ))
        })?;
        Ok(amenities_from_raw(kind, raw))
    }
}
