//! HTTP adapters for the capability traits. Only the CLI wires these in.

pub mod http;
pub mod nominatim;
pub mod ollama;
pub mod open_elevation;
pub mod osrm;
pub mod sfgov;

use std::sync::Arc;

use anyhow::Result;

use crate::capability::{AmenitySource, Capabilities, ElevationService, IncidentSource};
use crate::config::PlannerConfig;

use nominatim::NominatimPlaces;
use ollama::OllamaCompletion;
use open_elevation::OpenElevation;
use osrm::OsrmRouting;
use sfgov::SfGovData;

pub fn sfgov_data(cfg: &PlannerConfig) -> Result<SfGovData> {
    let p = &cfg.providers;
    Ok(SfGovData::new(
        http::build_client(p)?,
        &p.incidents_url,
        &p.amenities_url,
        p.resolved_app_token(),
    ))
}

/// Network-backed capabilities. `data` overrides the open-data source
/// (e.g. with the local cache).
pub fn network_capabilities(
    cfg: &PlannerConfig,
    data: Option<(Arc<dyn IncidentSource>, Arc<dyn AmenitySource>)>,
) -> Result<Capabilities> {
    let p = &cfg.providers;
    let client = http::build_client(p)?;

    let places = Arc::new(NominatimPlaces::new(client.clone(), &p.nominatim_url));
    let routing = OsrmRouting::new(
        client.clone(),
        &p.osrm_url,
        places.clone(),
        cfg.places.bias().center,
        cfg.places.radius_m,
    );
    let elevation = p.elevation_url.as_deref().map(|url| {
        Arc::new(OpenElevation::new(client.clone(), url)) as Arc<dyn ElevationService>
    });

    let (incidents, amenities) = match data {
        Some(pair) => pair,
        None => {
            let sf = Arc::new(sfgov_data(cfg)?);
            (
                sf.clone() as Arc<dyn IncidentSource>,
                sf as Arc<dyn AmenitySource>,
            )
        }
    };

    Ok(Capabilities {
        completion: Arc::new(OllamaCompletion::new(
            client,
            &p.ollama_url,
            &p.ollama_model,
        )),
        places,
        routing: Arc::new(routing),
        elevation,
        incidents,
        amenities,
    })
}
