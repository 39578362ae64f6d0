use std::sync::Arc;

use crate::capability::PlaceSearch;
use crate::model::{Endpoint, PlaceCandidate};
use crate::routing::geometry::LatLng;

/// Hard cap on candidates offered to the user.
pub const MAX_CANDIDATES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchBias {
    pub center: LatLng,
    pub radius_m: f64,
}

impl Default for SearchBias {
    fn default() -> Self {
        Self {
            center: LatLng::new(37.7749, -122.4194),
            radius_m: 20_000.0,
        }
    }
}

/// Result of resolving one endpoint description.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Nothing matched (or search failed): keep the user's text.
    Unresolved,
    /// Exactly one match, adopt it.
    Single(PlaceCandidate),
    /// Several matches; the user has to choose.
    Ambiguous(Vec<PlaceCandidate>),
    /// The endpoint already carries a place id.
    Authoritative,
}

/// Place-text resolver over the injected search capability.
///
/// Never fails: an empty query, a search error or zero matches all yield an
/// empty candidate list. No retries.
#[derive(Clone)]
pub struct CandidateResolver {
    places: Arc<dyn PlaceSearch>,
    bias: SearchBias,
    max_candidates: usize,
}

impl CandidateResolver {
    pub fn new(places: Arc<dyn PlaceSearch>, bias: SearchBias, max_candidates: usize) -> Self {
        Self {
            places,
            bias,
            max_candidates: max_candidates.clamp(1, MAX_CANDIDATES),
        }
    }

    pub async fn candidates(&self, query: &str) -> Vec<PlaceCandidate> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        match self
            .places
            .search(query, self.bias.center, self.bias.radius_m)
            .await
        {
            Ok(mut list) => {
                list.truncate(self.max_candidates);
                log::debug!("place search '{query}': {} candidate(s)", list.len());
                list
            }
            Err(e) => {
                log::warn!("Place search for '{query}' failed: {e}");
                Vec::new()
            }
        }
    }

    pub async fn resolve(&self, endpoint: &Endpoint) -> Resolution {
        if endpoint.is_authoritative() {
            return Resolution::Authoritative;
        }
        let mut list = self.candidates(&endpoint.description).await;
        match list.len() {
            0 => Resolution::Unresolved,
            1 => Resolution::Single(list.remove(0)),
            _ => Resolution::Ambiguous(list),
        }
    }
}
