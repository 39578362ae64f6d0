use serde::{Deserialize, Serialize};

use crate::routing::geometry::LatLng;

/// A resolved origin or destination.
///
/// An endpoint carrying a `place_id` is authoritative and is never re-resolved.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Endpoint {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LatLng>,
}

impl Endpoint {
    pub fn text(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            place_id: None,
            location: None,
        }
    }

    pub fn is_authoritative(&self) -> bool {
        self.place_id.is_some()
    }
}

impl From<PlaceCandidate> for Endpoint {
    fn from(c: PlaceCandidate) -> Self {
        Self {
            description: c.description,
            place_id: c.place_id,
            location: c.location,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointSide {
    Origin,
    Destination,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteEndpoints {
    pub origin: Endpoint,
    pub destination: Endpoint,
}

impl RouteEndpoints {
    /// Last write wins, keyed by side.
    pub fn with(&self, side: EndpointSide, endpoint: Endpoint) -> Self {
        match side {
            EndpointSide::Origin => Self {
                origin: endpoint,
                destination: self.destination.clone(),
            },
            EndpointSide::Destination => Self {
                origin: self.origin.clone(),
                destination: endpoint,
            },
        }
    }
}

/// A disambiguation option returned by place search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub description: String,
    pub place_id: Option<String>,
    pub location: Option<LatLng>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
}

/// Append-only conversation log.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversationLog {
    messages: Vec<ConversationMessage>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&mut self, content: impl Into<String>) {
        self.push(Role::User, content.into());
    }

    pub fn assistant(&mut self, content: impl Into<String>) {
        self.push(Role::Assistant, content.into());
    }

    fn push(&mut self, role: Role, content: String) {
        log::debug!("conversation[{:?}]: {}", role, content);
        self.messages.push(ConversationMessage { role, content });
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ConversationMessage> {
        self.messages.last()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentPoint {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub category: Option<String>,
    pub occurred_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmenityKind {
    Water,
    Restroom,
}

impl AmenityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AmenityKind::Water => "water",
            AmenityKind::Restroom => "restroom",
        }
    }

    pub fn default_name(self) -> &'static str {
        match self {
            AmenityKind::Water => "Water fountain",
            AmenityKind::Restroom => "Restroom",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "water" | "drinking_water" => Some(Self::Water),
            "restroom" | "restrooms" => Some(Self::Restroom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmenityPoint {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub name: Option<String>,
    pub address: Option<String>,
}

/// Nearest amenity of a kind to the route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmenityStop {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
    pub distance_meters: f64,
}

/// A bulk-fetched dataset plus the error that degraded it, if any.
#[derive(Debug, Clone)]
pub struct DataLayer<T> {
    pub points: Vec<T>,
    pub error: Option<String>,
}

impl<T> Default for DataLayer<T> {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            error: None,
        }
    }
}

impl<T> DataLayer<T> {
    pub fn loaded(points: Vec<T>) -> Self {
        Self {
            points,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            points: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DataLayers {
    pub incidents: DataLayer<IncidentPoint>,
    pub water: DataLayer<AmenityPoint>,
    pub restrooms: DataLayer<AmenityPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_update_is_keyed_by_side() {
        let eps = RouteEndpoints {
            origin: Endpoint::text("A"),
            destination: Endpoint::text("B"),
        };
        let next = eps.with(EndpointSide::Destination, Endpoint::text("C"));
        assert_eq!(next.origin.description, "A");
        assert_eq!(next.destination.description, "C");
        // original untouched
        assert_eq!(eps.destination.description, "B");
    }

    #[test]
    fn log_is_append_only() {
        let mut log = ConversationLog::new();
        log.assistant("hello");
        log.user("hi");
        assert_eq!(log.len(), 2);
        assert_eq!(log.messages()[0].role, Role::Assistant);
        assert_eq!(log.last().map(|m| m.content.as_str()), Some("hi"));
    }

    #[test]
    fn amenity_kind_parse_is_permissive() {
        assert_eq!(AmenityKind::parse(" Drinking_Water "), Some(AmenityKind::Water));
        assert_eq!(AmenityKind::parse("restrooms"), Some(AmenityKind::Restroom));
        assert_eq!(AmenityKind::parse("bench"), None);
    }
}
