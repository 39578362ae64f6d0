//! Structured interpretation of a running request.
//!
//! Every field is optional: absence means "unconstrained", never "rejected".

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteType {
    Loop,
    PointToPoint,
}

impl FromStr for RouteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "loop" | "round_trip" | "circular" => Ok(RouteType::Loop),
            "point_to_point" | "one_way" | "a_to_b" => Ok(RouteType::PointToPoint),
            other => Err(format!("unknown route type '{other}'")),
        }
    }
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RouteType::Loop => "loop",
            RouteType::PointToPoint => "point_to_point",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Incline {
    Low,
    Medium,
    High,
}

impl FromStr for Incline {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" | "flat" | "gentle" => Ok(Incline::Low),
            "medium" | "moderate" | "rolling" => Ok(Incline::Medium),
            "high" | "hilly" | "steep" => Ok(Incline::High),
            other => Err(format!("unknown incline '{other}'")),
        }
    }
}

impl fmt::Display for Incline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Incline::Low => "low",
            Incline::Medium => "medium",
            Incline::High => "high",
        })
    }
}

/// Deserialize an optional enum from a string, dropping values it does not know.
fn lenient_enum<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = String>,
{
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw.and_then(|s| match s.parse::<T>() {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("Ignoring intent value: {e}");
            None
        }
    }))
}

/// Accept a single string where a list is expected.
fn lenient_list<'de, D>(d: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    let raw: Option<OneOrMany> = Option::deserialize(d)?;
    Ok(raw.map(|v| match v {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    }))
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PlaceText {
    pub text: String,
}

impl<'de> Deserialize<'de> for PlaceText {
    /// Accepts `{"text": "..."}` or a bare string.
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bare(String),
            Object { text: String },
        }

        Ok(match Raw::deserialize(d)? {
            Raw::Bare(text) | Raw::Object { text } => PlaceText { text },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<PlaceText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<PlaceText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub points_of_interest: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(alias = "duration_min", skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    #[serde(
        deserialize_with = "lenient_enum",
        skip_serializing_if = "Option::is_none"
    )]
    pub route_type: Option<RouteType>,
    #[serde(
        deserialize_with = "lenient_enum",
        skip_serializing_if = "Option::is_none"
    )]
    pub incline: Option<Incline>,
    #[serde(deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub surface: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub safety: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub environment: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub scenery: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vibe: Option<String>,
    #[serde(deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub amenities: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Intent {
    pub location: Location,
    pub constraints: Constraints,
    pub preferences: Preferences,
}

pub const SAFETY_AVOID_CRIME: &str = "avoid_high_crime_areas";
pub const SAFETY_WELL_LIT: &str = "prefer_well_lit_streets";
pub const ENV_LOW_TRAFFIC: &str = "prefer_low_traffic";
pub const AMENITY_WATER: &str = "has_water_fountains";
pub const AMENITY_RESTROOMS: &str = "has_restrooms";

fn non_empty(s: &Option<PlaceText>) -> Option<&str> {
    s.as_ref()
        .map(|p| p.text.trim())
        .filter(|t| !t.is_empty())
}

impl Intent {
    pub fn origin_text(&self) -> Option<&str> {
        non_empty(&self.location.origin)
    }

    pub fn destination_text(&self) -> Option<&str> {
        non_empty(&self.location.destination)
    }

    pub fn context(&self) -> Option<&str> {
        self.location
            .context
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// One place mentioned and no destination: the request is a loop.
    pub fn is_loop_like(&self) -> bool {
        let has_origin = self.origin_text().is_some() || self.context().is_some();
        has_origin && self.destination_text().is_none()
    }

    /// Loop intents, or intents whose destination is unset or equal to the origin.
    pub fn wants_loop(&self) -> bool {
        if self.preferences.route_type == Some(RouteType::Loop) {
            return true;
        }
        match (self.destination_text(), self.origin_text()) {
            (None, _) => true,
            (Some(d), Some(o)) => d == o,
            (Some(_), None) => false,
        }
    }

    pub fn has_safety(&self, tag: &str) -> bool {
        contains(&self.preferences.safety, tag)
    }

    pub fn has_environment(&self, tag: &str) -> bool {
        contains(&self.preferences.environment, tag)
    }

    pub fn has_amenity(&self, tag: &str) -> bool {
        contains(&self.preferences.amenities, tag)
    }

    /// Add a safety tag once, keeping existing order.
    pub fn add_safety(&mut self, tag: &str) {
        let list = self.preferences.safety.get_or_insert_with(Vec::new);
        if !list.iter().any(|t| t == tag) {
            list.push(tag.to_string());
        }
    }

    /// Normalise a freshly decoded intent: trims text, drops non-positive or
    /// non-finite numbers and time strings that are not `HH:MM`.
    pub fn sanitized(mut self) -> Self {
        for p in [&mut self.location.origin, &mut self.location.destination] {
            let text = p.as_ref().map(|pt| pt.text.trim().to_string());
            *p = text.filter(|t| !t.is_empty()).map(|text| PlaceText { text });
        }
        if self.context().is_none() {
            self.location.context = None;
        }

        let c = &mut self.constraints;
        c.distance_km = c.distance_km.filter(|d| d.is_finite() && *d > 0.0);
        c.duration_minutes = c.duration_minutes.filter(|d| d.is_finite() && *d > 0.0);
        c.time_of_day = c
            .time_of_day
            .take()
            .and_then(|t| crate::intent::rules::parse_time_of_day(&t));

        if let Some(v) = &self.preferences.vibe
            && v.trim().is_empty()
        {
            self.preferences.vibe = None;
        }
        self
    }

    /// Normalisation run once per new intent, before any question is asked:
    /// a single-location request becomes a loop and loses its destination.
    pub fn normalized_for_planning(mut self) -> Self {
        if self.is_loop_like() {
            if self.preferences.route_type.is_none() {
                self.preferences.route_type = Some(RouteType::Loop);
            }
            self.location.destination = None;
        }
        self
    }

    pub fn summary_line(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(o) = self.origin_text() {
            parts.push(format!("Origin: {o}"));
        }
        if let Some(d) = self.destination_text() {
            parts.push(format!("Destination: {d}"));
        }
        if let Some(km) = self.constraints.distance_km {
            parts.push(format!("Target distance: {km} km"));
        }
        if let Some(s) = &self.preferences.safety
            && !s.is_empty()
        {
            parts.push(format!("Safety preferences: {}", s.join(", ")));
        }

        if parts.is_empty() {
            "Alright, let me interpret your running request.".to_string()
        } else {
            format!("Understood. Here is what I captured: {}.", parts.join("; "))
        }
    }
}

fn contains(list: &Option<Vec<String>>, tag: &str) -> bool {
    list.as_ref().is_some_and(|l| l.iter().any(|t| t == tag))
}
