//! Deterministic keyword pass over the user's raw text.
//!
//! Runs after the completion has been decoded and only fills fields the model
//! left unset. Safety tags are merged rather than replaced.

use std::sync::LazyLock;

use regex::Regex;

use crate::intent::schema::{
    Incline, Intent, RouteType, SAFETY_AVOID_CRIME, SAFETY_WELL_LIT,
};
use crate::normalize::{has_phrase, normalize_text};

const KM_PER_MILE: f64 = 1.609_344;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid regex {pattern}: {e}"))
}

static RE_CLOCK_MERIDIEM: LazyLock<Regex> =
    LazyLock::new(|| re(r"\b(\d{1,2})(?::(\d{2}))?\s*(am|pm)\b"));
static RE_TONIGHT_AT: LazyLock<Regex> =
    LazyLock::new(|| re(r"\btonight\s+(?:at\s+)?(\d{1,2})(?::(\d{2}))?\b"));
static RE_HHMM: LazyLock<Regex> = LazyLock::new(|| re(r"^(\d{1,2}):(\d{2})$"));
static RE_CLOCK_24: LazyLock<Regex> = LazyLock::new(|| re(r"\b(\d{1,2}):(\d{2})\b"));
static RE_DISTANCE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"\b(\d+(?:\.\d+)?)\s*(km|k|kms|kilometers?|kilometres?|mi|miles?)\b")
});

fn hhmm(hour: u32, minute: u32) -> Option<String> {
    (hour < 24 && minute < 60).then(|| format!("{hour:02}:{minute:02}"))
}

fn to_24h(hour: u32, pm: bool) -> u32 {
    match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    }
}

/// Normalise a time expression to `HH:MM`.
///
/// Accepts "21:00", "9:05", "9pm", "9:30 am", "tonight at 9" and a clock
/// time inside free text ("run at 21:00").
pub fn parse_time_of_day(raw: &str) -> Option<String> {
    let t = normalize_text(raw);

    if let Some(c) = RE_HHMM.captures(&t) {
        let h: u32 = c[1].parse().ok()?;
        let m: u32 = c[2].parse().ok()?;
        return hhmm(h, m);
    }
    if let Some(c) = RE_CLOCK_MERIDIEM.captures(&t) {
        let h: u32 = c[1].parse().ok()?;
        let m: u32 = c.get(2).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
        if !(1..=12).contains(&h) {
            return None;
        }
        return hhmm(to_24h(h, &c[3] == "pm"), m);
    }
    if let Some(c) = RE_TONIGHT_AT.captures(&t) {
        let h: u32 = c[1].parse().ok()?;
        let m: u32 = c.get(2).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
        let h = match h {
            12 => 0,
            1..=11 => h + 12,
            h => h,
        };
        return hhmm(h, m);
    }
    if let Some(c) = RE_CLOCK_24.captures(&t) {
        let h: u32 = c[1].parse().ok()?;
        let m: u32 = c[2].parse().ok()?;
        return hhmm(h, m);
    }
    None
}

/// Hours in [19, 24) or [0, 6) count as a night run.
pub fn is_night_time(hhmm: &str) -> bool {
    hhmm.split(':')
        .next()
        .and_then(|h| h.parse::<u32>().ok())
        .is_some_and(|h| h >= 19 || h < 6)
}

pub fn parse_distance_km(text: &str) -> Option<f64> {
    let t = normalize_text(text);
    let c = RE_DISTANCE.captures(&t)?;
    let value: f64 = c[1].parse().ok()?;
    let km = if c[2].starts_with('m') {
        value * KM_PER_MILE
    } else {
        value
    };
    (km.is_finite() && km > 0.0).then_some(km)
}

fn any_phrase(normalized: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| has_phrase(normalized, p))
}

const LOOP_WORDS: &[&str] = &["loop", "round trip", "circuit", "back to the start"];
const P2P_WORDS: &[&str] = &["point to point", "one way", "a to b"];
const SAFE_WORDS: &[&str] = &["safe", "safety", "safely", "secure"];
const LIT_WORDS: &[&str] = &["lit", "well lit", "well lighted", "lighting", "street lights"];
const NIGHT_WORDS: &[&str] = &["night", "tonight", "night run", "after dark", "late evening"];
const LOW_INCLINE: &[&str] = &["flat", "no hills", "easy grade", "gentle"];
const MEDIUM_INCLINE: &[&str] = &["rolling", "some hills", "moderate hills", "a few hills"];
const HIGH_INCLINE: &[&str] = &["hilly", "steep", "hills", "climb", "climbs", "challenging climbs"];
const SCENERY: &[(&str, &[&str])] = &[
    ("water_view", &["water", "waterfront", "bay", "ocean", "beach", "lake"]),
    ("bridge_view", &["bridge", "golden gate"]),
    ("park_view", &["park", "parks", "greenery", "trees"]),
    ("cityscape", &["skyline", "city view", "city views", "downtown views"]),
];

/// Fill unset intent fields from keywords in `text`.
pub fn apply_keyword_rules(mut intent: Intent, text: &str) -> Intent {
    let n = normalize_text(text);

    if intent.constraints.time_of_day.is_none() {
        intent.constraints.time_of_day = parse_time_of_day(text);
    }
    if intent.constraints.distance_km.is_none() {
        intent.constraints.distance_km = parse_distance_km(text);
    }

    if intent.preferences.route_type.is_none() {
        if any_phrase(&n, P2P_WORDS) {
            intent.preferences.route_type = Some(RouteType::PointToPoint);
        } else if any_phrase(&n, LOOP_WORDS) {
            intent.preferences.route_type = Some(RouteType::Loop);
        }
    }

    if any_phrase(&n, SAFE_WORDS) {
        intent.add_safety(SAFETY_AVOID_CRIME);
    }
    let night = intent
        .constraints
        .time_of_day
        .as_deref()
        .is_some_and(is_night_time)
        || any_phrase(&n, NIGHT_WORDS);
    if any_phrase(&n, LIT_WORDS) || night {
        intent.add_safety(SAFETY_WELL_LIT);
    }

    if intent.preferences.incline.is_none() {
        intent.preferences.incline = if any_phrase(&n, LOW_INCLINE) {
            Some(Incline::Low)
        } else if any_phrase(&n, MEDIUM_INCLINE) {
            Some(Incline::Medium)
        } else if any_phrase(&n, HIGH_INCLINE) {
            Some(Incline::High)
        } else {
            None
        };
    }

    if intent.preferences.scenery.is_none() {
        let found: Vec<String> = SCENERY
            .iter()
            .filter(|(_, words)| any_phrase(&n, words))
            .map(|(tag, _)| tag.to_string())
            .collect();
        if !found.is_empty() {
            intent.preferences.scenery = Some(found);
        }
    }

    intent
}
