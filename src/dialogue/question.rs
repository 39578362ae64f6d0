//! Follow-up question descriptors and the reducer that applies answers.
//!
//! Questions are plain data tagged by [`QuestionId`]; applying an answer is a
//! pure function of the current draft, so every update can be tested alone.

use std::fmt;

use serde::Serialize;

use crate::intent::schema::{Incline, Intent, RouteType};
use crate::model::{Endpoint, EndpointSide, PlaceCandidate, RouteEndpoints};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionId {
    ChooseOrigin,
    ChooseDestination,
    RouteType,
    Environment,
    Safety,
    Incline,
    Surface,
    Scenery,
    Vibe,
    Amenities,
}

impl QuestionId {
    /// Preference questions in the order they are asked.
    pub const PREFERENCES: [QuestionId; 8] = [
        QuestionId::RouteType,
        QuestionId::Environment,
        QuestionId::Safety,
        QuestionId::Incline,
        QuestionId::Surface,
        QuestionId::Scenery,
        QuestionId::Vibe,
        QuestionId::Amenities,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionId::ChooseOrigin => "choose_origin",
            QuestionId::ChooseDestination => "choose_destination",
            QuestionId::RouteType => "route_type",
            QuestionId::Environment => "environment",
            QuestionId::Safety => "safety",
            QuestionId::Incline => "incline",
            QuestionId::Surface => "surface",
            QuestionId::Scenery => "scenery",
            QuestionId::Vibe => "vibe",
            QuestionId::Amenities => "amenities",
        }
    }

    pub fn is_place(self) -> bool {
        matches!(self, QuestionId::ChooseOrigin | QuestionId::ChooseDestination)
    }

    /// True when `intent` already answers this preference.
    pub fn is_answered_by(self, intent: &Intent) -> bool {
        let p = &intent.preferences;
        match self {
            QuestionId::ChooseOrigin | QuestionId::ChooseDestination => false,
            QuestionId::RouteType => p.route_type.is_some(),
            QuestionId::Environment => p.environment.is_some(),
            QuestionId::Safety => p.safety.is_some(),
            QuestionId::Incline => p.incline.is_some(),
            QuestionId::Surface => p.surface.is_some(),
            QuestionId::Scenery => p.scenery.is_some(),
            QuestionId::Vibe => p.vibe.is_some(),
            QuestionId::Amenities => p.amenities.is_some(),
        }
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionOption {
    pub id: String,
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate: Option<PlaceCandidate>,
}

impl QuestionOption {
    fn preset(id: &str, label: &str, value: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            value: value.to_string(),
            candidate: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FollowUpQuestion {
    pub id: QuestionId,
    pub prompt: String,
    pub options: Vec<QuestionOption>,
    pub allow_skip: bool,
}

impl FollowUpQuestion {
    pub fn option(&self, option_id: &str) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.id == option_id)
    }
}

/// Build the question for an unset preference field.
///
/// Returns `None` for place questions, which are built from candidates.
pub fn preference_question(id: QuestionId) -> Option<FollowUpQuestion> {
    let (prompt, options): (&str, &[(&str, &str, &str)]) = match id {
        QuestionId::RouteType => (
            "What type of route do you prefer?",
            &[
                ("loop", "Loop", "loop"),
                ("point_to_point", "Point to point", "point_to_point"),
            ],
        ),
        QuestionId::Environment => (
            "What environment do you prefer?",
            &[
                ("prefer_shaded_paths", "Shaded paths", "prefer_shaded_paths"),
                ("prefer_low_traffic", "Quieter streets", "prefer_low_traffic"),
                ("avoid_heavy_traffic", "Avoid heavy traffic", "avoid_heavy_traffic"),
            ],
        ),
        QuestionId::Safety => (
            "Any additional safety preferences?",
            &[
                ("avoid_high_crime_areas", "Avoid higher-risk areas", "avoid_high_crime_areas"),
                ("prefer_well_lit_streets", "Prefer well-lit streets", "prefer_well_lit_streets"),
            ],
        ),
        QuestionId::Incline => (
            "How much incline are you looking for?",
            &[
                ("incline_low", "Keep it flat", "low"),
                ("incline_medium", "Moderate hills", "medium"),
                ("incline_high", "Challenging climbs", "high"),
            ],
        ),
        QuestionId::Surface => (
            "Preferred surface?",
            &[
                ("surface_paved", "Paved", "paved"),
                ("surface_trail", "Trail", "trail"),
                ("surface_track", "Track", "track"),
            ],
        ),
        QuestionId::Scenery => (
            "Any scenery you want to prioritize?",
            &[
                ("scenery_water", "Water views", "water_view"),
                ("scenery_bridge", "Bridge views", "bridge_view"),
                ("scenery_park", "Green parks", "park_view"),
                ("scenery_city", "City skyline", "cityscape"),
            ],
        ),
        QuestionId::Vibe => (
            "Do you prefer a specific vibe?",
            &[
                ("vibe_quiet", "Quiet and calm", "quiet"),
                ("vibe_lively", "Energetic and lively", "lively"),
            ],
        ),
        QuestionId::Amenities => (
            "Need any specific amenities along the route?",
            &[
                ("amenities_restrooms", "Restrooms", "has_restrooms"),
                ("amenities_water", "Water fountains", "has_water_fountains"),
            ],
        ),
        QuestionId::ChooseOrigin | QuestionId::ChooseDestination => return None,
    };

    Some(FollowUpQuestion {
        id,
        prompt: prompt.to_string(),
        options: options
            .iter()
            .map(|(oid, label, value)| QuestionOption::preset(oid, label, value))
            .collect(),
        allow_skip: true,
    })
}

/// One question per preference field the intent leaves unset, in fixed order.
pub fn preference_questions(intent: &Intent) -> Vec<FollowUpQuestion> {
    QuestionId::PREFERENCES
        .iter()
        .filter(|id| !id.is_answered_by(intent))
        .filter_map(|id| preference_question(*id))
        .collect()
}

/// A non-skippable "which place did you mean" question.
pub fn place_question(
    side: EndpointSide,
    description: &str,
    candidates: Vec<PlaceCandidate>,
) -> FollowUpQuestion {
    let (id, noun) = match side {
        EndpointSide::Origin => (QuestionId::ChooseOrigin, "origin"),
        EndpointSide::Destination => (QuestionId::ChooseDestination, "destination"),
    };
    FollowUpQuestion {
        id,
        prompt: format!("Please pick the {noun} \"{description}\""),
        options: candidates
            .into_iter()
            .enumerate()
            .map(|(i, c)| QuestionOption {
                id: format!("{noun}_{i}"),
                label: c.description.clone(),
                value: c.description.clone(),
                candidate: Some(c),
            })
            .collect(),
        allow_skip: false,
    }
}

/// Assistant line announcing an ambiguous place.
pub fn ambiguity_message(side: EndpointSide, description: &str) -> String {
    let what = match side {
        EndpointSide::Origin => "a starting point",
        EndpointSide::Destination => "a destination",
    };
    format!("I found several places related to \"{description}\". Please choose {what}:")
}

/// What a planning cycle has accumulated so far.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PlanDraft {
    pub intent: Intent,
    pub endpoints: RouteEndpoints,
}

/// Apply one answer to a draft. `None` is a skip and leaves the draft as is.
///
/// Place questions replace the endpoint on their side. Preference questions
/// write the chosen value, as a single-element list for list fields. Values
/// that do not parse for enum fields leave the draft unchanged.
pub fn reduce(draft: &PlanDraft, id: QuestionId, selected: Option<&QuestionOption>) -> PlanDraft {
    let Some(option) = selected else {
        return draft.clone();
    };

    let mut next = draft.clone();
    let p = &mut next.intent.preferences;
    let value = option.value.clone();

    match id {
        QuestionId::ChooseOrigin | QuestionId::ChooseDestination => {
            let side = if id == QuestionId::ChooseOrigin {
                EndpointSide::Origin
            } else {
                EndpointSide::Destination
            };
            if let Some(c) = &option.candidate {
                next.endpoints = draft.endpoints.with(side, Endpoint::from(c.clone()));
            }
        }
        QuestionId::RouteType => {
            if let Ok(rt) = value.parse::<RouteType>() {
                p.route_type = Some(rt);
            }
        }
        QuestionId::Incline => {
            if let Ok(inc) = value.parse::<Incline>() {
                p.incline = Some(inc);
            }
        }
        QuestionId::Environment => p.environment = Some(vec![value]),
        QuestionId::Safety => p.safety = Some(vec![value]),
        QuestionId::Surface => p.surface = Some(vec![value]),
        QuestionId::Scenery => p.scenery = Some(vec![value]),
        QuestionId::Vibe => p.vibe = Some(value),
        QuestionId::Amenities => p.amenities = Some(vec![value]),
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::schema::{AMENITY_WATER, ENV_LOW_TRAFFIC};
    use crate::routing::geometry::LatLng;

    fn choose(q: &FollowUpQuestion, option_id: &str) -> QuestionOption {
        q.option(option_id).cloned().unwrap()
    }

    #[test]
    fn one_question_per_unset_field() {
        let mut intent = Intent::default();
        assert_eq!(preference_questions(&intent).len(), 8);

        intent.preferences.route_type = Some(RouteType::Loop);
        intent.preferences.safety = Some(vec![]);
        let ids: Vec<_> = preference_questions(&intent).iter().map(|q| q.id).collect();
        assert_eq!(ids.first(), Some(&QuestionId::Environment));
        assert!(!ids.contains(&QuestionId::Safety));
        assert!(ids.iter().all(|id| !id.is_place()));
    }

    #[test]
    fn preference_answers_update_intent() {
        let draft = PlanDraft::default();

        let env = preference_question(QuestionId::Environment).unwrap();
        let d = reduce(&draft, env.id, Some(&choose(&env, "prefer_low_traffic")));
        assert!(d.intent.has_environment(ENV_LOW_TRAFFIC));

        let inc = preference_question(QuestionId::Incline).unwrap();
        let d = reduce(&d, inc.id, Some(&choose(&inc, "incline_medium")));
        assert_eq!(d.intent.preferences.incline, Some(Incline::Medium));

        let am = preference_question(QuestionId::Amenities).unwrap();
        let d = reduce(&d, am.id, Some(&choose(&am, "amenities_water")));
        assert!(d.intent.has_amenity(AMENITY_WATER));

        let vibe = preference_question(QuestionId::Vibe).unwrap();
        let d = reduce(&d, vibe.id, Some(&choose(&vibe, "vibe_lively")));
        assert_eq!(d.intent.preferences.vibe.as_deref(), Some("lively"));

        // input draft untouched
        assert_eq!(draft, PlanDraft::default());
    }

    #[test]
    fn skip_is_identity() {
        let mut draft = PlanDraft::default();
        draft.intent.constraints.distance_km = Some(5.0);
        assert_eq!(reduce(&draft, QuestionId::Scenery, None), draft);
    }

    #[test]
    fn place_choice_replaces_one_side() {
        let mut draft = PlanDraft::default();
        draft.endpoints.origin = Endpoint::text("Ferry Building");
        draft.endpoints.destination = Endpoint::text("Crissy Field");

        let candidates = vec![
            PlaceCandidate {
                description: "Ferry Building Marketplace".into(),
                place_id: Some("osm:1".into()),
                location: Some(LatLng::new(37.7955, -122.3937)),
            },
            PlaceCandidate {
                description: "Ferry Plaza".into(),
                place_id: Some("osm:2".into()),
                location: None,
            },
        ];
        let q = place_question(EndpointSide::Origin, "Ferry Building", candidates);
        assert!(!q.allow_skip);
        assert_eq!(q.prompt, "Please pick the origin \"Ferry Building\"");
        assert_eq!(q.options[1].id, "origin_1");

        let d = reduce(&draft, q.id, Some(&choose(&q, "origin_0")));
        assert_eq!(d.endpoints.origin.place_id.as_deref(), Some("osm:1"));
        assert_eq!(d.endpoints.destination.description, "Crissy Field");
    }

    #[test]
    fn ambiguity_wording() {
        assert_eq!(
            ambiguity_message(EndpointSide::Destination, "Pier 39"),
            "I found several places related to \"Pier 39\". Please choose a destination:"
        );
    }
}
