mod common;

use std::sync::Arc;

use common::*;
use ranno::config::DialogueConfig;
use ranno::dialogue::controller::{
    Answer, ClarificationController, DialogueState, DialogueStep, SKIP_MESSAGE, resolve_endpoints,
};
use ranno::dialogue::question::QuestionId;
use ranno::dialogue::resolver::{CandidateResolver, SearchBias};
use ranno::intent::schema::PlaceText;
use ranno::intent::{Incline, Intent, RouteType};
use ranno::model::ConversationLog;
use ranno::routing::geometry::LatLng;

fn mission_to_ferry() -> Intent {
    let mut i = Intent::default();
    i.location.origin = Some(PlaceText {
        text: "Mission".into(),
    });
    i.location.destination = Some(PlaceText {
        text: "Ferry Building".into(),
    });
    let p = &mut i.preferences;
    p.route_type = Some(RouteType::PointToPoint);
    p.environment = Some(vec!["prefer_low_traffic".into()]);
    p.safety = Some(vec!["avoid_high_crime_areas".into()]);
    p.surface = Some(vec!["paved".into()]);
    p.scenery = Some(vec!["water_view".into()]);
    p.vibe = Some("quiet".into());
    p.amenities = Some(vec!["has_water_fountains".into()]);
    i
}

fn resolver() -> CandidateResolver {
    let places = FixedPlaces::default()
        .with(
            "Mission",
            vec![
                candidate("Mission Dolores Park", "W1", LatLng::new(37.7596, -122.4269)),
                candidate("Mission Bay", "W2", LatLng::new(37.7706, -122.3915)),
            ],
        )
        .with(
            "Ferry Building",
            vec![candidate("Ferry Building", "W3", FERRY_BUILDING)],
        );
    CandidateResolver::new(Arc::new(places), SearchBias::default(), 5)
}

#[tokio::test]
async fn ambiguous_origin_is_asked_before_preferences() {
    let intent = mission_to_ferry().normalized_for_planning();
    let resolution = resolve_endpoints(&intent, &resolver(), &DialogueConfig::default()).await;
    assert_eq!(resolution.ambiguous.len(), 1);
    assert_eq!(
        resolution.endpoints.destination.place_id.as_deref(),
        Some("W3")
    );

    let mut log = ConversationLog::new();
    let mut ctl = ClarificationController::new(None);
    let step = ctl.start(intent, resolution, &mut log);

    let DialogueStep::Ask(q) = step else {
        panic!("expected the place question first");
    };
    assert_eq!(q.id, QuestionId::ChooseOrigin);
    assert!(!q.allow_skip);
    assert_eq!(q.options.len(), 2);
    assert!(
        log.messages()
            .iter()
            .any(|m| m.content.contains("several places related to \"Mission\""))
    );

    // place questions cannot be skipped
    assert!(ctl.answer(Answer::Skip, &mut log).is_err());
    assert_eq!(ctl.active_question().map(|q| q.id), Some(QuestionId::ChooseOrigin));

    let step = ctl.answer(Answer::Choose("origin_1".into()), &mut log).unwrap();
    assert_eq!(ctl.draft().endpoints.origin.description, "Mission Bay");
    assert_eq!(ctl.draft().endpoints.origin.place_id.as_deref(), Some("W2"));

    // only incline is left unset
    let DialogueStep::Ask(q) = step else {
        panic!("expected the incline question");
    };
    assert_eq!(q.id, QuestionId::Incline);

    let step = ctl.answer(Answer::Choose("incline_low".into()), &mut log).unwrap();
    let DialogueStep::Finalize(draft) = step else {
        panic!("expected finalize");
    };
    assert_eq!(draft.intent.preferences.incline, Some(Incline::Low));
    assert_eq!(*ctl.state(), DialogueState::Finalizing);
    assert_eq!(ctl.asked(), 2);
}

#[tokio::test]
async fn skipping_leaves_the_draft_untouched() {
    let mut intent = mission_to_ferry();
    intent.preferences.incline = None;
    intent.preferences.vibe = None;
    let intent = intent.normalized_for_planning();
    let resolution = ranno::dialogue::controller::EndpointResolution::default();

    let mut log = ConversationLog::new();
    let mut ctl = ClarificationController::new(None);
    let DialogueStep::Ask(q) = ctl.start(intent.clone(), resolution, &mut log) else {
        panic!("expected a question");
    };
    assert_eq!(q.id, QuestionId::Incline);

    let before = ctl.draft().clone();
    let step = ctl.answer(Answer::Skip, &mut log).unwrap();
    assert_eq!(ctl.draft(), &before);
    assert_eq!(log.last().unwrap().content, "Do you prefer a specific vibe?");
    assert!(log.messages().iter().any(|m| m.content == SKIP_MESSAGE));

    let DialogueStep::Ask(q) = step else {
        panic!("expected the vibe question");
    };
    assert_eq!(q.id, QuestionId::Vibe);
}

#[tokio::test]
async fn question_limit_cuts_the_queue() {
    let intent = Intent::default().normalized_for_planning();
    let mut log = ConversationLog::new();
    let mut ctl = ClarificationController::new(Some(2));

    let DialogueStep::Ask(_) = ctl.start(intent, Default::default(), &mut log) else {
        panic!("expected a question");
    };
    assert!(ctl.pending() > 1);

    let DialogueStep::Ask(_) = ctl.answer(Answer::Skip, &mut log).unwrap() else {
        panic!("expected a second question");
    };
    let step = ctl.answer(Answer::Skip, &mut log).unwrap();
    assert!(matches!(step, DialogueStep::Finalize(_)));
    assert_eq!(ctl.pending(), 0);

    // a finished cycle takes no more answers
    assert!(ctl.answer(Answer::Skip, &mut log).is_err());
}
