//! Clarification state machine.
//!
//! One cycle per parsed intent: place questions first, then one question per
//! unset preference, answered strictly one at a time. The cycle ends by
//! handing the accumulated [`PlanDraft`] to the finalizer exactly once.

use std::collections::VecDeque;

use crate::config::DialogueConfig;
use crate::dialogue::question::{
    FollowUpQuestion, PlanDraft, ambiguity_message, place_question, preference_questions, reduce,
};
use crate::dialogue::resolver::{CandidateResolver, Resolution};
use crate::error::{PlannerError, Result};
use crate::intent::schema::Intent;
use crate::model::{ConversationLog, Endpoint, EndpointSide, PlaceCandidate, RouteEndpoints};

pub const SKIP_MESSAGE: &str = "User chose to skip.";

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DialogueState {
    #[default]
    Idle,
    AwaitingAnswer(FollowUpQuestion),
    Finalizing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Choose(String),
    Skip,
}

/// What the caller should do next.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogueStep {
    Ask(FollowUpQuestion),
    Finalize(PlanDraft),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmbiguousPlace {
    pub side: EndpointSide,
    pub description: String,
    pub candidates: Vec<PlaceCandidate>,
}

/// Endpoints for a new cycle after place search, plus the sides that still
/// need the user to pick a candidate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EndpointResolution {
    pub endpoints: RouteEndpoints,
    pub ambiguous: Vec<AmbiguousPlace>,
}

/// Starting descriptions for a normalised intent.
///
/// Loop-like intents reuse the origin description as destination.
pub fn endpoint_descriptions(intent: &Intent, cfg: &DialogueConfig) -> (String, String) {
    let origin = intent
        .origin_text()
        .or(intent.context())
        .unwrap_or(&cfg.default_origin)
        .to_string();
    let destination = if intent.is_loop_like() {
        origin.clone()
    } else {
        intent
            .destination_text()
            .or(intent.context())
            .unwrap_or(&cfg.default_destination)
            .to_string()
    };
    (origin, destination)
}

/// Search both endpoints. Loop-like intents never resolve the destination.
pub async fn resolve_endpoints(
    intent: &Intent,
    resolver: &CandidateResolver,
    cfg: &DialogueConfig,
) -> EndpointResolution {
    let (origin, destination) = endpoint_descriptions(intent, cfg);
    let mut out = EndpointResolution {
        endpoints: RouteEndpoints {
            origin: Endpoint::text(&origin),
            destination: Endpoint::text(&destination),
        },
        ambiguous: Vec::new(),
    };

    let mut sides = vec![(EndpointSide::Origin, origin)];
    if !intent.is_loop_like() {
        sides.push((EndpointSide::Destination, destination));
    }

    for (side, description) in sides {
        let endpoint = Endpoint::text(&description);
        match resolver.resolve(&endpoint).await {
            Resolution::Single(c) => {
                log::info!("Resolved {side:?} '{description}' to '{}'", c.description);
                out.endpoints = out.endpoints.with(side, c.into());
            }
            Resolution::Ambiguous(candidates) => out.ambiguous.push(AmbiguousPlace {
                side,
                description,
                candidates,
            }),
            Resolution::Unresolved | Resolution::Authoritative => {}
        }
    }
    out
}

#[derive(Debug, Clone, Default)]
pub struct ClarificationController {
    max_follow_up: Option<usize>,
    queue: VecDeque<FollowUpQuestion>,
    state: DialogueState,
    asked: usize,
    draft: PlanDraft,
}

impl ClarificationController {
    pub fn new(max_follow_up: Option<usize>) -> Self {
        Self {
            max_follow_up,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &DialogueState {
        &self.state
    }

    pub fn active_question(&self) -> Option<&FollowUpQuestion> {
        match &self.state {
            DialogueState::AwaitingAnswer(q) => Some(q),
            _ => None,
        }
    }

    pub fn asked(&self) -> usize {
        self.asked
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn draft(&self) -> &PlanDraft {
        &self.draft
    }

    pub fn reset(&mut self) {
        self.queue.clear();
        self.asked = 0;
        self.state = DialogueState::Idle;
    }

    /// Begin a cycle for a freshly parsed intent whose endpoints have
    /// already been searched.
    pub fn start(
        &mut self,
        intent: Intent,
        resolution: EndpointResolution,
        log: &mut ConversationLog,
    ) -> DialogueStep {
        self.reset();

        let intent = intent.normalized_for_planning();
        log.assistant(intent.summary_line());

        for place in resolution.ambiguous {
            log.assistant(ambiguity_message(place.side, &place.description));
            self.queue
                .push_back(place_question(place.side, &place.description, place.candidates));
        }
        self.queue.extend(preference_questions(&intent));
        log::debug!("dialogue started with {} queued question(s)", self.queue.len());

        self.draft = PlanDraft {
            intent,
            endpoints: resolution.endpoints,
        };
        self.advance(log)
    }

    pub fn answer(&mut self, answer: Answer, log: &mut ConversationLog) -> Result<DialogueStep> {
        let question = match &self.state {
            DialogueState::AwaitingAnswer(q) => q,
            DialogueState::Idle => {
                return Err(PlannerError::Dialogue("no question is awaiting an answer".into()));
            }
            DialogueState::Finalizing => {
                return Err(PlannerError::Dialogue("planning cycle already finished".into()));
            }
        };

        let selected = match &answer {
            Answer::Choose(option_id) => Some(question.option(option_id).cloned().ok_or_else(|| {
                PlannerError::Dialogue(format!(
                    "unknown option '{option_id}' for question '{}'",
                    question.id
                ))
            })?),
            Answer::Skip if !question.allow_skip => {
                return Err(PlannerError::Dialogue(format!(
                    "question '{}' cannot be skipped",
                    question.id
                )));
            }
            Answer::Skip => None,
        };

        let id = question.id;
        self.asked += 1;
        match &selected {
            Some(option) => log.user(option.label.clone()),
            None => log.user(SKIP_MESSAGE),
        }
        self.draft = reduce(&self.draft, id, selected.as_ref());

        Ok(self.advance(log))
    }

    fn limit_reached(&self) -> bool {
        self.max_follow_up.is_some_and(|max| self.asked >= max)
    }

    fn advance(&mut self, log: &mut ConversationLog) -> DialogueStep {
        if self.limit_reached() {
            if !self.queue.is_empty() {
                log::info!("Question limit reached, dropping {} question(s)", self.queue.len());
            }
            self.queue.clear();
        }

        match self.queue.pop_front() {
            Some(q) => {
                log.assistant(q.prompt.clone());
                self.state = DialogueState::AwaitingAnswer(q.clone());
                DialogueStep::Ask(q)
            }
            None => {
                self.state = DialogueState::Finalizing;
                DialogueStep::Finalize(self.draft.clone())
            }
        }
    }
}
