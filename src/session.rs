//! One user's planning conversation.
//!
//! The session owns the conversation log, the clarification controller, the
//! loaded data layers and the last successful plan. Every awaited call
//! captures the current generation first; if the generation moved while the
//! call was outstanding, the result is dropped without touching state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::capability::Capabilities;
use crate::config::PlannerConfig;
use crate::dialogue::controller::{
    Answer, ClarificationController, DialogueStep, resolve_endpoints,
};
use crate::dialogue::question::{FollowUpQuestion, PlanDraft};
use crate::dialogue::resolver::CandidateResolver;
use crate::error::{PlannerError, Result};
use crate::intent::IntentParser;
use crate::model::{AmenityKind, ConversationLog, DataLayer, DataLayers};
use crate::routing::finalizer::{RouteFinalizer, RoutePlan};

pub const GREETING: &str =
    "Where should we start? Share your running goal, location, or distance.";

/// Shared, monotonically increasing counter of planning generations.
#[derive(Debug, Clone, Default)]
pub struct GenerationHandle(Arc<AtomicU64>);

impl GenerationHandle {
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    /// Start a new generation, making every in-flight result stale.
    pub fn invalidate(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current() == generation
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Question(FollowUpQuestion),
    RouteReady(Box<RoutePlan>),
    RouteFailed(String),
    ParseFailed(String),
    /// The result arrived after newer input and was discarded.
    Stale,
}

pub struct PlanningSession {
    caps: Capabilities,
    config: PlannerConfig,
    parser: IntentParser,
    resolver: CandidateResolver,
    finalizer: RouteFinalizer,
    controller: ClarificationController,
    log: ConversationLog,
    data: DataLayers,
    last_plan: Option<RoutePlan>,
    last_draft: Option<PlanDraft>,
    generation: GenerationHandle,
}

impl PlanningSession {
    pub fn new(caps: Capabilities, config: PlannerConfig) -> Self {
        let parser = IntentParser::new(caps.completion.clone());
        let resolver = CandidateResolver::new(
            caps.places.clone(),
            config.places.bias(),
            config.places.max_candidates,
        );
        let finalizer = RouteFinalizer::new(
            caps.routing.clone(),
            caps.elevation.clone(),
            config.route.clone(),
            config.amenities.options(),
        );
        let controller = ClarificationController::new(config.dialogue.max_follow_up);

        let mut log = ConversationLog::new();
        log.assistant(GREETING);

        Self {
            caps,
            config,
            parser,
            resolver,
            finalizer,
            controller,
            log,
            data: DataLayers::default(),
            last_plan: None,
            last_draft: None,
            generation: GenerationHandle::default(),
        }
    }

    pub fn generation_handle(&self) -> GenerationHandle {
        self.generation.clone()
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn data(&self) -> &DataLayers {
        &self.data
    }

    pub fn last_plan(&self) -> Option<&RoutePlan> {
        self.last_plan.as_ref()
    }

    pub fn controller(&self) -> &ClarificationController {
        &self.controller
    }

    pub fn active_question(&self) -> Option<&FollowUpQuestion> {
        self.controller.active_question()
    }

    /// Fetch incidents and both amenity layers. A failed layer is recorded as
    /// degraded; it never blocks planning.
    pub async fn load_data(&mut self) {
        let incidents = self.caps.incidents.clone();
        let amenities = self.caps.amenities.clone();
        let (inc_limit, am_limit) = (self.config.incidents.limit, self.config.amenities.limit);

        let (inc, water, rest) = tokio::join!(
            incidents.fetch_incidents(inc_limit),
            amenities.fetch_amenities(AmenityKind::Water, am_limit),
            amenities.fetch_amenities(AmenityKind::Restroom, am_limit),
        );

        self.data = DataLayers {
            incidents: into_layer("incidents", inc),
            water: into_layer("water fountains", water),
            restrooms: into_layer("restrooms", rest),
        };
    }

    pub fn set_data(&mut self, data: DataLayers) {
        self.data = data;
    }

    /// Parse new user text and start a clarification cycle for it.
    pub async fn submit_prompt(&mut self, text: &str) -> SessionEvent {
        let generation = self.generation.invalidate();
        self.controller.reset();

        let text = text.trim();
        if !text.is_empty() {
            self.log.user(text);
        }

        let parsed = self.parser.parse(text).await;
        if !self.generation.is_current(generation) {
            return SessionEvent::Stale;
        }
        let intent = match parsed {
            Ok(i) => i,
            Err(e) => {
                let msg = format!("Parsing failed: {e}");
                log::warn!("{msg}");
                self.log.assistant(msg.clone());
                return SessionEvent::ParseFailed(msg);
            }
        };

        let intent = intent.normalized_for_planning();
        let resolution = resolve_endpoints(&intent, &self.resolver, &self.config.dialogue).await;
        if !self.generation.is_current(generation) {
            return SessionEvent::Stale;
        }

        let step = self.controller.start(intent, resolution, &mut self.log);
        self.handle_step(step, generation).await
    }

    pub async fn answer(&mut self, answer: Answer) -> Result<SessionEvent> {
        let generation = self.generation.current();
        let step = self.controller.answer(answer, &mut self.log)?;
        Ok(self.handle_step(step, generation).await)
    }

    /// Run the finalizer again on the last completed draft.
    pub async fn replan(&mut self) -> Result<SessionEvent> {
        let draft = self
            .last_draft
            .clone()
            .ok_or_else(|| PlannerError::Dialogue("no plan to refresh yet".into()))?;
        let generation = self.generation.invalidate();
        Ok(self.run_finalize(draft, generation).await)
    }

    async fn handle_step(&mut self, step: DialogueStep, generation: u64) -> SessionEvent {
        match step {
            DialogueStep::Ask(q) => SessionEvent::Question(q),
            DialogueStep::Finalize(draft) => self.run_finalize(draft, generation).await,
        }
    }

    async fn run_finalize(&mut self, draft: PlanDraft, generation: u64) -> SessionEvent {
        let result = self.finalizer.finalize(&draft, &self.data).await;

        if !self.generation.is_current(generation) {
            log::info!("Discarding route result from generation {generation}");
            return SessionEvent::Stale;
        }
        self.last_draft = Some(draft);

        match result {
            Ok(plan) => {
                self.log.assistant(plan.ready_message());
                self.last_plan = Some(plan.clone());
                SessionEvent::RouteReady(Box::new(plan))
            }
            Err(e) => {
                let reason = match e {
                    PlannerError::RoutingFailure(m) => m,
                    other => other.to_string(),
                };
                let msg = format!("Route planning failed: {reason}");
                log::warn!("{msg}");
                self.log.assistant(msg.clone());
                SessionEvent::RouteFailed(msg)
            }
        }
    }
}

fn into_layer<T>(name: &str, fetched: Result<Vec<T>>) -> DataLayer<T> {
    match fetched {
        Ok(points) => {
            log::info!("Loaded {} {name}", points.len());
            DataLayer::loaded(points)
        }
        Err(e) => {
            log::warn!("Could not load {name}: {e}");
            DataLayer::failed(e.to_string())
        }
    }
}
