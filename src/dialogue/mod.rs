pub mod controller;
pub mod question;
pub mod resolver;

pub use controller::{Answer, ClarificationController, DialogueState, DialogueStep};
pub use question::{FollowUpQuestion, PlanDraft, QuestionId, QuestionOption};
pub use resolver::{CandidateResolver, SearchBias};
