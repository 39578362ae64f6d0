//! Conversational running-route planner.
//!
//! Free text goes in through [`session::PlanningSession`]; follow-up
//! questions and a routed, risk-scored [`routing::RoutePlan`] come out. All
//! external services sit behind the traits in [`capability`].

pub mod capability;
pub mod config;
pub mod db;
pub mod dialogue;
pub mod error;
pub mod intent;
pub mod model;
pub mod normalize;
pub mod paths;
pub mod providers;
pub mod routing;
pub mod session;
pub mod ui;
pub mod utils;

pub use error::{PlannerError, Result};
