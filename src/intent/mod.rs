pub mod parser;
pub mod prompt;
pub mod rules;
pub mod schema;

pub use parser::IntentParser;
pub use schema::{Incline, Intent, RouteType};
