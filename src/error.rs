use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlannerError>;

/// Failures of a single planning operation.
///
/// None of these is fatal to a session: each one ends the operation that raised
/// it and is surfaced to the user as a conversation message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlannerError {
    #[error("Capability unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error("Could not decode intent: {0}")]
    Parse(String),

    #[error("Completion failed: {0}")]
    Completion(String),

    #[error("Prompt is empty")]
    EmptyPrompt,

    #[error("Routing failed: {0}")]
    RoutingFailure(String),

    #[error("Data source failed: {0}")]
    DataSource(String),

    #[error("Invalid dialogue action: {0}")]
    Dialogue(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Cache error: {0}")]
    Cache(String),
}

impl PlannerError {
    /// Parse-stage failures: the user stays in the conversation and may retry.
    pub fn is_parse_stage(&self) -> bool {
        matches!(
            self,
            PlannerError::CapabilityUnavailable(_)
                | PlannerError::Parse(_)
                | PlannerError::Completion(_)
                | PlannerError::EmptyPrompt
        )
    }
}

impl From<rusqlite::Error> for PlannerError {
    fn from(e: rusqlite::Error) -> Self {
        PlannerError::Cache(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_stage_classification() {
        assert!(PlannerError::EmptyPrompt.is_parse_stage());
        assert!(PlannerError::Parse("x".into()).is_parse_stage());
        assert!(!PlannerError::RoutingFailure("ZERO_RESULTS".into()).is_parse_stage());
        assert!(!PlannerError::DataSource("HTTP 500".into()).is_parse_stage());
    }
}
