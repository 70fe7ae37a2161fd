use thiserror::Error;

/// Errors surfaced by learning agents
///
/// Missing model information (an action never tried from a state) and episodes
/// that hit the step cap are normal outcomes of learning, not errors, and are
/// deliberately absent from this taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdpError {
    /// A configuration value was rejected at construction or session start
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The environment reported no available actions for a non-terminal state,
    /// which violates the [`Environment`](crate::env::Environment) contract
    #[error("environment contract violation: no actions available in a non-terminal state")]
    NoAvailableActions,
}
