/// Learning agents
pub mod algo;

/// Implementations of strategies for time-decaying exploration schedules
pub mod decay;

/// Environment contract
pub mod env;

/// Error types
pub mod error;

/// Exploration policies
pub mod exploration;

/// Learned model of the environment dynamics
pub mod model;

/// Policy iteration over the learned model
pub mod policy;

/// Testing environments
pub mod gym;
