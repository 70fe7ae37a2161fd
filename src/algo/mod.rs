pub mod adp;

pub use adp::{AdpAgent, AdpAgentConfig, Solution, TrialRecord};
