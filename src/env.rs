use std::hash::Hash;

/// A trait for state and action types that can be used as keys in a [`HashMap`](std::collections::HashMap)
///
/// The tables kept by a learning agent are sparse maps keyed by states and
/// state-action pairs, so both types must have stable equality and hashing.
pub trait Key: Clone + Eq + Hash {}

impl<T> Key for T where T: Clone + Eq + Hash {}

/// The outcome of executing a single action in an environment
///
/// Produced by [`Environment::step`] and consumed by the learning loop.
pub struct Step<E: Environment + ?Sized> {
    /// The state the environment transitioned into
    pub next_state: E::State,
    /// The reward received for entering `next_state`
    pub reward: f64,
    /// Whether `next_state` is terminal
    pub terminal: bool,
}

/// Represents a Markov decision process, defining the dynamics of an environment
/// in which an agent can operate.
///
/// This base trait represents the common case of a discrete-time MDP with one agent
/// and a finite state space and action space. The dynamics may be stochastic:
/// the same `(state, action)` pair can legitimately produce different outcomes
/// across calls, so an agent must estimate transition probabilities from
/// accumulated observations rather than caching a single outcome.
pub trait Environment {
    /// A representation of the state of the environment to be passed to an agent
    type State: Key;

    /// A representation of an action that an agent can take to affect the environment
    type Action: Key;

    /// Get the state an episode begins in
    fn starting_state(&self) -> Self::State;

    /// Get the available actions for the given state
    ///
    /// The returned vector must be non-empty for any reachable non-terminal state;
    /// specify an action that represents doing nothing if necessary.
    fn actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Execute an action in the given state, producing the next state, the
    /// associated reward, and whether the episode is over
    fn step(&mut self, state: &Self::State, action: &Self::Action) -> Step<Self>;
}
