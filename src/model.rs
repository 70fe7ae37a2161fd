use std::collections::HashMap;

use crate::env::Environment;

/// Accumulated outcome counts for one action tried from a particular state
struct ActionStats<E: Environment> {
    action: E::Action,
    /// Times each resulting state was observed after taking `action`
    outcomes: HashMap<E::State, u64>,
    /// Total times `action` was taken, always equal to the sum of `outcomes`
    tries: u64,
}

/// A learned model of an environment's dynamics, built purely from observed
/// transitions
///
/// Keeps three sparse tables: outcome counts per `(state, action, next_state)`
/// triple, try counts per `(state, action)` pair, and the most recently
/// observed reward per state. Counts only ever grow; rewards are overwritten
/// on repeat visits (rewards are assumed stationary per state).
///
/// Per-state action records are kept in the order each action was first
/// tried, which gives downstream argmax computations a deterministic
/// tie-break order.
pub struct ExperienceModel<E: Environment> {
    transitions: HashMap<E::State, Vec<ActionStats<E>>>,
    rewards: HashMap<E::State, f64>,
}

impl<E: Environment> ExperienceModel<E> {
    /// Initialize an empty model
    pub fn new() -> Self {
        Self {
            transitions: HashMap::new(),
            rewards: HashMap::new(),
        }
    }

    /// Forget everything observed so far
    pub fn clear(&mut self) {
        self.transitions.clear();
        self.rewards.clear();
    }

    /// Record one observed transition `(state, action) -> next_state`
    ///
    /// Increments the outcome count for the triple and the try count for the
    /// `(state, action)` pair, exactly once each.
    pub fn record_transition(&mut self, state: &E::State, action: &E::Action, next_state: &E::State) {
        let stats = self.transitions.entry(state.clone()).or_default();
        let i = match stats.iter().position(|s| s.action == *action) {
            Some(i) => i,
            None => {
                stats.push(ActionStats {
                    action: action.clone(),
                    outcomes: HashMap::new(),
                    tries: 0,
                });
                stats.len() - 1
            }
        };
        *stats[i].outcomes.entry(next_state.clone()).or_insert(0) += 1;
        stats[i].tries += 1;
    }

    /// Record the reward observed for entering `state`, overwriting any
    /// previously observed value
    pub fn record_reward(&mut self, state: &E::State, reward: f64) {
        self.rewards.insert(state.clone(), reward);
    }

    /// The most recently observed reward for `state`, if it has been visited
    pub fn reward(&self, state: &E::State) -> Option<f64> {
        self.rewards.get(state).copied()
    }

    /// How many times `action` has been taken from `state`
    pub fn frequency(&self, state: &E::State, action: &E::Action) -> u64 {
        self.stats(state, action).map_or(0, |s| s.tries)
    }

    /// Empirical transition probabilities for `(state, action)`, normalized
    /// outcome counts summing to 1
    ///
    /// Returns an empty map if the action has never been taken from `state`.
    /// An empty map means "no information", not "zero probability everywhere".
    pub fn transition_probabilities(&self, state: &E::State, action: &E::Action) -> HashMap<E::State, f64> {
        match self.stats(state, action) {
            Some(stats) if stats.tries > 0 => {
                let n = stats.tries as f64;
                stats
                    .outcomes
                    .iter()
                    .map(|(s, &count)| (s.clone(), count as f64 / n))
                    .collect()
            }
            _ => HashMap::new(),
        }
    }

    /// Expected utility of taking `action` from `state` under the learned
    /// transition model: `Σ_s′ P(s′|state,action) · utilities[s′]`
    ///
    /// States with no utility estimate yet contribute 0. Returns `None` if
    /// the action has never been taken from `state`, so an untried action can
    /// never divide by zero or masquerade as a real estimate.
    pub fn expected_utility(
        &self,
        state: &E::State,
        action: &E::Action,
        utilities: &HashMap<E::State, f64>,
    ) -> Option<f64> {
        let stats = self.stats(state, action).filter(|s| s.tries > 0)?;
        let n = stats.tries as f64;
        let sum = stats
            .outcomes
            .iter()
            .map(|(s, &count)| count as f64 / n * utilities.get(s).copied().unwrap_or(0.0))
            .sum();
        Some(sum)
    }

    /// The actions that have been tried from `state`, in first-try order
    pub fn tried_actions(&self, state: &E::State) -> impl Iterator<Item = &E::Action> {
        self.transitions
            .get(state)
            .into_iter()
            .flat_map(|stats| stats.iter().map(|s| &s.action))
    }

    /// States that have at least one tried action
    pub fn acted_states(&self) -> impl Iterator<Item = &E::State> {
        self.transitions.keys()
    }

    /// States with a recorded reward, i.e. every state visited so far
    pub fn visited_states(&self) -> impl Iterator<Item = &E::State> {
        self.rewards.keys()
    }

    fn stats(&self, state: &E::State, action: &E::Action) -> Option<&ActionStats<E>> {
        self.transitions
            .get(state)?
            .iter()
            .find(|s| s.action == *action)
    }
}

impl<E: Environment> Default for ExperienceModel<E> {
    fn default() -> Self {
        Self::new()
    }
}
