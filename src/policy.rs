use std::collections::HashMap;

use log::warn;

use crate::{env::Environment, error::AdpError, exploration::Exploration, model::ExperienceModel};

const DEFAULT_MAX_SWEEPS: usize = 1000;
const EVALUATION_TOLERANCE: f64 = 1e-8;

/// Policy iteration over a learned [`ExperienceModel`]
///
/// Alternates a value-iteration-style evaluation sweep with a greedy
/// improvement pass until an improvement pass changes nothing, producing a
/// self-consistent `(utilities, policy)` pair for the model as currently
/// estimated. Because the model keeps changing while the agent learns, the
/// fixed point is recomputed after every new observation; re-running on an
/// unchanged model is a no-op.
///
/// Utility estimates fed to both passes go through the exploration strategy's
/// [`adjusted_estimate`](Exploration::adjusted_estimate), which is how
/// optimistic-reward exploration injects its bonus.
pub struct PolicyIteration<E: Environment> {
    utilities: HashMap<E::State, f64>,
    policy: HashMap<E::State, E::Action>,
    gamma: f64,
    max_sweeps: usize,
}

impl<E: Environment> PolicyIteration<E> {
    /// Initialize an empty engine with discount factor `gamma`
    ///
    /// `gamma` must be in `(0, 1]`; 1 recovers the undiscounted return.
    pub fn new(gamma: f64) -> Result<Self, AdpError> {
        if !(gamma > 0.0 && gamma <= 1.0) {
            return Err(AdpError::InvalidConfig(format!(
                "discount factor must be in (0, 1], got {gamma}"
            )));
        }
        Ok(Self {
            utilities: HashMap::new(),
            policy: HashMap::new(),
            gamma,
            max_sweeps: DEFAULT_MAX_SWEEPS,
        })
    }

    /// Override the safety bound on evaluation/improvement sweeps per solve
    pub fn with_max_sweeps(mut self, max_sweeps: usize) -> Self {
        self.max_sweeps = max_sweeps;
        self
    }

    /// The current utility estimate per visited state
    pub fn utilities(&self) -> &HashMap<E::State, f64> {
        &self.utilities
    }

    /// The currently preferred action per state
    ///
    /// Absent for states with no tried actions; callers must fall back to a
    /// random legal action for those.
    pub fn policy(&self) -> &HashMap<E::State, E::Action> {
        &self.policy
    }

    /// Discard the current utilities and policy
    pub fn clear(&mut self) {
        self.utilities.clear();
        self.policy.clear();
    }

    /// Re-converge the `(utilities, policy)` pair against the given model
    pub fn solve(&mut self, model: &ExperienceModel<E>, strategy: &impl Exploration) {
        for _ in 0..self.max_sweeps {
            self.evaluate(model, strategy);
            if !self.improve(model, strategy) {
                return;
            }
        }
        warn!(
            "policy iteration stopped after {} sweeps without reaching a fixed point",
            self.max_sweeps
        );
    }

    /// Bellman backup sweeps over every state with a recorded reward, until
    /// the largest utility change in a sweep falls below tolerance
    ///
    /// States with no tried actions keep `U[s] = R[s]`, the convention for
    /// reward-only terminal states.
    fn evaluate(&mut self, model: &ExperienceModel<E>, strategy: &impl Exploration) {
        for _ in 0..self.max_sweeps {
            let mut delta: f64 = 0.0;
            for state in model.visited_states() {
                let Some(reward) = model.reward(state) else {
                    continue;
                };
                let best = self.best_estimate(model, strategy, state).map(|(_, e)| e);
                let utility = match best {
                    Some(estimate) => reward + self.gamma * estimate,
                    None => reward,
                };
                let old = self.utilities.insert(state.clone(), utility).unwrap_or(0.0);
                delta = delta.max((utility - old).abs());
            }
            if delta < EVALUATION_TOLERANCE {
                return;
            }
        }
        warn!(
            "utility evaluation stopped after {} sweeps without converging",
            self.max_sweeps
        );
    }

    /// One greedy pass over every state with at least one tried action
    ///
    /// Updates `policy[s]` only on strict improvement over the currently
    /// assigned action's estimate, or when no action is assigned yet.
    ///
    /// **Returns** whether the pass changed the policy
    fn improve(&mut self, model: &ExperienceModel<E>, strategy: &impl Exploration) -> bool {
        let mut changed = false;
        for state in model.acted_states() {
            let Some((best_action, best_estimate)) = self.best_estimate(model, strategy, state)
            else {
                continue;
            };

            let current_estimate = self.policy.get(state).and_then(|action| {
                let estimate = model.expected_utility(state, action, &self.utilities)?;
                Some(strategy.adjusted_estimate(estimate, model.frequency(state, action)))
            });

            let improves = match current_estimate {
                Some(current) => best_estimate > current,
                None => true,
            };
            if improves {
                let best_action = best_action.clone();
                self.policy.insert(state.clone(), best_action);
                changed = true;
            }
        }
        changed
    }

    /// The best tried action from `state` and its adjusted estimate, in
    /// first-try order with ties going to the earliest action
    ///
    /// `None` if no action has been tried from `state`.
    fn best_estimate<'m>(
        &self,
        model: &'m ExperienceModel<E>,
        strategy: &impl Exploration,
        state: &E::State,
    ) -> Option<(&'m E::Action, f64)> {
        let mut best: Option<(&E::Action, f64)> = None;
        for action in model.tried_actions(state) {
            let Some(estimate) = model.expected_utility(state, action, &self.utilities) else {
                continue;
            };
            let estimate = strategy.adjusted_estimate(estimate, model.frequency(state, action));
            if best.map_or(true, |(_, b)| estimate > b) {
                best = Some((action, estimate));
            }
        }
        best
    }
}
