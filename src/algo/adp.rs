use std::collections::HashMap;

use log::{debug, info};
use rand::{seq::SliceRandom, thread_rng};

use crate::{
    env::{Environment, Step},
    error::AdpError,
    exploration::{Choice, Exploration},
    model::ExperienceModel,
    policy::PolicyIteration,
};

/// Configuration for the [`AdpAgent`]
pub struct AdpAgentConfig {
    /// Discount factor for the utility computation - must be in `(0, 1]`
    ///
    /// **Default**: `0.95`
    pub gamma: f64,
    /// Safety cap on steps per episode, for environments whose stochastic
    /// dynamics can keep an episode from ever terminating
    ///
    /// **Default**: `1000`
    pub max_steps_per_episode: usize,
    /// Cumulative reward at which [`AdpAgent::solve`] abandons an episode as
    /// failed - must be negative
    ///
    /// **Default**: `-1000.0`
    pub solve_reward_floor: f64,
    /// Whether to discard prior experience at the start of each
    /// [`learn`](AdpAgent::learn) session
    ///
    /// **Default**: `false`
    pub reset: bool,
}

impl Default for AdpAgentConfig {
    fn default() -> Self {
        Self {
            gamma: 0.95,
            max_steps_per_episode: 1000,
            solve_reward_floor: -1000.0,
            reset: false,
        }
    }
}

/// Per-episode summary, appended to the agent's history after every trial
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialRecord {
    /// Steps taken before the episode ended
    pub steps: usize,
    /// Sum of rewards received over the episode
    pub reward: f64,
    /// Whether the episode was cut off by the step cap rather than reaching a
    /// terminal state
    pub capped: bool,
}

/// The result of executing a fixed policy with [`AdpAgent::solve`]
pub struct Solution<E: Environment> {
    /// The sequence of actions executed
    pub actions: Vec<E::Action>,
    /// Sum of rewards received
    pub reward: f64,
    /// Whether a terminal state was reached
    pub solved: bool,
}

/// An active adaptive dynamic programming agent
///
/// Learns an unknown stochastic environment purely through interaction: every
/// observed transition updates a learned [`ExperienceModel`], and
/// [`PolicyIteration`] re-derives utilities and a greedy policy from the
/// updated model before the next action is chosen. The exploration strategy
/// decides how to balance trying new actions against exploiting the policy.
///
/// All tables are owned by the agent, constructed empty, and carried across
/// trials so experience accumulates over a whole learning run. One agent
/// drives one learning run; independent experiments need independent agents.
///
/// ### Generics
/// - `E` - The [`Environment`] in which the agent will learn
///     - The state and action spaces must both be discrete and small enough
///       to enumerate, because the model records counts per state-action pair
/// - `X` - The [`Exploration`] strategy
pub struct AdpAgent<E, X>
where
    E: Environment,
    X: Exploration,
{
    model: ExperienceModel<E>,
    engine: PolicyIteration<E>,
    strategy: X,
    max_steps: usize,
    solve_reward_floor: f64,
    reset: bool,
    history: Vec<TrialRecord>,
}

impl<E, X> AdpAgent<E, X>
where
    E: Environment,
    X: Exploration,
{
    /// Initialize a new `AdpAgent` with the given exploration strategy
    ///
    /// **Errors** if the configuration is invalid; invalid values are
    /// rejected outright, never clamped.
    pub fn new(strategy: X, config: AdpAgentConfig) -> Result<Self, AdpError> {
        if config.max_steps_per_episode == 0 {
            return Err(AdpError::InvalidConfig(String::from(
                "step cap per episode must be at least 1",
            )));
        }
        if !(config.solve_reward_floor < 0.0) {
            return Err(AdpError::InvalidConfig(format!(
                "solve reward floor must be negative, got {}",
                config.solve_reward_floor
            )));
        }
        Ok(Self {
            model: ExperienceModel::new(),
            engine: PolicyIteration::new(config.gamma)?,
            strategy,
            max_steps: config.max_steps_per_episode,
            solve_reward_floor: config.solve_reward_floor,
            reset: config.reset,
            history: Vec::new(),
        })
    }

    /// The currently preferred action per visited state
    pub fn policy(&self) -> &HashMap<E::State, E::Action> {
        self.engine.policy()
    }

    /// The current utility estimate per visited state
    pub fn utilities(&self) -> &HashMap<E::State, f64> {
        self.engine.utilities()
    }

    /// The learned model of the environment dynamics
    pub fn model(&self) -> &ExperienceModel<E> {
        &self.model
    }

    /// Summaries of every trial run so far, in order
    pub fn history(&self) -> &[TrialRecord] {
        &self.history
    }

    /// Discard all accumulated experience, utilities, policy, and history
    pub fn clear_experience(&mut self) {
        self.model.clear();
        self.engine.clear();
        self.history.clear();
    }

    /// Drive one episode against the environment
    ///
    /// Alternates choosing an action through the exploration strategy and
    /// executing it, recording every transition and reward into the model and
    /// re-converging the policy after each observation, until the environment
    /// reports a terminal state or the step cap is hit. Hitting the cap is a
    /// normal outcome during early learning, not an error.
    ///
    /// **Errors** only if the environment reports no available actions for a
    /// non-terminal state.
    pub fn run_trial(&mut self, env: &mut E) -> Result<TrialRecord, AdpError> {
        let mut state = env.starting_state();
        if self.model.reward(&state).is_none() {
            // the entry reward for the starting state is unobservable, use 0
            // until a transition into it says otherwise
            self.model.record_reward(&state, 0.0);
        }

        let mut steps = 0;
        let mut total_reward = 0.0;
        let mut capped = false;
        loop {
            let actions = env.actions(&state);
            if actions.is_empty() {
                return Err(AdpError::NoAvailableActions);
            }

            let action = self.act(&state, &actions);
            let Step {
                next_state,
                reward,
                terminal,
            } = env.step(&state, &action);

            self.model.record_transition(&state, &action, &next_state);
            self.model.record_reward(&next_state, reward);
            self.engine.solve(&self.model, &self.strategy);

            steps += 1;
            total_reward += reward;
            if terminal {
                break;
            }
            if steps >= self.max_steps {
                capped = true;
                break;
            }
            state = next_state;
        }

        let record = TrialRecord {
            steps,
            reward: total_reward,
            capped,
        };
        self.history.push(record);
        Ok(record)
    }

    /// Run `trials` episodes sequentially, carrying experience across them
    ///
    /// Clears prior experience first if the `reset` config flag is set.
    ///
    /// **Returns** the learned policy
    pub fn learn(
        &mut self,
        env: &mut E,
        trials: u32,
    ) -> Result<&HashMap<E::State, E::Action>, AdpError> {
        if self.reset {
            self.clear_experience();
        }

        for trial in 0..trials {
            let record = self.run_trial(env)?;
            debug!(
                "trial {trial}: {} steps, reward {:.3}{}",
                record.steps,
                record.reward,
                if record.capped { " (capped)" } else { "" },
            );
        }
        info!(
            "finished {trials} trials; {} states visited",
            self.utilities().len()
        );

        Ok(self.engine.policy())
    }

    /// Execute the learned policy with no further learning or exploration
    ///
    /// Falls back to a uniform-random legal action for states the policy has
    /// no entry for. The episode ends at a terminal state, at the cumulative
    /// reward floor (abandon and fail), or at the step cap.
    pub fn solve(&self, env: &mut E) -> Result<Solution<E>, AdpError> {
        let mut state = env.starting_state();
        let mut taken = Vec::new();
        let mut total_reward = 0.0;
        let mut solved = false;

        for _ in 0..self.max_steps {
            let actions = env.actions(&state);
            if actions.is_empty() {
                return Err(AdpError::NoAvailableActions);
            }
            let action = match self.engine.policy().get(&state) {
                Some(action) => action.clone(),
                None => actions
                    .choose(&mut thread_rng())
                    .cloned()
                    .expect("`actions` is not empty"),
            };

            let Step {
                next_state,
                reward,
                terminal,
            } = env.step(&state, &action);
            taken.push(action);
            total_reward += reward;

            if terminal {
                solved = true;
                break;
            }
            if total_reward <= self.solve_reward_floor {
                break;
            }
            state = next_state;
        }

        Ok(Solution {
            actions: taken,
            reward: total_reward,
            solved,
        })
    }

    /// Choose the action to execute from `state` via the exploration strategy
    fn act(&mut self, state: &E::State, actions: &[E::Action]) -> E::Action {
        match self.strategy.choose() {
            Choice::Explore => actions
                .choose(&mut thread_rng())
                .cloned()
                .expect("`actions` is not empty"),
            Choice::Exploit => self.greedy_action(state, actions),
        }
    }

    /// The greedy action from `state`: the legal action maximizing the
    /// exploration-adjusted one-step utility estimate
    ///
    /// Untried actions get a baseline estimate of 0 before adjustment, which
    /// is how optimistic-reward exploration reaches actions the model has
    /// never seen. Ties go to the earliest action in the environment's order.
    /// With no experience and no policy entry the choice is uniform random.
    fn greedy_action(&self, state: &E::State, actions: &[E::Action]) -> E::Action {
        let no_info = self.model.tried_actions(state).next().is_none();
        if no_info && !self.engine.policy().contains_key(state) {
            return actions
                .choose(&mut thread_rng())
                .cloned()
                .expect("`actions` is not empty");
        }

        let mut best: Option<(&E::Action, f64)> = None;
        for action in actions {
            let estimate = self
                .model
                .expected_utility(state, action, self.engine.utilities())
                .unwrap_or(0.0);
            let estimate = self
                .strategy
                .adjusted_estimate(estimate, self.model.frequency(state, action));
            if best.map_or(true, |(_, b)| estimate > b) {
                best = Some((action, estimate));
            }
        }
        best.map(|(action, _)| action.clone())
            .expect("`actions` is not empty")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exploration::{GlieRandom, OptimisticReward};
    use crate::gym::Corridor;

    /// One decision: action 0 from state 0 reaches terminal state 1, reward +1
    struct TwoState;

    impl Environment for TwoState {
        type State = u8;
        type Action = u8;

        fn starting_state(&self) -> u8 {
            0
        }

        fn actions(&self, _state: &u8) -> Vec<u8> {
            vec![0]
        }

        fn step(&mut self, _state: &u8, _action: &u8) -> Step<Self> {
            Step {
                next_state: 1,
                reward: 1.0,
                terminal: true,
            }
        }
    }

    /// No terminal transitions reachable, every step costs 0.04
    struct NoExit;

    impl Environment for NoExit {
        type State = u8;
        type Action = u8;

        fn starting_state(&self) -> u8 {
            0
        }

        fn actions(&self, _state: &u8) -> Vec<u8> {
            vec![0]
        }

        fn step(&mut self, _state: &u8, _action: &u8) -> Step<Self> {
            Step {
                next_state: 0,
                reward: -0.04,
                terminal: false,
            }
        }
    }

    #[test]
    fn one_trial_learns_the_single_decision() {
        let mut env = TwoState;
        let mut agent =
            AdpAgent::new(GlieRandom::default_schedule(), AdpAgentConfig::default()).unwrap();

        let policy = agent.learn(&mut env, 1).unwrap();
        assert_eq!(policy[&0], 0);
        assert!(agent.utilities()[&0] > 0.0);
        assert_eq!(agent.utilities()[&1], 1.0);
    }

    #[test]
    fn capped_episode_is_a_normal_outcome() {
        let mut env = NoExit;
        let config = AdpAgentConfig {
            max_steps_per_episode: 5,
            ..Default::default()
        };
        let mut agent = AdpAgent::new(GlieRandom::default_schedule(), config).unwrap();

        let record = agent.run_trial(&mut env).unwrap();
        assert_eq!(record.steps, 5);
        assert!(record.capped);
        assert!((record.reward + 0.2).abs() < 1e-12);
    }

    #[test]
    fn history_accumulates_across_trials() {
        let mut env = TwoState;
        let mut agent =
            AdpAgent::new(GlieRandom::default_schedule(), AdpAgentConfig::default()).unwrap();

        agent.learn(&mut env, 3).unwrap();
        assert_eq!(agent.history().len(), 3);
        assert!(agent.history().iter().all(|r| r.steps == 1 && !r.capped));

        agent.clear_experience();
        assert!(agent.history().is_empty());
        assert!(agent.policy().is_empty());
    }

    #[test]
    fn reset_discards_prior_experience() {
        let mut env = TwoState;
        let config = AdpAgentConfig {
            reset: true,
            ..Default::default()
        };
        let mut agent = AdpAgent::new(GlieRandom::default_schedule(), config).unwrap();

        agent.learn(&mut env, 2).unwrap();
        agent.learn(&mut env, 2).unwrap();
        assert_eq!(agent.history().len(), 2);
    }

    #[test]
    fn empty_action_set_is_a_contract_violation() {
        struct Broken;

        impl Environment for Broken {
            type State = u8;
            type Action = u8;

            fn starting_state(&self) -> u8 {
                0
            }

            fn actions(&self, _state: &u8) -> Vec<u8> {
                vec![]
            }

            fn step(&mut self, _state: &u8, _action: &u8) -> Step<Self> {
                unreachable!()
            }
        }

        let mut env = Broken;
        let mut agent =
            AdpAgent::new(GlieRandom::default_schedule(), AdpAgentConfig::default()).unwrap();
        assert_eq!(
            agent.run_trial(&mut env),
            Err(AdpError::NoAvailableActions)
        );
    }

    #[test]
    fn rejects_invalid_config() {
        let bad_cap = AdpAgentConfig {
            max_steps_per_episode: 0,
            ..Default::default()
        };
        assert!(AdpAgent::<TwoState, _>::new(GlieRandom::default_schedule(), bad_cap).is_err());

        let bad_gamma = AdpAgentConfig {
            gamma: 0.0,
            ..Default::default()
        };
        assert!(AdpAgent::<TwoState, _>::new(GlieRandom::default_schedule(), bad_gamma).is_err());

        let bad_floor = AdpAgentConfig {
            solve_reward_floor: 0.0,
            ..Default::default()
        };
        assert!(AdpAgent::<TwoState, _>::new(GlieRandom::default_schedule(), bad_floor).is_err());
    }

    #[test]
    fn learned_policy_solves_the_corridor_optimally() {
        let mut env = Corridor::new(4);
        let strategy = OptimisticReward::new(1.0, 1).unwrap();
        let config = AdpAgentConfig {
            max_steps_per_episode: 200,
            ..Default::default()
        };
        let mut agent = AdpAgent::new(strategy, config).unwrap();

        agent.learn(&mut env, 50).unwrap();
        let solution = agent.solve(&mut env).unwrap();

        assert!(solution.solved);
        // 0 -> 1 -> 2 -> 3 is the known shortest path
        assert_eq!(solution.actions.len(), 3);
        assert!((solution.reward - 0.92).abs() < 1e-12);
    }
}
