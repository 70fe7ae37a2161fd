use rand::{thread_rng, Rng};

use crate::{
    decay::{Decay, Glie},
    error::AdpError,
};

use super::{Choice, Exploration};

/// Decaying random exploration with a time-decaying exploration probability
///
/// At each decision point the agent takes a uniformly random action with
/// probability given by the schedule, and the greedy action otherwise. With a
/// [`Glie`] schedule the exploration probability tends to the floor as the
/// step counter grows, so the agent becomes greedy in the limit while every
/// action keeps being tried (GLIE).
///
/// The step counter is owned by the strategy and carries across trials, so
/// exploration decays over the whole learning run rather than restarting
/// every episode.
pub struct GlieRandom<D: Decay> {
    schedule: D,
    t: f64,
    t_step: f64,
}

impl GlieRandom<Glie> {
    /// Initialize with the default [`Glie`] schedule, `t₀ = 0`, and a step
    /// increment of `0.02`
    pub fn default_schedule() -> Self {
        Self {
            schedule: Glie::default(),
            t: 0.0,
            t_step: 0.02,
        }
    }
}

impl<D: Decay> GlieRandom<D> {
    /// Initialize decaying random exploration
    ///
    /// ### Parameters
    /// - `schedule` - The decay strategy mapping the step counter to an exploration probability
    /// - `t0` - Initial value of the step counter - must be non-negative
    /// - `t_step` - Counter increment per action taken - must be positive
    pub fn new(schedule: D, t0: f64, t_step: f64) -> Result<Self, AdpError> {
        if t0 < 0.0 {
            return Err(AdpError::InvalidConfig(format!(
                "initial exploration counter must be non-negative, got {t0}"
            )));
        }
        if t_step <= 0.0 {
            return Err(AdpError::InvalidConfig(format!(
                "exploration counter step must be positive, got {t_step}"
            )));
        }
        Ok(Self {
            schedule,
            t: t0,
            t_step,
        })
    }

    /// The current exploration probability
    pub fn probability(&self) -> f64 {
        self.schedule.evaluate(self.t)
    }
}

impl<D: Decay> Exploration for GlieRandom<D> {
    fn choose(&mut self) -> Choice {
        let p = self.schedule.evaluate(self.t);
        self.t += self.t_step;
        if thread_rng().gen::<f64>() < p {
            Choice::Explore
        } else {
            Choice::Exploit
        }
    }
}
