/// Exploration policy result
pub enum Choice {
    Explore,
    Exploit,
}

/// An exploration strategy layered over the greedy policy
///
/// A strategy can influence action selection in two ways: by randomizing the
/// choice itself ([`choose`](Exploration::choose), the GLIE-random approach)
/// or by shaping the utility estimates fed to policy iteration
/// ([`adjusted_estimate`](Exploration::adjusted_estimate), the
/// optimistic-reward approach).
pub trait Exploration {
    /// The estimate used for a `(state, action)` pair that has been tried `n`
    /// times, given the model-based expected utility `estimate`
    ///
    /// The default implementation passes the model estimate through unchanged.
    fn adjusted_estimate(&self, estimate: f64, n: u64) -> f64 {
        let _ = n;
        estimate
    }

    /// Invoke the strategy at a decision point
    ///
    /// Called once per action taken, so a strategy may keep a step counter.
    fn choose(&mut self) -> Choice;
}

mod glie_random;
mod optimistic;

pub use glie_random::GlieRandom;
pub use optimistic::OptimisticReward;
