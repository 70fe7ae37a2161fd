use crate::error::AdpError;

use super::{Choice, Exploration};

/// Optimistic-reward exploration
///
/// A deterministic alternative to random exploration: any `(state, action)`
/// pair tried fewer than `n_e` times is valued at the optimistic constant
/// `r_plus` instead of its model-based estimate, which pulls the greedy
/// policy toward under-sampled actions. Once a pair has `n_e` samples the
/// true estimate is used and the bonus vanishes.
///
/// `r_plus` should be an upper bound on the reward attainable anywhere in the
/// environment, otherwise well-known good actions can still dominate untried
/// ones and exploration stalls.
pub struct OptimisticReward {
    r_plus: f64,
    n_e: u64,
}

impl OptimisticReward {
    /// Initialize optimistic-reward exploration
    ///
    /// ### Parameters
    /// - `r_plus` - Optimistic utility assigned to under-sampled pairs
    /// - `n_e` - Number of samples after which the true estimate is trusted - must be at least 1
    pub fn new(r_plus: f64, n_e: u64) -> Result<Self, AdpError> {
        if n_e == 0 {
            return Err(AdpError::InvalidConfig(String::from(
                "optimistic sample threshold `n_e` must be at least 1",
            )));
        }
        Ok(Self { r_plus, n_e })
    }
}

impl Exploration for OptimisticReward {
    fn adjusted_estimate(&self, estimate: f64, n: u64) -> f64 {
        if n < self.n_e {
            self.r_plus
        } else {
            estimate
        }
    }

    fn choose(&mut self) -> Choice {
        Choice::Exploit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_below_threshold() {
        let x = OptimisticReward::new(5.0, 3).unwrap();
        assert_eq!(x.adjusted_estimate(-1.0, 0), 5.0);
        assert_eq!(x.adjusted_estimate(100.0, 2), 5.0);
        assert_eq!(x.adjusted_estimate(-1.0, 3), -1.0);
        assert_eq!(x.adjusted_estimate(0.25, 10), 0.25);
    }

    #[test]
    fn never_randomizes() {
        let mut x = OptimisticReward::new(1.0, 1).unwrap();
        for _ in 0..10 {
            assert!(matches!(x.choose(), Choice::Exploit));
        }
    }

    #[test]
    fn rejects_zero_threshold() {
        assert!(OptimisticReward::new(1.0, 0).is_err());
    }
}
