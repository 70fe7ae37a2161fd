use crate::error::AdpError;

/// An implementation of a time-decaying value
///
/// Used by exploration policies to schedule the probability of taking a
/// random action as experience accumulates.
pub trait Decay {
    /// Calculate value at time `t`
    fn evaluate(&self, t: f64) -> f64;
}

/// A constant value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constant {
    value: f64,
}

impl Constant {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl Decay for Constant {
    fn evaluate(&self, _t: f64) -> f64 {
        self.value
    }
}

/// v(t) = max(floor, 1 / (factor · (t + 1)))
///
/// The greedy-in-the-limit-with-infinite-exploration schedule: exploration
/// probability decays toward `floor` as `t` grows, and is never larger than 1
/// for `factor ≥ 1`. A `floor` of 0 yields a pure GLIE schedule; a positive
/// `floor` keeps a minimum amount of exploration forever.
#[derive(Debug, Clone, PartialEq)]
pub struct Glie {
    factor: f64,
    floor: f64,
}

impl Glie {
    /// Initialize a GLIE schedule with decay-rate `factor` and floor probability `floor`
    ///
    /// `factor` must be positive and `floor` must be a probability in `[0, 1]`.
    pub fn new(factor: f64, floor: f64) -> Result<Self, AdpError> {
        if factor <= 0.0 {
            return Err(AdpError::InvalidConfig(format!(
                "GLIE decay factor must be positive, got {factor}"
            )));
        }
        if !(0.0..=1.0).contains(&floor) {
            return Err(AdpError::InvalidConfig(format!(
                "GLIE floor probability must be in [0, 1], got {floor}"
            )));
        }
        Ok(Self { factor, floor })
    }
}

impl Default for Glie {
    fn default() -> Self {
        Self {
            factor: 1.0,
            floor: 0.0,
        }
    }
}

impl Decay for Glie {
    fn evaluate(&self, t: f64) -> f64 {
        let &Self { factor, floor } = self;
        (1.0 / (factor * (t + 1.0))).max(floor)
    }
}

/// v(t) = v<sub>f</sub> + (v<sub>i</sub> - v<sub>f</sub>) · e<sup>-rt</sup>
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Exponential {
    rate: f64,
    vi: f64,
    vf: f64,
}

impl Exponential {
    pub fn new(rate: f64, vi: f64, vf: f64) -> Result<Self, AdpError> {
        if !((rate >= 0.0 && vi > vf) || (rate < 0.0 && vi < vf)) {
            return Err(AdpError::InvalidConfig(String::from(
                "`vi - vf` must have same sign as `rate`",
            )));
        }
        Ok(Self { rate, vi, vf })
    }
}

impl Decay for Exponential {
    fn evaluate(&self, t: f64) -> f64 {
        let &Self { rate, vi, vf } = self;
        vf + (vi - vf) * (-rate * t).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_decay() {
        let x = Constant::new(1.0);
        assert_eq!(x.evaluate(0.0), 1.0);
        assert_eq!(x.evaluate(1.0), 1.0);
    }

    #[test]
    fn glie_schedule() {
        let x = Glie::new(1.0, 0.05).unwrap();
        assert_eq!(x.evaluate(0.0), 1.0);
        assert_eq!(x.evaluate(1.0), 0.5);
        assert_eq!(x.evaluate(3.0), 0.25);
        // converges to the floor
        assert_eq!(x.evaluate(1e9), 0.05);
    }

    #[test]
    fn glie_monotone_non_increasing() {
        let x = Glie::new(2.0, 0.01).unwrap();
        let mut prev = x.evaluate(0.0);
        for i in 1..1000 {
            let p = x.evaluate(i as f64 * 0.02);
            assert!(p <= prev);
            prev = p;
        }
    }

    #[test]
    fn glie_rejects_bad_config() {
        assert!(Glie::new(0.0, 0.0).is_err());
        assert!(Glie::new(-1.0, 0.0).is_err());
        assert!(Glie::new(1.0, 1.5).is_err());
    }

    #[test]
    fn exponential_decay() {
        let x = Exponential::new(2.0, 2.0, 0.5).unwrap();
        assert_eq!(x.evaluate(0.0), 2.0);
        assert_eq!(x.evaluate(1.0), 0.5 + 1.5 * f64::exp(-2.0));
        assert!(Exponential::new(-1.0, 1.0, 0.0).is_err());
    }
}
