use crate::env::{Environment, Step};

/// A deterministic one-dimensional shortest-path environment
///
/// The agent starts at position 0 and must walk to the far end of the
/// corridor, which is terminal and rewards +1. Every other move costs 0.04.
/// Walking into the left wall leaves the agent in place. The optimal episode
/// takes `length - 1` steps.
pub struct Corridor {
    length: i32,
}

impl Corridor {
    /// Initialize a corridor of `length` cells
    ///
    /// **Panics** if `length < 2`
    pub fn new(length: i32) -> Self {
        assert!(length >= 2, "a corridor needs at least two cells");
        Self { length }
    }
}

impl Environment for Corridor {
    type State = i32;
    type Action = i32;

    fn starting_state(&self) -> i32 {
        0
    }

    fn actions(&self, _state: &i32) -> Vec<i32> {
        vec![1, -1]
    }

    fn step(&mut self, state: &i32, action: &i32) -> Step<Self> {
        let next_state = (state + action).clamp(0, self.length - 1);
        if next_state == self.length - 1 {
            Step {
                next_state,
                reward: 1.0,
                terminal: true,
            }
        } else {
            Step {
                next_state,
                reward: -0.04,
                terminal: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_and_terminates() {
        let mut env = Corridor::new(3);
        assert_eq!(env.starting_state(), 0);

        let step = env.step(&0, &1);
        assert_eq!(step.next_state, 1);
        assert!(!step.terminal);

        let step = env.step(&1, &1);
        assert_eq!(step.next_state, 2);
        assert_eq!(step.reward, 1.0);
        assert!(step.terminal);
    }

    #[test]
    fn left_wall_blocks() {
        let mut env = Corridor::new(3);
        let step = env.step(&0, &-1);
        assert_eq!(step.next_state, 0);
        assert!(!step.terminal);
    }
}
