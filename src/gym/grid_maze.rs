use rand::{thread_rng, Rng};

use crate::{
    env::{Environment, Step},
    error::AdpError,
};

/// A movement direction in a [`GridMaze`]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MazeAction {
    Up,
    Down,
    Left,
    Right,
}

impl MazeAction {
    const ALL: [MazeAction; 4] = [
        MazeAction::Up,
        MazeAction::Down,
        MazeAction::Left,
        MazeAction::Right,
    ];

    /// Offset in `(row, col)` with row 0 at the top of the map
    fn delta(self) -> (isize, isize) {
        match self {
            MazeAction::Up => (-1, 0),
            MazeAction::Down => (1, 0),
            MazeAction::Left => (0, -1),
            MazeAction::Right => (0, 1),
        }
    }

    /// The two directions at right angles to this one
    fn perpendicular(self) -> [MazeAction; 2] {
        match self {
            MazeAction::Up | MazeAction::Down => [MazeAction::Left, MazeAction::Right],
            MazeAction::Left | MazeAction::Right => [MazeAction::Up, MazeAction::Down],
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
enum Cell {
    Free,
    Wall,
    End(f64),
}

/// A stochastic grid-world maze built from a text map
///
/// Map characters: `#` wall, `+` terminal cell with reward +1, `-` terminal
/// cell with reward -1, `A` the starting cell, space a free cell. Every
/// non-terminal move costs 0.04.
///
/// Movement is noisy: the intended direction is taken with probability
/// `1 - noise`, and each of the two perpendicular directions with probability
/// `noise / 2`. A move into a wall or off the map leaves the agent in place.
/// A `noise` of 0 makes the maze deterministic, which is convenient in tests.
///
/// ### Example
/// ```
/// use adp::gym::GridMaze;
///
/// let maze = GridMaze::new(&[
///     "######",
///     "#   +#",
///     "# # -#",
///     "#A   #",
///     "######",
/// ], 0.2).unwrap();
/// ```
pub struct GridMaze {
    cells: Vec<Vec<Cell>>,
    start: (usize, usize),
    noise: f64,
}

impl GridMaze {
    /// Parse a maze from map rows
    ///
    /// **Errors** if the map has no `A` cell, contains an unknown character,
    /// or `noise` is not in `[0, 1)`.
    pub fn new(map: &[&str], noise: f64) -> Result<Self, AdpError> {
        if !(0.0..1.0).contains(&noise) {
            return Err(AdpError::InvalidConfig(format!(
                "maze noise must be in [0, 1), got {noise}"
            )));
        }

        let mut cells = Vec::with_capacity(map.len());
        let mut start = None;
        for (i, row) in map.iter().enumerate() {
            let mut cell_row = Vec::with_capacity(row.len());
            for (j, c) in row.chars().enumerate() {
                let cell = match c {
                    '#' => Cell::Wall,
                    '+' => Cell::End(1.0),
                    '-' => Cell::End(-1.0),
                    ' ' => Cell::Free,
                    'A' => {
                        if start.replace((i, j)).is_some() {
                            return Err(AdpError::InvalidConfig(String::from(
                                "maze map has more than one starting cell",
                            )));
                        }
                        Cell::Free
                    }
                    other => {
                        return Err(AdpError::InvalidConfig(format!(
                            "unknown maze map character {other:?} at row {i}, column {j}"
                        )));
                    }
                };
                cell_row.push(cell);
            }
            cells.push(cell_row);
        }

        let start = start.ok_or_else(|| {
            AdpError::InvalidConfig(String::from("maze map has no starting cell `A`"))
        })?;
        Ok(Self {
            cells,
            start,
            noise,
        })
    }

    fn cell(&self, pos: (usize, usize)) -> Cell {
        self.cells
            .get(pos.0)
            .and_then(|row| row.get(pos.1))
            .copied()
            .unwrap_or(Cell::Wall)
    }

    /// The cell reached by moving from `pos` in `direction`, staying in place
    /// when the move hits a wall or leaves the map
    fn target(&self, pos: (usize, usize), direction: MazeAction) -> (usize, usize) {
        let (di, dj) = direction.delta();
        let Some(i) = pos.0.checked_add_signed(di) else {
            return pos;
        };
        let Some(j) = pos.1.checked_add_signed(dj) else {
            return pos;
        };
        if self.cell((i, j)) == Cell::Wall {
            pos
        } else {
            (i, j)
        }
    }
}

impl Environment for GridMaze {
    type State = (usize, usize);
    type Action = MazeAction;

    fn starting_state(&self) -> (usize, usize) {
        self.start
    }

    fn actions(&self, state: &(usize, usize)) -> Vec<MazeAction> {
        MazeAction::ALL
            .into_iter()
            .filter(|&direction| self.target(*state, direction) != *state)
            .collect()
    }

    fn step(&mut self, state: &(usize, usize), action: &MazeAction) -> Step<Self> {
        let r = thread_rng().gen::<f64>();
        let direction = if r < 1.0 - self.noise {
            *action
        } else {
            let [left, right] = action.perpendicular();
            if r < 1.0 - self.noise / 2.0 {
                left
            } else {
                right
            }
        };

        let next_state = self.target(*state, direction);
        match self.cell(next_state) {
            Cell::End(reward) => Step {
                next_state,
                reward,
                terminal: true,
            },
            _ => Step {
                next_state,
                reward: -0.04,
                terminal: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::{AdpAgent, AdpAgentConfig};
    use crate::exploration::OptimisticReward;

    const BOOK_MAP: [&str; 5] = [
        "######",
        "#   +#",
        "# # -#",
        "#A   #",
        "######",
    ];

    #[test]
    fn parses_the_map() {
        let maze = GridMaze::new(&BOOK_MAP, 0.2).unwrap();
        assert_eq!(maze.starting_state(), (3, 1));
        assert_eq!(maze.cell((1, 4)), Cell::End(1.0));
        assert_eq!(maze.cell((2, 4)), Cell::End(-1.0));
        assert_eq!(maze.cell((2, 2)), Cell::Wall);
    }

    #[test]
    fn rejects_bad_maps() {
        assert!(GridMaze::new(&["#+#"], 0.0).is_err()); // no start
        assert!(GridMaze::new(&["#A?+#"], 0.0).is_err()); // unknown character
        assert!(GridMaze::new(&["#AA+#"], 0.0).is_err()); // two starts
        assert!(GridMaze::new(&["#A +#"], 1.0).is_err()); // noise out of range
    }

    #[test]
    fn actions_exclude_walls() {
        let maze = GridMaze::new(&BOOK_MAP, 0.0).unwrap();
        assert_eq!(
            maze.actions(&(3, 1)),
            vec![MazeAction::Up, MazeAction::Right]
        );
    }

    #[test]
    fn deterministic_moves_and_terminals() {
        let mut maze = GridMaze::new(&BOOK_MAP, 0.0).unwrap();

        let step = maze.step(&(3, 1), &MazeAction::Up);
        assert_eq!(step.next_state, (2, 1));
        assert_eq!(step.reward, -0.04);
        assert!(!step.terminal);

        // moving into a wall leaves the agent in place
        let step = maze.step(&(3, 1), &MazeAction::Down);
        assert_eq!(step.next_state, (3, 1));
        assert!(!step.terminal);

        let step = maze.step(&(1, 3), &MazeAction::Right);
        assert_eq!(step.next_state, (1, 4));
        assert_eq!(step.reward, 1.0);
        assert!(step.terminal);

        let step = maze.step(&(2, 3), &MazeAction::Right);
        assert_eq!(step.reward, -1.0);
        assert!(step.terminal);
    }

    #[test]
    fn agent_learns_a_path_to_the_goal() {
        let mut maze = GridMaze::new(&BOOK_MAP, 0.0).unwrap();
        let strategy = OptimisticReward::new(1.0, 1).unwrap();
        let config = AdpAgentConfig {
            max_steps_per_episode: 100,
            ..Default::default()
        };
        let mut agent = AdpAgent::new(strategy, config).unwrap();

        agent.learn(&mut maze, 100).unwrap();
        let solution = agent.solve(&mut maze).unwrap();

        assert!(solution.solved);
        // both shortest routes to `+` take 5 moves and collect 0.84
        assert!(solution.reward > 0.5);
    }
}
