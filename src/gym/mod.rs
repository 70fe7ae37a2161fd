pub mod corridor;
pub mod grid_maze;

pub use corridor::Corridor;
pub use grid_maze::{GridMaze, MazeAction};
