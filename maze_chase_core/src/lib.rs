use serde::{Deserialize, Serialize};

pub mod agent;
pub mod animation;
pub mod game;
pub mod level;
pub mod map;

pub use agent::{Agent, PlayerController, PursuerController, Step};
pub use game::{GameState, Snapshot, Status};
pub use level::{Level, LevelError, Spawn, load_level_from_string};
pub use map::{Cell, GridError, GridMap};

/// Represents a 2D coordinate. Row 0 is the top of the maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }

    /// Returns the cell one step away in `direction`.
    ///
    /// Returns `None` when the step would leave the grid on the low edge.
    /// The high edge is not known here; callers bounds-check against the map.
    pub fn step(self, direction: Direction) -> Option<Position> {
        let (dx, dy) = direction.delta();
        Some(Position {
            x: self.x.checked_add_signed(dx)?,
            y: self.y.checked_add_signed(dy)?,
        })
    }
}

/// One of the four grid-aligned headings an agent can face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Every direction, in the order pursuers collect redirect candidates.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit grid-step vector `(dx, dy)`.
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Right
    }
}
