use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::{Direction, Position};

/// Represents errors that can occur while building or querying a maze grid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Coordinates ({x}, {y}) are out of bounds for grid size ({width}, {height})")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    #[error("Grid has zero width or height")]
    Empty,
    #[error("Inconsistent width at row {row}: expected {expected}, found {found}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Unknown cell value {value} at ({x}, {y})")]
    UnknownCell { value: u8, x: usize, y: usize },
    #[error("Cannot consume a pickup from the wall at ({x}, {y})")]
    WallConsumed { x: usize, y: usize },
}

/// A generic 2D grid structure.
///
/// Stores elements of type `T` in a flat vector using row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Builds a grid from equally sized rows.
    ///
    /// Fails with [`GridError::Empty`] when there are no rows or the first row
    /// is empty, and with [`GridError::Ragged`] when any row differs in length
    /// from the first.
    pub fn from_rows<R, F>(rows: &[R], mut f: F) -> Result<Self, GridError>
    where
        R: AsRef<[u8]>,
        F: FnMut(usize, usize, u8) -> Result<T, GridError>,
    {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.as_ref().len());
        if width == 0 || height == 0 {
            return Err(GridError::Empty);
        }

        let mut cells = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(GridError::Ragged {
                    row: y,
                    expected: width,
                    found: row.len(),
                });
            }
            for (x, &value) in row.iter().enumerate() {
                cells.push(f(x, y, value)?);
            }
        }

        Ok(Grid {
            width,
            height,
            cells,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Converts a position to a flat vector index.
    ///
    /// Returns `None` if the position is out of bounds.
    #[inline]
    fn index_of(&self, pos: Position) -> Option<usize> {
        if self.is_valid(pos) {
            Some(pos.y * self.width + pos.x)
        } else {
            None
        }
    }

    /// Checks if the given position is within the grid boundaries.
    #[inline]
    pub fn is_valid(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    pub fn get(&self, pos: Position) -> Option<&T> {
        self.index_of(pos).map(|idx| &self.cells[idx])
    }

    pub fn get_mut(&mut self, pos: Position) -> Option<&mut T> {
        self.index_of(pos).map(move |idx| &mut self.cells[idx])
    }

    fn out_of_bounds(&self, pos: Position) -> GridError {
        GridError::OutOfBounds {
            x: pos.x,
            y: pos.y,
            width: self.width,
            height: self.height,
        }
    }

    /// Returns an iterator that yields `(Position, &T)` for each cell in
    /// row-major order.
    pub fn enumerate(&self) -> impl Iterator<Item = (Position, &T)> {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, cell)| (Position::new(index % width, index / width), cell))
    }

    /// Iterates over the grid one row at a time.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.cells.chunks(self.width)
    }
}

impl<T> Index<Position> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, pos: Position) -> &Self::Output {
        match self.index_of(pos) {
            Some(idx) => &self.cells[idx],
            None => panic!(
                "Grid index ({}, {}) out of bounds for grid size ({}, {})",
                pos.x, pos.y, self.width, self.height
            ),
        }
    }
}

/// Classification of a single maze cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Wall,
    Pickup,
    Open,
}

impl Cell {
    /// Decodes the level encoding: 0 = Wall, 1 = Pickup, 2 = Open.
    pub const fn from_code(code: u8) -> Option<Cell> {
        match code {
            0 => Some(Cell::Wall),
            1 => Some(Cell::Pickup),
            2 => Some(Cell::Open),
            _ => None,
        }
    }

    pub const fn code(self) -> u8 {
        match self {
            Cell::Wall => 0,
            Cell::Pickup => 1,
            Cell::Open => 2,
        }
    }
}

/// The static maze layout plus pickup consumption state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridMap {
    cells: Grid<Cell>,
    total_pickups: usize,
    remaining_pickups: usize,
}

impl GridMap {
    /// Loads a maze from rows of cell codes.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, GridError> {
        let cells = Grid::from_rows(rows, |x, y, value| {
            Cell::from_code(value).ok_or(GridError::UnknownCell { value, x, y })
        })?;
        let total_pickups = cells.enumerate().filter(|(_, c)| **c == Cell::Pickup).count();
        Ok(GridMap {
            cells,
            total_pickups,
            remaining_pickups: total_pickups,
        })
    }

    pub fn width(&self) -> usize {
        self.cells.width()
    }

    pub fn height(&self) -> usize {
        self.cells.height()
    }

    /// True when `pos` lies inside the grid and is not a wall.
    pub fn is_passable(&self, pos: Position) -> bool {
        matches!(self.cells.get(pos), Some(Cell::Pickup | Cell::Open))
    }

    /// Returns the passable cell adjacent to `pos` in `direction`, if any.
    ///
    /// All neighbour lookups go through here so that edge cells never index
    /// past the grid.
    pub fn neighbor(&self, pos: Position, direction: Direction) -> Option<Position> {
        pos.step(direction).filter(|next| self.is_passable(*next))
    }

    pub fn cell_kind(&self, pos: Position) -> Result<Cell, GridError> {
        self.cells
            .get(pos)
            .copied()
            .ok_or_else(|| self.cells.out_of_bounds(pos))
    }

    /// Turns a pickup into open floor.
    ///
    /// Returns `Ok(true)` if a pickup was consumed and `Ok(false)` if the cell
    /// was already open.
    pub fn consume_pickup(&mut self, pos: Position) -> Result<bool, GridError> {
        let bounds_err = self.cells.out_of_bounds(pos);
        let cell = self.cells.get_mut(pos).ok_or(bounds_err)?;
        match *cell {
            Cell::Pickup => {
                *cell = Cell::Open;
                self.remaining_pickups -= 1;
                Ok(true)
            }
            Cell::Open => Ok(false),
            Cell::Wall => Err(GridError::WallConsumed { x: pos.x, y: pos.y }),
        }
    }

    pub fn remaining_pickups(&self) -> usize {
        self.remaining_pickups
    }

    /// Number of pickups present when the map was loaded.
    pub fn total_pickups(&self) -> usize {
        self.total_pickups
    }

    pub fn cells(&self) -> impl Iterator<Item = (Position, Cell)> + '_ {
        self.cells.enumerate().map(|(pos, cell)| (pos, *cell))
    }

    /// Encodes the current state back into level codes.
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.cells
            .rows()
            .map(|row| row.iter().map(|cell| cell.code()).collect())
            .collect()
    }
}

impl Index<Position> for GridMap {
    type Output = Cell;

    fn index(&self, pos: Position) -> &Cell {
        &self.cells[pos]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> GridMap {
        GridMap::from_rows(&[vec![0, 0, 0, 0], vec![0, 1, 2, 0], vec![0, 0, 0, 0]]).unwrap()
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = GridMap::from_rows(&[vec![0, 1, 0], vec![0, 1]]).unwrap_err();
        assert_eq!(
            err,
            GridError::Ragged {
                row: 1,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn empty_grids_are_rejected() {
        let no_rows: [Vec<u8>; 0] = [];
        assert_eq!(GridMap::from_rows(&no_rows).unwrap_err(), GridError::Empty);
        assert_eq!(
            GridMap::from_rows(&[Vec::<u8>::new()]).unwrap_err(),
            GridError::Empty
        );
    }

    #[test]
    fn unknown_codes_are_rejected() {
        let err = GridMap::from_rows(&[vec![0, 7]]).unwrap_err();
        assert_eq!(err, GridError::UnknownCell { value: 7, x: 1, y: 0 });
    }

    #[test]
    fn passability_checks_bounds_and_walls() {
        let map = corridor();
        assert!(map.is_passable(Position::new(1, 1)));
        assert!(map.is_passable(Position::new(2, 1)));
        assert!(!map.is_passable(Position::new(0, 1)));
        assert!(!map.is_passable(Position::new(4, 1)));
        assert!(!map.is_passable(Position::new(1, 3)));
    }

    #[test]
    fn neighbor_stops_at_low_edge() {
        let map = GridMap::from_rows(&[vec![1, 1]]).unwrap();
        assert_eq!(map.neighbor(Position::new(0, 0), Direction::Left), None);
        assert_eq!(map.neighbor(Position::new(0, 0), Direction::Up), None);
        assert_eq!(
            map.neighbor(Position::new(0, 0), Direction::Right),
            Some(Position::new(1, 0))
        );
    }

    #[test]
    fn cell_kind_reports_out_of_bounds() {
        let map = corridor();
        assert_eq!(map.cell_kind(Position::new(2, 1)), Ok(Cell::Open));
        assert_eq!(
            map.cell_kind(Position::new(9, 1)),
            Err(GridError::OutOfBounds {
                x: 9,
                y: 1,
                width: 4,
                height: 3
            })
        );
    }

    #[test]
    fn consuming_pickups_updates_the_counter() {
        let mut map = corridor();
        assert_eq!(map.total_pickups(), 1);
        assert_eq!(map.consume_pickup(Position::new(1, 1)), Ok(true));
        assert_eq!(map.remaining_pickups(), 0);
        assert_eq!(map[Position::new(1, 1)], Cell::Open);
        // Second visit is a no-op.
        assert_eq!(map.consume_pickup(Position::new(1, 1)), Ok(false));
        assert_eq!(map.remaining_pickups(), 0);
        assert_eq!(map.total_pickups(), 1);
    }

    #[test]
    fn consuming_a_wall_is_an_error() {
        let mut map = corridor();
        assert_eq!(
            map.consume_pickup(Position::new(0, 0)),
            Err(GridError::WallConsumed { x: 0, y: 0 })
        );
        assert_eq!(map.remaining_pickups(), 1);
    }

    #[test]
    fn to_rows_reflects_consumed_pickups() {
        let mut map = corridor();
        map.consume_pickup(Position::new(1, 1)).unwrap();
        assert_eq!(
            map.to_rows(),
            vec![vec![0, 0, 0, 0], vec![0, 2, 2, 0], vec![0, 0, 0, 0]]
        );
    }
}
