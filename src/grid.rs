use crate::constants::WALL_DENSITY;
use crate::error::GridError;
use crate::rng::Rng;
use crate::types::{Cell, CellChange, Position};

/// Square board of cells, fixed size for the life of a session.
///
/// Writes are journaled so the owner can forward exactly the changed
/// coordinates to whoever draws the board. The grid never judges whether a
/// write is legal under the game rules.
#[derive(Clone, Debug)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
    changes: Vec<CellChange>,
}

impl Grid {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Cell::Empty; size * size],
            changes: Vec::new(),
        }
    }

    /// Lays walls independently on each cell with `WALL_DENSITY` odds.
    pub fn generate(size: usize, rng: &mut Rng) -> Self {
        let mut grid = Self::new(size);
        for cell in &mut grid.cells {
            if rng.chance(WALL_DENSITY) {
                *cell = Cell::Wall;
            }
        }
        grid
    }

    pub fn dimensions(&self) -> usize {
        self.size
    }

    pub fn get(&self, pos: Position) -> Result<Cell, GridError> {
        let index = self.checked_index(pos)?;
        Ok(self.cells[index])
    }

    pub fn set(&mut self, pos: Position, cell: Cell) -> Result<(), GridError> {
        let index = self.checked_index(pos)?;
        self.cells[index] = cell;
        self.changes.push(CellChange {
            position: pos,
            cell,
        });
        Ok(())
    }

    pub fn position_of(&self, index: usize) -> Position {
        Position::new((index / self.size) as i32, (index % self.size) as i32)
    }

    pub fn count(&self, predicate: impl Fn(Cell) -> bool) -> usize {
        self.cells.iter().filter(|cell| predicate(**cell)).count()
    }

    pub fn empty_positions(&self) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == Cell::Empty)
            .map(|(index, _)| self.position_of(index))
            .collect()
    }

    /// Row-major view of the whole board.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn drain_changes(&mut self) -> Vec<CellChange> {
        std::mem::take(&mut self.changes)
    }

    fn index_of(&self, pos: Position) -> Option<usize> {
        if pos.row < 0 || pos.col < 0 {
            return None;
        }
        let (row, col) = (pos.row as usize, pos.col as usize);
        if row >= self.size || col >= self.size {
            return None;
        }
        Some(row * self.size + col)
    }

    fn checked_index(&self, pos: Position) -> Result<usize, GridError> {
        self.index_of(pos).ok_or(GridError::OutOfBounds {
            row: pos.row,
            col: pos.col,
            size: self.size,
        })
    }
}
