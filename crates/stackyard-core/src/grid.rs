//! Grid - the warehouse floor.
//!
//! A rows×cols matrix of cells stored row-major. Each cell is either empty
//! floor or wall, and an empty cell may own one [`StackBox`]. Walls and boxes
//! are mutually exclusive on a cell.
//!
//! The grid also keeps an observation list of robot handles. It does not own
//! the robots; the list exists so that robots can see each other's claims and
//! so that the presentation layer can draw them.

use crate::error::{Result, StackyardError};
use crate::presence::RobotHandle;
use crate::stack::StackBox;
use crate::types::Position;
use serde::{Deserialize, Serialize};

/// What a cell is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CellKind {
    #[default]
    Empty,
    Wall,
}

/// One grid cell.
#[derive(Debug, Clone, Default)]
pub struct Cell {
    pub kind: CellKind,
    stack: Option<StackBox>,
}

impl Cell {
    /// The box owned by this cell, if any.
    pub fn stack(&self) -> Option<&StackBox> {
        self.stack.as_ref()
    }

    pub fn is_wall(&self) -> bool {
        self.kind == CellKind::Wall
    }
}

/// An inclusive rectangle of wall cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallRange {
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
}

impl WallRange {
    pub fn new(start_x: i32, start_y: i32, end_x: i32, end_y: i32) -> Self {
        Self {
            start_x,
            start_y,
            end_x,
            end_y,
        }
    }
}

/// The warehouse floor.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    robots: Vec<RobotHandle>,
}

impl Grid {
    /// Create an all-empty grid.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::default(); rows * cols],
            robots: Vec::new(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn in_bounds(&self, at: Position) -> bool {
        self.index(at).is_some()
    }

    fn index(&self, at: Position) -> Option<usize> {
        if at.x < 0 || at.y < 0 {
            return None;
        }
        let (x, y) = (at.x as usize, at.y as usize);
        if x >= self.cols || y >= self.rows {
            return None;
        }
        Some(y * self.cols + x)
    }

    fn position_of(&self, index: usize) -> Position {
        Position::new((index % self.cols) as i32, (index / self.cols) as i32)
    }

    /// Get a cell, or `None` when out of bounds.
    pub fn cell(&self, at: Position) -> Option<&Cell> {
        self.index(at).map(|i| &self.cells[i])
    }

    /// Every cell with its coordinate, row by row.
    pub fn iter_cells(&self) -> impl Iterator<Item = (Position, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (self.position_of(i), cell))
    }

    // --- Boxes ---

    /// Create a box of `size` (clamped to `[1, 5]`) owned by cell `(x, y)`.
    ///
    /// Walls and occupied cells are rejected rather than overwritten.
    pub fn place_box(&mut self, x: i32, y: i32, size: i32) -> Result<()> {
        let at = Position::new(x, y);
        let idx = self.index(at).ok_or(StackyardError::OutOfBounds { x, y })?;
        let cell = &mut self.cells[idx];
        if cell.is_wall() {
            return Err(StackyardError::Wall { x, y });
        }
        if cell.stack.is_some() {
            return Err(StackyardError::CellOccupied { x, y });
        }
        cell.stack = Some(StackBox::new(at, size));
        Ok(())
    }

    /// Destroy the box at `(x, y)` and reset the cell to empty floor.
    /// Returns whether a box was destroyed.
    pub fn remove_box(&mut self, x: i32, y: i32) -> bool {
        let Some(idx) = self.index(Position::new(x, y)) else {
            return false;
        };
        let cell = &mut self.cells[idx];
        cell.kind = CellKind::Empty;
        cell.stack.take().is_some()
    }

    /// Whether `(x, y)` holds a box. Out-of-bounds cells hold none.
    pub fn has_box(&self, x: i32, y: i32) -> bool {
        self.box_at(Position::new(x, y)).is_some()
    }

    pub fn box_at(&self, at: Position) -> Option<&StackBox> {
        self.cell(at).and_then(|c| c.stack.as_ref())
    }

    pub fn box_at_mut(&mut self, at: Position) -> Option<&mut StackBox> {
        let idx = self.index(at)?;
        self.cells[idx].stack.as_mut()
    }

    /// Hand the box at `at` over to the caller. The cell is left empty.
    pub fn take_box(&mut self, at: Position) -> Option<StackBox> {
        let idx = self.index(at)?;
        let cell = &mut self.cells[idx];
        let stack = cell.stack.take()?;
        cell.kind = CellKind::Empty;
        Some(stack)
    }

    /// Merge `incoming` into the box at `at`, destroying `incoming`.
    ///
    /// Returns the merged size, or gives `incoming` back when there is no box
    /// to merge into.
    pub fn merge_into(&mut self, at: Position, incoming: StackBox) -> std::result::Result<u8, StackBox> {
        match self.box_at_mut(at) {
            Some(target) => Ok(target.merge(incoming)),
            None => Err(incoming),
        }
    }

    /// All boxes, row by row.
    pub fn boxes(&self) -> impl Iterator<Item = &StackBox> + '_ {
        self.cells.iter().filter_map(|c| c.stack.as_ref())
    }

    pub fn box_count(&self) -> usize {
        self.boxes().count()
    }

    /// Positions of every box flagged as pivot. At most one in a healthy grid.
    pub fn pivot_positions(&self) -> Vec<Position> {
        self.boxes()
            .filter(|b| b.is_pivot())
            .map(|b| b.position)
            .collect()
    }

    // --- Walls ---

    /// Mark an inclusive rectangle as wall, clamped to the grid, destroying
    /// any boxes inside. Returns the number of boxes destroyed.
    pub fn add_wall_range(&mut self, start_x: i32, start_y: i32, end_x: i32, end_y: i32) -> usize {
        if self.rows == 0 || self.cols == 0 {
            return 0;
        }
        let start_x = start_x.max(0);
        let start_y = start_y.max(0);
        let end_x = end_x.min(self.cols as i32 - 1);
        let end_y = end_y.min(self.rows as i32 - 1);

        let mut destroyed = 0;
        for y in start_y..=end_y {
            for x in start_x..=end_x {
                if let Some(idx) = self.index(Position::new(x, y)) {
                    let cell = &mut self.cells[idx];
                    cell.kind = CellKind::Wall;
                    if cell.stack.take().is_some() {
                        destroyed += 1;
                    }
                }
            }
        }
        if destroyed > 0 {
            tracing::debug!(destroyed, "wall range destroyed boxes");
        }
        destroyed
    }

    pub fn add_walls(&mut self, range: &WallRange) -> usize {
        self.add_wall_range(range.start_x, range.start_y, range.end_x, range.end_y)
    }

    pub fn is_wall(&self, at: Position) -> bool {
        self.cell(at).is_some_and(Cell::is_wall)
    }

    /// Whether a route to `destination` may pass through `at`.
    ///
    /// Walls are never traversable. A box-occupied cell may only be entered
    /// as the destination itself.
    pub fn is_traversable(&self, at: Position, destination: Position) -> bool {
        match self.cell(at) {
            None => false,
            Some(cell) if cell.is_wall() => false,
            Some(cell) => cell.stack.is_none() || at == destination,
        }
    }

    /// Cells that are neither wall nor box.
    pub fn free_cells(&self) -> Vec<Position> {
        self.iter_cells()
            .filter(|(_, c)| !c.is_wall() && c.stack.is_none())
            .map(|(p, _)| p)
            .collect()
    }

    // --- Robots (observation only) ---

    pub fn add_robot(&mut self, robot: RobotHandle) {
        self.robots.push(robot);
    }

    pub fn robots(&self) -> &[RobotHandle] {
        &self.robots
    }
}
