//! Snapshot - a read-only frame for presentation.
//!
//! Captured after every robot has updated for a tick. Nothing here can
//! reach back into the grid or the robots.
//!
//! The ASCII frame draws two characters per cell:
//!
//! | cell            | glyph |
//! |-----------------|-------|
//! | wall            | `##`  |
//! | empty floor     | ` .`  |
//! | box of size n   | ` n`  |
//! | pivot of size n | `*n`  |
//! | robot           | ` R`  |
//! | carrying robot  | ` C`  |

use serde::{Deserialize, Serialize};
use stackyard_core::grid::Grid;
use stackyard_core::types::{Position, RobotState, Tick};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub at: Position,
    pub wall: bool,
    /// Size of the box on this cell, if any.
    pub stack: Option<u8>,
    pub pivot: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotSnapshot {
    pub name: String,
    pub at: Position,
    pub state: RobotState,
    pub carrying: bool,
}

/// One frame of the warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub tick: Tick,
    pub rows: usize,
    pub cols: usize,
    pub movements: u64,
    /// Every cell, row by row.
    pub cells: Vec<CellSnapshot>,
    pub robots: Vec<RobotSnapshot>,
}

impl GridSnapshot {
    pub fn capture(grid: &Grid, tick: Tick, movements: u64) -> Self {
        let cells = grid
            .iter_cells()
            .map(|(at, cell)| CellSnapshot {
                at,
                wall: cell.is_wall(),
                stack: cell.stack().map(|b| b.size()),
                pivot: cell.stack().is_some_and(|b| b.is_pivot()),
            })
            .collect();

        let robots = grid
            .robots()
            .iter()
            .map(|handle| {
                handle.read(|v| RobotSnapshot {
                    name: v.name.clone(),
                    at: v.position,
                    state: v.state,
                    carrying: v.carrying,
                })
            })
            .collect();

        Self {
            tick,
            rows: grid.rows(),
            cols: grid.cols(),
            movements,
            cells,
            robots,
        }
    }

    pub fn cell(&self, at: Position) -> Option<&CellSnapshot> {
        if at.x < 0 || at.y < 0 || at.x as usize >= self.cols || at.y as usize >= self.rows {
            return None;
        }
        self.cells.get(at.y as usize * self.cols + at.x as usize)
    }

    pub fn box_count(&self) -> usize {
        self.cells.iter().filter(|c| c.stack.is_some()).count()
    }

    /// Draw the frame as text, one line per row.
    pub fn render_ascii(&self) -> String {
        let mut frame = String::with_capacity(self.rows * (self.cols * 2 + 1));
        for y in 0..self.rows {
            for x in 0..self.cols {
                let at = Position::new(x as i32, y as i32);
                let glyph = match self.robots.iter().find(|r| r.at == at) {
                    Some(r) if r.carrying => " C".to_string(),
                    Some(_) => " R".to_string(),
                    None => match self.cell(at) {
                        Some(c) if c.wall => "##".to_string(),
                        Some(CellSnapshot {
                            stack: Some(size),
                            pivot,
                            ..
                        }) => format!("{}{}", if *pivot { '*' } else { ' ' }, size),
                        _ => " .".to_string(),
                    },
                };
                frame.push_str(&glyph);
            }
            frame.push('\n');
        }
        frame
    }

    pub fn to_json(&self) -> stackyard_core::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackyard_core::presence::{RobotHandle, RobotView};

    #[test]
    fn renders_every_kind_of_cell() {
        let mut grid = Grid::new(2, 4);
        grid.add_wall_range(0, 0, 0, 0);
        grid.place_box(1, 0, 3).unwrap();
        grid.place_box(2, 0, 1).unwrap();
        grid.box_at_mut(Position::new(2, 0)).unwrap().mark_pivot();

        let idle = RobotHandle::new(RobotView::new("a", Position::new(0, 1)));
        let carrier = RobotHandle::new(RobotView::new("b", Position::new(3, 1)));
        carrier.update(|v| v.carrying = true);
        grid.add_robot(idle);
        grid.add_robot(carrier);

        let snapshot = GridSnapshot::capture(&grid, 7, 12);
        assert_eq!(snapshot.render_ascii(), "## 3*1 .\n R . . C\n");
        assert_eq!(snapshot.box_count(), 2);
        assert_eq!(snapshot.tick, 7);
        assert_eq!(snapshot.movements, 12);
        assert!(snapshot.cell(Position::new(2, 0)).unwrap().pivot);
        assert!(snapshot.cell(Position::new(4, 0)).is_none());
    }
}
