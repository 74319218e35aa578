//! Shared types used across the grid, the agents and the runtime.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell coordinate on the grid. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Taxicab distance, the metric robots use to rank candidate boxes.
    pub fn manhattan(&self, other: &Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The neighbouring cell in a direction. May lie outside the grid.
    pub fn step(&self, direction: Direction) -> Position {
        let (dx, dy) = direction.offset();
        Position::new(self.x + dx, self.y + dy)
    }

    /// The four orthogonal neighbours, in [`Direction::ALL`] order.
    pub fn neighbors(&self) -> [Position; 4] {
        Direction::ALL.map(|d| self.step(d))
    }

    /// Whether `other` is this cell or one of its orthogonal neighbours.
    pub fn is_adjacent_or_on(&self, other: &Position) -> bool {
        self.manhattan(other) <= 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// One of the four grid directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    East,
    West,
    South,
    North,
}

impl Direction {
    /// Neighbour scan order shared by the pathfinder and the pickup/stack actions.
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::West,
        Direction::South,
        Direction::North,
    ];

    /// `(dx, dy)` offset. `y` grows downwards (row index).
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::South => (0, 1),
            Direction::North => (0, -1),
        }
    }
}

/// Task state of a robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RobotState {
    /// Idle: no box left to pursue. Terminal in the base design.
    Exploring,
    /// Looking for, negotiating for, or walking to a loose box.
    #[default]
    MovingToBox,
    /// Carrying a box towards the pivot.
    MovingToPivot,
    /// Declared for completeness; stacking finishes within the arrival tick
    /// so no robot is ever observed in this state.
    Stacking,
}

impl RobotState {
    pub fn is_idle(&self) -> bool {
        matches!(self, RobotState::Exploring)
    }
}

impl fmt::Display for RobotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RobotState::Exploring => "EXPLORING",
            RobotState::MovingToBox => "MOVING_TO_BOX",
            RobotState::MovingToPivot => "MOVING_TO_PIVOT",
            RobotState::Stacking => "STACKING",
        };
        f.write_str(label)
    }
}

/// The current tick of the simulation.
pub type Tick = u64;
