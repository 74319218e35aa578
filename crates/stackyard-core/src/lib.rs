//! # Stackyard Core
//!
//! The spatial model and shared coordination primitives that every
//! Stackyard robot reads and mutates:
//!
//! - **Grid** - a rows×cols matrix of cells; each cell is empty or a wall
//!   and may own one box stack
//! - **Pathfinder** - uniform-cost shortest paths over the 4-connected grid,
//!   with boxes treated as obstacles except at the destination
//! - **Coordination** - the process-wide pivot reference, movement counter
//!   and simulation clock, guarded by a single lock
//! - **Presence** - the published view of a robot that peers and observers read
//!
//! ## Quick Start
//!
//! ```rust
//! use stackyard_core::prelude::*;
//!
//! let mut grid = Grid::new(5, 5);
//! grid.place_box(2, 2, 1).unwrap();
//!
//! let path = compute_shortest_path(&grid, Position::new(0, 0), Position::new(2, 2));
//! assert_eq!(path.len(), 4);
//! assert_eq!(path.last(), Some(&Position::new(2, 2)));
//! ```

pub mod types;
pub mod stack;
pub mod presence;
pub mod grid;
pub mod pathfinder;
pub mod coordination;
pub mod error;
pub mod prelude;
