//! Stackyard Core Prelude - convenient imports for common usage.
//!
//! ```rust
//! use stackyard_core::prelude::*;
//! ```

pub use crate::types::{Direction, Position, RobotState, Tick};

pub use crate::stack::{StackBox, MAX_STACK_SIZE, MIN_STACK_SIZE};

pub use crate::presence::{RobotHandle, RobotView};

pub use crate::grid::{Cell, CellKind, Grid, WallRange};

pub use crate::pathfinder::{compute_shortest_path, Path};

pub use crate::coordination::CoordinationState;

pub use crate::error::{Result, StackyardError};
