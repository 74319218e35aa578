//! # Stackyard
//!
//! Cooperating warehouse robots that consolidate scattered unit boxes into
//! stacks of up to five.
//!
//! One box is designated the *pivot*; robots negotiate with each other over
//! bounded mailboxes to claim loose boxes, carry them along shortest paths
//! and merge them into the pivot until it is full.
//!
//! ## Quick Start
//!
//! ```rust
//! use stackyard::prelude::*;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<()> {
//!     let mut config = SimulationConfig::default();
//!     config.grid.rows = 6;
//!     config.grid.cols = 6;
//!     config.grid.walls.clear();
//!
//!     let layout = Layout::new()
//!         .with_box(2, 2, 1)
//!         .with_box(4, 4, 1)
//!         .with_robot("Robot1", 0, 0)
//!         .with_robot("Robot2", 5, 5);
//!
//!     let mut sim = Simulation::from_layout(config, layout)?;
//!     let report = sim.run(200).await;
//!
//!     println!("{}", sim.snapshot().render_ascii());
//!     println!("{} movements in {} ms", report.movements, report.elapsed_ms);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`stackyard_core`] - Grid, pathfinder, box stacks, coordination state
//! - [`stackyard_agents`] - ACL messages, agent registry, negotiation, robots
//! - [`stackyard_runtime`] - Configuration, layout, simulation driver, frames
//!
//! ## Robot states
//!
//! | State | What the robot does |
//! |-------|---------------------|
//! | `MOVING_TO_BOX` | Picks the nearest unclaimed box, asks its peers, walks there |
//! | `MOVING_TO_PIVOT` | Carries a box to the pivot and stacks it |
//! | `EXPLORING` | Nothing left to pursue; idle for the rest of the run |

// Re-export all subcrates
pub use stackyard_core as core;
pub use stackyard_agents as agents;
pub use stackyard_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust
/// use stackyard::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use stackyard_core::types::{Direction, Position, RobotState, Tick};
    pub use stackyard_core::stack::{StackBox, MAX_STACK_SIZE, MIN_STACK_SIZE};
    pub use stackyard_core::grid::{Cell, CellKind, Grid, WallRange};
    pub use stackyard_core::pathfinder::{compute_shortest_path, Path};
    pub use stackyard_core::coordination::CoordinationState;
    pub use stackyard_core::presence::{RobotHandle, RobotView};

    // Error types
    pub use stackyard_core::error::{Result, StackyardError};

    // Agents
    pub use stackyard_agents::acl::{AclMessage, Availability, ConversationId, Performative, Request};
    pub use stackyard_agents::registry::AgentRegistry;
    pub use stackyard_agents::negotiation::{Negotiator, NegotiatorSettings};
    pub use stackyard_agents::robot::{Robot, RobotEvent};

    // Runtime
    pub use stackyard_runtime::config::SimulationConfig;
    pub use stackyard_runtime::layout::Layout;
    pub use stackyard_runtime::simulation::{Simulation, SimulationEvent, SimulationReport};
    pub use stackyard_runtime::snapshot::GridSnapshot;
}
