//! Stackyard Runtime Prelude - convenient imports for common usage.
//!
//! ```rust
//! use stackyard_runtime::prelude::*;
//! ```

// Re-export configuration
pub use crate::config::{
    BoxConfig, FleetConfig, GridConfig, NegotiationConfig, RunConfig, SimulationConfig,
};

// Re-export layout
pub use crate::layout::{BoxPlacement, Layout, RobotPlacement};

// Re-export the driver
pub use crate::simulation::{Simulation, SimulationEvent, SimulationReport, StackSummary};

// Re-export presentation frames
pub use crate::snapshot::{CellSnapshot, GridSnapshot, RobotSnapshot};

// Re-export from agents
pub use stackyard_agents::prelude::*;
