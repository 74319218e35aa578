//! # Stackyard Runtime
//!
//! Builds and drives a warehouse simulation.
//!
//! The runtime is the host of the fleet: it lays out boxes and robots,
//! constructs the shared agent registry and coordination state, ticks every
//! robot in a fixed order and produces read-only frames and a final report.

pub mod config;
pub mod layout;
pub mod simulation;
pub mod snapshot;
pub mod prelude;
