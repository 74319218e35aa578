//! Simulation configuration.
//!
//! Every field has a default, so a partial file (or none at all) yields the
//! reference warehouse: a 30×30 floor with one wall block, 17 single boxes
//! and five robots.

use serde::{Deserialize, Serialize};
use stackyard_agents::negotiation::NegotiatorSettings;
use stackyard_core::error::{Result, StackyardError};
use stackyard_core::grid::{Grid, WallRange};
use stackyard_core::stack::{MAX_STACK_SIZE, MIN_STACK_SIZE};
use std::time::Duration;

/// Full simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SimulationConfig {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub fleet: FleetConfig,
    #[serde(default)]
    pub boxes: BoxConfig,
    #[serde(default)]
    pub negotiation: NegotiationConfig,
    #[serde(default)]
    pub run: RunConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_rows")]
    pub rows: usize,
    #[serde(default = "default_cols")]
    pub cols: usize,
    /// Inclusive wall rectangles carved before anything is placed.
    #[serde(default = "default_walls")]
    pub walls: Vec<WallRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetConfig {
    #[serde(default = "default_robots")]
    pub robots: usize,
    /// Robots are named `<prefix>1`, `<prefix>2`, ...
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxConfig {
    #[serde(default = "default_box_count")]
    pub count: usize,
    #[serde(default = "default_initial_size")]
    pub initial_size: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationConfig {
    /// Upper bound on one availability query.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
    /// Layout seed. Unset means a fresh random layout every run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Pause between ticks, for watching a rendered run.
    #[serde(default)]
    pub tick_delay_ms: u64,
}

// Default value functions
fn default_rows() -> usize { 30 }
fn default_cols() -> usize { 30 }
fn default_walls() -> Vec<WallRange> { vec![WallRange::new(10, 10, 15, 15)] }
fn default_robots() -> usize { 5 }
fn default_name_prefix() -> String { "Robot".to_string() }
fn default_mailbox_capacity() -> usize { 32 }
fn default_box_count() -> usize { 17 }
fn default_initial_size() -> i32 { 1 }
fn default_timeout_ms() -> u64 { 100 }
fn default_max_ticks() -> u64 { 10_000 }

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            cols: default_cols(),
            walls: default_walls(),
        }
    }
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            robots: default_robots(),
            name_prefix: default_name_prefix(),
            mailbox_capacity: default_mailbox_capacity(),
        }
    }
}

impl Default for BoxConfig {
    fn default() -> Self {
        Self {
            count: default_box_count(),
            initial_size: default_initial_size(),
        }
    }
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_ticks: default_max_ticks(),
            seed: None,
            tick_delay_ms: 0,
        }
    }
}

impl SimulationConfig {
    /// Reject configurations the simulation cannot be built from.
    pub fn validate(&self) -> Result<()> {
        if self.grid.rows == 0 || self.grid.cols == 0 {
            return Err(StackyardError::invalid_config(
                "grid",
                format!("{}x{}", self.grid.rows, self.grid.cols),
                "grid must have at least one row and one column",
            ));
        }
        if self.fleet.robots == 0 {
            return Err(StackyardError::invalid_config(
                "fleet.robots",
                self.fleet.robots,
                "at least one robot is required",
            ));
        }
        if self.fleet.mailbox_capacity == 0 {
            return Err(StackyardError::invalid_config(
                "fleet.mailbox_capacity",
                self.fleet.mailbox_capacity,
                "mailboxes must hold at least one message",
            ));
        }
        if self.negotiation.timeout_ms == 0 {
            return Err(StackyardError::invalid_config(
                "negotiation.timeout_ms",
                self.negotiation.timeout_ms,
                "timeout must be positive",
            ));
        }
        let sizes = i32::from(MIN_STACK_SIZE)..=i32::from(MAX_STACK_SIZE);
        if !sizes.contains(&self.boxes.initial_size) {
            return Err(StackyardError::invalid_config(
                "boxes.initial_size",
                self.boxes.initial_size,
                "box size must be between 1 and 5",
            ));
        }

        let free = self.floor().free_cells().len();
        let needed = self.boxes.count + self.fleet.robots;
        if needed > free {
            return Err(StackyardError::invalid_config(
                "boxes.count",
                self.boxes.count,
                format!("{needed} boxes and robots do not fit on {free} free cells"),
            ));
        }
        Ok(())
    }

    /// An empty floor with the configured walls.
    pub fn floor(&self) -> Grid {
        let mut grid = Grid::new(self.grid.rows, self.grid.cols);
        for range in &self.grid.walls {
            grid.add_walls(range);
        }
        grid
    }

    /// Name of the `index`-th robot (zero-based).
    pub fn robot_name(&self, index: usize) -> String {
        format!("{}{}", self.fleet.name_prefix, index + 1)
    }

    pub fn negotiator_settings(&self) -> NegotiatorSettings {
        NegotiatorSettings {
            mailbox_capacity: self.fleet.mailbox_capacity,
            timeout: Duration::from_millis(self.negotiation.timeout_ms),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
