//! Simulation - the tick driver.
//!
//! The simulation owns the grid, the robots and the two shared services
//! (agent registry and coordination state) and drives everything from one
//! task.
//!
//! Each tick:
//! 1. Every robot updates once, in registration order
//! 2. Robot events are collected and tagged with the robot's name
//! 3. The tick counter advances and a `TickComplete` event is recorded
//!
//! The run is finished when every robot is exploring with no target.

use crate::config::SimulationConfig;
use crate::layout::{self, Layout};
use crate::snapshot::GridSnapshot;
use serde::{Deserialize, Serialize};
use stackyard_agents::registry::AgentRegistry;
use stackyard_agents::robot::{Robot, RobotEvent};
use stackyard_core::coordination::CoordinationState;
use stackyard_core::error::{Result, StackyardError};
use stackyard_core::grid::Grid;
use stackyard_core::presence::RobotView;
use stackyard_core::types::{Position, Tick};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Event emitted by the simulation during a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationEvent {
    /// A robot acted.
    Robot { robot: String, event: RobotEvent },
    /// A tick completed.
    TickComplete {
        tick: Tick,
        movements: u64,
        settled: usize,
    },
}

/// A stack left on the floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackSummary {
    pub at: Position,
    pub size: u8,
    pub pivot: bool,
}

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub ticks: Tick,
    pub finished: bool,
    pub elapsed_ms: u64,
    pub movements: u64,
    pub stacks: Vec<StackSummary>,
    pub robots: Vec<RobotView>,
}

impl SimulationReport {
    /// Number of stacks that reached the maximum size.
    pub fn complete_stacks(&self) -> usize {
        self.stacks
            .iter()
            .filter(|s| s.size >= stackyard_core::stack::MAX_STACK_SIZE)
            .count()
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// The warehouse simulation.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    grid: Grid,
    robots: Vec<Robot>,
    registry: Arc<AgentRegistry>,
    coordination: Arc<CoordinationState>,
    tick: Tick,
    started: bool,
    event_history: Vec<(Tick, SimulationEvent)>,
}

impl Simulation {
    /// Build a simulation with a random (or seeded) layout.
    ///
    /// Fails with `StackyardError::NoRuntime` outside a Tokio runtime.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let layout = layout::generate(&config)?;
        Self::from_layout(config, layout)
    }

    /// Build a simulation with explicit box and robot positions.
    ///
    /// Fails with `StackyardError::NoRuntime` outside a Tokio runtime.
    pub fn from_layout(config: SimulationConfig, layout: Layout) -> Result<Self> {
        let mut grid = config.floor();
        for placement in &layout.boxes {
            grid.place_box(placement.at.x, placement.at.y, placement.size)?;
        }

        let registry = Arc::new(AgentRegistry::new());
        let coordination = Arc::new(CoordinationState::new());
        let settings = config.negotiator_settings();

        let mut robots = Vec::with_capacity(layout.robots.len());
        for placement in &layout.robots {
            let at = placement.at;
            if !grid.in_bounds(at) {
                return Err(StackyardError::OutOfBounds { x: at.x, y: at.y });
            }
            if grid.is_wall(at) {
                return Err(StackyardError::Wall { x: at.x, y: at.y });
            }
            if grid.box_at(at).is_some() || robots.iter().any(|r: &Robot| r.position() == at) {
                return Err(StackyardError::CellOccupied { x: at.x, y: at.y });
            }

            let robot = Robot::spawn(
                placement.name.clone(),
                at,
                Arc::clone(&registry),
                Arc::clone(&coordination),
                settings,
            )?;
            grid.add_robot(robot.handle());
            robots.push(robot);
        }

        tracing::info!(
            rows = grid.rows(),
            cols = grid.cols(),
            boxes = grid.box_count(),
            robots = robots.len(),
            "simulation built"
        );

        Ok(Self {
            config,
            grid,
            robots,
            registry,
            coordination,
            tick: 0,
            started: false,
            event_history: Vec::new(),
        })
    }

    /// Start the clock and reset the movement counter. Called once; later
    /// calls are ignored.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.coordination.start_timer();
        self.started = true;
    }

    /// Run a single simulation tick.
    pub async fn tick(&mut self) -> Vec<SimulationEvent> {
        self.start();
        let mut events = Vec::new();

        for robot in &mut self.robots {
            for event in robot.update(&mut self.grid).await {
                events.push(SimulationEvent::Robot {
                    robot: robot.name().to_string(),
                    event,
                });
            }
        }

        self.tick += 1;
        events.push(SimulationEvent::TickComplete {
            tick: self.tick,
            movements: self.coordination.movement_count(),
            settled: self.robots.iter().filter(|r| r.is_settled()).count(),
        });

        for event in &events {
            self.event_history.push((self.tick, event.clone()));
        }
        events
    }

    /// Whether every robot is exploring with no target.
    pub fn is_finished(&self) -> bool {
        self.robots.iter().all(Robot::is_settled)
    }

    /// Tick until finished or `max_ticks` ticks have run in total.
    pub async fn run(&mut self, max_ticks: u64) -> SimulationReport {
        self.start();
        let delay = Duration::from_millis(self.config.run.tick_delay_ms);
        while !self.is_finished() && self.tick < max_ticks {
            self.tick().await;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        let report = self.report();
        if report.finished {
            tracing::info!(
                ticks = report.ticks,
                elapsed_ms = report.elapsed_ms,
                movements = report.movements,
                "simulation finished"
            );
        } else {
            tracing::warn!(ticks = report.ticks, "tick limit reached before the robots settled");
        }
        report
    }

    pub fn report(&self) -> SimulationReport {
        SimulationReport {
            ticks: self.tick,
            finished: self.is_finished(),
            elapsed_ms: u64::try_from(self.coordination.elapsed_ms()).unwrap_or(u64::MAX),
            movements: self.coordination.movement_count(),
            stacks: self
                .grid
                .boxes()
                .map(|b| StackSummary {
                    at: b.position,
                    size: b.size(),
                    pivot: b.is_pivot(),
                })
                .collect(),
            robots: self.robots.iter().map(Robot::view).collect(),
        }
    }

    /// Read-only frame of the current state.
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot::capture(&self.grid, self.tick, self.coordination.movement_count())
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn robots(&self) -> &[Robot] {
        &self.robots
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn coordination(&self) -> &CoordinationState {
        &self.coordination
    }

    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    /// Full event history with tick numbers.
    pub fn event_history(&self) -> &[(Tick, SimulationEvent)] {
        &self.event_history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.grid.rows = 5;
        config.grid.cols = 5;
        config.grid.walls.clear();
        config
    }

    #[tokio::test]
    async fn robots_cannot_start_on_boxes_or_walls() {
        let mut config = small_config();
        config.grid.walls = vec![stackyard_core::grid::WallRange::new(4, 4, 4, 4)];

        let on_box = Layout::new().with_box(1, 1, 1).with_robot("a", 1, 1);
        assert_eq!(
            Simulation::from_layout(config.clone(), on_box).unwrap_err(),
            StackyardError::CellOccupied { x: 1, y: 1 }
        );

        let on_wall = Layout::new().with_robot("a", 4, 4);
        assert_eq!(
            Simulation::from_layout(config.clone(), on_wall).unwrap_err(),
            StackyardError::Wall { x: 4, y: 4 }
        );

        let twins = Layout::new().with_robot("a", 0, 0).with_robot("b", 0, 0);
        assert!(Simulation::from_layout(config, twins).is_err());
    }

    #[test]
    fn building_without_a_runtime_is_an_error() {
        let layout = Layout::new().with_box(2, 2, 1).with_robot("Robot1", 0, 0);
        assert_eq!(
            Simulation::from_layout(small_config(), layout).unwrap_err(),
            StackyardError::NoRuntime("Robot1".into())
        );
    }

    #[tokio::test]
    async fn history_records_every_tick() {
        let layout = Layout::new()
            .with_box(2, 2, 1)
            .with_robot("Robot1", 0, 0)
            .with_robot("Robot2", 4, 4);
        let mut sim = Simulation::from_layout(small_config(), layout).unwrap();

        sim.tick().await;
        sim.tick().await;
        assert_eq!(sim.current_tick(), 2);
        let completes = sim
            .event_history()
            .iter()
            .filter(|(_, e)| matches!(e, SimulationEvent::TickComplete { .. }))
            .count();
        assert_eq!(completes, 2);
        assert_eq!(sim.registry().len(), 2);
    }
}
