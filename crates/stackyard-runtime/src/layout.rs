//! Layout - where boxes and robots start.
//!
//! Boxes are dropped on random free cells first, then robots on the free
//! cells that remain, so nothing starts on a wall, a box or another robot.
//! A configured seed makes the layout reproducible.

use crate::config::SimulationConfig;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use stackyard_core::error::{Result, StackyardError};
use stackyard_core::types::Position;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxPlacement {
    pub at: Position,
    pub size: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotPlacement {
    pub name: String,
    pub at: Position,
}

/// Initial positions of every box and robot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Layout {
    pub boxes: Vec<BoxPlacement>,
    pub robots: Vec<RobotPlacement>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_box(mut self, x: i32, y: i32, size: i32) -> Self {
        self.boxes.push(BoxPlacement {
            at: Position::new(x, y),
            size,
        });
        self
    }

    pub fn with_robot(mut self, name: impl Into<String>, x: i32, y: i32) -> Self {
        self.robots.push(RobotPlacement {
            name: name.into(),
            at: Position::new(x, y),
        });
        self
    }
}

/// A layout for `config`, seeded from `config.run.seed` when set.
pub fn generate(config: &SimulationConfig) -> Result<Layout> {
    let mut rng = match config.run.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    random_layout(config, &mut rng)
}

/// Pick collision-free cells for the configured boxes, then robots.
pub fn random_layout<R: Rng + ?Sized>(config: &SimulationConfig, rng: &mut R) -> Result<Layout> {
    let mut free = config.floor().free_cells();
    let needed = config.boxes.count + config.fleet.robots;
    if needed > free.len() {
        return Err(StackyardError::invalid_config(
            "boxes.count",
            config.boxes.count,
            format!("{needed} boxes and robots do not fit on {} free cells", free.len()),
        ));
    }
    free.shuffle(rng);

    let mut cells = free.into_iter();
    let boxes = cells
        .by_ref()
        .take(config.boxes.count)
        .map(|at| BoxPlacement {
            at,
            size: config.boxes.initial_size,
        })
        .collect();
    let robots = cells
        .take(config.fleet.robots)
        .enumerate()
        .map(|(i, at)| RobotPlacement {
            name: config.robot_name(i),
            at,
        })
        .collect();

    tracing::debug!(boxes = config.boxes.count, robots = config.fleet.robots, "layout generated");
    Ok(Layout { boxes, robots })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn nothing_overlaps_and_walls_stay_clear() {
        let config = SimulationConfig::default();
        let floor = config.floor();
        let layout = random_layout(&config, &mut StdRng::seed_from_u64(3)).unwrap();

        assert_eq!(layout.boxes.len(), 17);
        assert_eq!(layout.robots.len(), 5);

        let mut seen = HashSet::new();
        for at in layout.boxes.iter().map(|b| b.at).chain(layout.robots.iter().map(|r| r.at)) {
            assert!(floor.in_bounds(at));
            assert!(!floor.is_wall(at), "{at} is a wall");
            assert!(seen.insert(at), "{at} used twice");
        }
    }

    #[test]
    fn same_seed_same_layout() {
        let mut config = SimulationConfig::default();
        config.run.seed = Some(42);
        assert_eq!(generate(&config).unwrap(), generate(&config).unwrap());
    }

    #[test]
    fn robots_are_named_in_order() {
        let config = SimulationConfig::default();
        let layout = random_layout(&config, &mut StdRng::seed_from_u64(1)).unwrap();
        let names: Vec<_> = layout.robots.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Robot1", "Robot2", "Robot3", "Robot4", "Robot5"]);
    }

    #[test]
    fn overcrowded_floor_is_an_error() {
        let mut config = SimulationConfig::default();
        config.grid.rows = 2;
        config.grid.cols = 2;
        config.grid.walls.clear();
        config.boxes.count = 3;
        config.fleet.robots = 2;
        assert!(random_layout(&config, &mut StdRng::seed_from_u64(0)).is_err());
    }
}
