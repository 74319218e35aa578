//! Print a single frame of the warehouse.

use anyhow::{Context, Result};
use stackyard::prelude::*;
use std::path::Path;

use crate::config;

pub async fn run(config_path: Option<&Path>, seed: Option<u64>, ticks: u64, json: bool) -> Result<()> {
    let mut config = config::load(config_path)?;
    if seed.is_some() {
        config.run.seed = seed;
    }

    let mut sim = Simulation::new(config).context("Failed to build simulation")?;
    for _ in 0..ticks {
        if sim.is_finished() {
            break;
        }
        sim.tick().await;
    }

    let frame = sim.snapshot();
    if json {
        println!("{}", frame.to_json()?);
    } else {
        println!("tick {} · {} movements", frame.tick, frame.movements);
        print!("{}", frame.render_ascii());
    }
    Ok(())
}
