//! Run the warehouse simulation.

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use stackyard::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config;

/// Frame interval when rendering without a configured delay (20 fps).
const RENDER_DELAY_MS: u64 = 50;

pub struct RunOptions<'a> {
    pub config: Option<&'a Path>,
    pub ticks: Option<u64>,
    pub seed: Option<u64>,
    pub render: bool,
    pub json: Option<PathBuf>,
    pub verbose: bool,
}

pub async fn run(opts: RunOptions<'_>) -> Result<()> {
    let mut config = config::load(opts.config)?;
    if let Some(ticks) = opts.ticks {
        config.run.max_ticks = ticks;
    }
    if opts.seed.is_some() {
        config.run.seed = opts.seed;
    }
    let max_ticks = config.run.max_ticks;
    let delay = match config.run.tick_delay_ms {
        0 if opts.render => Duration::from_millis(RENDER_DELAY_MS),
        ms => Duration::from_millis(ms),
    };

    println!(
        "{} Building {}x{} warehouse: {} boxes, {} robots...",
        "→".blue(),
        config.grid.rows.to_string().cyan(),
        config.grid.cols.to_string().cyan(),
        config.boxes.count.to_string().cyan(),
        config.fleet.robots.to_string().cyan()
    );
    if let Some(seed) = config.run.seed {
        println!("  Seed: {}", seed.to_string().cyan());
    }

    let mut sim = Simulation::new(config).context("Failed to build simulation")?;
    sim.start();

    if opts.render {
        println!("{}", sim.snapshot().render_ascii());
        while !sim.is_finished() && sim.current_tick() < max_ticks {
            let events = sim.tick().await;
            let frame = sim.snapshot();
            println!(
                "{} tick {} · {} movements",
                "→".blue(),
                frame.tick.to_string().cyan(),
                frame.movements.to_string().cyan()
            );
            if opts.verbose {
                print_events(&events);
            }
            println!("{}", frame.render_ascii());
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    } else {
        let pb = ProgressBar::new(max_ticks);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ticks {msg}")?
                .progress_chars("#>-"),
        );
        while !sim.is_finished() && sim.current_tick() < max_ticks {
            let events = sim.tick().await;
            if opts.verbose {
                for line in describe(&events) {
                    pb.println(line);
                }
            }
            pb.set_message(format!("{} movements", sim.coordination().movement_count()));
            pb.inc(1);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        pb.finish_and_clear();
    }

    let report = sim.report();
    print_report(&report);

    if let Some(path) = opts.json {
        report
            .save_json(&path)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        println!("  {} Report written to {}", "✓".green(), path.display());
    }

    Ok(())
}

fn print_report(report: &SimulationReport) {
    println!();
    if report.finished {
        println!("{} All robots are idle.", "✓".green().bold());
    } else {
        println!(
            "{} Tick limit reached with robots still working.",
            "•".yellow().bold()
        );
    }
    println!("  Ticks:           {}", report.ticks.to_string().cyan());
    println!("  Elapsed:         {} ms", report.elapsed_ms.to_string().cyan());
    println!("  Movements:       {}", report.movements.to_string().green());
    println!(
        "  Complete stacks: {} of {} stacks",
        report.complete_stacks().to_string().green(),
        report.stacks.len()
    );
    for robot in &report.robots {
        println!(
            "    {} {} steps, {} pickups, {} stacks, {} pivots",
            robot.name.bold(),
            robot.steps,
            robot.pickups,
            robot.stacks,
            robot.designations
        );
    }
}

fn print_events(events: &[SimulationEvent]) {
    for line in describe(events) {
        println!("{line}");
    }
}

/// One line per notable robot event; steps and tick markers are skipped.
fn describe(events: &[SimulationEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            SimulationEvent::Robot { robot, event } => {
                let what = match event {
                    RobotEvent::Stepped { .. } => return None,
                    RobotEvent::TargetAdopted { at } => format!("targets box {at}"),
                    RobotEvent::TargetDropped { at } => format!("drops target {at}"),
                    RobotEvent::WentIdle => "goes idle".yellow().to_string(),
                    RobotEvent::PivotDesignated { at } => {
                        format!("designates pivot {at}").green().to_string()
                    }
                    RobotEvent::PickedUp { at } => format!("picks up box {at}"),
                    RobotEvent::PickupDeferred { at, heading, pivot_size } => {
                        format!("waits at {at} ({heading} heading, pivot size {pivot_size})")
                    }
                    RobotEvent::Stacked { onto, size } => {
                        format!("stacks onto {onto} (size {size})")
                    }
                    RobotEvent::PivotCompleted { at } => {
                        format!("completes pivot {at}").green().bold().to_string()
                    }
                    RobotEvent::NoPath { target } => {
                        format!("has no path to {target}").red().to_string()
                    }
                    RobotEvent::PivotLost => "lost the pivot".red().to_string(),
                };
                Some(format!("  {} {}", robot.cyan(), what))
            }
            SimulationEvent::TickComplete { .. } => None,
        })
        .collect()
}
