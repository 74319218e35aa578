//! Write a default stackyard.toml.

use anyhow::{Context, Result};
use colored::Colorize;
use stackyard::runtime::config::SimulationConfig;
use std::path::PathBuf;

use crate::config::{save, CONFIG_FILE};

pub fn run(path: Option<String>) -> Result<()> {
    let base_path = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    println!("{} Initializing Stackyard project...", "→".blue());

    std::fs::create_dir_all(&base_path)
        .with_context(|| format!("Failed to create {}", base_path.display()))?;

    let config_path = base_path.join(CONFIG_FILE);
    if !config_path.exists() {
        save(&SimulationConfig::default(), &config_path)?;
        println!("  {} Created {}", "✓".green(), config_path.display());
    } else {
        println!("  {} {} already exists", "•".yellow(), config_path.display());
    }

    println!();
    println!("{} Stackyard project initialized!", "✓".green().bold());
    println!();
    println!("Next steps:");
    println!("  {} edit {} to change the floor or the fleet", "1.".blue(), CONFIG_FILE);
    println!("  {} stackyard run --render", "2.".blue());
    println!("  {} stackyard run --json report.json", "3.".blue());

    Ok(())
}
