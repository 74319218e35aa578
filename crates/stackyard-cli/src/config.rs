//! Configuration file handling for the Stackyard CLI.

use anyhow::{Context, Result};
use stackyard::runtime::config::SimulationConfig;
use std::path::{Path, PathBuf};

/// File name looked up in the current and parent directories.
pub const CONFIG_FILE: &str = "stackyard.toml";

/// Load the config from `explicit`, or from stackyard.toml in the current
/// or parent directories, or fall back to defaults.
pub fn load(explicit: Option<&Path>) -> Result<SimulationConfig> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(),
    };
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            parse(&content).with_context(|| format!("Failed to parse config: {}", path.display()))
        }
        None => Ok(SimulationConfig::default()),
    }
}

pub fn parse(content: &str) -> Result<SimulationConfig> {
    Ok(toml::from_str(content)?)
}

/// Save config to the specified path.
pub fn save(config: &SimulationConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config: {}", path.display()))?;
    Ok(())
}

/// Find stackyard.toml in current or parent directories.
fn find_config_file() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}
