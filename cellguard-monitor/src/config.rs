//! Config file loading
//!
//! The path comes from the first CLI argument, else `CELLGUARD_CONFIG`.
//! Without either the built-in defaults apply. Fields missing from the file
//! keep their defaults.

use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cellguard_core::MonitorConfig;
use log::info;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "CELLGUARD_CONFIG";

/// Pick the config path: explicit argument first, then the environment
pub fn resolve_path(arg: Option<String>) -> Option<PathBuf> {
    arg.map(PathBuf::from)
        .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from))
}

/// Read and validate a JSON config file
pub fn load_from(path: &Path) -> Result<MonitorConfig> {
    let file = File::open(path)
        .with_context(|| format!("opening config file {}", path.display()))?;
    let config: MonitorConfig = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing config file {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid settings in {}", path.display()))?;
    Ok(config)
}

pub fn load(arg: Option<String>) -> Result<MonitorConfig> {
    match resolve_path(arg) {
        Some(path) => {
            info!("loading config from {}", path.display());
            load_from(&path)
        }
        None => {
            info!("no config file given, using defaults");
            Ok(MonitorConfig::default())
        }
    }
}
