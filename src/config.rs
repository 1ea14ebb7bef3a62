//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;

use crate::error::Result;
use crate::sizing::SizeSettings;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Lifetime of cached size multipliers, in ticks
    pub scalar_ttl_ticks: i64,
    /// Lifetime of cached meshes, in ticks
    pub mesh_ttl_ticks: i64,
    /// Background maintenance interval in seconds
    pub maintenance_interval: u64,
    /// JSON file holding size settings
    pub settings_path: Option<PathBuf>,
    /// File the size table is loaded from at start and saved to periodically
    pub assignments_path: Option<PathBuf>,
    /// Fixed seed for size draws
    pub rng_seed: Option<u64>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SCALAR_TTL_TICKS` - Size cache lifetime (default: 1800)
    /// - `MESH_TTL_TICKS` - Mesh cache lifetime (default: 3600)
    /// - `MAINTENANCE_INTERVAL` - Sweep/autosave frequency in seconds, 0 falls back to the default (default: 30)
    /// - `SETTINGS_PATH` - Size settings JSON (default: built-in settings)
    /// - `ASSIGNMENTS_PATH` - Size table save file (default: none, no autosave)
    /// - `RNG_SEED` - Deterministic draw seed (default: OS entropy)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            scalar_ttl_ticks: parse_var("SCALAR_TTL_TICKS").unwrap_or(defaults.scalar_ttl_ticks),
            mesh_ttl_ticks: parse_var("MESH_TTL_TICKS").unwrap_or(defaults.mesh_ttl_ticks),
            maintenance_interval: parse_var("MAINTENANCE_INTERVAL")
                .filter(|secs: &u64| *secs > 0)
                .unwrap_or(defaults.maintenance_interval),
            settings_path: env::var_os("SETTINGS_PATH").map(PathBuf::from),
            assignments_path: env::var_os("ASSIGNMENTS_PATH").map(PathBuf::from),
            rng_seed: parse_var("RNG_SEED"),
        }
    }

    /// Loads size settings from `settings_path`, or the defaults when unset.
    pub fn load_settings(&self) -> Result<SizeSettings> {
        match &self.settings_path {
            Some(path) => SizeSettings::from_path(path),
            None => Ok(SizeSettings::default()),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            scalar_ttl_ticks: 1800,
            mesh_ttl_ticks: 3600,
            maintenance_interval: 30,
            settings_path: None,
            assignments_path: None,
            rng_seed: None,
        }
    }
}
