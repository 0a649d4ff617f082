use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::container::{LauncherConfig, PreprocessConfig};

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub time_settings: TimeSettings,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub simulation: SimulationDefaults,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub preprocess: Option<PreprocessConfig>,
    #[serde(default)]
    pub launcher: Option<LauncherConfig>,
}

/// Time cadence settings, all in hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct TimeSettings {
    /// Hours between sampled instants inside a window.
    pub tincr: u32,
    /// Total window span.
    pub tdelta: u32,
    /// Cadence at which simulation windows may start.
    pub tfreq_f: u32,
    /// Cadence at which forecast runs are issued.
    pub tfreq: u32,
}

impl Default for TimeSettings {
    fn default() -> Self {
        Self {
            tincr: 1,
            tdelta: 6,
            tfreq_f: 6,
            tfreq: 6,
        }
    }
}

/// Ledger database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("db/sqlite3-db")
}

/// Values copied verbatim into every emitted simulation config.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationDefaults {
    /// Short name of the release site (e.g. BEZ, LEI).
    #[serde(default = "default_release_site")]
    pub release_site: String,
}

impl Default for SimulationDefaults {
    fn default() -> Self {
        Self {
            release_site: default_release_site(),
        }
    }
}

fn default_release_site() -> String {
    "BEZ".to_string()
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Sanitized config for API responses (env file locations hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub time_settings: TimeSettings,
    pub database: DatabaseConfig,
    pub simulation: SimulationDefaults,
    pub server: ServerConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preprocess: Option<SanitizedContainerConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launcher: Option<SanitizedContainerConfig>,
}

/// Container section with the env file reduced to a flag
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedContainerConfig {
    pub image: String,
    pub env_file_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            time_settings: config.time_settings,
            database: config.database.clone(),
            simulation: config.simulation.clone(),
            server: config.server.clone(),
            preprocess: config.preprocess.as_ref().map(|p| SanitizedContainerConfig {
                image: p.image.clone(),
                env_file_configured: p.env_file.is_some(),
                timeout_secs: p.timeout_secs,
            }),
            launcher: config.launcher.as_ref().map(|l| SanitizedContainerConfig {
                image: l.image.clone(),
                env_file_configured: l.env_file.is_some(),
                timeout_secs: l.timeout_secs,
            }),
        }
    }
}
