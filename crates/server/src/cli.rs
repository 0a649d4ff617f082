//! Command-line interface.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use flexorch_core::{Trigger, TriggerError};

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV: &str = "FLEXORCH_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Launch Flexpart simulations as soon as their forecast inputs are ingested
#[derive(Parser, Debug)]
#[command(name = "flexorch")]
#[command(about = "flexorch - Forecast-driven Flexpart simulation orchestrator", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to $FLEXORCH_CONFIG, then config.toml)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Config path from the flag, the environment, or the default.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(|| {
            std::env::var(CONFIG_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Identifies the ingested forecast file.
#[derive(clap::Args, Debug, Clone)]
pub struct TriggerArgs {
    /// Issue date, YYYYMMDD
    #[arg(long)]
    pub date: String,

    /// Issue hour, HH
    #[arg(long)]
    pub time: String,

    /// Lead time in hours
    #[arg(long)]
    pub step: u32,
}

impl TriggerArgs {
    pub fn into_trigger(self, location: Option<String>) -> Result<Trigger, TriggerError> {
        Trigger::parse(self.date, self.time, self.step, location)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Preprocess one forecast file, then launch every simulation it completes
    #[command(name = "run")]
    Run {
        #[command(flatten)]
        trigger: TriggerArgs,

        /// URI of the ingested file, passed to preprocessing
        #[arg(long)]
        location: Option<String>,
    },

    /// Print the simulation configs that are ready, without running anything
    #[command(name = "aggregate")]
    Aggregate {
        #[command(flatten)]
        trigger: TriggerArgs,
    },

    /// Accept ingestion notifications over HTTP
    #[command(name = "serve")]
    Serve,
}
