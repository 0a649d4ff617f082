//! Docker-backed collaborators.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, error, info};

use crate::metrics;
use crate::readiness::SimulationConfig;
use crate::trigger::Trigger;

use super::config::{LauncherConfig, PreprocessConfig};
use super::error::ContainerError;
use super::traits::{Preprocessor, SimulationLauncher};

const PREPROCESS_KIND: &str = "preprocess";
const SIMULATION_KIND: &str = "simulation";

/// Mount point of the ledger directory inside the preprocessing image.
const DB_MOUNT_TARGET: &str = "/src/db/";

/// Runs `docker_path args...` to completion, capturing stderr.
async fn run_container(
    kind: &'static str,
    docker_path: &Path,
    args: &[String],
    timeout_secs: Option<u64>,
) -> Result<(), ContainerError> {
    let start = Instant::now();
    debug!("Running {} {}", docker_path.display(), args.join(" "));

    let child = Command::new(docker_path)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ContainerError::RuntimeNotFound {
                    path: docker_path.to_path_buf(),
                }
            } else {
                ContainerError::Io(e)
            }
        })?;

    // Dropping the wait future on timeout kills the child.
    let waited = match timeout_secs {
        Some(secs) => timeout(Duration::from_secs(secs), child.wait_with_output())
            .await
            .map_err(|_| secs),
        None => Ok(child.wait_with_output().await),
    };

    metrics::CONTAINER_DURATION
        .with_label_values(&[kind])
        .observe(start.elapsed().as_secs_f64());

    let output = match waited {
        Ok(output) => output?,
        Err(timeout_secs) => {
            metrics::CONTAINER_RUNS
                .with_label_values(&[kind, "failed"])
                .inc();
            return Err(ContainerError::Timeout { kind, timeout_secs });
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    for line in stdout.lines() {
        debug!("[{}] {}", kind, line);
    }

    if !output.status.success() {
        metrics::CONTAINER_RUNS
            .with_label_values(&[kind, "failed"])
            .inc();
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ContainerError::failed(kind, output.status.code(), &stderr));
    }

    metrics::CONTAINER_RUNS
        .with_label_values(&[kind, "success"])
        .inc();
    Ok(())
}

/// Runs the preprocessing image for each ingested forecast file.
pub struct DockerPreprocessor {
    config: PreprocessConfig,
}

impl DockerPreprocessor {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    fn build_args(&self, trigger: &Trigger) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "--rm".to_string(),
            "--mount".to_string(),
            format!(
                "type=bind,source={},destination={}",
                self.config.db_mount.display(),
                DB_MOUNT_TARGET
            ),
        ];

        if let Some(env_file) = &self.config.env_file {
            args.extend(["--env-file".to_string(), env_file.display().to_string()]);
        }

        args.extend(self.config.extra_args.iter().cloned());
        args.push(self.config.image.clone());

        args.extend([
            "--step".to_string(),
            trigger.step.to_string(),
            "--date".to_string(),
            trigger.issue_date.clone(),
            "--time".to_string(),
            trigger.issue_time.clone(),
        ]);
        if let Some(location) = &trigger.location {
            args.extend(["--location".to_string(), location.clone()]);
        }

        args
    }
}

#[async_trait]
impl Preprocessor for DockerPreprocessor {
    fn name(&self) -> &str {
        "docker"
    }

    async fn run(&self, trigger: &Trigger) -> Result<(), ContainerError> {
        info!(
            "Preprocessing {}{} step {} with {}",
            trigger.issue_date, trigger.issue_time, trigger.step, self.config.image
        );

        if !self.config.db_mount.is_dir() {
            error!(
                "Ledger directory {} does not exist",
                self.config.db_mount.display()
            );
            return Err(ContainerError::MountSourceMissing {
                path: self.config.db_mount.clone(),
            });
        }

        let args = self.build_args(trigger);
        run_container(
            PREPROCESS_KIND,
            &self.config.docker_path,
            &args,
            self.config.timeout_secs,
        )
        .await
        .inspect_err(|e| error!("Preprocessing failed: {}", e))
    }
}

/// Runs one Flexpart container per simulation config.
pub struct DockerLauncher {
    config: LauncherConfig,
}

impl DockerLauncher {
    pub fn new(config: LauncherConfig) -> Self {
        Self { config }
    }

    fn build_args(&self, simulation: &SimulationConfig) -> Vec<String> {
        let mut args = vec!["run".to_string()];

        if let Some(env_file) = &self.config.env_file {
            args.extend(["--env-file".to_string(), env_file.display().to_string()]);
        }

        for (key, value) in simulation.env_vars() {
            args.extend(["-e".to_string(), format!("{}={}", key, value)]);
        }

        args.push("--rm".to_string());
        args.extend(self.config.extra_args.iter().cloned());
        args.push(self.config.image.clone());
        args.extend(self.config.command.iter().cloned());

        args
    }
}

#[async_trait]
impl SimulationLauncher for DockerLauncher {
    fn name(&self) -> &str {
        "docker"
    }

    async fn launch(&self, simulation: &SimulationConfig) -> Result<(), ContainerError> {
        info!(
            "Launching simulation: {}",
            serde_json::to_string(simulation).unwrap_or_default()
        );

        let args = self.build_args(simulation);
        run_container(
            SIMULATION_KIND,
            &self.config.docker_path,
            &args,
            self.config.timeout_secs,
        )
        .await
        .inspect_err(|e| error!("Simulation for {} failed: {}", simulation.forecast_datetime, e))?;

        info!("Simulation for {} finished", simulation.forecast_datetime);
        Ok(())
    }
}
