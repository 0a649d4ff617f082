//! Configuration for the container collaborators.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Preprocessing container settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Path to the docker binary.
    #[serde(default = "default_docker_path")]
    pub docker_path: PathBuf,

    /// Image that converts raw forecast files.
    pub image: String,

    /// File passed via `--env-file`.
    #[serde(default)]
    pub env_file: Option<PathBuf>,

    /// Host directory holding the ledger, mounted at `/src/db/`.
    #[serde(default = "default_db_mount")]
    pub db_mount: PathBuf,

    /// Kill the container after this many seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Additional `docker run` arguments, inserted before the image.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

/// Simulation container settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Path to the docker binary.
    #[serde(default = "default_docker_path")]
    pub docker_path: PathBuf,

    /// Flexpart image.
    pub image: String,

    /// File passed via `--env-file`.
    #[serde(default)]
    pub env_file: Option<PathBuf>,

    /// Command run inside the container.
    #[serde(default = "default_command")]
    pub command: Vec<String>,

    /// Kill the container after this many seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Additional `docker run` arguments, inserted before the image.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_docker_path() -> PathBuf {
    PathBuf::from("docker")
}

fn default_db_mount() -> PathBuf {
    PathBuf::from("db")
}

fn default_command() -> Vec<String> {
    vec![
        "/bin/sh".to_string(),
        "-c".to_string(),
        "ulimit -a && bash entrypoint.sh".to_string(),
    ]
}

impl PreprocessConfig {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            docker_path: default_docker_path(),
            image: image.into(),
            env_file: None,
            db_mount: default_db_mount(),
            timeout_secs: None,
            extra_args: Vec::new(),
        }
    }
}

impl LauncherConfig {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            docker_path: default_docker_path(),
            image: image.into(),
            env_file: None,
            command: default_command(),
            timeout_secs: None,
            extra_args: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launcher_defaults() {
        let config: LauncherConfig = toml::from_str(r#"image = "flexpart:latest""#).unwrap();
        assert_eq!(config.docker_path, PathBuf::from("docker"));
        assert_eq!(config.command[0], "/bin/sh");
        assert_eq!(config.command[2], "ulimit -a && bash entrypoint.sh");
        assert!(config.timeout_secs.is_none());
    }

    #[test]
    fn test_preprocess_requires_image() {
        let result: Result<PreprocessConfig, _> = toml::from_str(r#"db_mount = "/data""#);
        assert!(result.is_err());
    }
}
