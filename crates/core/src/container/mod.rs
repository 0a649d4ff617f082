//! External container steps: forecast preprocessing and simulation launch.
//!
//! Both steps run a `docker run` command to completion. The orchestrator only
//! sees the [`Preprocessor`] and [`SimulationLauncher`] traits, so tests swap
//! in the mocks from [`crate::testing`].

mod config;
mod docker;
mod error;
mod traits;

pub use config::{LauncherConfig, PreprocessConfig};
pub use docker::{DockerLauncher, DockerPreprocessor};
pub use error::{ContainerError, STDERR_TAIL_BYTES};
pub use traits::{Preprocessor, SimulationLauncher};
