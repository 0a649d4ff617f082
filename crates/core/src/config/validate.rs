use super::{types::Config, ConfigError};

/// Longest simulation window accepted, in hours.
pub const MAX_TDELTA_HOURS: u32 = 24 * 31;

/// Validate configuration
/// Currently validates:
/// - Time settings are positive
/// - Windows span at most [`MAX_TDELTA_HOURS`]
/// - Forecast and simulation cadences divide a day evenly
/// - The sampling increment fits inside a window
/// - Server port is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let ts = &config.time_settings;

    for (name, value) in [
        ("tincr", ts.tincr),
        ("tdelta", ts.tdelta),
        ("tfreq_f", ts.tfreq_f),
        ("tfreq", ts.tfreq),
    ] {
        if value == 0 {
            return Err(ConfigError::ValidationError(format!(
                "time_settings.{} must be positive",
                name
            )));
        }
    }

    for (name, value) in [("tfreq_f", ts.tfreq_f), ("tfreq", ts.tfreq)] {
        if 24 % value != 0 {
            return Err(ConfigError::ValidationError(format!(
                "time_settings.{} must divide 24, got {}",
                name, value
            )));
        }
    }

    if ts.tdelta > MAX_TDELTA_HOURS {
        return Err(ConfigError::ValidationError(format!(
            "time_settings.tdelta ({}) cannot exceed {} hours",
            ts.tdelta, MAX_TDELTA_HOURS
        )));
    }

    if ts.tincr > ts.tdelta {
        return Err(ConfigError::ValidationError(format!(
            "time_settings.tincr ({}) cannot exceed tdelta ({})",
            ts.tincr, ts.tdelta
        )));
    }

    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.simulation.release_site.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "simulation.release_site cannot be empty".to_string(),
        ));
    }

    Ok(())
}
