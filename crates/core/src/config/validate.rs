use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Output suffix is non-empty and has no path separators
/// - Log buffer is not 0
/// - Default settings are themselves valid
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let suffix = &config.output.suffix;
    if suffix.is_empty() {
        return Err(ConfigError::ValidationError(
            "output.suffix cannot be empty".to_string(),
        ));
    }
    if suffix.contains(['/', '\\']) {
        return Err(ConfigError::ValidationError(format!(
            "output.suffix cannot contain path separators: {}",
            suffix
        )));
    }

    if config.output.log_buffer_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "output.log_buffer_bytes cannot be 0".to_string(),
        ));
    }

    config
        .defaults
        .validate()
        .map_err(|e| ConfigError::ValidationError(format!("defaults: {}", e)))?;

    Ok(())
}
