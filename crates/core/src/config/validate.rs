use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - workload ceiling is non-zero
/// - availability threshold is a percentage in (0, 100]
/// - audit buffer is non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.allocation.max_workload_per_coordinator == 0 {
        return Err(ConfigError::ValidationError(
            "allocation.max_workload_per_coordinator cannot be 0".to_string(),
        ));
    }

    let pct = config.allocation.availability_threshold_pct;
    if pct == 0 || pct > 100 {
        return Err(ConfigError::ValidationError(format!(
            "allocation.availability_threshold_pct must be in 1..=100, got {}",
            pct
        )));
    }

    if config.audit.buffer_size == 0 {
        return Err(ConfigError::ValidationError(
            "audit.buffer_size cannot be 0".to_string(),
        ));
    }

    Ok(())
}
