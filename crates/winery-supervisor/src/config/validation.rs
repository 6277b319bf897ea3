use super::*;
use anyhow::{anyhow, Result};

/// Validate the complete configuration
pub fn validate_config(config: &LauncherConfig) -> Result<()> {
    validate_launcher_options(&config.launcher)?;
    validate_service_options(&config.service)?;
    Ok(())
}

/// Validate supervisor tuning
fn validate_launcher_options(options: &LauncherOptions) -> Result<()> {
    if options.baseline_port == 0 {
        return Err(anyhow!("Baseline port must be between 1 and 65535, got: 0"));
    }

    if options.poll_interval.is_zero() {
        return Err(anyhow!("Poll interval must be greater than 0"));
    }

    if options.probe_timeout.is_zero() {
        return Err(anyhow!("Probe timeout must be greater than 0"));
    }

    if options.ready_timeout.is_some_and(|d| d.is_zero()) {
        return Err(anyhow!("Ready timeout must be greater than 0 when set"));
    }

    if options.stop_timeout.is_some_and(|d| d.is_zero()) {
        return Err(anyhow!("Stop timeout must be greater than 0 when set"));
    }

    if options.data_dir.as_os_str().is_empty() {
        return Err(anyhow!("Data directory cannot be empty"));
    }

    Ok(())
}

/// Validate the service command line inputs
fn validate_service_options(service: &ServiceOptions) -> Result<()> {
    if service.java_path.as_os_str().is_empty() {
        return Err(anyhow!("Java path cannot be empty"));
    }

    if service.launcher_jar.as_os_str().is_empty() {
        return Err(anyhow!("Launcher jar cannot be empty"));
    }

    if service.logback_config.as_os_str().is_empty() {
        return Err(anyhow!("Logback configuration path cannot be empty"));
    }

    for key in service.environment.keys() {
        if key.is_empty() || key.contains('=') {
            return Err(anyhow!("Invalid environment variable name: '{}'", key));
        }
    }

    Ok(())
}
