//! Validation of service targets and monitoring settings.

use anyhow::{Result, anyhow};
use url::Url;

/// Validate an HTTP/HTTPS service URL
pub fn validate_service_url(target: &str) -> Result<()> {
    let url = Url::parse(target).map_err(|e| anyhow!("Invalid URL: {}", e))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(anyhow!("Invalid scheme for HTTP service: {}", other)),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(anyhow!("URL has no host: {}", target));
    }

    if url.port() == Some(0) {
        return Err(anyhow!("Port 0 is not valid"));
    }

    Ok(())
}

/// Validate the global check interval
pub fn validate_check_interval(interval_minutes: u64) -> Result<()> {
    const MIN_INTERVAL: u64 = 1;
    const MAX_INTERVAL: u64 = 1440; // 24 hours

    if interval_minutes < MIN_INTERVAL {
        return Err(anyhow!(
            "Check interval too short: {} minutes (minimum: {})",
            interval_minutes,
            MIN_INTERVAL
        ));
    }

    if interval_minutes > MAX_INTERVAL {
        return Err(anyhow!(
            "Check interval too long: {} minutes (maximum: {})",
            interval_minutes,
            MAX_INTERVAL
        ));
    }

    if interval_minutes > 60 {
        tracing::warn!(
            "Check interval of {} minutes exceeds the one-hour status change window; every check will be reported as a fresh observation",
            interval_minutes
        );
    }

    Ok(())
}

/// Validate timeout is reasonable
pub fn validate_timeout(timeout_seconds: u64) -> Result<()> {
    const MIN_TIMEOUT: u64 = 1;
    const MAX_TIMEOUT: u64 = 300; // 5 minutes

    if timeout_seconds < MIN_TIMEOUT {
        return Err(anyhow!(
            "Timeout too short: {} seconds (minimum: {})",
            timeout_seconds,
            MIN_TIMEOUT
        ));
    }

    if timeout_seconds > MAX_TIMEOUT {
        return Err(anyhow!(
            "Timeout too long: {} seconds (maximum: {})",
            timeout_seconds,
            MAX_TIMEOUT
        ));
    }

    Ok(())
}

/// Validate the retention window
pub fn validate_retention(retention_days: u32) -> Result<()> {
    if retention_days == 0 {
        return Err(anyhow!("Retention must keep at least 1 day of data"));
    }
    Ok(())
}
