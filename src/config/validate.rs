// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, TaskgraphError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::TaskgraphError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_queue(&raw)?;
        validate_decision(&raw)?;
        let timeout = parse_duration(&raw.queue.timeout).map_err(|e| {
            TaskgraphError::ConfigError(format!("invalid [queue].timeout: {}", e))
        })?;
        let submit_timeout = (!timeout.is_zero()).then_some(timeout);
        Ok(ConfigFile::new_unchecked(raw.queue, raw.decision, submit_timeout))
    }
}

fn validate_queue(cfg: &RawConfigFile) -> Result<()> {
    if cfg.queue.concurrency == 0 {
        return Err(TaskgraphError::ConfigError(
            "[queue].concurrency must be >= 1 (got 0)".to_string(),
        ));
    }

    let url = reqwest::Url::parse(&cfg.queue.root_url).map_err(|e| {
        TaskgraphError::ConfigError(format!(
            "[queue].root_url '{}' is not a valid URL: {}",
            cfg.queue.root_url, e
        ))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(TaskgraphError::ConfigError(format!(
            "[queue].root_url '{}' must use http or https",
            cfg.queue.root_url
        )));
    }

    Ok(())
}

fn validate_decision(cfg: &RawConfigFile) -> Result<()> {
    if cfg.decision.task_id_env.trim().is_empty() {
        return Err(TaskgraphError::ConfigError(
            "[decision].task_id_env must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Parse a duration such as `"500ms"`, `"30s"`, `"2m"` or `"1h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{}' is too large", s))
}
