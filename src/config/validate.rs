// src/config/validate.rs

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use globset::Glob;

use crate::config::model::Settings;

/// Run basic semantic validation against the assembled settings.
///
/// This checks:
/// - the import path is not empty
/// - the source extension is not empty
/// - every `exclude` entry is a valid glob
/// - the grace period is not zero
pub fn validate_settings(settings: &Settings) -> Result<()> {
    if settings.import_path.trim().is_empty() {
        return Err(anyhow!("import path must not be empty"));
    }

    if settings.source_extension.is_empty() {
        return Err(anyhow!("[config].extension must not be empty"));
    }

    for pat in &settings.exclude {
        Glob::new(pat).with_context(|| format!("invalid exclude glob: {pat}"))?;
    }

    if settings.grace_period.is_zero() {
        return Err(anyhow!("grace period must be greater than zero"));
    }

    Ok(())
}

/// Strip a leading dot so `".go"` and `"go"` mean the same thing.
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_string()
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
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
                "unsupported duration unit '{unit}'; expected ms, s, m, or h"
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{s}' is too large"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_units() {
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration(" 3s "), Ok(Duration::from_secs(3)));
        assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
    }

    #[test]
    fn rejects_bad_durations() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("5d").is_err());
    }

    #[test]
    fn oversized_durations_are_rejected() {
        assert!(parse_duration("307445734561825861m").is_err());
        assert!(parse_duration("5124095576030432h").is_err());
        assert_eq!(
            parse_duration("307445734561825860m"),
            Ok(Duration::from_secs(307445734561825860 * 60))
        );
    }

    #[test]
    fn extension_loses_leading_dot() {
        assert_eq!(normalize_extension(".go"), "go");
        assert_eq!(normalize_extension("go"), "go");
    }

    #[test]
    fn invalid_exclude_glob_is_rejected() {
        let mut settings = Settings::new("example.com/app");
        settings.exclude = vec!["[".to_string()];
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn zero_grace_period_is_rejected() {
        let mut settings = Settings::new("example.com/app");
        settings.grace_period = Duration::ZERO;
        assert!(validate_settings(&settings).is_err());
    }
}
