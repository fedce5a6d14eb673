//! Dashboard configuration from environment variables
//!
//! Loaded once at startup (after `.env`, if present) and passed explicitly to
//! the components that need it.

use crate::aggregator_core::{
    UnclassifiedPolicy, WindowDays, WindowError, DEFAULT_CACHE_TTL, DEFAULT_TOP_K,
};
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
    #[error(transparent)]
    Window(#[from] WindowError),
}

/// Range of window lengths the dashboard offers. The aggregation itself
/// accepts any positive length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    pub min: u32,
    pub max: u32,
}

impl WindowBounds {
    pub fn check(&self, days: u32) -> Result<WindowDays, WindowError> {
        if days < self.min || days > self.max {
            return Err(WindowError::OutOfRange {
                days,
                min: self.min,
                max: self.max,
            });
        }
        WindowDays::new(days)
    }
}

impl Default for WindowBounds {
    fn default() -> Self {
        Self { min: 1, max: 180 }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Path to the SQLite database holding `species_logins`
    pub db_path: PathBuf,
    pub default_window: WindowDays,
    pub window_bounds: WindowBounds,
    pub cache_ttl: Duration,
    pub top_k: usize,
    pub unclassified: UnclassifiedPolicy,
    /// JSON species -> diet file; the `species_diets` table is used when unset
    pub classifications_path: Option<PathBuf>,
}

impl DashboardConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `SPECIES_DB_PATH` (default: data/species.db)
    /// - `DEFAULT_WINDOW_DAYS` (default: 7)
    /// - `WINDOW_MIN_DAYS` / `WINDOW_MAX_DAYS` (default: 1 / 180)
    /// - `CACHE_TTL_SECS` (default: 300)
    /// - `TOP_K` (default: 5)
    /// - `UNCLASSIFIED_POLICY` (default: drop; or bucket, bucket:<label>)
    /// - `CLASSIFICATIONS_PATH` (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path: PathBuf = var("SPECIES_DB_PATH")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "data/species.db".to_string())
            .into();

        let window_bounds = WindowBounds {
            min: parse_var(&var, "WINDOW_MIN_DAYS", 1)?,
            max: parse_var(&var, "WINDOW_MAX_DAYS", 180)?,
        };
        if window_bounds.min == 0 || window_bounds.min > window_bounds.max {
            return Err(ConfigError::InvalidValue {
                var: "WINDOW_MIN_DAYS".to_string(),
                reason: format!(
                    "bounds {}..={} must be positive and ordered",
                    window_bounds.min, window_bounds.max
                ),
            });
        }

        let default_window = window_bounds.check(parse_var(&var, "DEFAULT_WINDOW_DAYS", 7)?)?;

        let cache_ttl = Duration::from_secs(parse_var(
            &var,
            "CACHE_TTL_SECS",
            DEFAULT_CACHE_TTL.as_secs(),
        )?);

        let top_k = parse_var(&var, "TOP_K", DEFAULT_TOP_K)?;
        let unclassified = parse_var(&var, "UNCLASSIFIED_POLICY", UnclassifiedPolicy::Drop)?;

        let classifications_path = var("CLASSIFICATIONS_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            db_path,
            default_window,
            window_bounds,
            cache_ttl,
            top_k,
            unclassified,
            classifications_path,
        })
    }
}

fn parse_var<F, T>(var: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match var(name) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                var: name.to_string(),
                reason: e.to_string(),
            })
        }
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<DashboardConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DashboardConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.db_path, PathBuf::from("data/species.db"));
        assert_eq!(config.default_window.days(), 7);
        assert_eq!(config.window_bounds, WindowBounds { min: 1, max: 180 });
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.top_k, 5);
        assert_eq!(config.unclassified, UnclassifiedPolicy::Drop);
        assert!(config.classifications_path.is_none());
    }

    #[test]
    fn test_custom_config() {
        let config = config_from(&[
            ("SPECIES_DB_PATH", "/tmp/test.db"),
            ("DEFAULT_WINDOW_DAYS", "30"),
            ("WINDOW_MAX_DAYS", "30"),
            ("CACHE_TTL_SECS", "60"),
            ("TOP_K", "3"),
            ("UNCLASSIFIED_POLICY", "bucket:other"),
            ("CLASSIFICATIONS_PATH", "diets.json"),
        ])
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/test.db"));
        assert_eq!(config.default_window.days(), 30);
        assert_eq!(config.window_bounds.max, 30);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.top_k, 3);
        assert_eq!(
            config.unclassified,
            UnclassifiedPolicy::Bucket("other".to_string())
        );
        assert_eq!(config.classifications_path, Some(PathBuf::from("diets.json")));
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = config_from(&[("TOP_K", "many")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref var, .. } if var == "TOP_K"));
    }

    #[test]
    fn test_default_window_must_fit_bounds() {
        let err = config_from(&[("DEFAULT_WINDOW_DAYS", "200")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Window(WindowError::OutOfRange {
                days: 200,
                min: 1,
                max: 180
            })
        );
    }

    #[test]
    fn test_bounds_check() {
        let bounds = WindowBounds { min: 1, max: 30 };
        assert!(bounds.check(0).is_err());
        assert!(bounds.check(31).is_err());
        assert_eq!(bounds.check(30).unwrap().days(), 30);
    }
}
