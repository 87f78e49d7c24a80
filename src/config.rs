//! Service configuration from environment variables
//!
//! | Variable                          | Default            |
//! |-----------------------------------|--------------------|
//! | `TELEMETRY_BIND`                  | `127.0.0.1:7420`   |
//! | `TELEMETRY_STATE_DIR`             | `./state`          |
//! | `TELEMETRY_MAX_EVENTS`            | `10000`            |
//! | `TELEMETRY_MAX_AGE_SECS`          | `86400`            |
//! | `TELEMETRY_SESSION_MAX_AGE_SECS`  | `604800`           |
//! | `TELEMETRY_METRICS_INTERVAL_SECS` | `60`               |
//! | `TELEMETRY_METRICS_HISTORY`       | `1440`             |
//! | `TELEMETRY_IO_TIMEOUT_SECS`       | `10`               |

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::event_log::RetentionConfig;
use crate::metrics::{AggregatorConfig, METRICS_FILE_NAME};

pub const DEFAULT_BIND: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 7420);

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub state_dir: PathBuf,
    pub retention: RetentionConfig,
    pub aggregator: AggregatorConfig,
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let current_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::from_lookup(&current_dir, |name| env::var(name).ok())
    }

    /// Build configuration from any variable lookup; relative state
    /// directories are resolved against `base_dir`
    pub fn from_lookup<F>(base_dir: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr: SocketAddr = parse_var(&lookup, "TELEMETRY_BIND")?
            .unwrap_or(DEFAULT_BIND);

        let state_dir = match lookup("TELEMETRY_STATE_DIR") {
            Some(dir) if Path::new(&dir).is_absolute() => PathBuf::from(dir),
            Some(dir) => base_dir.join(dir),
            None => base_dir.join("state"),
        };

        let defaults = RetentionConfig::default();
        let retention = RetentionConfig {
            max_events: parse_var(&lookup, "TELEMETRY_MAX_EVENTS")?
                .unwrap_or(defaults.max_events),
            max_age: secs_var(&lookup, "TELEMETRY_MAX_AGE_SECS")?.unwrap_or(defaults.max_age),
            session_max_age: secs_var(&lookup, "TELEMETRY_SESSION_MAX_AGE_SECS")?
                .unwrap_or(defaults.session_max_age),
            active_window: defaults.active_window,
        };

        let aggregator_defaults = AggregatorConfig::default();
        let aggregator = AggregatorConfig {
            interval: secs_var(&lookup, "TELEMETRY_METRICS_INTERVAL_SECS")?
                .unwrap_or(aggregator_defaults.interval),
            max_history: parse_var(&lookup, "TELEMETRY_METRICS_HISTORY")?
                .unwrap_or(aggregator_defaults.max_history),
            state_path: Some(state_dir.join(METRICS_FILE_NAME)),
            io_timeout: secs_var(&lookup, "TELEMETRY_IO_TIMEOUT_SECS")?
                .unwrap_or(aggregator_defaults.io_timeout),
        };

        if aggregator.interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                var: "TELEMETRY_METRICS_INTERVAL_SECS".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(Self {
            bind_addr,
            state_dir,
            retention,
            aggregator,
        })
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                var: name.to_string(),
                value: raw,
            }),
    }
}

fn secs_var<F>(lookup: &F, name: &str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(parse_var::<u64, F>(lookup, name)?.map(Duration::from_secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(Path::new("/srv/telemetry"), |name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.bind_addr, DEFAULT_BIND);
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:7420");
        assert_eq!(config.state_dir, PathBuf::from("/srv/telemetry/state"));
        assert_eq!(config.retention, RetentionConfig::default());
        assert_eq!(config.aggregator.interval, Duration::from_secs(60));
        assert_eq!(
            config.aggregator.state_path,
            Some(PathBuf::from("/srv/telemetry/state/metrics-history.json"))
        );
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("TELEMETRY_BIND", "0.0.0.0:9000"),
            ("TELEMETRY_STATE_DIR", "data"),
            ("TELEMETRY_MAX_EVENTS", "500"),
            ("TELEMETRY_MAX_AGE_SECS", "120"),
            ("TELEMETRY_METRICS_HISTORY", "10"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.state_dir, PathBuf::from("/srv/telemetry/data"));
        assert_eq!(config.retention.max_events, 500);
        assert_eq!(config.retention.max_age, Duration::from_secs(120));
        assert_eq!(config.aggregator.max_history, 10);
    }

    #[test]
    fn test_invalid_value_is_reported() {
        let err = config_from(&[("TELEMETRY_MAX_EVENTS", "lots")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                var: "TELEMETRY_MAX_EVENTS".to_string(),
                value: "lots".to_string(),
            }
        );
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        assert!(config_from(&[("TELEMETRY_METRICS_INTERVAL_SECS", "0")]).is_err());
    }
}
