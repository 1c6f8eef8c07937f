use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use snafu::ResultExt as _;

use crate::error::{ApplicationError, ConfigLoadSnafu};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(rename = "host_address", default = "default_host")]
    pub host: SocketAddr,
    /// Root of the remote authority, e.g. `http://127.0.0.1:3000/`.
    #[serde(default = "default_remote_url")]
    pub remote_url: String,
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(flatten)]
    pub timings: Timings,
}

impl Config {
    pub fn from_env() -> Result<Config, ApplicationError> {
        envy::from_env::<Config>().context(ConfigLoadSnafu)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            remote_url: default_remote_url(),
            data_file: default_data_file(),
            cache_dir: default_cache_dir(),
            log_dir: default_log_dir(),
            log_level: default_log_level(),
            timings: Timings::default(),
        }
    }
}

/// Every delay the sync engine waits on, written as humantime strings (`3s`, `500ms`).
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    #[serde(default = "default_probe_timeout", deserialize_with = "humantime_duration")]
    pub probe_timeout: Duration,
    #[serde(default = "default_request_timeout", deserialize_with = "humantime_duration")]
    pub request_timeout: Duration,
    #[serde(default = "default_monitor_interval", deserialize_with = "humantime_duration")]
    pub monitor_interval: Duration,
    #[serde(default = "default_autosave_delay", deserialize_with = "humantime_duration")]
    pub autosave_delay: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            probe_timeout: default_probe_timeout(),
            request_timeout: default_request_timeout(),
            monitor_interval: default_monitor_interval(),
            autosave_delay: default_autosave_delay(),
        }
    }
}

fn humantime_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    humantime::parse_duration(&text).map_err(serde::de::Error::custom)
}

fn default_host() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn default_remote_url() -> String {
    "http://127.0.0.1:3000/".to_string()
}

fn default_data_file() -> PathBuf {
    PathBuf::from("data.json")
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".reelsync")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_probe_timeout() -> Duration {
    Duration::from_secs(3)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_monitor_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_autosave_delay() -> Duration {
    Duration::from_millis(1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(vars: &[(&str, &str)]) -> Config {
        let vars = vars.iter().map(|(k, v)| (k.to_string(), v.to_string()));
        envy::from_iter(vars).unwrap()
    }

    #[test]
    fn everything_has_a_default() {
        let config = parse(&[]);

        assert_eq!(config.host, default_host());
        assert_eq!(config.remote_url, "http://127.0.0.1:3000/");
        assert_eq!(config.timings, Timings::default());
        assert_eq!(config.timings.autosave_delay, Duration::from_millis(1000));
    }

    #[test]
    fn durations_are_humantime() {
        let config = parse(&[
            ("PROBE_TIMEOUT", "500ms"),
            ("MONITOR_INTERVAL", "1m"),
            ("HOST_ADDRESS", "0.0.0.0:8080"),
        ]);

        assert_eq!(config.timings.probe_timeout, Duration::from_millis(500));
        assert_eq!(config.timings.monitor_interval, Duration::from_secs(60));
        assert_eq!(config.host.port(), 8080);
    }

    #[test]
    fn malformed_durations_are_rejected() {
        let vars = [("AUTOSAVE_DELAY".to_string(), "soon".to_string())];
        assert!(envy::from_iter::<_, Config>(vars).is_err());
    }
}
