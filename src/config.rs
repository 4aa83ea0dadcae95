use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use url::Url;

use crate::api::http::DEFAULT_TIMEOUT;
use crate::services::keep_alive::DEFAULT_INTERVAL;

pub const APP_ID: &str = "neon-todo";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

pub const ENV_API_URL: &str = "NEON_TODO_API_URL";
pub const ENV_KEEP_ALIVE_SECS: &str = "NEON_TODO_KEEP_ALIVE_SECS";
pub const ENV_TIMEOUT_SECS: &str = "NEON_TODO_TIMEOUT_SECS";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub keep_alive_interval: Duration,
    pub request_timeout: Duration,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = match lookup(ENV_API_URL) {
            Some(raw) => parse_api_url(&raw)?,
            None => {
                tracing::debug!("{} not set, using {}", ENV_API_URL, DEFAULT_API_URL);
                parse_api_url(DEFAULT_API_URL)?
            }
        };

        let keep_alive_interval = match lookup(ENV_KEEP_ALIVE_SECS) {
            Some(raw) => parse_secs(ENV_KEEP_ALIVE_SECS, &raw)?,
            None => DEFAULT_INTERVAL,
        };

        let request_timeout = match lookup(ENV_TIMEOUT_SECS) {
            Some(raw) => parse_secs(ENV_TIMEOUT_SECS, &raw)?,
            None => DEFAULT_TIMEOUT,
        };

        let data_dir = match lookup("XDG_DATA_HOME") {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => lookup("HOME")
                .map(|home| PathBuf::from(home).join(".local/share"))
                .ok_or_else(|| anyhow!("Neither XDG_DATA_HOME nor HOME is set"))?,
        };

        Ok(Self {
            api_url,
            keep_alive_interval,
            request_timeout,
            data_dir: data_dir.join(APP_ID),
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(format!("{APP_ID}.db"))
    }
}

pub fn parse_api_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("Invalid API URL: {raw}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(anyhow!("Unsupported API URL scheme: {other}")),
    }
}

fn parse_secs(name: &str, raw: &str) -> Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{name} must be a whole number of seconds"))?;
    if secs == 0 {
        return Err(anyhow!("{name} must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("HOME", "/home/case")])).unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.keep_alive_interval, Duration::from_secs(840));
        assert_eq!(
            config.db_path(),
            PathBuf::from("/home/case/.local/share/neon-todo/neon-todo.db")
        );
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            (ENV_API_URL, "https://api.neon.example/v1"),
            (ENV_KEEP_ALIVE_SECS, "60"),
            (ENV_TIMEOUT_SECS, "5"),
            ("XDG_DATA_HOME", "/data"),
        ]))
        .unwrap();
        assert_eq!(config.api_url.host_str(), Some("api.neon.example"));
        assert_eq!(config.keep_alive_interval, Duration::from_secs(60));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.data_dir, PathBuf::from("/data/neon-todo"));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Config::from_lookup(lookup(&[("HOME", "/h"), (ENV_API_URL, "ftp://x")])).is_err());
        assert!(Config::from_lookup(lookup(&[("HOME", "/h"), (ENV_API_URL, "not a url")])).is_err());
        assert!(Config::from_lookup(lookup(&[("HOME", "/h"), (ENV_KEEP_ALIVE_SECS, "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[])).is_err());
    }
}
