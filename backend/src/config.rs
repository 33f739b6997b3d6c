//! Runtime configuration read from the environment.
//!
//! Every setting has a default so the application starts with no environment
//! at all, the same way the log level falls back to `info` unless `RUST_LOG`
//! is set.

use log::warn;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE: &str = "krd.sqlite";
const DEFAULT_OUTPUT_DIR: &str = "./generated";
const DEFAULT_OPERATOR: &str = "system";
const DEFAULT_JSON_LIMIT_MB: usize = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// SQLite file holding templates, mappings, case data and the audit log.
    pub database_path: PathBuf,
    /// Directory where generated documents wait until they are saved.
    pub output_dir: PathBuf,
    /// Name written into the `username` column of audit rows.
    pub operator: String,
    pub json_limit_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_path: PathBuf::from(DEFAULT_DATABASE),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            operator: DEFAULT_OPERATOR.to_string(),
            json_limit_bytes: DEFAULT_JSON_LIMIT_MB * 1024 * 1024,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            host: value("KRD_HOST").unwrap_or(defaults.host),
            port: parse_or("KRD_PORT", value("KRD_PORT"), defaults.port),
            database_path: value("KRD_DATABASE")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            output_dir: value("KRD_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            operator: value("KRD_OPERATOR").unwrap_or(defaults.operator),
            json_limit_bytes: parse_or(
                "KRD_JSON_LIMIT_MB",
                value("KRD_JSON_LIMIT_MB"),
                DEFAULT_JSON_LIMIT_MB,
            ) * 1024
                * 1024,
        }
    }

    pub fn bind_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}={:?}, using {}", key, raw, default);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_environment() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_path, PathBuf::from("krd.sqlite"));
        assert_eq!(config.operator, "system");
        assert_eq!(config.json_limit_bytes, 10 * 1024 * 1024);
        assert_eq!(config.bind_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("KRD_PORT", "9090"),
            ("KRD_DATABASE", "/tmp/cases.sqlite"),
            ("KRD_OPERATOR", "ivanov"),
            ("KRD_JSON_LIMIT_MB", "2"),
        ]));
        assert_eq!(config.port, 9090);
        assert_eq!(config.database_path, PathBuf::from("/tmp/cases.sqlite"));
        assert_eq!(config.operator, "ivanov");
        assert_eq!(config.json_limit_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let config = AppConfig::from_lookup(lookup(&[("KRD_PORT", "eighty"), ("KRD_HOST", " ")]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
    }
}
