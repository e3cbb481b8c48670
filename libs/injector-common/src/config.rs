// Runtime configuration for the load injector
// Defaults reproduce the fixed load profile; env vars and CLI flags override

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_TARGET_URL: &str = "http://localhost:8080/api/compile/json";
pub const DEFAULT_ITERATIONS: u32 = 10;
/// Equal to iterations x languages, so the default profile is never throttled
pub const DEFAULT_CONCURRENCY: usize = 40;
/// Upper bound on in-flight requests; well under tokio's semaphore permit limit
pub const MAX_CONCURRENCY: usize = 65_536;
pub const DEFAULT_MEMORY_LIMIT: u32 = 1500;
pub const DEFAULT_TIME_LIMIT: u32 = 15;

pub const ENV_URL: &str = "INJECTOR_URL";
pub const ENV_ITERATIONS: &str = "INJECTOR_ITERATIONS";
pub const ENV_CONCURRENCY: &str = "INJECTOR_CONCURRENCY";
pub const ENV_FIXTURES_DIR: &str = "INJECTOR_FIXTURES_DIR";
pub const ENV_MEMORY_LIMIT: &str = "INJECTOR_MEMORY_LIMIT";
pub const ENV_TIME_LIMIT: &str = "INJECTOR_TIME_LIMIT";

/// Limits stamped into every payload; data for the server, not client deadlines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobLimits {
    pub memory_limit: u32,
    pub time_limit: u32,
}

impl Default for JobLimits {
    fn default() -> Self {
        Self {
            memory_limit: DEFAULT_MEMORY_LIMIT,
            time_limit: DEFAULT_TIME_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectorConfig {
    pub target_url: String,
    pub iterations: u32,
    /// Maximum number of requests in flight at once
    pub concurrency: usize,
    pub fixtures_dir: PathBuf,
    pub limits: JobLimits,
}

impl Default for InjectorConfig {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            iterations: DEFAULT_ITERATIONS,
            concurrency: DEFAULT_CONCURRENCY,
            fixtures_dir: PathBuf::from("."),
            limits: JobLimits::default(),
        }
    }
}

impl InjectorConfig {
    /// Load defaults overridden by `INJECTOR_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` but reads variables through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_URL) {
            config.target_url = url;
        }
        if let Some(dir) = lookup(ENV_FIXTURES_DIR) {
            config.fixtures_dir = PathBuf::from(dir);
        }
        if let Some(value) = parse_var(&lookup, ENV_ITERATIONS)? {
            config.iterations = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_CONCURRENCY)? {
            config.concurrency = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_MEMORY_LIMIT)? {
            config.limits.memory_limit = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_TIME_LIMIT)? {
            config.limits.time_limit = value;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_url.trim().is_empty() {
            bail!("Target URL cannot be empty");
        }
        if self.iterations == 0 {
            bail!("Iterations must be at least 1");
        }
        if self.concurrency == 0 {
            bail!("Concurrency must be at least 1");
        }
        if self.concurrency > MAX_CONCURRENCY {
            bail!(
                "Concurrency {} exceeds the maximum of {}",
                self.concurrency,
                MAX_CONCURRENCY
            );
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => {
            let value = raw
                .trim()
                .parse::<T>()
                .with_context(|| format!("Invalid value for {}: '{}'", key, raw))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_fixed_profile() {
        let config = InjectorConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.target_url, "http://localhost:8080/api/compile/json");
        assert_eq!(config.iterations, 10);
        assert_eq!(config.concurrency, 40);
        assert_eq!(config.limits.memory_limit, 1500);
        assert_eq!(config.limits.time_limit, 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let config = InjectorConfig::from_lookup(lookup_from(&[
            (ENV_URL, "http://judge:9000/api/compile/json"),
            (ENV_ITERATIONS, "3"),
            (ENV_CONCURRENCY, " 8 "),
            (ENV_FIXTURES_DIR, "/srv/fixtures"),
            (ENV_TIME_LIMIT, "2"),
        ]))
        .unwrap();

        assert_eq!(config.target_url, "http://judge:9000/api/compile/json");
        assert_eq!(config.iterations, 3);
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.fixtures_dir, PathBuf::from("/srv/fixtures"));
        assert_eq!(config.limits.time_limit, 2);
        assert_eq!(config.limits.memory_limit, DEFAULT_MEMORY_LIMIT);
    }

    #[test]
    fn test_invalid_env_value_is_rejected() {
        let err = InjectorConfig::from_lookup(lookup_from(&[(ENV_ITERATIONS, "ten")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_ITERATIONS));
    }

    #[test]
    fn test_validate_rejects_zero_fan_out() {
        let mut config = InjectorConfig::default();
        config.concurrency = 0;
        assert!(config.validate().is_err());

        let mut config = InjectorConfig::default();
        config.iterations = 0;
        assert!(config.validate().is_err());

        let mut config = InjectorConfig::default();
        config.target_url = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_caps_concurrency() {
        let mut config = InjectorConfig::default();
        config.concurrency = MAX_CONCURRENCY;
        assert!(config.validate().is_ok());

        config.concurrency = usize::MAX;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("exceeds the maximum"));
    }
}
