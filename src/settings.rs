//! Service settings from environment variables (a `.env` file is read first by the binary).

use crate::backend::BackendConfig;
use crate::error::ConfigError;
use crate::query::DEFAULT_PAGE_SIZE;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Settings {
    pub backend: BackendConfig,
    pub bind_addr: String,
    pub default_page_size: u32,
    pub body_limit_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            backend: BackendConfig::default(),
            bind_addr: "127.0.0.1:3000".into(),
            default_page_size: DEFAULT_PAGE_SIZE,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

fn parse<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::Validation(format!("{} has an invalid value: {}", key, v))),
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Settings::default();
        let timeout_secs = parse(
            "BACKEND_TIMEOUT_SECS",
            lookup("BACKEND_TIMEOUT_SECS"),
            defaults.backend.timeout.as_secs(),
        )?;
        let default_page_size = parse("DEFAULT_PAGE_SIZE", lookup("DEFAULT_PAGE_SIZE"), defaults.default_page_size)?;
        if default_page_size == 0 {
            return Err(ConfigError::Validation("DEFAULT_PAGE_SIZE must be positive".into()));
        }
        Ok(Settings {
            backend: BackendConfig {
                base_url: lookup("BACKEND_URL").unwrap_or(defaults.backend.base_url),
                timeout: Duration::from_secs(timeout_secs),
                token: lookup("BACKEND_TOKEN").filter(|t| !t.is_empty()),
            },
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            default_page_size,
            body_limit_bytes: parse("BODY_LIMIT_BYTES", lookup("BODY_LIMIT_BYTES"), defaults.body_limit_bytes)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let s = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(s.bind_addr, "127.0.0.1:3000");
        assert_eq!(s.default_page_size, 20);
        assert_eq!(s.backend.timeout, Duration::from_secs(30));
        assert!(s.backend.token.is_none());
    }

    #[test]
    fn reads_overrides() {
        let s = Settings::from_lookup(lookup(&[
            ("BACKEND_URL", "http://payroll:9000/api"),
            ("BACKEND_TIMEOUT_SECS", "5"),
            ("BACKEND_TOKEN", "secret"),
            ("DEFAULT_PAGE_SIZE", "50"),
        ]))
        .unwrap();
        assert_eq!(s.backend.base_url, "http://payroll:9000/api");
        assert_eq!(s.backend.timeout, Duration::from_secs(5));
        assert_eq!(s.backend.token.as_deref(), Some("secret"));
        assert_eq!(s.default_page_size, 50);
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(Settings::from_lookup(lookup(&[("BACKEND_TIMEOUT_SECS", "soon")])).is_err());
        assert!(Settings::from_lookup(lookup(&[("DEFAULT_PAGE_SIZE", "0")])).is_err());
    }
}
