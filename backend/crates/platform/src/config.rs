//! Environment Configuration Helpers
//!
//! Typed readers over process environment variables. Each binary decides
//! which variables it needs; these helpers only parse and report.

use std::str::FromStr;
use std::time::Duration;

use base64::{Engine, engine::general_purpose};

/// Minimum length of a signing secret, in bytes
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(String),

    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: String, reason: String },
}

/// Anything that can hand out raw variable values
///
/// The process environment in production, a map in tests.
pub trait EnvSource {
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads from `std::env`
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.trim().is_empty())
    }
}

impl EnvSource for std::collections::HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Typed access over an [`EnvSource`]
pub struct Env<S: EnvSource = ProcessEnv> {
    source: S,
}

impl Env<ProcessEnv> {
    pub fn process() -> Self {
        Self { source: ProcessEnv }
    }
}

impl<S: EnvSource> Env<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn required(&self, name: &str) -> Result<String, ConfigError> {
        self.source
            .get(name)
            .ok_or_else(|| ConfigError::Missing(name.to_string()))
    }

    pub fn optional(&self, name: &str) -> Option<String> {
        self.source.get(name)
    }

    /// Parse with `FromStr`, falling back to `default` when unset
    pub fn parsed_or<T>(&self, name: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.source.get(name) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                name: name.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    pub fn duration_secs_or(&self, name: &str, default: Duration) -> Result<Duration, ConfigError> {
        self.parsed_or(name, default.as_secs())
            .map(Duration::from_secs)
    }

    /// `true`/`false`/`1`/`0`
    pub fn flag_or(&self, name: &str, default: bool) -> Result<bool, ConfigError> {
        match self.source.get(name).as_deref().map(str::trim) {
            None => Ok(default),
            Some("1") | Some("true") => Ok(true),
            Some("0") | Some("false") => Ok(false),
            Some(other) => Err(ConfigError::Invalid {
                name: name.to_string(),
                reason: format!("expected a boolean, got {other:?}"),
            }),
        }
    }

    /// Base64-encoded secret of at least [`MIN_SECRET_LEN`] bytes
    pub fn secret(&self, name: &str) -> Result<Vec<u8>, ConfigError> {
        let raw = self.required(name)?;
        let bytes = general_purpose::STANDARD
            .decode(raw.trim())
            .map_err(|e| ConfigError::Invalid {
                name: name.to_string(),
                reason: format!("not valid base64: {e}"),
            })?;

        if bytes.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: name.to_string(),
                reason: format!("must decode to at least {MIN_SECRET_LEN} bytes"),
            });
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> Env<HashMap<String, String>> {
        Env::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_required_and_optional() {
        let env = env(&[("DATABASE_URL", "postgres://localhost/cms")]);
        assert_eq!(env.required("DATABASE_URL").unwrap(), "postgres://localhost/cms");
        assert!(matches!(env.required("NOPE"), Err(ConfigError::Missing(_))));
        assert_eq!(env.optional("NOPE"), None);
    }

    #[test]
    fn test_durations_and_flags() {
        let env = env(&[("TTL", "900"), ("BAD_TTL", "soon"), ("SECURE", "false")]);
        assert_eq!(
            env.duration_secs_or("TTL", Duration::from_secs(1)).unwrap(),
            Duration::from_secs(900)
        );
        assert_eq!(
            env.duration_secs_or("UNSET", Duration::from_secs(7)).unwrap(),
            Duration::from_secs(7)
        );
        assert!(env.duration_secs_or("BAD_TTL", Duration::ZERO).is_err());
        assert!(!env.flag_or("SECURE", true).unwrap());
        assert!(env.flag_or("UNSET", true).unwrap());
    }

    #[test]
    fn test_secret_length_enforced() {
        let long = general_purpose::STANDARD.encode([7u8; 32]);
        let short = general_purpose::STANDARD.encode([7u8; 8]);
        let env = env(&[("LONG", long.as_str()), ("SHORT", short.as_str()), ("JUNK", "%%%")]);

        assert_eq!(env.secret("LONG").unwrap(), vec![7u8; 32]);
        assert!(matches!(env.secret("SHORT"), Err(ConfigError::Invalid { .. })));
        assert!(matches!(env.secret("JUNK"), Err(ConfigError::Invalid { .. })));
    }
}
