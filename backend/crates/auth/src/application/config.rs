//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::fmt;
use std::time::Duration;

use platform::config::{ConfigError, Env, EnvSource};
use platform::cookie::CookieConfig;
use platform::crypto::random_bytes;
use platform::rate_limit::RateLimitConfig;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(15 * 60);
const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(24 * 3600);
const DEFAULT_SECURITY_TOKEN_TTL: Duration = Duration::from_secs(15 * 60);
const DEFAULT_FORGOT_REQUESTS_PER_HOUR: u32 = 5;

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC key for access tokens
    pub access_token_secret: Vec<u8>,
    /// HMAC key for refresh tokens; must differ from the access key
    pub refresh_token_secret: Vec<u8>,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    /// Lifetime of password reset and email verification tokens
    pub security_token_ttl: Duration,
    /// Cookie carrying the refresh token
    pub refresh_cookie: CookieConfig,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Origin used to build links in outbound emails
    pub public_base_url: String,
    /// Per-address limit on forgot-password / forgot-username requests
    pub forgot_rate_limit: RateLimitConfig,
}

impl AuthConfig {
    /// Production defaults around the given secrets
    pub fn new(access_token_secret: Vec<u8>, refresh_token_secret: Vec<u8>) -> Self {
        Self {
            access_token_secret,
            refresh_token_secret,
            access_token_ttl: DEFAULT_ACCESS_TTL,
            refresh_token_ttl: DEFAULT_REFRESH_TTL,
            security_token_ttl: DEFAULT_SECURITY_TOKEN_TTL,
            refresh_cookie: refresh_cookie(true, DEFAULT_REFRESH_TTL),
            password_pepper: None,
            public_base_url: "http://localhost:3000".to_string(),
            forgot_rate_limit: RateLimitConfig::per_hour(DEFAULT_FORGOT_REQUESTS_PER_HOUR),
        }
    }

    /// Create config with random signing secrets
    pub fn with_random_secrets() -> Self {
        Self::new(random_bytes(32), random_bytes(32))
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        let mut config = Self::with_random_secrets();
        config.refresh_cookie = refresh_cookie(false, config.refresh_token_ttl);
        config
    }

    /// Read the configuration from environment variables
    ///
    /// `ACCESS_TOKEN_SECRET` and `REFRESH_TOKEN_SECRET` are required; every
    /// other variable has a default.
    pub fn from_env<S: EnvSource>(env: &Env<S>) -> Result<Self, ConfigError> {
        let access_token_secret = env.secret("ACCESS_TOKEN_SECRET")?;
        let refresh_token_secret = env.secret("REFRESH_TOKEN_SECRET")?;
        if access_token_secret == refresh_token_secret {
            return Err(ConfigError::Invalid {
                name: "REFRESH_TOKEN_SECRET".to_string(),
                reason: "must differ from ACCESS_TOKEN_SECRET".to_string(),
            });
        }

        let refresh_token_ttl = env.duration_secs_or("REFRESH_TOKEN_TTL_SECS", DEFAULT_REFRESH_TTL)?;
        let cookie_secure = env.flag_or("COOKIE_SECURE", true)?;

        Ok(Self {
            access_token_secret,
            refresh_token_secret,
            access_token_ttl: env.duration_secs_or("ACCESS_TOKEN_TTL_SECS", DEFAULT_ACCESS_TTL)?,
            refresh_token_ttl,
            security_token_ttl: env
                .duration_secs_or("SECURITY_TOKEN_TTL_SECS", DEFAULT_SECURITY_TOKEN_TTL)?,
            refresh_cookie: refresh_cookie(cookie_secure, refresh_token_ttl),
            password_pepper: env.optional("PASSWORD_PEPPER").map(String::into_bytes),
            public_base_url: env
                .optional("PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            forgot_rate_limit: RateLimitConfig::per_hour(
                env.parsed_or("FORGOT_RATE_LIMIT_PER_HOUR", DEFAULT_FORGOT_REQUESTS_PER_HOUR)?,
            ),
        })
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}

/// Cross-site refresh cookie; `SameSite=None` only when it can be `Secure`
fn refresh_cookie(secure: bool, ttl: Duration) -> CookieConfig {
    CookieConfig {
        name: REFRESH_COOKIE_NAME.to_string(),
        secure,
        http_only: true,
        same_site: if secure { SameSite::None } else { SameSite::Lax },
        path: "/".to_string(),
        max_age_secs: Some(ttl.as_secs() as i64),
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_token_secret", &"[REDACTED]")
            .field("refresh_token_secret", &"[REDACTED]")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("security_token_ttl", &self.security_token_ttl)
            .field("refresh_cookie", &self.refresh_cookie)
            .field("password_pepper", &self.password_pepper.as_ref().map(|_| "[REDACTED]"))
            .field("public_base_url", &self.public_base_url)
            .field("forgot_rate_limit", &self.forgot_rate_limit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const KEY_A: &str = "YWFhYWFhYWFhYWFhYWFhYWFhYWFhYWFhYWFhYWFhYWE=";
    const KEY_B: &str = "YmJiYmJiYmJiYmJiYmJiYmJiYmJiYmJiYmJiYmJiYmI=";

    fn env(pairs: &[(&str, &str)]) -> Env<HashMap<String, String>> {
        Env::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_defaults() {
        let config = AuthConfig::from_env(&env(&[
            ("ACCESS_TOKEN_SECRET", KEY_A),
            ("REFRESH_TOKEN_SECRET", KEY_B),
        ]))
        .unwrap();

        assert_eq!(config.access_token_ttl, Duration::from_secs(900));
        assert_eq!(config.refresh_token_ttl, Duration::from_secs(86_400));
        assert_eq!(config.security_token_ttl, Duration::from_secs(900));
        assert_eq!(config.refresh_cookie.name, "refreshToken");
        assert_eq!(config.refresh_cookie.same_site, SameSite::None);
        assert!(config.refresh_cookie.secure);
        assert_eq!(config.refresh_cookie.max_age_secs, Some(86_400));
        assert!(config.pepper().is_none());
    }

    #[test]
    fn test_overrides() {
        let config = AuthConfig::from_env(&env(&[
            ("ACCESS_TOKEN_SECRET", KEY_A),
            ("REFRESH_TOKEN_SECRET", KEY_B),
            ("ACCESS_TOKEN_TTL_SECS", "60"),
            ("COOKIE_SECURE", "false"),
            ("PUBLIC_BASE_URL", "https://cms.example.com/"),
            ("PASSWORD_PEPPER", "pepper"),
        ]))
        .unwrap();

        assert_eq!(config.access_token_ttl, Duration::from_secs(60));
        assert!(!config.refresh_cookie.secure);
        assert_eq!(config.refresh_cookie.same_site, SameSite::Lax);
        assert_eq!(config.public_base_url, "https://cms.example.com");
        assert_eq!(config.pepper(), Some(&b"pepper"[..]));
    }

    #[test]
    fn test_secrets_required_and_distinct() {
        assert!(matches!(
            AuthConfig::from_env(&env(&[("ACCESS_TOKEN_SECRET", KEY_A)])),
            Err(ConfigError::Missing(_))
        ));
        assert!(matches!(
            AuthConfig::from_env(&env(&[
                ("ACCESS_TOKEN_SECRET", KEY_A),
                ("REFRESH_TOKEN_SECRET", KEY_A),
            ])),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug = format!("{:?}", AuthConfig::with_random_secrets());
        assert!(debug.contains("[REDACTED]"));
    }
}
