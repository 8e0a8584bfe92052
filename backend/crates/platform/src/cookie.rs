//! Cookie Management Infrastructure
//!
//! Building and reading the `Set-Cookie` / `Cookie` headers.

use axum::http::{HeaderMap, HeaderValue, header};

/// SameSite policy for cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    /// Sent on cross-site requests. Browsers require `Secure` alongside it.
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Cookie configuration
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub path: String,
    pub max_age_secs: Option<i64>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "session".to_string(),
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
            path: "/".to_string(),
            max_age_secs: None,
        }
    }
}

impl CookieConfig {
    fn attributes(&self) -> String {
        let mut attrs = String::new();
        if self.http_only {
            attrs.push_str("; HttpOnly");
        }
        if self.secure {
            attrs.push_str("; Secure");
        }
        attrs.push_str("; SameSite=");
        attrs.push_str(self.same_site.as_str());
        attrs.push_str("; Path=");
        attrs.push_str(&self.path);
        attrs
    }

    /// Build Set-Cookie header value
    pub fn build_set_cookie(&self, value: &str) -> String {
        let mut cookie = format!("{}={}{}", self.name, value, self.attributes());
        if let Some(max_age) = self.max_age_secs {
            cookie.push_str(&format!("; Max-Age={}", max_age));
        }
        cookie
    }

    /// Build Set-Cookie header for deletion (expired)
    ///
    /// Carries the same attributes as the original cookie; browsers ignore a
    /// deletion whose `SameSite`/`Secure` differ from the stored cookie on
    /// cross-site requests.
    pub fn build_delete_cookie(&self) -> String {
        format!(
            "{}={}; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            self.name,
            self.attributes()
        )
    }
}

/// Extract a cookie value from headers
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;
            (key == name && !value.is_empty()).then(|| value.to_string())
        })
}

/// Create a Set-Cookie header value
pub fn set_cookie_header(config: &CookieConfig, value: &str) -> HeaderValue {
    HeaderValue::from_str(&config.build_set_cookie(value))
        .unwrap_or_else(|_| HeaderValue::from_static(""))
}

/// Create a Set-Cookie header value that removes the cookie
pub fn delete_cookie_header(config: &CookieConfig) -> HeaderValue {
    HeaderValue::from_str(&config.build_delete_cookie())
        .unwrap_or_else(|_| HeaderValue::from_static(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cross_site() -> CookieConfig {
        CookieConfig {
            name: "refreshToken".to_string(),
            secure: true,
            http_only: true,
            same_site: SameSite::None,
            path: "/".to_string(),
            max_age_secs: Some(86_400),
        }
    }

    #[test]
    fn test_cookie_config_build() {
        let cookie = cross_site().build_set_cookie("value123");
        assert!(cookie.starts_with("refreshToken=value123"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=None"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=86400"));
    }

    #[test]
    fn test_delete_cookie_keeps_attributes() {
        let cookie = cross_site().build_delete_cookie();
        assert!(cookie.starts_with("refreshToken=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.contains("SameSite=None"));
        assert!(cookie.contains("Secure"));
        assert!(!cookie.contains("86400"));
    }

    #[test]
    fn test_extract_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("foo=bar; refreshToken=abc.def.ghi; empty="),
        );

        assert_eq!(
            extract_cookie(&headers, "refreshToken"),
            Some("abc.def.ghi".to_string())
        );
        assert_eq!(extract_cookie(&headers, "foo"), Some("bar".to_string()));
        assert_eq!(extract_cookie(&headers, "empty"), None);
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_extract_cookie_across_multiple_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::COOKIE, HeaderValue::from_static("b=2"));
        assert_eq!(extract_cookie(&headers, "b"), Some("2".to_string()));
    }
}
