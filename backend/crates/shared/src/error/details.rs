//! Per-field validation details
//!
//! Collected while validating a request and rendered under `details`
//! in the error envelope: `{"email": ["Invalid email format"]}`.

use std::collections::BTreeMap;

use serde::Serialize;

/// Validation messages grouped by request field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Shorthand for a single failing field
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Keep the `Ok` value or record the error message under `field`
    pub fn capture<T, E: std::fmt::Display>(
        &mut self,
        field: &str,
        result: Result<T, E>,
    ) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.add(field, e.to_string());
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_messages_by_field() {
        let mut errors = FieldErrors::new();
        errors.add("password", "too short");
        errors.add("password", "too common");
        errors.add("email", "invalid");

        assert_eq!(errors.get("password").map(<[String]>::len), Some(2));
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["email", "password"]);
    }

    #[test]
    fn test_capture() {
        let mut errors = FieldErrors::new();
        let ok: Option<u8> = errors.capture("a", Ok::<u8, String>(1));
        let bad: Option<u8> = errors.capture("b", Err::<u8, _>("nope"));

        assert_eq!(ok, Some(1));
        assert_eq!(bad, None);
        assert_eq!(errors.get("b"), Some(&["nope".to_string()][..]));
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let errors = FieldErrors::single("email", "taken");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({ "email": ["taken"] }));
    }
}
