use crate::error::{CsrfError, Result};
use serde::Deserialize;

/// Smallest secret accepted, in random bytes.
pub const MIN_SECRET_LENGTH: usize = 18;

/// CSRF gate configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CsrfConfig {
    /// Random bytes per session secret (at least 18)
    pub secret_length: usize,

    /// Random bytes per token salt
    pub salt_length: usize,

    /// Session key the secret is stored under
    pub session_key: String,

    /// Response header carrying the freshly issued token
    pub response_header: String,

    /// Body and query field name for the token
    pub field_name: String,

    /// Request headers checked for the token, in precedence order
    pub header_names: Vec<String>,

    /// Safe HTTP methods (not checked for CSRF)
    pub safe_methods: Vec<String>,
}

impl CsrfConfig {
    /// Create a configuration with the default names and lengths
    pub fn new() -> Self {
        Self {
            secret_length: MIN_SECRET_LENGTH,
            salt_length: 8,
            session_key: "csrfSecret".to_string(),
            response_header: "X-CSRF-TOKEN".to_string(),
            field_name: "_csrf".to_string(),
            header_names: vec![
                "csrf-token".to_string(),
                "xsrf-token".to_string(),
                "x-csrf-token".to_string(),
                "x-xsrf-token".to_string(),
            ],
            safe_methods: vec![
                "GET".to_string(),
                "HEAD".to_string(),
                "OPTIONS".to_string(),
            ],
        }
    }

    /// Load configuration from JSON, filling omitted fields with defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the bounds the token scheme relies on
    pub fn validate(&self) -> Result<()> {
        if self.secret_length < MIN_SECRET_LENGTH {
            return Err(CsrfError::Config(format!(
                "secret_length must be at least {} bytes, got {}",
                MIN_SECRET_LENGTH, self.secret_length
            )));
        }

        if self.salt_length == 0 {
            return Err(CsrfError::Config(
                "salt_length must be greater than zero".to_string(),
            ));
        }

        if self.session_key.is_empty() {
            return Err(CsrfError::Config("session_key must not be empty".to_string()));
        }

        if http::HeaderName::from_bytes(self.response_header.as_bytes()).is_err() {
            return Err(CsrfError::Config(format!(
                "response_header {:?} is not a valid header name",
                self.response_header
            )));
        }

        Ok(())
    }

    /// Set secret length in bytes
    pub fn with_secret_length(mut self, length: usize) -> Self {
        self.secret_length = length;
        self
    }

    /// Set salt length in bytes
    pub fn with_salt_length(mut self, length: usize) -> Self {
        self.salt_length = length;
        self
    }

    /// Set session key
    pub fn with_session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = key.into();
        self
    }

    /// Set response header name
    pub fn with_response_header(mut self, name: impl Into<String>) -> Self {
        self.response_header = name.into();
        self
    }

    /// Set body/query field name
    pub fn with_field_name(mut self, name: impl Into<String>) -> Self {
        self.field_name = name.into();
        self
    }

    /// Replace the request header names, in precedence order
    pub fn with_header_names(mut self, names: Vec<String>) -> Self {
        self.header_names = names;
        self
    }

    /// Replace the safe methods
    pub fn with_safe_methods(mut self, methods: Vec<String>) -> Self {
        self.safe_methods = methods;
        self
    }
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = CsrfConfig::default();
        assert_eq!(config.secret_length, 18);
        assert_eq!(config.salt_length, 8);
        assert_eq!(config.session_key, "csrfSecret");
        assert_eq!(config.response_header, "X-CSRF-TOKEN");
        assert_eq!(config.field_name, "_csrf");
        assert_eq!(
            config.header_names,
            vec!["csrf-token", "xsrf-token", "x-csrf-token", "x-xsrf-token"]
        );
        assert_eq!(config.safe_methods, vec!["GET", "HEAD", "OPTIONS"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = CsrfConfig::default()
            .with_secret_length(32)
            .with_session_key("_csrf_secret")
            .with_response_header("X-XSRF-TOKEN");

        assert_eq!(config.secret_length, 32);
        assert_eq!(config.session_key, "_csrf_secret");
        assert_eq!(config.response_header, "X-XSRF-TOKEN");
    }

    #[test]
    fn test_short_secret_rejected() {
        let config = CsrfConfig::default().with_secret_length(8);
        assert!(matches!(config.validate(), Err(CsrfError::Config(_))));
    }

    #[test]
    fn test_invalid_response_header_rejected() {
        for name in ["", "bad header", "x-token\n"] {
            let config = CsrfConfig::default().with_response_header(name);
            assert!(matches!(config.validate(), Err(CsrfError::Config(_))));
        }
        assert!(CsrfConfig::default().with_response_header("X-XSRF-TOKEN").validate().is_ok());
    }

    #[test]
    fn test_zero_salt_rejected() {
        let config = CsrfConfig::default().with_salt_length(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_partial() {
        let config = CsrfConfig::from_json(r#"{"secret_length": 24, "field_name": "csrf"}"#)
            .unwrap();
        assert_eq!(config.secret_length, 24);
        assert_eq!(config.field_name, "csrf");
        assert_eq!(config.session_key, "csrfSecret");
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            CsrfConfig::from_json("not json"),
            Err(CsrfError::Serialization(_))
        ));
        assert!(matches!(
            CsrfConfig::from_json(r#"{"secret_length": 4}"#),
            Err(CsrfError::Config(_))
        ));
    }
}
