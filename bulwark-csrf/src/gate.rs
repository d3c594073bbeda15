use crate::config::CsrfConfig;
use crate::error::{CsrfError, Result};
use crate::extract::TokenExtractor;
use crate::logging::{debug, trace, warn};
use crate::request::{CsrfRequest, ResponseHeaders};
use crate::session::SessionData;
use crate::token::{Secret, Token, TokenManager};
use std::sync::Arc;

/// Next step after looking at the request method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Issue,
    Validate,
}

/// Per-request CSRF gate.
///
/// Holds no per-request state; clone it into every worker or share it
/// behind a reference.
#[derive(Debug, Clone)]
pub struct CsrfGate {
    config: Arc<CsrfConfig>,
    tokens: TokenManager,
    extractor: Arc<TokenExtractor>,
}

impl CsrfGate {
    /// Create a gate from a validated configuration
    pub fn new(config: CsrfConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            tokens: TokenManager::from_config(&config),
            extractor: Arc::new(TokenExtractor::from_config(&config)),
            config: Arc::new(config),
        })
    }

    /// Replace the token extraction order
    pub fn with_extractor(mut self, extractor: TokenExtractor) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    pub fn config(&self) -> &CsrfConfig {
        &self.config
    }

    pub fn token_manager(&self) -> &TokenManager {
        &self.tokens
    }

    pub fn extractor(&self) -> &TokenExtractor {
        &self.extractor
    }

    /// Check if the method skips validation
    pub fn is_safe_method(&self, method: &str) -> bool {
        self.config.safe_methods.iter().any(|m| m == method)
    }

    /// Gate one request.
    ///
    /// Safe methods always pass. Any other method must carry a token
    /// derived from the session secret, otherwise the request is rejected
    /// with [`CsrfError::Forbidden`] and the response is left untouched.
    /// On success a fresh token is set on the response header and returned.
    pub fn guard<S, R, W>(&self, session: &mut S, request: &R, response: &mut W) -> Result<Token>
    where
        S: SessionData + ?Sized,
        R: CsrfRequest + ?Sized,
        W: ResponseHeaders + ?Sized,
    {
        let method = request.method();

        let step = if self.is_safe_method(method) {
            Step::Issue
        } else {
            Step::Validate
        };
        trace!(method, ?step, "CSRF method check");

        if step == Step::Validate && !self.validate(&*session, request) {
            warn!(method, "Rejected request with invalid CSRF token");
            return Err(CsrfError::invalid_token());
        }

        self.issue(session, response)
    }

    fn validate<S, R>(&self, session: &S, request: &R) -> bool
    where
        S: SessionData + ?Sized,
        R: CsrfRequest + ?Sized,
    {
        let Some((source, candidate)) = self.extractor.extract(request) else {
            debug!("No CSRF token supplied");
            return false;
        };

        let Some(secret) = session.get(&self.config.session_key) else {
            debug!("Session has no CSRF secret");
            return false;
        };

        let valid = self.tokens.verify_token(&Secret::new(secret), &candidate);
        debug!(?source, valid, "Verified CSRF token");
        valid
    }

    fn issue<S, W>(&self, session: &mut S, response: &mut W) -> Result<Token>
    where
        S: SessionData + ?Sized,
        W: ResponseHeaders + ?Sized,
    {
        let (secret, fresh) = match session.get(&self.config.session_key) {
            Some(existing) if !existing.is_empty() => (Secret::new(existing), false),
            _ => (self.tokens.generate_secret(), true),
        };

        let token = self.tokens.derive_token(&secret);
        // Header first: a failed write must leave the session untouched
        response.set_header(&self.config.response_header, token.as_str())?;

        if fresh {
            session.set(&self.config.session_key, secret.into_inner());
            debug!("Stored new CSRF secret in session");
        }

        Ok(token)
    }
}

impl Default for CsrfGate {
    fn default() -> Self {
        let config = CsrfConfig::default();
        Self {
            tokens: TokenManager::from_config(&config),
            extractor: Arc::new(TokenExtractor::from_config(&config)),
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{HttpRequest, HttpResponse};
    use crate::session::MemorySession;

    const KEY: &str = "csrfSecret";

    #[test]
    fn test_safe_methods_issue_token() {
        let gate = CsrfGate::default();

        for method in ["GET", "HEAD", "OPTIONS"] {
            let mut session = MemorySession::new();
            let mut res = HttpResponse::ok();

            let token = gate
                .guard(&mut session, &HttpRequest::new(method), &mut res)
                .unwrap();

            assert_eq!(res.header("X-CSRF-TOKEN"), Some(token.as_str()));
            assert!(session.contains(KEY));
        }
    }

    #[test]
    fn test_safe_method_is_case_sensitive() {
        let gate = CsrfGate::default();
        assert!(gate.is_safe_method("GET"));
        assert!(!gate.is_safe_method("get"));
        assert!(!gate.is_safe_method("POST"));
    }

    #[test]
    fn test_post_without_token_rejected() {
        let gate = CsrfGate::default();
        let mut session = MemorySession::new();
        let mut res = HttpResponse::ok();

        let err = gate
            .guard(&mut session, &HttpRequest::new("POST"), &mut res)
            .unwrap_err();

        assert_eq!(err.status_code(), 403);
        assert_eq!(err.to_string(), "invalid CSRF token");
        assert!(res.headers.is_empty());
        assert!(session.is_empty());
    }

    #[test]
    fn test_secret_reused_across_requests() {
        let gate = CsrfGate::default();
        let mut session = MemorySession::new();

        gate.guard(&mut session, &HttpRequest::new("GET"), &mut HttpResponse::ok())
            .unwrap();
        let first = session.get(KEY).unwrap();

        gate.guard(&mut session, &HttpRequest::new("GET"), &mut HttpResponse::ok())
            .unwrap();
        assert_eq!(session.get(KEY).unwrap(), first);
    }

    #[test]
    fn test_empty_secret_replaced_on_issue() {
        let gate = CsrfGate::default();
        let mut session = MemorySession::new().with(KEY, "");

        gate.guard(&mut session, &HttpRequest::new("GET"), &mut HttpResponse::ok())
            .unwrap();
        assert!(!session.get(KEY).unwrap().is_empty());
    }

    #[test]
    fn test_round_trip() {
        let gate = CsrfGate::default();
        let mut session = MemorySession::new();

        let token = gate
            .guard(&mut session, &HttpRequest::new("GET"), &mut HttpResponse::ok())
            .unwrap();

        let req = HttpRequest::new("DELETE").with_header("x-csrf-token", token.as_str());
        let next = gate
            .guard(&mut session, &req, &mut HttpResponse::ok())
            .unwrap();

        assert_ne!(next, token);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CsrfConfig::default().with_secret_length(4);
        assert!(matches!(CsrfGate::new(config), Err(CsrfError::Config(_))));

        let config = CsrfConfig::default().with_response_header("bad header");
        assert!(matches!(CsrfGate::new(config), Err(CsrfError::Config(_))));
    }

    struct RejectingHeaders;

    impl ResponseHeaders for RejectingHeaders {
        fn set_header(&mut self, _name: &str, _value: &str) -> Result<()> {
            Err(CsrfError::Config("header write failed".to_string()))
        }
    }

    #[test]
    fn test_failed_header_write_leaves_session_untouched() {
        let gate = CsrfGate::default();
        let mut session = MemorySession::new();

        let err = gate
            .guard(&mut session, &HttpRequest::new("GET"), &mut RejectingHeaders)
            .unwrap_err();

        assert!(matches!(err, CsrfError::Config(_)));
        assert!(session.is_empty());
    }

    #[test]
    fn test_custom_names() {
        let config = CsrfConfig::default()
            .with_session_key("secret")
            .with_response_header("X-XSRF-TOKEN")
            .with_field_name("authenticity_token");
        let gate = CsrfGate::new(config).unwrap();
        let mut session = MemorySession::new();
        let mut res = HttpResponse::ok();

        let token = gate
            .guard(&mut session, &HttpRequest::new("GET"), &mut res)
            .unwrap();
        assert!(session.contains("secret"));
        assert_eq!(res.header("x-xsrf-token"), Some(token.as_str()));

        let req = HttpRequest::new("POST").with_body_field("authenticity_token", token.as_str());
        assert!(gate.guard(&mut session, &req, &mut HttpResponse::ok()).is_ok());
    }
}
