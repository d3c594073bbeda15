//! Error types for the CSRF gate.

use crate::request::HttpResponse;
use thiserror::Error;

/// Message carried by every rejection from the gate.
pub const INVALID_TOKEN_MESSAGE: &str = "invalid CSRF token";

#[derive(Error, Debug)]
pub enum CsrfError {
    /// Token missing, malformed or not derived from the session secret.
    #[error("{0}")]
    Forbidden(String),

    #[error("Invalid CSRF configuration: {0}")]
    Config(String),

    #[error("Failed to parse request body: {0}")]
    BodyParse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CsrfError {
    /// The rejection raised when a mutating request fails verification.
    pub fn invalid_token() -> Self {
        CsrfError::Forbidden(INVALID_TOKEN_MESSAGE.to_string())
    }

    /// HTTP status code the transport should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            CsrfError::Forbidden(_) => 403,
            CsrfError::BodyParse(_) => 400,
            CsrfError::Config(_) | CsrfError::Serialization(_) => 500,
        }
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, CsrfError::Forbidden(_))
    }

    /// Plain-text response carrying the status code and message
    pub fn into_response(self) -> HttpResponse {
        HttpResponse::text(self.status_code(), self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CsrfError>;
