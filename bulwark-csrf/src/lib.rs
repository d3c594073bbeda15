//! # Bulwark CSRF Protection
//!
//! Stateless Cross-Site Request Forgery protection for HTTP pipelines.
//!
//! ## Features
//!
//! - ✅ **Stateless Tokens** - Salted HMAC-SHA256 tokens verified against a per-session secret
//! - ✅ **Method Gating** - `GET`, `HEAD` and `OPTIONS` pass, everything else is checked
//! - ✅ **Multiple Token Sources** - Body field, query field or one of several headers
//! - ✅ **Constant-time Verification** - No timing side channel on the MAC comparison
//! - ✅ **Bring Your Own Session** - Any key-value store implementing [`SessionData`]
//! - ✅ **Middleware Integration** - Async wrapper that skips the handler on rejection
//!
//! ## Quick Start
//!
//! ```rust
//! use bulwark_csrf::{CsrfGate, HttpRequest, HttpResponse, MemorySession};
//!
//! let gate = CsrfGate::default();
//! let mut session = MemorySession::new();
//!
//! // A safe request issues a token and stores the secret in the session
//! let mut response = HttpResponse::ok();
//! let token = gate
//!     .guard(&mut session, &HttpRequest::new("GET"), &mut response)
//!     .unwrap();
//! assert_eq!(response.header("X-CSRF-TOKEN"), Some(token.as_str()));
//!
//! // A mutating request must echo a token back
//! let request = HttpRequest::new("POST").with_header("x-csrf-token", token.as_str());
//! let next = gate
//!     .guard(&mut session, &request, &mut HttpResponse::ok())
//!     .unwrap();
//! assert_ne!(next, token);
//!
//! // Without one it is rejected with 403
//! let err = gate
//!     .guard(&mut session, &HttpRequest::new("POST"), &mut HttpResponse::ok())
//!     .unwrap_err();
//! assert_eq!(err.status_code(), 403);
//! ```
//!
//! ## Token Operations
//!
//! ```rust
//! use bulwark_csrf::TokenManager;
//!
//! let tokens = TokenManager::default();
//! let secret = tokens.generate_secret();
//!
//! let a = tokens.derive_token(&secret);
//! let b = tokens.derive_token(&secret);
//! assert_ne!(a, b);
//! assert!(tokens.verify_token(&secret, a.as_str()));
//! assert!(tokens.verify_token(&secret, b.as_str()));
//! assert!(!tokens.verify_token(&secret, "invalid"));
//! ```
//!
//! ## Middleware
//!
//! ```rust
//! use bulwark_csrf::{CsrfMiddleware, HttpRequest, HttpResponse, MemorySession};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let csrf = CsrfMiddleware::default();
//! let mut session = MemorySession::new();
//! let handler = |_req: HttpRequest| async { HttpResponse::ok() };
//!
//! let response = csrf
//!     .respond(&mut session, HttpRequest::new("PUT"), &handler)
//!     .await;
//! assert_eq!(response.status, 403);
//! # }
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod gate;
pub mod logging;
pub mod middleware;
pub mod request;
pub mod session;
pub mod token;

pub use config::CsrfConfig;
pub use error::{CsrfError, Result};
pub use extract::{TokenExtractor, TokenSource};
pub use gate::CsrfGate;
pub use middleware::{CsrfMiddleware, Handler};
pub use request::{CsrfRequest, HttpRequest, HttpResponse, ResponseHeaders};
pub use session::{MemorySession, SessionData};
pub use token::{Secret, Token, TokenManager};
