//! Secret generation, token derivation and token verification.
//!
//! A token has the form `<salt>.<mac>`: a fresh random salt and the
//! HMAC-SHA256 of that salt keyed by the session secret, both URL-safe
//! base64 without padding. Verification only needs the secret, so no
//! issued token is ever stored.

use crate::config::CsrfConfig;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use std::fmt;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

const SEPARATOR: char = '.';

/// Per-session secret. Never leaves the server.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wrap a secret previously read from a session.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(..)")
    }
}

/// Token handed to the client and echoed back on mutating requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.0
    }
}

/// Stateless token operations.
///
/// Holds only the secret and salt lengths, so it is `Copy` and can be
/// shared freely between threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenManager {
    secret_length: usize,
    salt_length: usize,
}

impl TokenManager {
    /// Create a token manager
    ///
    /// # Examples
    ///
    /// ```
    /// use bulwark_csrf::TokenManager;
    ///
    /// let tokens = TokenManager::new(18, 8);
    /// let secret = tokens.generate_secret();
    /// let token = tokens.derive_token(&secret);
    /// assert!(tokens.verify_token(&secret, token.as_str()));
    /// ```
    pub fn new(secret_length: usize, salt_length: usize) -> Self {
        Self {
            secret_length,
            salt_length,
        }
    }

    pub fn from_config(config: &CsrfConfig) -> Self {
        Self::new(config.secret_length, config.salt_length)
    }

    /// Generate a new random session secret
    pub fn generate_secret(&self) -> Secret {
        Secret(random_encoded(self.secret_length))
    }

    /// Derive a fresh token from `secret`
    pub fn derive_token(&self, secret: &Secret) -> Token {
        let salt = random_encoded(self.salt_length);
        let mac = URL_SAFE_NO_PAD.encode(sign(secret, &salt));
        Token(format!("{}{}{}", salt, SEPARATOR, mac))
    }

    /// Check that `token` was derived from `secret`
    ///
    /// Malformed input of any kind is a plain `false`.
    pub fn verify_token(&self, secret: &Secret, token: &str) -> bool {
        if secret.is_empty() || token.is_empty() {
            return false;
        }

        let Some((salt, mac)) = token.split_once(SEPARATOR) else {
            return false;
        };

        if salt.is_empty() || URL_SAFE_NO_PAD.decode(salt).is_err() {
            return false;
        }

        let Ok(provided) = URL_SAFE_NO_PAD.decode(mac) else {
            return false;
        };

        let expected = sign(secret, salt);
        expected.as_slice().ct_eq(provided.as_slice()).into()
    }
}

impl Default for TokenManager {
    fn default() -> Self {
        Self::from_config(&CsrfConfig::default())
    }
}

fn random_encoded(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// HMAC-SHA256 of the salt keyed by the secret
fn sign(secret: &Secret, salt: &str) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret.as_str().as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(salt.as_bytes());
    mac.finalize().into_bytes().to_vec()
}
