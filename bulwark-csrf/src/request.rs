//! Request and response views the gate works against.
//!
//! [`HttpRequest`] and [`HttpResponse`] are plain structs for transports
//! that already decoded the body and query. The `http` crate types are
//! adapted as well so hyper/axum style stacks can call the gate directly.

use crate::error::{CsrfError, Result};
use std::collections::HashMap;

/// What the gate needs to read from a request.
pub trait CsrfRequest {
    /// HTTP method, e.g. `"POST"`
    fn method(&self) -> &str;

    /// Header value by case-insensitive name
    fn header(&self, name: &str) -> Option<String>;

    /// Field from the decoded request body
    fn body_field(&self, name: &str) -> Option<String>;

    /// Field from the decoded query string
    fn query_field(&self, name: &str) -> Option<String>;
}

/// What the gate needs to write on a response.
pub trait ResponseHeaders {
    /// Set a header, replacing any previous value
    fn set_header(&mut self, name: &str, value: &str) -> Result<()>;
}

/// HTTP request with pre-parsed body and query.
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    pub method: String,
    pub headers: HashMap<String, String>,
    pub body: Option<HashMap<String, serde_json::Value>>,
    pub query: Option<HashMap<String, String>>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            ..Default::default()
        }
    }

    /// Add a header; names are stored lower-cased
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body_field(
        mut self,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.body
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Decode a raw query string (with or without the leading `?`)
    ///
    /// The first occurrence of a repeated key wins.
    pub fn with_query_string(mut self, query: &str) -> Result<Self> {
        let pairs: Vec<(String, String)> =
            serde_urlencoded::from_str(query.trim_start_matches('?'))
                .map_err(|e| CsrfError::BodyParse(e.to_string()))?;

        let map = self.query.get_or_insert_with(HashMap::new);
        for (key, value) in pairs {
            map.entry(key).or_insert(value);
        }
        Ok(self)
    }

    /// Decode an `application/x-www-form-urlencoded` body
    pub fn with_form_body(mut self, body: &[u8]) -> Result<Self> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
            .map_err(|e| CsrfError::BodyParse(e.to_string()))?;

        let map = self.body.get_or_insert_with(HashMap::new);
        for (key, value) in pairs {
            map.entry(key).or_insert(serde_json::Value::String(value));
        }
        Ok(self)
    }

    /// Decode a JSON object body
    pub fn with_json_body(mut self, body: &[u8]) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_slice(body).map_err(|e| CsrfError::BodyParse(e.to_string()))?;

        let serde_json::Value::Object(object) = value else {
            return Err(CsrfError::BodyParse(
                "JSON body must be an object".to_string(),
            ));
        };

        self.body
            .get_or_insert_with(HashMap::new)
            .extend(object);
        Ok(self)
    }
}

impl CsrfRequest for HttpRequest {
    fn method(&self) -> &str {
        &self.method
    }

    fn header(&self, name: &str) -> Option<String> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.clone())
    }

    fn body_field(&self, name: &str) -> Option<String> {
        // null, false and zero count as absent
        match self.body.as_ref()?.get(name)? {
            serde_json::Value::Null | serde_json::Value::Bool(false) => None,
            serde_json::Value::Number(n) if n.as_f64() == Some(0.0) => None,
            serde_json::Value::String(s) => Some(s.clone()),
            // Present but not a string: rendered so it fails verification
            other => Some(other.to_string()),
        }
    }

    fn query_field(&self, name: &str) -> Option<String> {
        self.query.as_ref()?.get(name).cloned()
    }
}

impl<B> CsrfRequest for http::Request<B> {
    fn method(&self) -> &str {
        http::Request::method(self).as_str()
    }

    fn header(&self, name: &str) -> Option<String> {
        self.headers()
            .get(name)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
    }

    /// Bodies of `http::Request` are not decoded here
    fn body_field(&self, _name: &str) -> Option<String> {
        None
    }

    fn query_field(&self, name: &str) -> Option<String> {
        let query = self.uri().query()?;
        serde_urlencoded::from_str::<Vec<(String, String)>>(query)
            .ok()?
            .into_iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

/// HTTP response with a settable header map.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    /// Plain-text response
    pub fn text(status: u16, message: impl Into<String>) -> Self {
        let mut response = Self::new(status).with_body(message.into().into_bytes());
        response
            .headers
            .insert("Content-Type".to_string(), "text/plain; charset=utf-8".to_string());
        response
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::text(403, message)
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::ok()
    }
}

impl ResponseHeaders for HttpResponse {
    fn set_header(&mut self, name: &str, value: &str) -> Result<()> {
        self.headers.retain(|key, _| !key.eq_ignore_ascii_case(name));
        self.headers.insert(name.to_string(), value.to_string());
        Ok(())
    }
}

impl ResponseHeaders for http::HeaderMap {
    fn set_header(&mut self, name: &str, value: &str) -> Result<()> {
        let name = http::HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| CsrfError::Config(format!("invalid header name {:?}: {}", name, e)))?;
        let value = http::HeaderValue::from_str(value)
            .map_err(|e| CsrfError::Config(format!("invalid header value: {}", e)))?;
        self.insert(name, value);
        Ok(())
    }
}

impl<B> ResponseHeaders for http::Response<B> {
    fn set_header(&mut self, name: &str, value: &str) -> Result<()> {
        self.headers_mut().set_header(name, value)
    }
}
