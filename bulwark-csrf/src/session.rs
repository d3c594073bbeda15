//! Session capability used by the gate.
//!
//! The gate only reads and writes one string field, so anything that can
//! get and set a string by key works as a session.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Minimal key-value access to a caller-owned session.
pub trait SessionData {
    /// Read a string value
    fn get(&self, key: &str) -> Option<String>;

    /// Write a string value
    fn set(&mut self, key: &str, value: String);
}

impl SessionData for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.insert(key.to_string(), value);
    }
}

impl SessionData for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.insert(key.to_string(), value);
    }
}

/// Dynamic session bag; non-string values read as absent.
impl SessionData for HashMap<String, serde_json::Value> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key)
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }

    fn set(&mut self, key: &str, value: String) {
        self.insert(key.to_string(), serde_json::Value::String(value));
    }
}

impl<S: SessionData + ?Sized> SessionData for &mut S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) {
        (**self).set(key, value)
    }
}

/// In-memory session the caller can serialize into a cookie or a store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySession {
    data: HashMap<String, String>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.data.remove(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl SessionData for MemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.data.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.data.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_map() {
        let mut session: HashMap<String, String> = HashMap::new();
        assert_eq!(SessionData::get(&session, "csrfSecret"), None);

        SessionData::set(&mut session, "csrfSecret", "abc".to_string());
        assert_eq!(SessionData::get(&session, "csrfSecret"), Some("abc".to_string()));
    }

    #[test]
    fn test_json_bag_ignores_non_strings() {
        let mut session: HashMap<String, serde_json::Value> = HashMap::new();
        session.insert("csrfSecret".to_string(), json!(42));
        session.insert("user_id".to_string(), json!(7));

        assert_eq!(SessionData::get(&session, "csrfSecret"), None);

        SessionData::set(&mut session, "csrfSecret", "abc".to_string());
        assert_eq!(session["csrfSecret"], json!("abc"));
        assert_eq!(session["user_id"], json!(7));
    }

    #[test]
    fn test_memory_session_roundtrip_through_json() {
        let mut session = MemorySession::new().with("user", "alice");
        session.set("csrfSecret", "s3cr3t".to_string());

        let json = serde_json::to_string(&session).unwrap();
        let restored: MemorySession = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, session);
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.get("csrfSecret"), Some("s3cr3t".to_string()));
    }

    #[test]
    fn test_mut_ref_forwards() {
        fn store<S: SessionData>(mut session: S) {
            session.set("k", "v".to_string());
        }

        let mut session = MemorySession::new();
        store(&mut session);
        assert!(session.contains("k"));
    }
}
