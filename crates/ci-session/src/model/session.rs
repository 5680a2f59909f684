//! Session rows as the legacy framework stores them.
//!
//! Persistence itself lives outside this crate; [`SessionStore`] is the seam
//! an application implements over its database.

use std::collections::HashMap;
use std::convert::Infallible;

use crate::codec::{decode, encode};
use crate::config::Config;
use crate::crypto::SessionCrypto;
use crate::error::{CryptoError, DecodeError};
use crate::limits::USER_AGENT_MAX_CHARS;
use crate::model::{Map, Value};

fn normalize_user_agent(user_agent: &str, config: &Config) -> String {
    if config.truncate_user_agent {
        user_agent.chars().take(USER_AGENT_MAX_CHARS).collect()
    } else {
        user_agent.to_string()
    }
}

/// One row of the sessions table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub session_id: String,
    pub ip_address: String,
    pub user_agent: String,
    /// Unix timestamp of the last write.
    pub last_activity: i64,
    /// Serialized user data, opaque to the store.
    pub user_data: Vec<u8>,
}

impl SessionRecord {
    /// Creates a row with empty user data, normalizing the user agent.
    pub fn new(
        session_id: impl Into<String>,
        ip_address: impl Into<String>,
        user_agent: &str,
        last_activity: i64,
        config: &Config,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            ip_address: ip_address.into(),
            user_agent: normalize_user_agent(user_agent, config),
            last_activity,
            user_data: Vec::new(),
        }
    }

    /// Decodes the stored user data. An empty column is an empty map.
    pub fn user_data(&self) -> Result<Value, DecodeError> {
        Ok(decode(&self.user_data)?.unwrap_or_else(|| Value::Map(Map::new())))
    }

    /// Serializes `value` into the user data column.
    pub fn set_user_data(&mut self, value: &Value) {
        self.user_data = encode(value);
    }

    /// Stores a user agent, truncated when the config asks for it.
    pub fn set_user_agent(&mut self, user_agent: &str, config: &Config) {
        self.user_agent = normalize_user_agent(user_agent, config);
    }

    /// Records activity at `now` (Unix seconds).
    pub fn touch(&mut self, now: i64) {
        self.last_activity = now;
    }

    /// The map the legacy framework puts in the cookie.
    pub fn cookie_value(&self) -> Value {
        let mut map = Map::with_capacity(4);
        map.insert("session_id", self.session_id.as_str());
        map.insert("ip_address", self.ip_address.as_str());
        map.insert("user_agent", self.user_agent.as_str());
        map.insert("last_activity", self.last_activity);
        Value::Map(map)
    }

    /// Encrypted cookie text for this row.
    pub fn cookie_data(&self, crypto: &SessionCrypto) -> Result<String, CryptoError> {
        crypto.encrypt_cookie(&self.cookie_value())
    }
}

/// Lookup criteria for a session row.
///
/// IP address and user agent take part only when the matching policy in
/// [`Config`] asks for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionQuery {
    pub session_id: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl SessionQuery {
    /// Builds the query for a request's session id, address and user agent.
    pub fn for_request(
        session_id: impl Into<String>,
        ip_address: &str,
        user_agent: &str,
        config: &Config,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            ip_address: config.match_ip_address.then(|| ip_address.to_string()),
            user_agent: config
                .match_user_agent
                .then(|| normalize_user_agent(user_agent, config)),
        }
    }

    /// Returns true if `record` satisfies every criterion.
    pub fn matches(&self, record: &SessionRecord) -> bool {
        record.session_id == self.session_id
            && self
                .ip_address
                .as_ref()
                .is_none_or(|ip| *ip == record.ip_address)
            && self
                .user_agent
                .as_ref()
                .is_none_or(|ua| *ua == record.user_agent)
    }
}

/// Storage for session rows, keyed by session id.
pub trait SessionStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the row matching every criterion of `query`.
    fn find(&self, query: &SessionQuery) -> Result<Option<SessionRecord>, Self::Error>;

    /// Inserts or replaces the row with the record's session id.
    fn save(&mut self, record: &SessionRecord) -> Result<(), Self::Error>;

    /// Deletes a row, returning whether it existed.
    fn delete(&mut self, session_id: &str) -> Result<bool, Self::Error>;
}

/// In-process [`SessionStore`], for tests and single-process tools.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: HashMap<String, SessionRecord>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if no rows are stored.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl SessionStore for MemoryStore {
    type Error = Infallible;

    fn find(&self, query: &SessionQuery) -> Result<Option<SessionRecord>, Self::Error> {
        Ok(self
            .rows
            .get(&query.session_id)
            .filter(|record| query.matches(record))
            .cloned())
    }

    fn save(&mut self, record: &SessionRecord) -> Result<(), Self::Error> {
        self.rows.insert(record.session_id.clone(), record.clone());
        Ok(())
    }

    fn delete(&mut self, session_id: &str) -> Result<bool, Self::Error> {
        Ok(self.rows.remove(session_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SID: &str = "0123456789abcdef0123456789abcdef";

    fn record(config: &Config) -> SessionRecord {
        SessionRecord::new(SID, "10.0.0.1", "Mozilla/5.0", 1_500_000_000, config)
    }

    #[test]
    fn test_user_data_roundtrip() {
        let mut rec = record(&Config::default());
        assert_eq!(rec.user_data().unwrap(), Value::Map(Map::new()));

        let data: Map = [("user_id", Value::Integer(7)), ("flash", Value::from("saved"))]
            .into_iter()
            .collect();
        rec.set_user_data(&Value::Map(data.clone()));
        assert_eq!(
            rec.user_data,
            br#"a:2:{s:7:"user_id";i:7;s:5:"flash";s:5:"saved";}"#
        );
        assert_eq!(rec.user_data().unwrap(), Value::Map(data));
    }

    #[test]
    fn test_corrupt_user_data() {
        let mut rec = record(&Config::default());
        rec.user_data = b"a:1:{".to_vec();
        assert!(rec.user_data().is_err());
    }

    #[test]
    fn test_user_agent_truncation() {
        let long = "x".repeat(200);
        let config = Config::default().truncate_user_agent(true);
        let rec = SessionRecord::new(SID, "10.0.0.1", &long, 0, &config);
        assert_eq!(rec.user_agent.chars().count(), 120);

        let mut rec = SessionRecord::new(SID, "10.0.0.1", &long, 0, &Config::default());
        assert_eq!(rec.user_agent.len(), 200);
        rec.set_user_agent("ü".repeat(130).as_str(), &config);
        // Characters, not bytes.
        assert_eq!(rec.user_agent.chars().count(), 120);
    }

    #[test]
    fn test_cookie_data_decrypts_to_row_fields() {
        let crypto = SessionCrypto::new("password");
        let rec = record(&Config::default());
        let text = rec.cookie_data(&crypto).unwrap();
        let value = crypto.decrypt_cookie(&text).unwrap();

        assert_eq!(value.get("session_id").and_then(Value::as_str), Some(SID));
        assert_eq!(value.get("ip_address").and_then(Value::as_str), Some("10.0.0.1"));
        assert_eq!(value.get("user_agent").and_then(Value::as_str), Some("Mozilla/5.0"));
        assert_eq!(value.get("last_activity").and_then(Value::as_i64), Some(1_500_000_000));
    }

    #[test]
    fn test_query_follows_matching_policy() {
        let loose = SessionQuery::for_request(SID, "1.1.1.1", "curl", &Config::default());
        assert_eq!(loose.ip_address, None);
        assert_eq!(loose.user_agent, None);

        let strict = Config::default()
            .match_ip_address(true)
            .match_user_agent(true)
            .truncate_user_agent(true);
        let long = "y".repeat(150);
        let query = SessionQuery::for_request(SID, "1.1.1.1", &long, &strict);
        assert_eq!(query.ip_address.as_deref(), Some("1.1.1.1"));
        assert_eq!(query.user_agent.as_ref().map(String::len), Some(120));
    }

    #[test]
    fn test_memory_store() {
        let config = Config::default().match_ip_address(true);
        let mut store = MemoryStore::new();
        let mut rec = record(&config);
        store.save(&rec).unwrap();
        assert_eq!(store.len(), 1);

        let hit = SessionQuery::for_request(SID, "10.0.0.1", "any", &config);
        assert_eq!(store.find(&hit).unwrap(), Some(rec.clone()));

        let miss = SessionQuery::for_request(SID, "10.0.0.2", "any", &config);
        assert_eq!(store.find(&miss).unwrap(), None);

        rec.touch(1_600_000_000);
        store.save(&rec).unwrap();
        assert_eq!(store.find(&hit).unwrap().map(|r| r.last_activity), Some(1_600_000_000));

        assert!(store.delete(SID).unwrap());
        assert!(!store.delete(SID).unwrap());
        assert!(store.is_empty());
    }
}
