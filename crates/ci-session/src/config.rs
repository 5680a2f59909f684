//! Session options.
//!
//! Plain data with defaults matching a stock PyroCMS install. Loading these
//! from files or the environment is left to the embedding application.

use zeroize::Zeroizing;

/// Default sessions table name.
pub const DEFAULT_TABLE_NAME: &str = "default_ci_sessions";

/// Default session cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "default_pyrocms";

/// Options shared by the cookie and session-row helpers.
#[derive(Clone)]
pub struct Config {
    /// Raw encryption key, as configured in the legacy application.
    pub key: Zeroizing<Vec<u8>>,
    /// Name of the table holding session rows.
    pub table_name: String,
    /// Name of the cookie carrying the encrypted session.
    pub cookie_name: String,
    /// Cut user agents to 120 characters before storing or matching them.
    ///
    /// The legacy framework truncates, and it also matches on the stored
    /// value, so this must agree with its setting.
    pub truncate_user_agent: bool,
    /// Require the user agent to match when looking up a session.
    pub match_user_agent: bool,
    /// Require the client IP address to match when looking up a session.
    pub match_ip_address: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key: Zeroizing::new(Vec::new()),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            truncate_user_agent: false,
            match_user_agent: false,
            match_ip_address: false,
        }
    }
}

impl Config {
    /// Creates options with the given key and defaults for everything else.
    pub fn new(key: impl AsRef<[u8]>) -> Self {
        Self::default().key(key)
    }

    /// Sets the raw encryption key.
    pub fn key(mut self, key: impl AsRef<[u8]>) -> Self {
        self.key = Zeroizing::new(key.as_ref().to_vec());
        self
    }

    /// Sets the sessions table name.
    pub fn table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = name.into();
        self
    }

    /// Sets the session cookie name.
    pub fn cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Enables cutting user agents to 120 characters.
    pub fn truncate_user_agent(mut self, enabled: bool) -> Self {
        self.truncate_user_agent = enabled;
        self
    }

    /// Requires the user agent to match on lookup.
    pub fn match_user_agent(mut self, enabled: bool) -> Self {
        self.match_user_agent = enabled;
        self
    }

    /// Requires the IP address to match on lookup.
    pub fn match_ip_address(mut self, enabled: bool) -> Self {
        self.match_ip_address = enabled;
        self
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("key", &"<redacted>")
            .field("table_name", &self.table_name)
            .field("cookie_name", &self.cookie_name)
            .field("truncate_user_agent", &self.truncate_user_agent)
            .field("match_user_agent", &self.match_user_agent)
            .field("match_ip_address", &self.match_ip_address)
            .finish()
    }
}
