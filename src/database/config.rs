//! ConnectionProperties - where and how to reach a CouchDB-compatible server.

use serde::Deserialize;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5984;

/// Connection settings for [`CouchClient`](super::CouchClient).
///
/// Deserializable so applications can keep it in their own config files:
///
/// ```ignore
/// let props: ConnectionProperties = serde_json::from_str(
///     r#"{ "host": "db.internal", "port": 6984, "secured": true }"#,
/// )?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectionProperties {
    pub host: String,
    pub port: u16,
    /// Use https instead of http.
    pub secured: bool,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for ConnectionProperties {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            secured: false,
            username: None,
            password: None,
        }
    }
}

impl ConnectionProperties {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn secured(mut self, secured: bool) -> Self {
        self.secured = secured;
        self
    }

    /// Server root URL, e.g. `http://127.0.0.1:5984/`.
    pub fn base_url(&self) -> String {
        let scheme = if self.secured { "https" } else { "http" };
        format!("{}://{}:{}/", scheme, self.host, self.port)
    }
}
