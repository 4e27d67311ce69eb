//! Client configuration parsed from environment variables.

use std::time::Duration;

pub const DEFAULT_DOCUMENT: &str = "untitled";
pub const DEFAULT_SERVER: &str = "localhost";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;
pub const DEFAULT_CHAT_POLL_MS: u64 = 250;
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub user_name: String,
    pub document_name: String,
    pub server: String,
    pub poll_interval: Duration,
    pub chat_url: Option<String>,
    pub chat_poll_interval: Duration,
    pub location: String,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `SHEET_USER_NAME`: initial identity, default empty
    /// - `SHEET_DOCUMENT`: document name, default `untitled`
    /// - `SHEET_SERVER`: server selector, default `localhost`
    /// - `SHEET_POLL_INTERVAL_MS`: sync period, default 50
    /// - `SHEET_CHAT_URL`: HTTP chat relay base URL; in-memory hub when absent
    /// - `SHEET_CHAT_POLL_MS`: relay poll period, default 250
    /// - `SHEET_LOCATION`: page location, default `<origin>/<document>`
    #[must_use]
    pub fn from_env() -> Self {
        let document_name = std::env::var("SHEET_DOCUMENT").unwrap_or_else(|_| DEFAULT_DOCUMENT.to_string());
        let location = std::env::var("SHEET_LOCATION").unwrap_or_else(|_| default_location(&document_name));
        let chat_url = std::env::var("SHEET_CHAT_URL")
            .ok()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        Self {
            user_name: std::env::var("SHEET_USER_NAME").unwrap_or_default(),
            document_name,
            server: std::env::var("SHEET_SERVER").unwrap_or_else(|_| DEFAULT_SERVER.to_string()),
            poll_interval: Duration::from_millis(env_parse("SHEET_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS).max(1)),
            chat_url,
            chat_poll_interval: Duration::from_millis(env_parse("SHEET_CHAT_POLL_MS", DEFAULT_CHAT_POLL_MS).max(1)),
            location,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_name: String::new(),
            document_name: DEFAULT_DOCUMENT.to_string(),
            server: DEFAULT_SERVER.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            chat_url: None,
            chat_poll_interval: Duration::from_millis(DEFAULT_CHAT_POLL_MS),
            location: default_location(DEFAULT_DOCUMENT),
        }
    }
}

#[must_use]
pub fn default_location(document_name: &str) -> String {
    format!("{DEFAULT_ORIGIN}/{document_name}")
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
