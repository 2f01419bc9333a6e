//! Client configuration.
//!
//! The consumer key identifies the application to the service and is sent
//! with every request. It is held by the client instance rather than in
//! process-wide state.

use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://getpocket.com";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// Application consumer key. Not validated locally.
    #[serde(alias = "client_key")]
    pub consumer_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout in milliseconds for the default transport.
    /// `None` waits forever.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl ClientConfig {
    pub fn new(consumer_key: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            base_url: default_base_url(),
            timeout_ms: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Rounded up to whole milliseconds, so a non-zero timeout stays non-zero.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let millis = timeout.as_nanos().div_ceil(1_000_000);
        self.timeout_ms = Some(u64::try_from(millis).unwrap_or(u64::MAX));
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_default_base_url() {
        let config = ClientConfig::new("abc123");
        assert_eq!(config.consumer_key, "abc123");
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let config = ClientConfig::new("abc123").with_base_url("http://localhost:3000/");
        assert_eq!(config.base_url(), "http://localhost:3000");
    }

    #[test]
    fn deserializes_with_client_key_alias() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"client_key":"abc123","timeout_ms":1500}"#).unwrap();
        assert_eq!(config.consumer_key, "abc123");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn sub_second_timeout_is_kept() {
        let config = ClientConfig::new("abc123").with_timeout(Duration::from_millis(900));
        assert_eq!(config.timeout(), Some(Duration::from_millis(900)));
    }

    #[test]
    fn timeout_rounds_up_to_whole_millis() {
        let config = ClientConfig::new("abc123").with_timeout(Duration::from_micros(1));
        assert_eq!(config.timeout(), Some(Duration::from_millis(1)));

        let config = ClientConfig::new("abc123").with_timeout(Duration::from_micros(2_500));
        assert_eq!(config.timeout(), Some(Duration::from_millis(3)));
    }

    #[test]
    fn deserialize_requires_a_key() {
        let result: Result<ClientConfig, _> = serde_json::from_str(r#"{"base_url":"http://x"}"#);
        assert!(result.is_err());
    }
}
