//! LinkedIn API client
//!
//! Dispatches authenticated calls against the LinkedIn REST API using a
//! shared [`linkedin_auth::CredentialManager`] and keeps process-wide
//! request counters.

pub mod client;
pub mod error;
pub mod metrics;
pub mod request;
pub mod types;

pub use client::{LinkedInClient, REQUEST_ID_HEADER};
pub use error::{ClientError, Result};
pub use metrics::{MetricsSnapshot, RequestMetrics};
pub use request::{HttpMethod, OutboundRequest};
pub use types::*;

/// Default LinkedIn REST API base URL
pub const DEFAULT_API_BASE: &str = "https://api.linkedin.com/v2";

// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base: String,
    pub timeout: Option<std::time::Duration>,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Some(std::time::Duration::from_secs(30)),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config() {
        let config = ClientConfig::new()
            .with_api_base("http://localhost:8080/v2")
            .with_timeout(std::time::Duration::from_secs(60));

        assert_eq!(config.api_base, "http://localhost:8080/v2");
        assert_eq!(config.timeout, Some(std::time::Duration::from_secs(60)));
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.timeout, Some(std::time::Duration::from_secs(30)));
        assert_eq!(config.without_timeout().timeout, None);
    }
}
