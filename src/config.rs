//! Remote service configuration, read from the environment.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE: &str = "http://localhost:3020";
pub const DEFAULT_USER_ID: &str = "NO_AUTH_SHARED_USER";

/// Per-call timeout for remote operations.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Everything the remote client needs: where the service lives and the
/// credentials that go into the auth token.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Service base URL, no trailing slash.
    pub base: String,
    pub user_id: String,
    pub api_key: String,
    /// Optional upstream base URL carried in the auth token.
    pub proxy_url: Option<String>,
}

impl RemoteConfig {
    /// Read configuration from the environment.
    ///
    /// A missing API key is a fatal configuration error, caught here before
    /// any network call is attempted.
    pub fn from_env() -> Result<Self> {
        let base = env::var("LOBECHAT_BASE")
            .unwrap_or_else(|_| DEFAULT_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let api_key = env::var("OPENAI_API_KEY")
            .context("OPENAI_API_KEY is not set (required for the auth token)")?;

        let user_id =
            env::var("LOBE_SHARED_USER_ID").unwrap_or_else(|_| DEFAULT_USER_ID.to_string());

        let proxy_url = env::var("OPENAI_PROXY_URL").ok().filter(|v| !v.is_empty());

        Ok(Self {
            base,
            user_id,
            api_key,
            proxy_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var reads are covered indirectly; process-global state makes them
    // racy under the parallel test runner. These cover the pure parts.

    #[test]
    fn default_base_has_no_trailing_slash() {
        assert!(!DEFAULT_BASE.ends_with('/'));
    }

    #[test]
    fn timeout_matches_the_remote_call_contract() {
        assert_eq!(REQUEST_TIMEOUT, Duration::from_secs(15));
    }
}
