//! Remote resource client for the role web API.
//!
//! [`RoleStore`] is the seam the engine talks through: five thin HTTP+JSON
//! operations with a typed error that separates "the server said no"
//! ([`ClientError::Http`]) from "no server answered"
//! ([`ClientError::Transport`]). The engine never touches raw HTTP.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use ureq::Agent;

use crate::auth::{AUTH_HEADER, AuthPayload, build_token};
use crate::config::{REQUEST_TIMEOUT, RemoteConfig};
use crate::schema::{CreateRole, RemoteRole, UpdateRole};

pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors from remote operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server responded with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// No usable response at all (DNS, refused connection, timeout).
    #[error("connection failed: {0}")]
    Transport(String),

    /// The server responded 2xx but the body was not what we expect.
    #[error("invalid response body: {0}")]
    InvalidResponse(String),
}

impl From<ureq::Error> for ClientError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Http {
                status: code,
                body: format!("HTTP {code}"),
            },
            other => Self::Transport(other.to_string()),
        }
    }
}

/// Operations the reconciler needs from the remote store.
///
/// `delete` is a standalone CLI operation; reconciliation never calls it.
pub trait RoleStore {
    fn list(&self) -> Result<Vec<RemoteRole>>;
    fn create(&self, role: &CreateRole) -> Result<RemoteRole>;
    fn update(&self, role_id: i64, patch: &UpdateRole) -> Result<RemoteRole>;
    fn delete(&self, role_id: i64) -> Result<()>;
    /// Returns the session path to append to the base URL.
    fn open_session(&self, role_id: i64) -> Result<String>;
}

/// Blocking HTTP implementation of [`RoleStore`].
pub struct HttpRoleClient {
    agent: Agent,
    base: String,
    token: String,
}

impl HttpRoleClient {
    /// Build a client from config; fails only if the auth token cannot be
    /// encoded.
    pub fn new(config: &RemoteConfig) -> std::result::Result<Self, serde_json::Error> {
        let token = build_token(&AuthPayload {
            user_id: config.user_id.clone(),
            api_key: config.api_key.clone(),
            base_url: config.proxy_url.clone(),
        })?;

        // Non-2xx statuses are read as normal responses so the error body
        // can be surfaced alongside the status.
        let agent = Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .http_status_as_error(false)
            .build()
            .new_agent();

        Ok(Self {
            agent,
            base: config.base.clone(),
            token,
        })
    }

    /// Client against a custom base with a fixed token (for tests).
    #[cfg(test)]
    pub fn with_base(base: impl Into<String>, token: impl Into<String>) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            agent,
            base: base.into(),
            token: token.into(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn roles_url(&self) -> String {
        format!("{}/webapi/roles", self.base)
    }

    fn role_url(&self, role_id: i64) -> String {
        format!("{}/webapi/roles/{}", self.base, role_id)
    }

    fn open_url(&self, role_id: i64) -> String {
        format!("{}/webapi/roles/{}/open", self.base, role_id)
    }

    fn get(&self, url: &str) -> Result<ureq::http::Response<ureq::Body>> {
        log::debug!("GET {url}");
        Ok(self
            .agent
            .get(url)
            .header("Accept", "application/json")
            .header(AUTH_HEADER, &self.token)
            .call()?)
    }

    fn post<B: serde::Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<ureq::http::Response<ureq::Body>> {
        log::debug!("POST {url}");
        Ok(self
            .agent
            .post(url)
            .header("Accept", "application/json")
            .header(AUTH_HEADER, &self.token)
            .send_json(body)?)
    }

    fn put<B: serde::Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<ureq::http::Response<ureq::Body>> {
        log::debug!("PUT {url}");
        Ok(self
            .agent
            .put(url)
            .header("Accept", "application/json")
            .header(AUTH_HEADER, &self.token)
            .send_json(body)?)
    }
}

impl RoleStore for HttpRoleClient {
    fn list(&self) -> Result<Vec<RemoteRole>> {
        read_json(self.get(&self.roles_url())?)
    }

    fn create(&self, role: &CreateRole) -> Result<RemoteRole> {
        read_json(self.post(&self.roles_url(), role)?)
    }

    fn update(&self, role_id: i64, patch: &UpdateRole) -> Result<RemoteRole> {
        read_json(self.put(&self.role_url(role_id), patch)?)
    }

    fn delete(&self, role_id: i64) -> Result<()> {
        let url = self.role_url(role_id);
        log::debug!("DELETE {url}");
        let resp = self
            .agent
            .delete(&url)
            .header("Accept", "application/json")
            .header(AUTH_HEADER, &self.token)
            .call()?;
        expect_success(resp).map(|_| ())
    }

    fn open_session(&self, role_id: i64) -> Result<String> {
        #[derive(Deserialize)]
        struct OpenSession {
            #[serde(default = "default_session_path")]
            url: String,
        }
        let session: OpenSession = read_json(self.get(&self.open_url(role_id))?)?;
        Ok(session.url)
    }
}

fn default_session_path() -> String {
    "/chat".to_string()
}

/// Check the status and read the body; non-2xx becomes [`ClientError::Http`]
/// carrying the parsed (or raw) error body.
fn expect_success(mut resp: ureq::http::Response<ureq::Body>) -> Result<String> {
    let status = resp.status().as_u16();
    let text = resp
        .body_mut()
        .read_to_string()
        .map_err(|e| ClientError::Transport(e.to_string()))?;

    if (200..300).contains(&status) {
        Ok(text)
    } else {
        Err(ClientError::Http {
            status,
            body: condense_error_body(&text),
        })
    }
}

fn read_json<T: DeserializeOwned>(resp: ureq::http::Response<ureq::Body>) -> Result<T> {
    let text = expect_success(resp)?;
    serde_json::from_str(&text).map_err(|e| ClientError::InvalidResponse(e.to_string()))
}

/// Pull the message out of a structured error body; fall back to raw text.
fn condense_error_body(text: &str) -> String {
    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(text) {
        for key in ["error", "message"] {
            if let Some(Value::String(msg)) = obj.get(key) {
                return msg.clone();
            }
        }
    }
    let trimmed = text.trim();
    if trimmed.is_empty() {
        "(empty body)".to_string()
    } else {
        trimmed.to_string()
    }
}
