//! Obfuscated auth token for the remote service.
//!
//! The service expects a single custom header whose value is the JSON
//! credential payload XOR'd against a shared secret (cycling the secret's
//! bytes) and base64-encoded. This is obfuscation, not encryption; both ends
//! must agree on the exact secret and encoding.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

pub const AUTH_HEADER: &str = "X-lobe-chat-auth";

/// Shared with the service frontend; changing it breaks every client.
const SECRET_XOR_KEY: &str = "LobeHub · LobeHub";

/// Credential payload carried inside the token. Field order matters for
/// byte-identical tokens, so it mirrors the frontend's encoding order.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthPayload {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "apiKey")]
    pub api_key: String,
    #[serde(rename = "baseURL")]
    pub base_url: Option<String>,
}

/// Build the header value for a credential payload.
pub fn build_token(payload: &AuthPayload) -> serde_json::Result<String> {
    let raw = serde_json::to_vec(payload)?;
    Ok(BASE64.encode(xor_obfuscate(&raw, SECRET_XOR_KEY.as_bytes())))
}

fn xor_obfuscate(data: &[u8], key: &[u8]) -> Vec<u8> {
    data.iter()
        .zip(key.iter().cycle())
        .map(|(b, k)| b ^ k)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;

    #[test]
    fn xor_is_its_own_inverse() {
        let data = "hello 世界".as_bytes();
        let key = SECRET_XOR_KEY.as_bytes();
        let once = xor_obfuscate(data, key);
        assert_ne!(once, data);
        assert_eq!(xor_obfuscate(&once, key), data);
    }

    #[test]
    fn token_round_trips_to_the_payload() {
        let token = build_token(&AuthPayload {
            user_id: "NO_AUTH_SHARED_USER".to_string(),
            api_key: "sk-test".to_string(),
            base_url: Some("https://api.example.com/v1".to_string()),
        })
        .unwrap();

        let bytes = BASE64.decode(&token).unwrap();
        let raw = xor_obfuscate(&bytes, SECRET_XOR_KEY.as_bytes());
        let decoded: AuthPayload = serde_json::from_slice(&raw).unwrap();
        assert_eq!(decoded.user_id, "NO_AUTH_SHARED_USER");
        assert_eq!(decoded.api_key, "sk-test");
        assert_eq!(decoded.base_url.as_deref(), Some("https://api.example.com/v1"));
    }

    #[test]
    fn token_is_deterministic() {
        let payload = || AuthPayload {
            user_id: "u".to_string(),
            api_key: "k".to_string(),
            base_url: None,
        };
        assert_eq!(
            build_token(&payload()).unwrap(),
            build_token(&payload()).unwrap()
        );
    }

    #[test]
    fn payload_field_names_match_the_wire_format() {
        let json = serde_json::to_value(AuthPayload {
            user_id: "u".to_string(),
            api_key: "k".to_string(),
            base_url: None,
        })
        .unwrap();
        assert!(json.get("userId").is_some());
        assert!(json.get("apiKey").is_some());
        assert!(json.get("baseURL").is_some());
    }
}
