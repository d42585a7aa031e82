//! Service-account authentication for the Google APIs.
//!
//! The decoded credentials are a service-account JSON key. A short-lived RS256
//! assertion is signed with its private key and exchanged at the key's token
//! endpoint for a bearer token scoped to [`DRIVE_FILE_SCOPE`].

use std::time::{SystemTime, UNIX_EPOCH};

use drive_upload_core::error::UploadError;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::logging::add_mask;

pub const DRIVE_FILE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Lifetime of the signed assertion; Google caps it at one hour.
const ASSERTION_LIFETIME_SECS: u64 = 3600;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// Parses a service-account JSON key. The input is never echoed back in errors.
    pub fn from_json(json: &str) -> Result<Self, UploadError> {
        let key: ServiceAccountKey = serde_json::from_str(json).map_err(|e| {
            error!(line = e.line(), column = e.column(), "Credentials are not a valid service-account key");
            UploadError::AuthFailure {
                stage: format!(
                    "parsing service-account key (line {}, column {})",
                    e.line(),
                    e.column()
                ),
                source: None,
            }
        })?;
        add_mask(&key.private_key);
        if let Some(id) = &key.private_key_id {
            add_mask(id);
        }
        Ok(key)
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Bearer token for the store client.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Signs the JWT assertion for `key` and `scope`, valid from `now` (unix seconds).
pub fn sign_assertion(key: &ServiceAccountKey, scope: &str, now: u64) -> Result<String, UploadError> {
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| UploadError::auth("loading the service-account private key", e))?;
    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope,
        aud: &key.token_uri,
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    };
    encode(&header, &claims, &encoding_key)
        .map_err(|e| UploadError::auth("signing the token assertion", e))
}

/// Exchanges a signed assertion for an access token.
pub async fn fetch_access_token(
    http: &reqwest::Client,
    key: &ServiceAccountKey,
    scope: &str,
) -> Result<AccessToken, UploadError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let assertion = sign_assertion(key, scope, now)?;
    add_mask(&assertion);

    info!(client_email = %key.client_email, token_uri = %key.token_uri, "Requesting access token");
    let response = http
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .await
        .map_err(|e| UploadError::auth("requesting an access token", e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!(status = %status, "Token endpoint rejected the assertion");
        return Err(UploadError::auth(
            "exchanging the token assertion",
            format!("token endpoint returned {status}: {body}"),
        ));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| UploadError::auth("reading the token response", e))?;
    add_mask(&token.access_token);
    info!(expires_in = token.expires_in.unwrap_or_default(), "Access token obtained");
    Ok(AccessToken(token.access_token))
}
