//! Service-account authentication for the reporting API.
//!
//! A signed RS256 assertion is exchanged for a short-lived bearer token at
//! the OAuth token endpoint.

use crate::error::{SourceError, SourceResult};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const ANALYTICS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/analytics.readonly";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const SOURCE_NAME: &str = "OAuth token";

/// Service-account identity used to sign token assertions.
#[derive(Debug, Clone)]
pub struct ServiceAccountKey {
    pub client_email: String,
    /// PEM-encoded RSA private key with real newlines.
    pub private_key: String,
    pub token_url: String,
}

/// How the reporting client obtains its bearer token.
#[derive(Debug, Clone)]
pub enum Authenticator {
    ServiceAccount(ServiceAccountKey),
    /// A pre-issued bearer token, used as-is.
    Static(String),
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl ServiceAccountKey {
    /// Sign a token assertion valid for one hour from now.
    pub fn sign_assertion(&self) -> SourceResult<String> {
        let iat = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: ANALYTICS_READONLY_SCOPE,
            aud: &self.token_url,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())?;
        Ok(encode(&Header::new(Algorithm::RS256), &claims, &key)?)
    }
}

impl Authenticator {
    /// Produce a bearer token, exchanging a signed assertion if needed.
    pub async fn bearer_token(&self, http_client: &Client) -> SourceResult<String> {
        let account = match self {
            Authenticator::Static(token) => return Ok(token.clone()),
            Authenticator::ServiceAccount(account) => account,
        };

        let assertion = account.sign_assertion()?;
        debug!(
            "Exchanging assertion for {} at {}",
            account.client_email, account.token_url
        );

        let response = http_client
            .post(&account.token_url)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::from_response(SOURCE_NAME, response).await);
        }

        let body = response.text().await?;
        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| SourceError::Decode {
                source_name: SOURCE_NAME,
                message: e.to_string(),
            })?;

        Ok(token.access_token)
    }
}

/// Turn literal `\n` sequences (as stored in env files) into newlines.
pub fn unescape_private_key(raw: &str) -> String {
    raw.replace("\\n", "\n")
}
