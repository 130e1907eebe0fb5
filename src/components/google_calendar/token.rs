use super::credentials::Credentials;
use crate::error::{CalendarResult, Error};
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Tokens this close to expiry are refreshed before use
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Source of bearer tokens for the calendar API
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> CalendarResult<String>;
}

/// A fixed token, for hosts that obtain tokens elsewhere
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> CalendarResult<String> {
        Ok(self.0.clone())
    }
}

/// JWT claims of a service account assertion
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: i64,
}

/// Exchanges signed service account assertions for access tokens and caches
/// the result until shortly before it expires
#[derive(Clone)]
pub struct TokenManager {
    credentials: Credentials,
    client: Client,
    cached: Arc<RwLock<Option<CachedToken>>>,
}

impl TokenManager {
    pub fn new(credentials: Credentials, client: Client) -> Self {
        Self {
            credentials,
            client,
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Sign the assertion sent to the token endpoint
    fn signed_assertion(&self, now: i64) -> CalendarResult<String> {
        let key = self.credentials.key();
        let claims = Claims {
            iss: key.client_email.clone(),
            scope: self.credentials.scope(),
            aud: key.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
            sub: self.credentials.subject().map(str::to_string),
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = key.private_key_id.clone();

        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        Ok(encode(&header, &claims, &encoding_key)?)
    }

    /// Request a fresh token from the token endpoint
    async fn fetch_token(&self) -> CalendarResult<CachedToken> {
        let now = Utc::now().timestamp();
        let assertion = self.signed_assertion(now)?;
        let token_uri = &self.credentials.key().token_uri;

        debug!(
            "Requesting access token from {} for {}",
            token_uri,
            self.credentials
                .subject()
                .unwrap_or(self.credentials.key().client_email.as_str())
        );

        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];
        let response = self.client.post(token_uri).form(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(Error::Auth { status, message });
        }

        let token: TokenResponse = response.json().await?;
        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: now + token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS),
        })
    }
}

#[async_trait]
impl TokenProvider for TokenManager {
    async fn access_token(&self) -> CalendarResult<String> {
        let now = Utc::now().timestamp();
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref() {
                if token.expires_at - EXPIRY_MARGIN_SECS > now {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let mut cached = self.cached.write().await;
        // Another caller may have refreshed while we waited for the lock
        if let Some(token) = cached.as_ref() {
            if token.expires_at - EXPIRY_MARGIN_SECS > now {
                return Ok(token.access_token.clone());
            }
        }

        let token = self.fetch_token().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }
}
