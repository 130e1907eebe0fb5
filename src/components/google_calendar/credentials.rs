use crate::error::{config_error, credentials_error, env_error, CalendarResult};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Environment variable consulted when no credential file is available
pub const DEFAULT_CREDENTIALS_ENV: &str = "GOOGLE_SERVICE_ACCOUNT_CREDENTIALS";

/// Full read/write access to calendars
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Service account key as downloaded from the cloud console
#[derive(Clone, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub key_type: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// Parse key JSON
    pub fn from_json(json: &str) -> CalendarResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| credentials_error(&format!("Invalid service account JSON: {}", e)))
    }

    /// Decode a base64 blob holding key JSON
    pub fn from_base64(encoded: &str) -> CalendarResult<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| credentials_error(&format!("Invalid base64 credentials: {}", e)))?;
        let json = String::from_utf8(bytes)
            .map_err(|e| credentials_error(&format!("Decoded credentials are not UTF-8: {}", e)))?;
        Self::from_json(&json)
    }

    /// Read key JSON from a file
    pub async fn from_file(path: &Path) -> CalendarResult<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_json(&content)
    }
}

/// Service account credentials bound to scopes and an optional delegation subject
#[derive(Debug, Clone)]
pub struct Credentials {
    key: ServiceAccountKey,
    scopes: Vec<String>,
    subject: Option<String>,
}

impl Credentials {
    pub fn new(key: ServiceAccountKey, scopes: &[&str]) -> Self {
        Self {
            key,
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            subject: None,
        }
    }

    /// Delegated credentials acting on behalf of `subject`
    pub fn with_subject(self, subject: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.into()),
            ..self
        }
    }

    pub fn key(&self) -> &ServiceAccountKey {
        &self.key
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Space-separated scope string as the token endpoint expects it
    pub fn scope(&self) -> String {
        self.scopes.join(" ")
    }
}

/// Load a key from `path` when it names an existing file, otherwise from the
/// base64 blob in the `credentials_env` environment variable.
pub async fn resolve_key(
    path: Option<&str>,
    credentials_env: &str,
) -> CalendarResult<ServiceAccountKey> {
    if let Some(path) = path.filter(|p| !p.is_empty()) {
        let path = Path::new(path);
        if path.exists() {
            info!("Using provided service account JSON: {}", path.display());
            return ServiceAccountKey::from_file(path).await;
        }
        debug!("Service account file {} not found, falling back to environment", path.display());
    }

    let encoded = match env::var(credentials_env) {
        Ok(value) if !value.trim().is_empty() => value,
        Ok(_) | Err(env::VarError::NotPresent) => {
            return Err(config_error(&format!(
                "Neither a valid file path nor {} environment variable was found.",
                credentials_env
            )))
        }
        Err(env::VarError::NotUnicode(_)) => return Err(env_error(credentials_env)),
    };

    debug!("Using base64 credentials from {}", credentials_env);
    ServiceAccountKey::from_base64(&encoded)
}
