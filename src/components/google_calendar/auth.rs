use super::credentials::{resolve_key, Credentials, CALENDAR_SCOPE, DEFAULT_CREDENTIALS_ENV};
use super::service::{CalendarService, GOOGLE_API_BASE_URL};
use crate::components::Context;
use crate::error::CalendarResult;
use serde::{Deserialize, Serialize};
use tracing::info;

fn default_credentials_env() -> String {
    DEFAULT_CREDENTIALS_ENV.to_string()
}

fn default_api_base_url() -> String {
    GOOGLE_API_BASE_URL.to_string()
}

/// Inputs of the Authenticate unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthRequest {
    /// Path to a service account JSON file
    #[serde(default)]
    pub service_account_json: Option<String>,
    /// User to impersonate through domain-wide delegation
    #[serde(default)]
    pub impersonate_user_account: Option<String>,
    /// Environment variable holding base64-encoded key JSON
    #[serde(default = "default_credentials_env")]
    pub credentials_env: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl Default for AuthRequest {
    fn default() -> Self {
        Self {
            service_account_json: None,
            impersonate_user_account: None,
            credentials_env: default_credentials_env(),
            api_base_url: default_api_base_url(),
        }
    }
}

/// Build an authenticated calendar service from the request's credential source
pub async fn build_service(request: &AuthRequest) -> CalendarResult<CalendarService> {
    let key = resolve_key(
        request.service_account_json.as_deref(),
        &request.credentials_env,
    )
    .await?;

    let mut credentials = Credentials::new(key, &[CALENDAR_SCOPE]);
    if let Some(subject) = request
        .impersonate_user_account
        .as_deref()
        .filter(|s| !s.is_empty())
    {
        info!("Delegating calendar access to {}", subject);
        credentials = credentials.with_subject(subject);
    }

    CalendarService::new(credentials, &request.api_base_url)
}

/// Authenticate and publish the service in `ctx`, replacing any earlier one.
/// On failure the context is left as it was.
pub async fn authenticate(ctx: &mut Context, request: &AuthRequest) -> CalendarResult<()> {
    let service = build_service(request).await?;
    ctx.set_service(service);
    info!("Google Calendar authentication completed successfully.");
    Ok(())
}
