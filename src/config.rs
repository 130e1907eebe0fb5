use crate::components::google_calendar::credentials::DEFAULT_CREDENTIALS_ENV;
use crate::components::google_calendar::{AuthRequest, GOOGLE_API_BASE_URL, PRIMARY_CALENDAR};
use crate::error::{env_error, CalendarResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Optional overrides file, relative to the working directory
pub const CONFIG_FILE: &str = "config/gcal.toml";

/// Runtime configuration for a workflow run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Path to a service account JSON file
    pub service_account_json: Option<String>,
    /// User to impersonate through domain-wide delegation
    pub impersonate_user_account: Option<String>,
    /// Environment variable holding base64-encoded credentials
    pub credentials_env: String,
    /// Calendar used when a workflow step names none
    pub calendar_id: String,
    /// Calendar API base URL
    pub api_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_account_json: None,
            impersonate_user_account: None,
            credentials_env: DEFAULT_CREDENTIALS_ENV.to_string(),
            calendar_id: PRIMARY_CALENDAR.to_string(),
            api_base_url: GOOGLE_API_BASE_URL.to_string(),
        }
    }
}

/// Shape of `config/gcal.toml`; every key is optional
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    service_account_json: Option<String>,
    impersonate_user_account: Option<String>,
    credentials_env: Option<String>,
    calendar_id: Option<String>,
    api_base_url: Option<String>,
}

/// Read an optional variable; unset and empty are the same
fn optional_var(name: &str) -> CalendarResult<Option<String>> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(Some(value)),
        Ok(_) | Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(env_error(name)),
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> CalendarResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let mut config = Self::from_env()?;
        config.merge_file(Path::new(CONFIG_FILE))?;
        Ok(config)
    }

    /// Configuration from environment variables alone
    pub fn from_env() -> CalendarResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            service_account_json: optional_var("GOOGLE_SERVICE_ACCOUNT_JSON")?,
            impersonate_user_account: optional_var("GOOGLE_IMPERSONATE_USER")?,
            credentials_env: optional_var("GCAL_CREDENTIALS_ENV")?
                .unwrap_or(defaults.credentials_env),
            calendar_id: optional_var("GOOGLE_CALENDAR_ID")?.unwrap_or(defaults.calendar_id),
            api_base_url: optional_var("GOOGLE_CALENDAR_API_URL")?.unwrap_or(defaults.api_base_url),
        })
    }

    /// Overlay values from a TOML file if it exists
    pub fn merge_file(&mut self, path: &Path) -> CalendarResult<()> {
        if !path.exists() {
            return Ok(());
        }
        let content = fs::read_to_string(path)?;
        self.merge_toml(&content)
    }

    fn merge_toml(&mut self, content: &str) -> CalendarResult<()> {
        let file: FileConfig = toml::from_str(content)?;

        if file.service_account_json.is_some() {
            self.service_account_json = file.service_account_json;
        }
        if file.impersonate_user_account.is_some() {
            self.impersonate_user_account = file.impersonate_user_account;
        }
        if let Some(credentials_env) = file.credentials_env {
            self.credentials_env = credentials_env;
        }
        if let Some(calendar_id) = file.calendar_id {
            self.calendar_id = calendar_id;
        }
        if let Some(api_base_url) = file.api_base_url {
            self.api_base_url = api_base_url;
        }
        Ok(())
    }

    /// Authenticate inputs derived from this configuration
    pub fn auth_request(&self) -> AuthRequest {
        AuthRequest {
            service_account_json: self.service_account_json.clone(),
            impersonate_user_account: self.impersonate_user_account.clone(),
            credentials_env: self.credentials_env.clone(),
            api_base_url: self.api_base_url.clone(),
        }
    }
}
