use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the calendar units
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(gcal_units::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(gcal_units::config),
        help("Provide a service account JSON file or a base64-encoded credential blob in the environment")
    )]
    Config(String),

    #[error("Credential error: {0}")]
    #[diagnostic(code(gcal_units::credentials))]
    Credentials(String),

    #[error("Token request failed: HTTP {status} - {message}")]
    #[diagnostic(code(gcal_units::auth))]
    Auth { status: u16, message: String },

    #[error("Google Calendar API error: HTTP {status} - {message}")]
    #[diagnostic(code(gcal_units::google_calendar))]
    Api { status: u16, message: String },

    #[error("Google Calendar request error: {0}")]
    #[diagnostic(code(gcal_units::google_calendar))]
    GoogleCalendar(String),

    #[error(transparent)]
    #[diagnostic(code(gcal_units::http))]
    Http(#[from] reqwest::Error),

    #[error("No authenticated calendar service in context (key \"{0}\"); run Authenticate first")]
    #[diagnostic(code(gcal_units::missing_service))]
    MissingService(&'static str),

    #[error("Missing key: {0}")]
    #[diagnostic(code(gcal_units::missing_key))]
    MissingKey(String),

    #[error(transparent)]
    #[diagnostic(code(gcal_units::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(gcal_units::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(gcal_units::other))]
    Other(String),
}

impl Error {
    /// HTTP status of a remote API failure, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } | Error::Auth { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the remote API reported the resource as missing (404 or 410)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api { status: 404 | 410, .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Error::Credentials(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type CalendarResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Environment variable {} is not valid unicode", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create credential errors
pub fn credentials_error(message: &str) -> Error {
    Error::Credentials(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}
