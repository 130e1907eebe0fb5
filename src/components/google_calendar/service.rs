use super::credentials::Credentials;
use super::token::{TokenManager, TokenProvider};
use crate::error::{google_calendar_error, CalendarResult, Error};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Calendar API v3 endpoint
pub const GOOGLE_API_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Authenticated handle to the calendar API.
///
/// Cloning is cheap; clones share the HTTP connection pool and token cache.
#[derive(Clone)]
pub struct CalendarService {
    client: Client,
    base_url: Url,
    tokens: Arc<dyn TokenProvider>,
}

impl fmt::Debug for CalendarService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarService")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl CalendarService {
    /// Build a service that exchanges `credentials` for tokens on demand
    pub fn new(credentials: Credentials, base_url: &str) -> CalendarResult<Self> {
        let client = Client::new();
        let tokens = TokenManager::new(credentials, client.clone());
        Self::build(client, base_url, Arc::new(tokens))
    }

    /// Build a service around any token source
    pub fn with_token_provider(
        base_url: &str,
        tokens: Arc<dyn TokenProvider>,
    ) -> CalendarResult<Self> {
        Self::build(Client::new(), base_url, tokens)
    }

    fn build(client: Client, base_url: &str, tokens: Arc<dyn TokenProvider>) -> CalendarResult<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(google_calendar_error(&format!(
                "API URL cannot be used as a base: {}",
                base_url
            )));
        }
        Ok(Self {
            client,
            base_url,
            tokens,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve API path segments against the base URL, percent-encoding each one
    pub(crate) fn url(&self, segments: &[&str]) -> CalendarResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| google_calendar_error("API URL cannot be used as a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn request(&self, method: Method, url: Url) -> CalendarResult<RequestBuilder> {
        let token = self.tokens.access_token().await?;
        debug!("{} {}", method, url);
        Ok(self.client.request(method, url).bearer_auth(token))
    }

    /// Send a request, turning non-success statuses into `Error::Api`
    async fn send(builder: RequestBuilder) -> CalendarResult<Response> {
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(Error::Api { status, message });
        }

        Ok(response)
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> CalendarResult<T> {
        let builder = self.request(Method::GET, url).await?.query(query);
        Ok(Self::send(builder).await?.json().await?)
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
        body: Option<&impl Serialize>,
    ) -> CalendarResult<T> {
        let builder = self.request(Method::POST, url).await?.query(query);
        let builder = match body {
            Some(body) => builder.json(body),
            // Google answers 411 to a bodiless POST without an explicit length
            None => builder.header(reqwest::header::CONTENT_LENGTH, 0),
        };
        Ok(Self::send(builder).await?.json().await?)
    }

    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
        body: &impl Serialize,
    ) -> CalendarResult<T> {
        let builder = self.request(Method::PUT, url).await?.query(query).json(body);
        Ok(Self::send(builder).await?.json().await?)
    }

    pub(crate) async fn delete(&self, url: Url) -> CalendarResult<()> {
        let builder = self.request(Method::DELETE, url).await?;
        Self::send(builder).await?;
        Ok(())
    }
}
