use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response};
use url::Url;

use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::observability::{
    CLIENT_MALFORMED_RESPONSES, CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS,
};
use crate::types::{ApiErrorBody, GenerateContentRequest, GenerateContentResponse, Model};

/// Base URL of the Generative Language API, including the version segment.
pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";

/// Environment variable consulted when no key is passed explicitly.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Message used when an error response carries no usable message.
pub const GENERIC_FAILURE: &str = "Failed to analyze code";

/// Client for the Gemini `generateContent` endpoint.
///
/// The API key travels as the `key` query parameter.  No timeout is set unless
/// one is passed to [`Gemini::with_options`]; the transport default applies.
#[derive(Clone)]
pub struct Gemini {
    api_key: String,
    client: ReqwestClient,
    base_url: Url,
    timeout: Option<Duration>,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl fmt::Debug for Gemini {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gemini")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

impl Gemini {
    /// Create a new Gemini client.
    ///
    /// The API key can be provided directly or read from the GEMINI_API_KEY
    /// environment variable.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_options(api_key, None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = match api_key {
            Some(key) => key,
            None => env::var(API_KEY_ENV).map_err(|_| {
                Error::authentication(
                    "API key not provided and GEMINI_API_KEY environment variable not set",
                )
            })?,
        };
        if api_key.trim().is_empty() {
            return Err(Error::authentication("API key is empty"));
        }

        let base_url = parse_base_url(base_url.as_deref().unwrap_or(DEFAULT_API_URL))?;

        let mut builder = ReqwestClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            Error::http_client(
                format!("Failed to build HTTP client: {}", e),
                Some(Box::new(e)),
            )
        })?;

        Ok(Self {
            api_key,
            client,
            base_url,
            timeout,
            logger: None,
        })
    }

    /// Attach a logger that observes every request made by this client.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Returns the base URL requests are issued against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds `{base}models/{model}:generateContent?key={key}`.
    pub fn endpoint(&self, model: &Model) -> Result<Url> {
        let mut url = self
            .base_url
            .join(&format!("models/{}:generateContent", model))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        let parsed = serde_json::from_str::<ApiErrorBody>(&error_body).unwrap_or_default();
        let message = parsed.message().unwrap_or(GENERIC_FAILURE).to_string();
        let status = parsed.status().map(String::from);

        match status_code {
            400 => Error::bad_request(message, status),
            401 => Error::authentication(message),
            403 => Error::permission(message),
            404 => Error::not_found(message),
            408 => Error::timeout(message, None),
            429 => Error::rate_limit(message, retry_after),
            500 => Error::internal_server(message),
            502..=504 => Error::service_unavailable(message, retry_after),
            _ => Error::api(status_code, status, message),
        }
    }

    /// Issue one `generateContent` call and return the parsed body.
    ///
    /// A success status whose body lacks `candidates[0].content.parts[0].text`
    /// is reported as [`Error::MalformedResponse`].
    pub async fn generate_content(
        &self,
        model: &Model,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        CLIENT_REQUESTS.click();
        if let Some(logger) = &self.logger {
            logger.log_request(model, request);
        }
        let start = Instant::now();
        let result = self.generate_content_inner(model, request).await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        match &result {
            Ok(response) => {
                if let Some(logger) = &self.logger {
                    logger.log_response(response);
                }
            }
            Err(err) => {
                CLIENT_REQUEST_ERRORS.click();
                if let Some(logger) = &self.logger {
                    logger.log_error(err);
                }
            }
        }
        result
    }

    async fn generate_content_inner(
        &self,
        model: &Model,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = self.endpoint(model)?;

        let response = self
            .client
            .post(url)
            .headers(self.default_headers())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::timeout(e.to_string(), self.timeout.map(|t| t.as_secs_f64()))
                } else if e.is_connect() {
                    Error::connection(e.to_string(), Some(Box::new(e)))
                } else {
                    Error::http_client(e.to_string(), Some(Box::new(e)))
                }
            })?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        let body = response.json::<GenerateContentResponse>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })?;

        if body.first_text().is_none() {
            CLIENT_MALFORMED_RESPONSES.click();
            return Err(Error::malformed_response(
                "response did not contain candidates[0].content.parts[0].text",
            ));
        }
        Ok(body)
    }

    /// Issue one request carrying `prompt` and return the first candidate's text.
    pub async fn generate_text(&self, model: &Model, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest::from_prompt(prompt);
        let response = self.generate_content(model, &request).await?;
        response
            .first_text()
            .map(String::from)
            .ok_or_else(|| Error::malformed_response("response did not contain any text"))
    }
}

/// Parse a base URL, making sure it ends with `/` so `join` appends to it.
fn parse_base_url(base_url: &str) -> Result<Url> {
    let mut base_url = base_url.trim().to_string();
    if !base_url.ends_with('/') {
        base_url.push('/');
    }
    Ok(Url::parse(&base_url)?)
}
