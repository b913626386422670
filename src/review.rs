//! The review request: prompt template, backend seam and error formatting.
//!
//! [`request_review`] is the boundary past which nothing fails.  Whatever the
//! backend does, the caller gets a string to append to the transcript.

use std::sync::Arc;
use std::time::Duration;

use crate::client::Gemini;
use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::observability::{SESSION_MISSING_KEY, SESSION_REVIEW_FAILURES};
use crate::types::Model;

/// Marker that prefixes every failure shown in the transcript.
pub const WARNING_MARKER: &str = "⚠️";

/// Notice returned instead of a review when no API key is set.
pub const MISSING_KEY_NOTICE: &str = "Please enter your Gemini API key first.";

/// Message used when an error carries no description at all.
pub const UNKNOWN_ERROR: &str = "Unknown error occurred";

const REVIEW_INSTRUCTIONS: &str = "You are an expert code reviewer. Analyze the following code and provide a comprehensive review covering:

1. **Code Quality**: Readability, maintainability, and organization
2. **Bugs & Errors**: Potential bugs, logic errors, or edge cases
3. **Security**: Security vulnerabilities or concerns
4. **Performance**: Performance issues and optimization opportunities
5. **Best Practices**: Adherence to language-specific best practices
6. **Suggestions**: Specific, actionable improvements with code examples where helpful

Format your response in a clear, structured way. Be constructive and educational.

Code to review:";

/// Embed `code`, unmodified, in the fixed six-section review prompt.
pub fn review_prompt(code: &str) -> String {
    format!("{REVIEW_INSTRUCTIONS}\n```\n{code}\n```")
}

/// Something that can turn a prompt into review text.
///
/// The session holds the API key, so it is passed on every call rather than
/// captured by the backend.
#[async_trait::async_trait]
pub trait ReviewBackend: Send + Sync {
    /// Send `prompt` with `api_key` and return the model's text verbatim.
    async fn review(&self, api_key: &str, prompt: &str) -> Result<String>;
}

/// [`ReviewBackend`] backed by the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiReviewer {
    model: Model,
    base_url: Option<String>,
    timeout: Option<Duration>,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl GeminiReviewer {
    /// Creates a reviewer for `model` against the public endpoint.
    pub fn new(model: Model) -> Self {
        Self {
            model,
            base_url: None,
            timeout: None,
            logger: None,
        }
    }

    /// Overrides the API base URL (e.g. a proxy or a test server).
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    /// Sets a request timeout; `None` leaves the transport default.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attaches a logger to every client this reviewer builds.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Returns the model reviews are requested from.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Changes the model used for subsequent reviews.
    pub fn set_model(&mut self, model: Model) {
        self.model = model;
    }
}

#[async_trait::async_trait]
impl ReviewBackend for GeminiReviewer {
    async fn review(&self, api_key: &str, prompt: &str) -> Result<String> {
        let mut client = Gemini::with_options(
            Some(api_key.to_string()),
            self.base_url.clone(),
            self.timeout,
        )?;
        if let Some(logger) = &self.logger {
            client = client.with_logger(Arc::clone(logger));
        }
        client.generate_text(&self.model, prompt).await
    }
}

/// Render an error as transcript text.
///
/// Upstream errors show the API's own message, or the generic failure when it
/// sent none.  Everything else shows the error's description.
pub fn format_review_error(err: &Error) -> String {
    let message = if err.is_upstream() {
        err.message().to_string()
    } else {
        err.to_string()
    };
    let message = if message.trim().is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        message
    };
    format!("{WARNING_MARKER} Error: {message}\n\nPlease check your API key and try again.")
}

/// Ask `backend` to review `code`; never fails.
///
/// An empty key short-circuits to [`MISSING_KEY_NOTICE`] without calling the
/// backend.  Failures are logged and converted by [`format_review_error`].
pub async fn request_review(backend: &dyn ReviewBackend, code: &str, api_key: &str) -> String {
    if api_key.trim().is_empty() {
        SESSION_MISSING_KEY.click();
        return MISSING_KEY_NOTICE.to_string();
    }

    match backend.review(api_key, &review_prompt(code)).await {
        Ok(text) => text,
        Err(err) => {
            SESSION_REVIEW_FAILURES.click();
            tracing::warn!(error = %err, "error analyzing code");
            format_review_error(&err)
        }
    }
}
