//! Logging trait for Gemini client operations.
//!
//! This module provides the [`ClientLogger`] trait that allows callers to
//! capture every API interaction passing through the [`crate::Gemini`]
//! client, and [`TracingLogger`], which forwards them to `tracing`.

use crate::Error;
use crate::types::{GenerateContentRequest, GenerateContentResponse, Model};

/// A trait for logging Gemini client operations.
///
/// # Example
///
/// ```rust,ignore
/// use codereview::{ClientLogger, Error, GenerateContentRequest, GenerateContentResponse, Model};
/// use std::sync::Mutex;
///
/// struct CountingLogger {
///     failures: Mutex<usize>,
/// }
///
/// impl ClientLogger for CountingLogger {
///     fn log_request(&self, _: &Model, _: &GenerateContentRequest) {}
///     fn log_response(&self, _: &GenerateContentResponse) {}
///     fn log_error(&self, _: &Error) {
///         *self.failures.lock().unwrap() += 1;
///     }
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log an outgoing `generateContent` request.
    ///
    /// Called once per request, before it is sent.  The API key is not part
    /// of the request body and is never passed here.
    fn log_request(&self, model: &Model, request: &GenerateContentRequest);

    /// Log a successfully parsed response.
    fn log_response(&self, response: &GenerateContentResponse);

    /// Log a failed request, whatever the failure class.
    fn log_error(&self, error: &Error);
}

/// A [`ClientLogger`] that emits `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl ClientLogger for TracingLogger {
    fn log_request(&self, model: &Model, request: &GenerateContentRequest) {
        let prompt_bytes: usize = request
            .contents
            .iter()
            .flat_map(|content| content.parts.iter())
            .filter_map(|part| part.text.as_ref())
            .map(String::len)
            .sum();
        tracing::debug!(%model, prompt_bytes, "sending generateContent request");
    }

    fn log_response(&self, response: &GenerateContentResponse) {
        tracing::debug!(
            candidates = response.candidates.len(),
            finish_reason = response
                .candidates
                .first()
                .and_then(|candidate| candidate.finish_reason.as_deref())
                .unwrap_or("unknown"),
            "received generateContent response"
        );
    }

    fn log_error(&self, error: &Error) {
        tracing::warn!(status = ?error.status_code(), "generateContent failed: {error}");
    }
}
