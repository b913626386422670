use serde::{Deserialize, Serialize};

/// The error envelope returned with non-2xx responses.
///
/// ```json
/// { "error": { "code": 400, "message": "...", "status": "INVALID_ARGUMENT" } }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiErrorBody {
    /// The error detail, when the body follows the documented shape.
    #[serde(default)]
    pub error: Option<ApiErrorDetail>,
}

/// Detail of an [`ApiErrorBody`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiErrorDetail {
    /// HTTP status code echoed by the API.
    #[serde(default)]
    pub code: Option<u16>,

    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,

    /// Canonical status string such as `INVALID_ARGUMENT`.
    #[serde(default)]
    pub status: Option<String>,
}

impl ApiErrorBody {
    /// Returns the upstream message if one was provided and is not blank.
    pub fn message(&self) -> Option<&str> {
        self.error
            .as_ref()?
            .message
            .as_deref()
            .filter(|message| !message.trim().is_empty())
    }

    /// Returns the upstream status string, if any.
    pub fn status(&self) -> Option<&str> {
        self.error.as_ref()?.status.as_deref()
    }
}
