//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::env;
use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::client::API_KEY_ENV;
use crate::review::GeminiReviewer;
use crate::types::Model;

/// Command-line arguments for the codereview-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for reviews.
    #[arrrg(optional, "Model to use (default: gemini-2.5-pro)", "MODEL")]
    pub model: Option<String>,

    /// API key; falls back to the environment when absent.
    #[arrrg(optional, "Gemini API key (default: $GEMINI_API_KEY)", "KEY")]
    pub api_key: Option<String>,

    /// Alternate API base URL.
    #[arrrg(
        optional,
        "API base URL (default: https://generativelanguage.googleapis.com/v1beta/)",
        "URL"
    )]
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: none)", "SECONDS")]
    pub timeout: Option<u32>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// The model reviews are requested from.
    pub model: Model,

    /// API key used to pre-populate the key prompt.
    pub api_key: Option<String>,

    /// Base URL override; `None` means the public endpoint.
    pub base_url: Option<String>,

    /// Request timeout; `None` leaves the transport default.
    pub timeout: Option<Duration>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: gemini-2.5-pro
    /// - API key: none
    /// - Base URL: the public endpoint
    /// - Timeout: none
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            model: Model::default(),
            api_key: None,
            base_url: None,
            timeout: None,
            use_color: true,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    /// Fills the API key from `GEMINI_API_KEY` unless one is already set.
    pub fn with_env_api_key(self) -> Self {
        if self.api_key.is_some() {
            return self;
        }
        let key = env::var(API_KEY_ENV).ok();
        self.with_api_key(key)
    }

    /// Sets the API base URL.
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Builds the review backend described by this configuration.
    pub fn reviewer(&self) -> GeminiReviewer {
        GeminiReviewer::new(self.model.clone())
            .with_base_url(self.base_url.clone())
            .with_timeout(self.timeout)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let model = args
            .model
            .map(|s| s.parse::<Model>().unwrap_or(Model::Custom(s)))
            .unwrap_or_default();

        ChatConfig {
            model,
            base_url: args.base_url,
            timeout: args
                .timeout
                .filter(|secs| *secs > 0)
                .map(|secs| Duration::from_secs(secs.into())),
            use_color: !args.no_color,
            ..ChatConfig::new()
        }
        .with_api_key(args.api_key)
    }
}
