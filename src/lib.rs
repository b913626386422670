// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod clipboard;
pub mod error;
pub mod observability;
pub mod render;
pub mod review;
pub mod types;

// Re-exports
pub use client::Gemini;
pub use client_logger::{ClientLogger, TracingLogger};
pub use clipboard::{Clipboard, MemoryClipboard, SystemClipboard};
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use render::{PlainTextRenderer, Renderer};
pub use review::{
    GeminiReviewer, MISSING_KEY_NOTICE, ReviewBackend, WARNING_MARKER, format_review_error,
    request_review, review_prompt,
};
pub use types::*;
