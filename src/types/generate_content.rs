use serde::{Deserialize, Serialize};

/// A single piece of content; only text parts are produced or read here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Part {
    /// The text of this part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// An ordered list of parts, optionally attributed to a role.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Content {
    /// The parts of this content.
    #[serde(default)]
    pub parts: Vec<Part>,

    /// The producer of the content (`user` or `model`), if given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Request body for `models/{model}:generateContent`.
///
/// The body is always a single content with a single text part:
/// `{ "contents": [{ "parts": [{ "text": ... }] }] }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateContentRequest {
    /// The content sent to the model.
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// Create a request that carries one text prompt.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part::text(prompt)],
                role: None,
            }],
        }
    }
}

/// One generated response option.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The generated content, absent when the candidate was blocked.
    #[serde(default)]
    pub content: Option<Content>,

    /// Why generation stopped, e.g. `STOP` or `SAFETY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Response body of `generateContent`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateContentResponse {
    /// Generated candidates; this crate only reads the first.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Returns `candidates[0].content.parts[0].text`, if present.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}
