use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Represents a Gemini model identifier.
///
/// This can be a predefined model or a custom string value for models that
/// are not listed in [`KnownModel`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Model {
    /// Known model versions
    Known(KnownModel),

    /// Custom model identifier (for newer or tuned models)
    Custom(String),
}

/// Known Gemini model versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownModel {
    /// Gemini 2.5 Pro
    #[serde(rename = "gemini-2.5-pro")]
    Gemini25Pro,

    /// Gemini 2.5 Flash
    #[serde(rename = "gemini-2.5-flash")]
    Gemini25Flash,

    /// Gemini 2.0 Flash
    #[serde(rename = "gemini-2.0-flash")]
    Gemini20Flash,
}

impl KnownModel {
    /// The wire identifier used in the `models/{id}:generateContent` path.
    pub fn as_str(&self) -> &'static str {
        match self {
            KnownModel::Gemini25Pro => "gemini-2.5-pro",
            KnownModel::Gemini25Flash => "gemini-2.5-flash",
            KnownModel::Gemini20Flash => "gemini-2.0-flash",
        }
    }

    const ALL: [KnownModel; 3] = [
        KnownModel::Gemini25Pro,
        KnownModel::Gemini25Flash,
        KnownModel::Gemini20Flash,
    ];
}

impl Default for Model {
    fn default() -> Self {
        Model::Known(KnownModel::Gemini25Pro)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Known(known_model) => write!(f, "{}", known_model),
            Model::Custom(custom) => write!(f, "{}", custom),
        }
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Model {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // Accept the "models/" prefix the API uses in its own listings.
        let s = s.strip_prefix("models/").unwrap_or(s);
        Ok(KnownModel::ALL
            .iter()
            .find(|known| known.as_str() == s)
            .map(|known| Model::Known(*known))
            .unwrap_or_else(|| Model::Custom(s.to_string())))
    }
}

impl From<KnownModel> for Model {
    fn from(model: KnownModel) -> Self {
        Model::Known(model)
    }
}

impl From<String> for Model {
    fn from(model: String) -> Self {
        Model::Custom(model)
    }
}

impl From<&str> for Model {
    fn from(model: &str) -> Self {
        Model::Custom(model.to_string())
    }
}
