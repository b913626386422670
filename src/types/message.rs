use serde::{Deserialize, Serialize};

/// Who authored a transcript message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Text typed or pasted by the user.
    User,

    /// Review text, notices and formatted errors.
    Assistant,
}

/// One entry of the visible transcript.
///
/// Messages are never edited once appended; the session only pushes new ones.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// The role of the message.
    pub role: Role,

    /// The text of the message, displayed as-is.
    pub content: String,
}

impl Message {
    /// Create a new `Message` with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a new user `Message`.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant `Message`.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Returns true if the message was authored by the assistant.
    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn message_serializes_lowercase_role() {
        let message = Message::user("fn main() {}");
        assert_eq!(
            to_value(&message).unwrap(),
            json!({
                "role": "user",
                "content": "fn main() {}"
            })
        );
    }

    #[test]
    fn constructors() {
        assert!(Message::assistant("hi").is_assistant());
        assert!(!Message::user("hi").is_assistant());
        assert_eq!(Message::new(Role::User, "x"), Message::user("x"));
    }
}
