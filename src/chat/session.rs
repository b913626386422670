//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the transcript,
//! the draft being typed, the API key and the loading flag, and which issues
//! one review request per submission.

use std::time::Duration;

use tokio::time::Instant;

use crate::clipboard::Clipboard;
use crate::error::{Error, Result};
use crate::observability::{SESSION_COPIES, SESSION_IGNORED_SUBMISSIONS, SESSION_SUBMISSIONS};
use crate::review::{ReviewBackend, request_review};
use crate::types::{Message, Role};

/// The assistant message every session starts with.
pub const GREETING: &str = "Hello! I'm your AI Code Review Assistant. Paste your code below, and I'll analyze it for bugs, security issues, performance improvements, and best practices. 🚀";

/// How long a copy acknowledgment stays visible.
pub const COPY_ACK_DURATION: Duration = Duration::from_secs(2);

/// Which screen the session is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// The key prompt is shown; the initial mode.
    AwaitingApiKey,
    /// The transcript and draft input are shown.
    ActiveChat,
}

#[derive(Debug, Clone, Copy)]
struct CopyAck {
    index: usize,
    expires_at: Instant,
}

/// A submission whose user message is already in the transcript.
///
/// Produced by [`ChatSession::begin_submit`] and consumed by
/// [`ChatSession::complete_review`].  It borrows nothing, but only the session
/// that produced it can accept it back, so a review can never land in a
/// session that has gone away.
#[derive(Debug)]
#[must_use = "a pending review leaves the session loading until completed"]
pub struct PendingReview {
    code: String,
    api_key: String,
}

impl PendingReview {
    /// The submitted text, exactly as typed.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The key captured at submission time.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    /// The number of messages in the transcript, greeting included.
    pub message_count: usize,
    /// Number of accepted submissions.
    pub submissions: u64,
    /// Whether a review is in flight.
    pub is_loading: bool,
    /// Whether a non-blank API key is set.
    pub has_api_key: bool,
    /// The current mode.
    pub mode: SessionMode,
    /// Lines in the current draft.
    pub draft_lines: usize,
}

/// A chat session that manages transcript state and review requests.
///
/// At most one review is in flight: [`ChatSession::begin_submit`] refuses to
/// start another while `is_loading` is set.  The transcript only ever grows.
pub struct ChatSession<B: ReviewBackend> {
    backend: B,
    messages: Vec<Message>,
    draft_input: String,
    api_key: String,
    is_loading: bool,
    mode: SessionMode,
    copied: Option<CopyAck>,
    submissions: u64,
}

impl<B: ReviewBackend> ChatSession<B> {
    /// Creates a session seeded with the greeting, waiting for an API key.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            messages: vec![Message::assistant(GREETING)],
            draft_input: String::new(),
            api_key: String::new(),
            is_loading: false,
            mode: SessionMode::AwaitingApiKey,
            copied: None,
            submissions: 0,
        }
    }

    /// Pre-populates the API key field.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Returns the review backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the review backend for mutation.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /////////////////////////////////////////// Key ///////////////////////////////////////////

    /// Replaces the API key.  Allowed in either mode.
    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.api_key = api_key.into();
    }

    /// Returns the current API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Leaves the key prompt if a non-blank key is set.
    ///
    /// Returns whether the session is now in [`SessionMode::ActiveChat`].
    pub fn confirm_api_key(&mut self) -> bool {
        if self.api_key.trim().is_empty() {
            return false;
        }
        self.mode = SessionMode::ActiveChat;
        true
    }

    /// Returns to the key prompt.  The transcript is kept.
    pub fn request_key_change(&mut self) {
        self.mode = SessionMode::AwaitingApiKey;
    }

    /// Returns the current mode.
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    ////////////////////////////////////////// Draft //////////////////////////////////////////

    /// Replaces the draft.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft_input = text.into();
    }

    /// Appends one line to the draft.
    pub fn push_draft_line(&mut self, line: &str) {
        if !self.draft_input.is_empty() {
            self.draft_input.push('\n');
        }
        self.draft_input.push_str(line);
    }

    /// Discards the draft.
    pub fn clear_draft(&mut self) {
        self.draft_input.clear();
    }

    /// Returns the draft.
    pub fn draft(&self) -> &str {
        &self.draft_input
    }

    /// Returns true if the draft would be accepted by [`ChatSession::begin_submit`].
    pub fn can_submit(&self) -> bool {
        !self.is_loading && !self.draft_input.trim().is_empty()
    }

    //////////////////////////////////////// Submission ///////////////////////////////////////

    /// Returns true while a review is in flight.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Starts a submission of the draft.
    ///
    /// Does nothing and returns `None` when the draft is blank after trimming
    /// or a review is already in flight.  Otherwise appends the user message,
    /// clears the draft and sets the loading flag.
    pub fn begin_submit(&mut self) -> Option<PendingReview> {
        if !self.can_submit() {
            if self.is_loading {
                SESSION_IGNORED_SUBMISSIONS.click();
                tracing::debug!("submission ignored: review in flight");
            }
            return None;
        }
        SESSION_SUBMISSIONS.click();
        self.submissions += 1;
        let code = std::mem::take(&mut self.draft_input);
        self.messages.push(Message::user(code.clone()));
        self.is_loading = true;
        Some(PendingReview {
            code,
            api_key: self.api_key.clone(),
        })
    }

    /// Runs the review for `pending`.  Never fails; see [`request_review`].
    pub async fn run_review(&self, pending: &PendingReview) -> String {
        self.request_review(&pending.code, &pending.api_key).await
    }

    /// Asks the backend to review `code` with `api_key`.
    ///
    /// Returns the model's text verbatim, the missing-key notice, or a
    /// warning-prefixed error string.
    pub async fn request_review(&self, code: &str, api_key: &str) -> String {
        request_review(&self.backend, code, api_key).await
    }

    /// Appends the review as an assistant message and clears the loading flag.
    pub fn complete_review(&mut self, pending: PendingReview, review: String) {
        drop(pending);
        self.messages.push(Message::assistant(review));
        self.is_loading = false;
    }

    /// Submits the draft and waits for the review.
    ///
    /// Returns the index of the appended assistant message, or `None` if the
    /// submission was ignored.
    pub async fn submit(&mut self) -> Option<usize> {
        let pending = self.begin_submit()?;
        let review = self.run_review(&pending).await;
        self.complete_review(pending, review);
        Some(self.messages.len() - 1)
    }

    //////////////////////////////////////// Transcript ///////////////////////////////////////

    /// Returns the transcript.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the number of messages in the transcript.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Returns the index of the most recent assistant message.
    pub fn last_assistant_index(&self) -> Option<usize> {
        self.messages
            .iter()
            .rposition(|message| message.role == Role::Assistant)
    }

    ////////////////////////////////////////// Copying /////////////////////////////////////////

    /// Copies message `index` to `clipboard` and acknowledges it for two seconds.
    ///
    /// A new copy replaces any earlier acknowledgment.
    pub fn copy_to_clipboard(&mut self, clipboard: &mut dyn Clipboard, index: usize) -> Result<()> {
        let message = self.messages.get(index).ok_or_else(|| {
            Error::validation(
                format!("no message at index {index}"),
                Some("index".to_string()),
            )
        })?;
        clipboard.write_text(&message.content)?;
        SESSION_COPIES.click();
        self.copied = Some(CopyAck {
            index,
            expires_at: Instant::now() + COPY_ACK_DURATION,
        });
        Ok(())
    }

    /// Returns the index whose copy acknowledgment is still showing.
    pub fn copied_index(&self) -> Option<usize> {
        self.copied
            .filter(|ack| Instant::now() < ack.expires_at)
            .map(|ack| ack.index)
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            message_count: self.message_count(),
            submissions: self.submissions,
            is_loading: self.is_loading,
            has_api_key: !self.api_key.trim().is_empty(),
            mode: self.mode,
            draft_lines: if self.draft_input.is_empty() {
                0
            } else {
                self.draft_input.lines().count().max(1)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryClipboard;
    use crate::review::{MISSING_KEY_NOTICE, review_prompt};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct EchoBackend {
        calls: AtomicUsize,
        last_prompt: Mutex<Option<String>>,
    }

    #[async_trait::async_trait]
    impl ReviewBackend for EchoBackend {
        async fn review(&self, _: &str, prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            Ok(format!("reviewed {} bytes", prompt.len()))
        }
    }

    fn session() -> ChatSession<EchoBackend> {
        ChatSession::new(EchoBackend::default()).with_api_key("AIza-test")
    }

    #[test]
    fn new_session_has_greeting() {
        let session = ChatSession::new(EchoBackend::default());
        assert_eq!(session.messages(), &[Message::assistant(GREETING)]);
        assert_eq!(session.mode(), SessionMode::AwaitingApiKey);
        assert!(!session.is_loading());
        assert_eq!(session.last_assistant_index(), Some(0));
    }

    #[test]
    fn key_confirmation() {
        let mut session = ChatSession::new(EchoBackend::default());
        assert!(!session.confirm_api_key());
        session.set_api_key("   ");
        assert!(!session.confirm_api_key());
        assert_eq!(session.mode(), SessionMode::AwaitingApiKey);

        session.set_api_key("AIza-test");
        assert!(session.confirm_api_key());
        assert_eq!(session.mode(), SessionMode::ActiveChat);

        session.request_key_change();
        assert_eq!(session.mode(), SessionMode::AwaitingApiKey);
        assert_eq!(session.api_key(), "AIza-test");
        assert_eq!(session.message_count(), 1);
    }

    #[test]
    fn draft_lines_join_with_newlines() {
        let mut session = session();
        session.push_draft_line("fn main() {");
        session.push_draft_line("");
        session.push_draft_line("}");
        assert_eq!(session.draft(), "fn main() {\n\n}");
        assert_eq!(session.stats().draft_lines, 3);
        session.clear_draft();
        assert_eq!(session.draft(), "");
        assert_eq!(session.stats().draft_lines, 0);
    }

    #[tokio::test]
    async fn submit_appends_user_then_assistant() {
        let mut session = session();
        session.set_draft("  let x = 1;  ");
        let index = session.submit().await;

        assert_eq!(index, Some(2));
        assert_eq!(session.message_count(), 3);
        assert_eq!(session.messages()[1], Message::user("  let x = 1;  "));
        assert_eq!(session.messages()[2].role, Role::Assistant);
        assert_eq!(session.draft(), "");
        assert!(!session.is_loading());
        assert_eq!(
            session.backend().last_prompt.lock().unwrap().as_deref(),
            Some(review_prompt("  let x = 1;  ").as_str())
        );
    }

    #[tokio::test]
    async fn blank_draft_is_ignored() {
        let mut session = session();
        session.set_draft(" \n\t ");
        assert_eq!(session.submit().await, None);
        assert_eq!(session.message_count(), 1);
        assert_eq!(session.backend().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_key_short_circuits() {
        let mut session = ChatSession::new(EchoBackend::default());
        session.set_draft("print('hi')");
        session.submit().await;

        let assistants: Vec<_> = session.messages()[1..]
            .iter()
            .filter(|message| message.is_assistant())
            .collect();
        assert_eq!(assistants.len(), 1);
        assert_eq!(assistants[0].content, MISSING_KEY_NOTICE);
        assert_eq!(session.backend().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn submit_while_loading_is_noop() {
        let mut session = session();
        session.set_draft("first");
        let pending = session.begin_submit().expect("first submission starts");
        assert!(session.is_loading());
        assert_eq!(pending.code(), "first");
        assert_eq!(pending.api_key(), "AIza-test");

        session.set_draft("second");
        assert!(!session.can_submit());
        assert!(session.begin_submit().is_none());
        assert_eq!(session.submit().await, None);
        assert_eq!(session.message_count(), 2);
        assert_eq!(session.draft(), "second");

        let review = session.run_review(&pending).await;
        session.complete_review(pending, review);
        assert!(!session.is_loading());
        assert_eq!(session.message_count(), 3);
        assert!(session.can_submit());
    }

    #[tokio::test]
    async fn key_captured_at_submission() {
        let mut session = session();
        session.set_draft("code");
        let pending = session.begin_submit().unwrap();
        session.set_api_key("");
        let review = session.run_review(&pending).await;
        assert!(review.starts_with("reviewed"));
        session.complete_review(pending, review);
    }

    #[tokio::test(start_paused = true)]
    async fn copy_acknowledges_latest_index_for_two_seconds() {
        let mut session = session();
        session.set_draft("code");
        session.submit().await;
        let mut clipboard = MemoryClipboard::new();

        session.copy_to_clipboard(&mut clipboard, 0).unwrap();
        assert_eq!(session.copied_index(), Some(0));
        assert_eq!(clipboard.contents(), Some(GREETING));

        tokio::time::advance(Duration::from_millis(500)).await;
        session.copy_to_clipboard(&mut clipboard, 2).unwrap();
        assert_eq!(session.copied_index(), Some(2));
        assert_eq!(clipboard.contents(), Some(session.messages()[2].content.as_str()));

        tokio::time::advance(Duration::from_millis(1900)).await;
        assert_eq!(session.copied_index(), Some(2));

        tokio::time::advance(Duration::from_millis(100)).await;
        assert_eq!(session.copied_index(), None);
        assert_eq!(session.message_count(), 3);
    }

    #[test]
    fn copy_out_of_range() {
        let mut session = session();
        let mut clipboard = MemoryClipboard::new();
        let err = session.copy_to_clipboard(&mut clipboard, 7).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(session.copied_index(), None);
        assert_eq!(clipboard.contents(), None);
    }
}
