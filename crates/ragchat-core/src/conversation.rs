//! Conversation state: the ordered message list and the pending flag.

use tracing::debug;

use crate::backend::RagClient;
use crate::error::BackendError;
use crate::state::{ChatMessage, ChatRole};

pub const DEFAULT_GREETING: &str =
    "Hello! I can answer questions based on your PDFs using RAG. What would you like to ask?";

/// Prefix of the assistant message shown when a request fails.
pub const FAILURE_PREFIX: &str = "Sorry, something went wrong";

/// Messages for one chat session plus the in-flight marker.
///
/// Entries are append-only. `pending` is true strictly between a successful
/// [`submit`](Self::submit) and the matching [`resolve`](Self::resolve), so at
/// most one request is ever outstanding.
#[derive(Debug, Clone)]
pub struct Conversation {
    entries: Vec<ChatMessage>,
    pending: bool,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self::with_greeting(DEFAULT_GREETING)
    }

    pub fn with_greeting(greeting: &str) -> Self {
        Self {
            entries: vec![ChatMessage::assistant(greeting)],
            pending: false,
        }
    }

    pub fn entries(&self) -> &[ChatMessage] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Accept a user query.
    ///
    /// Returns the trimmed query the caller must send to the backend, or
    /// `None` when the input is blank or a request is already pending. In the
    /// `None` case nothing changes.
    pub fn submit(&mut self, raw: &str) -> Option<String> {
        let query = raw.trim();
        if query.is_empty() || self.pending {
            return None;
        }

        self.entries.push(ChatMessage::user(query));
        self.pending = true;
        debug!(entries = self.entries.len(), "query submitted");
        Some(query.to_string())
    }

    /// Record the outcome of the pending request and clear `pending`.
    ///
    /// Failures become an assistant message embedding the error description.
    /// A resolution with nothing pending is dropped.
    pub fn resolve(&mut self, result: Result<String, BackendError>) {
        if !self.pending {
            debug!("resolution with no pending request ignored");
            return;
        }

        let content = match result {
            Ok(answer) => answer,
            Err(e) => format!("{}: {}", FAILURE_PREFIX, e),
        };
        self.entries.push(ChatMessage::assistant(content));
        self.pending = false;
    }

    /// Submit, wait for the backend, then resolve. Returns whether a request
    /// was made.
    pub async fn ask(&mut self, client: &RagClient, raw: &str) -> bool {
        let Some(query) = self.submit(raw) else {
            return false;
        };
        let result = client.ask(&query).await;
        self.resolve(result);
        true
    }

    /// Text of the most recent assistant entry (copy answer).
    pub fn last_answer(&self) -> Option<&str> {
        self.last_of(ChatRole::Assistant)
    }

    /// Text of the most recent user entry (rewrite last query).
    pub fn last_query(&self) -> Option<&str> {
        self.last_of(ChatRole::User)
    }

    fn last_of(&self, role: ChatRole) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|m| m.role == role)
            .map(|m| m.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{refused_url, MockBackend};

    #[test]
    fn test_new_seeds_greeting() {
        let conv = Conversation::new();
        assert_eq!(conv.entries(), &[ChatMessage::assistant(DEFAULT_GREETING)]);
        assert!(!conv.is_pending());
        assert_eq!(conv.last_query(), None);
    }

    #[test]
    fn test_submit_trims_and_sets_pending() {
        let mut conv = Conversation::new();
        let query = conv.submit("  what is RAG?\n");
        assert_eq!(query.as_deref(), Some("what is RAG?"));
        assert!(conv.is_pending());
        assert_eq!(conv.entries().last(), Some(&ChatMessage::user("what is RAG?")));
    }

    #[test]
    fn test_submit_blank_is_noop() {
        let mut conv = Conversation::new();
        for input in ["", "   ", "\n\t "] {
            assert_eq!(conv.submit(input), None);
        }
        assert_eq!(conv.len(), 1);
        assert!(!conv.is_pending());
    }

    #[test]
    fn test_submit_while_pending_is_noop() {
        let mut conv = Conversation::new();
        conv.submit("first").unwrap();
        assert_eq!(conv.submit("second"), None);
        assert_eq!(conv.len(), 2);
        assert!(conv.is_pending());
    }

    #[test]
    fn test_round_trips_add_two_entries() {
        let mut conv = Conversation::new();
        for i in 0..3 {
            let before = conv.len();
            conv.submit(&format!("question {}", i)).unwrap();
            assert_eq!(conv.len(), before + 1);
            conv.resolve(Ok(format!("answer {}", i)));
            assert_eq!(conv.len(), before + 2);
            assert!(!conv.is_pending());
        }
    }

    #[test]
    fn test_failure_clears_pending() {
        let mut conv = Conversation::new();
        conv.submit("question").unwrap();
        conv.resolve(Err(BackendError::from_status(500, Some("index unavailable".into()))));

        assert!(!conv.is_pending());
        let last = conv.entries().last().unwrap();
        assert_eq!(last.role, ChatRole::Assistant);
        assert!(last.content.starts_with(FAILURE_PREFIX));
        assert!(last.content.contains("index unavailable"));
    }

    #[test]
    fn test_resolve_without_pending_is_ignored() {
        let mut conv = Conversation::new();
        conv.resolve(Ok("stray".into()));
        assert_eq!(conv.len(), 1);
    }

    #[test]
    fn test_last_answer_and_query() {
        let mut conv = Conversation::new();
        assert_eq!(conv.last_answer(), Some(DEFAULT_GREETING));

        conv.submit("first").unwrap();
        conv.resolve(Ok("one".into()));
        conv.submit("second").unwrap();
        assert_eq!(conv.last_query(), Some("second"));
        assert_eq!(conv.last_answer(), Some("one"));

        conv.resolve(Ok("two".into()));
        assert_eq!(conv.last_answer(), Some("two"));
    }

    #[tokio::test]
    async fn test_ask_success_round_trip() {
        let backend = MockBackend::start(200, r#"{"answer": "42"}"#).await;
        let client = RagClient::new(&backend.url());
        let mut conv = Conversation::new();

        assert!(conv.ask(&client, "What is the meaning of life?").await);

        assert_eq!(conv.len(), 3);
        assert!(!conv.is_pending());
        assert_eq!(conv.entries().last(), Some(&ChatMessage::assistant("42")));
    }

    #[tokio::test]
    async fn test_ask_http_error_detail() {
        let backend = MockBackend::start(500, r#"{"detail": "index unavailable"}"#).await;
        let client = RagClient::new(&backend.url());
        let mut conv = Conversation::new();

        conv.ask(&client, "anything").await;

        assert!(!conv.is_pending());
        assert!(conv.last_answer().unwrap().contains("index unavailable"));
    }

    #[tokio::test]
    async fn test_ask_connection_refused() {
        let client = RagClient::new(&refused_url().await);
        let mut conv = Conversation::new();

        conv.ask(&client, "anything").await;

        assert!(!conv.is_pending());
        assert_eq!(conv.len(), 3);
        let text = conv.last_answer().unwrap();
        let description = text.strip_prefix(FAILURE_PREFIX).unwrap().trim_start_matches(": ");
        assert!(!description.is_empty());
    }

    #[tokio::test]
    async fn test_ask_blank_makes_no_request() {
        let client = RagClient::new(&refused_url().await);
        let mut conv = Conversation::new();

        assert!(!conv.ask(&client, "   ").await);
        assert_eq!(conv.len(), 1);
    }
}
