use ragchat_core::{BackendError, Conversation, RagClient};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::input::InputBuffer;

/// What the startup health check learned about the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendStatus {
    Unknown,
    Online,
    Offline(String),
}

pub struct App {
    pub should_quit: bool,

    // Conversation
    pub conversation: Conversation,
    pub input: InputBuffer,
    pub query_task: Option<JoinHandle<Result<String, BackendError>>>,

    // Chat view state
    pub chat_scroll: u16,
    pub follow_bottom: bool, // pin the view to the newest line on next render
    pub chat_height: u16,    // inner height of chat area, set during render
    pub chat_lines: u16,     // wrapped line count of the history, set during render

    // Header/footer state
    pub backend_status: BackendStatus,
    pub status_message: Option<String>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    pub client: RagClient,
}

impl App {
    pub fn new(client: RagClient, conversation: Conversation) -> Self {
        Self {
            should_quit: false,
            conversation,
            input: InputBuffer::default(),
            query_task: None,
            chat_scroll: 0,
            follow_bottom: true,
            chat_height: 0,
            chat_lines: 0,
            backend_status: BackendStatus::Unknown,
            status_message: None,
            animation_frame: 0,
            client,
        }
    }

    /// Send the current input. Does nothing when the input is blank or a
    /// query is already outstanding; the input is kept in that case.
    pub fn send_query(&mut self) {
        let Some(query) = self.conversation.submit(self.input.text()) else {
            return;
        };

        self.input.clear();
        self.status_message = None;
        self.scroll_to_bottom();

        let client = self.client.clone();
        self.query_task = Some(tokio::spawn(async move { client.ask(&query).await }));
    }

    /// Fold a finished query task back into the conversation.
    pub async fn poll_query(&mut self) {
        let finished = self
            .query_task
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }
        let Some(task) = self.query_task.take() else {
            return;
        };

        let result = match task.await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "query task did not complete");
                Err(BackendError::transport(format!("request task failed: {}", e)))
            }
        };
        self.conversation.resolve(result);
        self.scroll_to_bottom();
    }

    /// Put the most recent question back into the input for editing.
    pub fn rewrite_last_query(&mut self) {
        match self.conversation.last_query() {
            Some(query) => {
                let query = query.to_string();
                self.input.set(&query);
                self.status_message = None;
            }
            None => self.status_message = Some("No question to rewrite yet".to_string()),
        }
    }

    pub fn copy_last_answer(&mut self) {
        let Some(answer) = self.conversation.last_answer() else {
            self.status_message = Some("No answer to copy yet".to_string());
            return;
        };

        let copied = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(answer));
        self.status_message = Some(match copied {
            Ok(()) => "Copied last answer to clipboard".to_string(),
            Err(e) => {
                debug!(error = %e, "clipboard unavailable");
                "Clipboard unavailable".to_string()
            }
        });
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.conversation.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Furthest scroll offset, from the line count of the last render.
    pub fn max_scroll(&self) -> u16 {
        self.chat_lines.saturating_sub(self.chat_height)
    }

    /// Show the newest line. Applied at render time, once the wrapped height
    /// of the new content is known.
    pub fn scroll_to_bottom(&mut self) {
        self.follow_bottom = true;
        self.chat_scroll = self.max_scroll();
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
        self.follow_bottom = self.chat_scroll >= self.max_scroll();
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(self.max_scroll());
        self.follow_bottom = self.chat_scroll >= self.max_scroll();
    }

    pub fn page_size(&self) -> u16 {
        (self.chat_height / 2).max(1)
    }
}
