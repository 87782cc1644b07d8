use ratatui::layout::Rect;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use zenchat_core::{ChatClient, ChatError, ChatMessage, Conversation, FALLBACK_REPLY};

use crate::transcript;

pub struct App {
    pub should_quit: bool,

    // Input state
    pub input: String,
    pub input_cursor: usize, // cursor position in input, in chars

    // Conversation state
    pub conversation: Conversation,
    pub loading: bool,
    pub request_task: Option<JoinHandle<Result<String, ChatError>>>,

    // Chat view state
    pub chat_scroll: u16,
    pub chat_height: u16, // Inner height of chat area for scroll calculations
    pub chat_width: u16,  // Inner width of chat area for wrap calculations
    pub chat_area: Option<Rect>,
    pub clamp_scroll_pending: bool, // terminal resized; clamp once the new size is known

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    pub client: ChatClient,
}

impl App {
    pub fn new(client: ChatClient) -> Self {
        Self {
            should_quit: false,
            input: String::new(),
            input_cursor: 0,
            conversation: Conversation::new(),
            loading: false,
            request_task: None,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_area: None,
            clamp_scroll_pending: false,
            animation_frame: 0,
            client,
        }
    }

    /// Nothing to show yet: no messages and nothing in flight
    pub fn show_empty_state(&self) -> bool {
        !self.loading && self.conversation.is_empty()
    }

    pub fn status_label(&self) -> &'static str {
        if self.loading {
            "Thinking"
        } else {
            "Live"
        }
    }

    /// Send the current input. Ignored when the input is blank or a request
    /// is already in flight.
    pub fn submit(&mut self) {
        if self.input.trim().is_empty() || self.request_task.is_some() {
            return;
        }

        let message = self.input.clone();
        self.conversation.push(ChatMessage::user(message.clone()));
        self.loading = true;
        self.animation_frame = 0;
        self.scroll_to_bottom();

        info!(chars = message.chars().count(), "submitting message");

        let client = self.client.clone();
        self.request_task = Some(tokio::spawn(async move { client.send(&message).await }));
    }

    /// Collect the reply once the in-flight request has finished
    pub async fn poll_request(&mut self) {
        let finished = self
            .request_task
            .as_ref()
            .map(|task| task.is_finished())
            .unwrap_or(false);
        if !finished {
            return;
        }

        if let Some(task) = self.request_task.take() {
            let reply = match task.await {
                Ok(Ok(reply)) => reply,
                Ok(Err(e)) => {
                    error!(error = %e, "chat request failed");
                    FALLBACK_REPLY.to_string()
                }
                Err(e) => {
                    error!(error = %e, "chat request task did not complete");
                    FALLBACK_REPLY.to_string()
                }
            };
            self.finish_request(reply);
        }
    }

    fn finish_request(&mut self, reply: String) {
        self.conversation.push(ChatMessage::assistant(reply));
        self.loading = false;
        self.input.clear();
        self.input_cursor = 0;
        self.scroll_to_bottom();
    }

    /// Start over. Disabled while a request is in flight.
    pub fn new_chat(&mut self) {
        if self.loading {
            return;
        }
        debug!(messages = self.conversation.len(), "clearing conversation");
        self.conversation.clear();
        self.input.clear();
        self.input_cursor = 0;
        self.chat_scroll = 0;
    }

    /// Abort any in-flight request before exit
    pub fn shutdown(&mut self) {
        if let Some(task) = self.request_task.take() {
            task.abort();
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick(&mut self) {
        if self.loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    fn visible_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }

    fn max_scroll(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 { self.chat_width } else { 50 };
        let lines =
            transcript::transcript_lines(&self.conversation, self.loading, self.animation_frame);
        transcript::wrapped_height(&lines, wrap_width).saturating_sub(self.visible_height())
    }

    /// Scroll chat to bottom so the latest message is visible
    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll = self.max_scroll();
    }

    pub fn scroll_down(&mut self, rows: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(rows).min(self.max_scroll());
    }

    /// Pull the scroll offset back into range for the current viewport
    pub fn clamp_scroll(&mut self) {
        self.chat_scroll = self.chat_scroll.min(self.max_scroll());
    }

    pub fn scroll_up(&mut self, rows: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(rows);
    }

    pub fn half_page(&self) -> u16 {
        (self.visible_height() / 2).max(1)
    }
}
