//! Conversational assistant widget.
//!
//! The widget keeps the transcript and sends all of it to the chat endpoint
//! on every turn. The backend owns any context trimming. The user's message
//! joins the transcript as soon as a turn starts. A failed turn shows an
//! error entry in the panel and adds no assistant message, so the next
//! request repeats the unanswered user message but never the error text.
//!
//! A turn runs in two steps, [`ChatWidget::begin_turn`] and
//! [`ChatWidget::finish_turn`], so a caller can render the loading state
//! in between. [`ChatWidget::send_message`] runs both steps with one call.

pub mod format;

use crate::api::{ApiClient, ApiError, Transport};
use crate::models::{ChatMessage, ChatReply};

pub const DEFAULT_GREETING: &str =
    "Hello! I'm your MediConnect AI assistant. How can I help you today?";

const GENERIC_ERROR: &str = "An error occurred. Please try again.";
const CONNECT_ERROR: &str =
    "Failed to connect to AI service. Please check your connection and try again.";
const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";
const UNAUTHORIZED: &str = "You are not authorized to use the AI assistant.";
const SERVICE_UNAVAILABLE: &str =
    "The AI service is currently unavailable. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    AwaitingReply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    User,
    Assistant,
    Error,
}

/// One line in the chat panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub kind: EntryKind,
    pub text: String,
}

impl ChatEntry {
    fn new(kind: EntryKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

pub struct ChatWidget<T> {
    api: ApiClient<T>,
    greeting: String,
    transcript: Vec<ChatMessage>,
    entries: Vec<ChatEntry>,
    state: ChatState,
    open: bool,
}

impl<T: Transport> ChatWidget<T> {
    /// Create the widget for a signed-in session. Returns `None` when the
    /// caller is not authenticated; the server remains the real gate.
    pub fn mount(api: ApiClient<T>, authenticated: bool, greeting: Option<&str>) -> Option<Self> {
        if !authenticated {
            tracing::debug!("chat widget not mounted: no session");
            return None;
        }
        let greeting = greeting
            .filter(|g| !g.trim().is_empty())
            .unwrap_or(DEFAULT_GREETING)
            .to_string();
        Some(Self {
            entries: vec![ChatEntry::new(EntryKind::Assistant, greeting.clone())],
            api,
            greeting,
            transcript: Vec::new(),
            state: ChatState::Idle,
            open: false,
        })
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    /// Messages that will be sent with the next turn.
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Everything shown in the panel, greeting and errors included.
    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    /// Record the user's message and return the payload for the backend.
    ///
    /// Returns `None` (and changes nothing) while a reply is pending or when
    /// `input` is blank.
    pub fn begin_turn(&mut self, input: &str) -> Option<Vec<ChatMessage>> {
        let message = input.trim();
        if message.is_empty() || self.state == ChatState::AwaitingReply {
            return None;
        }
        self.entries.push(ChatEntry::new(EntryKind::User, message));
        self.transcript.push(ChatMessage::user(message));
        self.state = ChatState::AwaitingReply;
        Some(self.transcript.clone())
    }

    /// Apply the backend's answer. Always returns the widget to idle.
    pub fn finish_turn(&mut self, outcome: Result<ChatReply, ApiError>) {
        match outcome {
            Ok(ChatReply {
                success: true,
                message: Some(reply),
                ..
            }) => {
                self.entries
                    .push(ChatEntry::new(EntryKind::Assistant, reply.clone()));
                self.transcript.push(ChatMessage::assistant(reply));
            }
            Ok(reply) => {
                let text = reply
                    .error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| GENERIC_ERROR.to_string());
                self.entries.push(ChatEntry::new(EntryKind::Error, text));
            }
            Err(err) => {
                tracing::warn!(error = %err, "chat request failed");
                self.entries
                    .push(ChatEntry::new(EntryKind::Error, failure_text(&err)));
            }
        }
        self.state = ChatState::Idle;
    }

    /// Send one user turn and wait for the reply.
    pub fn send_message(&mut self, input: &str) {
        let Some(messages) = self.begin_turn(input) else {
            return;
        };
        let outcome = self.api.chat(&messages);
        self.finish_turn(outcome);
    }

    /// Forget the conversation and show the greeting again.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.entries.clear();
        self.entries
            .push(ChatEntry::new(EntryKind::Assistant, self.greeting.clone()));
        self.state = ChatState::Idle;
    }
}

fn failure_text(err: &ApiError) -> String {
    match err {
        ApiError::Status { status: 401, .. } => SESSION_EXPIRED.to_string(),
        ApiError::Status { status: 403, .. } => UNAUTHORIZED.to_string(),
        ApiError::Status { status, message } if *status >= 500 => message
            .clone()
            .unwrap_or_else(|| SERVICE_UNAVAILABLE.to_string()),
        ApiError::Status { message, .. } => {
            message.clone().unwrap_or_else(|| GENERIC_ERROR.to_string())
        }
        ApiError::Malformed(_) => GENERIC_ERROR.to_string(),
        ApiError::Transport(_) => CONNECT_ERROR.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
