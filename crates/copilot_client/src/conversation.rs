//! Conversation state: ordered messages, in-flight flag and the last error banner.
//!
//! A submission goes `begin` → backend call → `settle`. `settle` always appends
//! exactly one assistant message, either the answer or an echo of the error.

use crate::client::{ApiClient, ClientError};
use crate::messages::{Mode, RequestResult};
use crate::render::{render_blocks, Block};

pub const GREETING: &str =
    "Hello! I’m your AI Copilot. Choose a mode and tell me how I can help.";

/// Shown when the backend succeeded without any content.
pub const NO_CONTENT: &str = "(No content returned)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One conversation turn. Never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn blocks(&self) -> Vec<Block> {
        render_blocks(&self.content)
    }
}

/// What the user sent: mode, text and, for debug, optional error output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    mode: Mode,
    text: String,
    error_context: Option<String>,
}

impl Submission {
    pub fn new(mode: Mode, text: impl Into<String>) -> Self {
        Self {
            mode,
            text: text.into(),
            error_context: None,
        }
    }

    pub fn with_error_context(mut self, error: impl Into<String>) -> Self {
        let error = error.into();
        self.error_context = (!error.trim().is_empty()).then_some(error);
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn error_context(&self) -> Option<&str> {
        self.error_context.as_deref()
    }
}

/// Assistant turn echoing a failure as a code block.
pub fn error_echo(message: &str) -> String {
    format!(
        "Sorry, I couldn't process that request.\n\n```\n{}\n```",
        message
    )
}

pub struct Conversation {
    client: ApiClient,
    messages: Vec<Message>,
    sending: bool,
    error: Option<String>,
}

impl Conversation {
    /// New conversation seeded with the assistant greeting.
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            messages: vec![Message::assistant(GREETING)],
            sending: false,
            error: None,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    /// Text for the error banner, from the most recent failed submission.
    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Start a submission: clears the banner, marks the request in flight and
    /// appends the user message. Blank text or a request already in flight is
    /// ignored and returns `false`.
    pub fn begin(&mut self, submission: &Submission) -> bool {
        if self.sending || submission.text().trim().is_empty() {
            return false;
        }
        self.error = None;
        self.sending = true;
        self.messages.push(Message::user(submission.text()));
        tracing::debug!(mode = %submission.mode(), "submission started");
        true
    }

    /// Finish the in-flight submission with its outcome and return the assistant
    /// message that was appended.
    pub fn settle(&mut self, outcome: Result<RequestResult, ClientError>) -> &Message {
        let reply = match outcome {
            Ok(result) => {
                let content = result
                    .content
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| NO_CONTENT.to_string());
                Message::assistant(content)
            }
            Err(e) => {
                let text = e.to_string();
                tracing::warn!(kind = ?e.kind(), error = %text, "submission failed");
                let reply = Message::assistant(error_echo(&text));
                self.error = Some(text);
                reply
            }
        };
        self.sending = false;
        self.messages.push(reply);
        &self.messages[self.messages.len() - 1]
    }

    /// Run one submission end to end. Returns the assistant reply, or `None` if
    /// the submission was ignored.
    pub async fn submit(&mut self, submission: Submission) -> Option<&Message> {
        if !self.begin(&submission) {
            return None;
        }
        let outcome = self.client.dispatch(&submission).await;
        Some(self.settle(outcome))
    }
}
