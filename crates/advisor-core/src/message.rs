//! Conversation Messages
//!
//! Chat message format shared by every advisory prompt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a message sender
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System prompt/instructions
    System,
    /// User input
    User,
    /// Assistant (LLM) response
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message in a conversation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,

    pub content: String,

    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Conversation history
///
/// The system prompt is kept apart from the turn history so it can be
/// rebuilt on every request with fresh portfolio context.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// The most recent `n` messages, oldest first
    pub fn recent(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    /// System prompt followed by the trailing `window` messages
    pub fn windowed(&self, system: impl Into<String>, window: usize) -> Vec<Message> {
        let mut out = Vec::with_capacity(window + 1);
        out.push(Message::system(system));
        out.extend(self.recent(window).iter().cloned());
        out
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello");
    }

    #[test]
    fn recent_window_keeps_newest() {
        let mut conv = Conversation::new();
        for i in 0..10 {
            conv.push(Message::user(format!("q{i}")));
        }

        let window = conv.recent(6);
        assert_eq!(window.len(), 6);
        assert_eq!(window[0].content, "q4");
        assert_eq!(window[5].content, "q9");
        assert_eq!(conv.recent(50).len(), 10);
    }

    #[test]
    fn windowed_prompt_leads_with_system() {
        let mut conv = Conversation::new();
        for i in 0..4 {
            conv.push(Message::user(format!("q{i}")));
            conv.push(Message::assistant(format!("a{i}")));
        }

        let prompt = conv.windowed("You are an ETF advisor.", 6);
        assert_eq!(prompt.len(), 7);
        assert_eq!(prompt[0].role, Role::System);
        assert_eq!(prompt[1].content, "q1");
        assert_eq!(prompt[6].content, "a3");
    }
}
