//! Conversation message types.
//!
//! This module defines the tagged union of messages a chat widget renders:
//! plain text, an action execution (the model invoking an application-defined
//! function), the result of that execution, and agent state snapshots from an
//! external autonomous process.
//!
//! Messages are appended to the conversation in order and never reordered.
//! The only in-place mutation permitted anywhere in the crate is the
//! [`ActionExecutionMessage`] status transition performed by the store when
//! the matching result arrives.
//!
//! # Example
//!
//! ```rust
//! use chat_slots::message::{Message, Role, TextMessage};
//!
//! let msg = Message::Text(TextMessage::new(Role::User, "Hello"));
//! let json = serde_json::to_string(&msg).unwrap();
//! assert!(json.contains("\"type\":\"text\""));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The embedding application's end user.
    User,
    /// The assistant.
    Assistant,
    /// System-injected content.
    System,
}

/// Lifecycle status of an action execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionExecutionStatus {
    /// The action has been invoked and its result is pending.
    InProgress,
    /// The action finished and its result message is in the sequence.
    Complete,
    /// The action failed.
    Error,
}

impl ActionExecutionStatus {
    /// Whether the status can no longer change.
    #[must_use]
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }
}

/// A message in the conversation.
///
/// Serialized with an internal `type` tag so clients can dispatch on the
/// variant without knowing the Rust enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// Plain text from a user, the assistant, or the system.
    Text(TextMessage),
    /// The assistant invoking an application-defined action.
    ActionExecution(ActionExecutionMessage),
    /// The outcome of a previously invoked action.
    Result(ResultMessage),
    /// A state snapshot from an external agent process.
    AgentState(AgentStateMessage),
}

impl Message {
    /// Unique identifier of the message, regardless of variant.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Text(m) => &m.id,
            Self::ActionExecution(m) => &m.id,
            Self::Result(m) => &m.id,
            Self::AgentState(m) => &m.id,
        }
    }

    /// Creation time of the message.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Self::Text(m) => m.created_at,
            Self::ActionExecution(m) => m.created_at,
            Self::Result(m) => m.created_at,
            Self::AgentState(m) => m.created_at,
        }
    }
}

/// Plain text message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextMessage {
    /// Unique message identifier.
    pub id: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Message origin.
    pub role: Role,
    /// Text content. Rendering of rich text is the host's concern.
    pub content: String,
}

impl TextMessage {
    /// Create a text message with a fresh id.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            role,
            content: content.into(),
        }
    }
}

/// The assistant invoking an application-defined action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionExecutionMessage {
    /// Unique message identifier. Result messages reference it.
    pub id: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Action name as registered by the application.
    pub name: String,
    /// Typed arguments as supplied by the model.
    pub arguments: serde_json::Value,
    /// Lifecycle status, transitioned in place when the result arrives.
    pub status: ActionExecutionStatus,
}

impl ActionExecutionMessage {
    /// Create an in-progress action execution with a fresh id.
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            name: name.into(),
            arguments,
            status: ActionExecutionStatus::InProgress,
        }
    }
}

/// The outcome of an action execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMessage {
    /// Unique message identifier.
    pub id: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Id of the [`ActionExecutionMessage`] this result settles.
    pub action_execution_id: String,
    /// Name of the executed action.
    pub action_name: String,
    /// Result value.
    pub result: serde_json::Value,
}

impl ResultMessage {
    /// Create a result message with a fresh id.
    pub fn new(
        action_execution_id: impl Into<String>,
        action_name: impl Into<String>,
        result: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            action_execution_id: action_execution_id.into(),
            action_name: action_name.into(),
            result,
        }
    }
}

/// A state snapshot from an external agent process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStateMessage {
    /// Unique message identifier.
    pub id: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Name of the agent.
    pub agent_name: String,
    /// Node or step the agent is currently at.
    pub node_name: String,
    /// Whether the agent is still running.
    pub running: bool,
    /// Arbitrary state payload.
    pub state: serde_json::Value,
}

impl AgentStateMessage {
    /// Create an agent state message with a fresh id.
    pub fn new(
        agent_name: impl Into<String>,
        node_name: impl Into<String>,
        running: bool,
        state: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            agent_name: agent_name.into(),
            node_name: node_name.into(),
            running,
            state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_message_serialization() {
        let msg = Message::Text(TextMessage::new(Role::Assistant, "Hi there"));
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"text\""));
        assert!(json.contains("\"role\":\"assistant\""));
        assert!(json.contains("Hi there"));
    }

    #[test]
    fn test_action_execution_status_serialization() {
        let msg = ActionExecutionMessage::new("get_weather", serde_json::json!({"city": "Oslo"}));
        let json = serde_json::to_string(&Message::ActionExecution(msg)).unwrap();
        assert!(json.contains("\"type\":\"action_execution\""));
        assert!(json.contains("\"status\":\"inProgress\""));
    }

    #[test]
    fn test_round_trip() {
        let msg = Message::AgentState(AgentStateMessage::new(
            "research-agent",
            "gather_sources",
            true,
            serde_json::json!({"sources": 3}),
        ));
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_status_settled() {
        assert!(!ActionExecutionStatus::InProgress.is_settled());
        assert!(ActionExecutionStatus::Complete.is_settled());
        assert!(ActionExecutionStatus::Error.is_settled());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = TextMessage::new(Role::User, "a");
        let b = TextMessage::new(Role::User, "a");
        assert_ne!(a.id, b.id);
    }
}
