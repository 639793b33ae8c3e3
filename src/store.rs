//! Chat state store.
//!
//! Holds the widget's conversational state: the append-only message
//! sequence, the open/closed flag, and the in-progress flag. Handles are
//! cheap clones sharing one inner record; renderers never see the store
//! directly; the widget facade takes a [`ChatSnapshot`] first and builds
//! contexts from that, so no lock is held across a renderer invocation.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::message::{
    ActionExecutionMessage, ActionExecutionStatus, AgentStateMessage, Message, ResultMessage,
    Role, TextMessage,
};

/// Errors from action status transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No action execution message with the given id exists.
    #[error("unknown action execution `{id}`")]
    UnknownActionExecution {
        /// The id as supplied.
        id: String,
    },

    /// The action execution already has a terminal status.
    #[error("action execution `{id}` is already settled")]
    ActionAlreadySettled {
        /// Id of the settled action.
        id: String,
    },
}

/// Shared chat state handle.
#[derive(Debug, Clone)]
pub struct ChatState {
    inner: Arc<ChatStateInner>,
}

#[derive(Debug)]
struct ChatStateInner {
    messages: RwLock<Vec<Message>>,
    open: RwLock<bool>,
    in_progress: RwLock<bool>,
    created_at: DateTime<Utc>,
}

/// Immutable copy of the chat state for one render pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSnapshot {
    /// Whether the widget is open.
    pub open: bool,
    /// Whether a response is currently being produced.
    pub in_progress: bool,
    /// The full ordered message sequence.
    pub messages: Vec<Message>,
    /// Creation time of the state, RFC3339.
    pub created_at: String,
}

impl Default for ChatState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatState {
    /// Create an empty, closed, idle chat state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ChatStateInner {
                messages: RwLock::new(Vec::new()),
                open: RwLock::new(false),
                in_progress: RwLock::new(false),
                created_at: Utc::now(),
            }),
        }
    }

    /// Rebuild a state handle from a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: ChatSnapshot) -> Self {
        let created_at = DateTime::parse_from_rfc3339(&snapshot.created_at)
            .map_or_else(|_| Utc::now(), |t| t.with_timezone(&Utc));
        Self {
            inner: Arc::new(ChatStateInner {
                messages: RwLock::new(snapshot.messages),
                open: RwLock::new(snapshot.open),
                in_progress: RwLock::new(snapshot.in_progress),
                created_at,
            }),
        }
    }

    /// Take an immutable copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> ChatSnapshot {
        ChatSnapshot {
            open: self.is_open(),
            in_progress: self.in_progress(),
            messages: self.messages(),
            created_at: self.inner.created_at.to_rfc3339(),
        }
    }

    /// Append a message to the sequence.
    pub fn add_message(&self, message: Message) {
        let mut guard = self.inner.messages.write().unwrap();
        guard.push(message);
    }

    /// Append a user text message.
    pub fn add_user_message(&self, content: impl Into<String>) {
        self.add_message(Message::Text(TextMessage::new(Role::User, content)));
    }

    /// Append an assistant text message.
    pub fn add_assistant_message(&self, content: impl Into<String>) {
        self.add_message(Message::Text(TextMessage::new(Role::Assistant, content)));
    }

    /// Append an in-progress action execution. Returns the new message's id,
    /// which the caller passes back to [`ChatState::complete_action`] or
    /// [`ChatState::fail_action`].
    pub fn begin_action(
        &self,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> String {
        let message = ActionExecutionMessage::new(name, arguments);
        let id = message.id.clone();
        debug!(action = %message.name, id = %id, "action execution started");
        self.add_message(Message::ActionExecution(message));
        id
    }

    /// Settle an action execution with its result: transitions the action
    /// message's status in place (same id, same position) and appends the
    /// result message at the tail.
    pub fn complete_action(
        &self,
        action_id: &str,
        result: serde_json::Value,
    ) -> Result<(), StoreError> {
        let mut guard = self.inner.messages.write().unwrap();
        let action_name = Self::transition(
            &mut guard,
            action_id,
            ActionExecutionStatus::Complete,
        )?;
        guard.push(Message::Result(ResultMessage::new(
            action_id, action_name, result,
        )));
        Ok(())
    }

    /// Mark an action execution as failed.
    pub fn fail_action(&self, action_id: &str) -> Result<(), StoreError> {
        let mut guard = self.inner.messages.write().unwrap();
        Self::transition(&mut guard, action_id, ActionExecutionStatus::Error)?;
        Ok(())
    }

    fn transition(
        messages: &mut [Message],
        action_id: &str,
        status: ActionExecutionStatus,
    ) -> Result<String, StoreError> {
        let action = messages
            .iter_mut()
            .find_map(|m| match m {
                Message::ActionExecution(a) if a.id == action_id => Some(a),
                _ => None,
            })
            .ok_or_else(|| StoreError::UnknownActionExecution {
                id: action_id.to_string(),
            })?;
        if action.status.is_settled() {
            return Err(StoreError::ActionAlreadySettled {
                id: action_id.to_string(),
            });
        }
        action.status = status;
        Ok(action.name.clone())
    }

    /// Append an agent state snapshot.
    pub fn add_agent_state(
        &self,
        agent_name: impl Into<String>,
        node_name: impl Into<String>,
        running: bool,
        state: serde_json::Value,
    ) {
        self.add_message(Message::AgentState(AgentStateMessage::new(
            agent_name, node_name, running, state,
        )));
    }

    /// Get all messages in order.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.inner.messages.read().unwrap().clone()
    }

    /// Number of messages.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.inner.messages.read().unwrap().len()
    }

    /// Remove all messages.
    pub fn clear(&self) {
        self.inner.messages.write().unwrap().clear();
    }

    /// Whether the widget is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        *self.inner.open.read().unwrap()
    }

    /// Open or close the widget.
    pub fn set_open(&self, open: bool) {
        *self.inner.open.write().unwrap() = open;
    }

    /// Flip the open state and return the new value.
    pub fn toggle_open(&self) -> bool {
        let mut guard = self.inner.open.write().unwrap();
        *guard = !*guard;
        *guard
    }

    /// Whether a response is being produced.
    #[must_use]
    pub fn in_progress(&self) -> bool {
        *self.inner.in_progress.read().unwrap()
    }

    /// Set the in-progress flag.
    pub fn set_in_progress(&self, in_progress: bool) {
        *self.inner.in_progress.write().unwrap() = in_progress;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let state = ChatState::new();
        state.add_user_message("one");
        state.add_assistant_message("two");
        state.add_user_message("three");

        let contents: Vec<String> = state
            .messages()
            .into_iter()
            .map(|m| match m {
                Message::Text(t) => t.content,
                other => panic!("unexpected variant: {other:?}"),
            })
            .collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_complete_action_transitions_in_place() {
        let state = ChatState::new();
        state.add_user_message("What's the weather?");
        let action_id = state.begin_action("get_weather", serde_json::json!({"city": "Oslo"}));
        state.add_assistant_message("Checking...");

        state
            .complete_action(&action_id, serde_json::json!({"temp_c": 14}))
            .unwrap();

        let messages = state.messages();
        assert_eq!(messages.len(), 4);
        // Same id, same position, new status.
        match &messages[1] {
            Message::ActionExecution(a) => {
                assert_eq!(a.id, action_id);
                assert_eq!(a.status, ActionExecutionStatus::Complete);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
        // Result appended at the tail, referencing the action.
        match &messages[3] {
            Message::Result(r) => {
                assert_eq!(r.action_execution_id, action_id);
                assert_eq!(r.action_name, "get_weather");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_action_rejected() {
        let state = ChatState::new();
        let err = state
            .complete_action("missing", serde_json::json!(null))
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::UnknownActionExecution {
                id: "missing".to_string()
            }
        );
    }

    #[test]
    fn test_settled_action_rejected() {
        let state = ChatState::new();
        let id = state.begin_action("lookup", serde_json::json!({}));
        state.complete_action(&id, serde_json::json!(1)).unwrap();

        let err = state.complete_action(&id, serde_json::json!(2)).unwrap_err();
        assert_eq!(err, StoreError::ActionAlreadySettled { id });
    }

    #[test]
    fn test_fail_action() {
        let state = ChatState::new();
        let id = state.begin_action("lookup", serde_json::json!({}));
        state.fail_action(&id).unwrap();

        match &state.messages()[0] {
            Message::ActionExecution(a) => assert_eq!(a.status, ActionExecutionStatus::Error),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_open_and_progress_flags() {
        let state = ChatState::new();
        assert!(!state.is_open());
        assert!(state.toggle_open());
        assert!(!state.toggle_open());

        state.set_in_progress(true);
        assert!(state.in_progress());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let state = ChatState::new();
        state.add_user_message("hello");
        state.set_open(true);

        let json = serde_json::to_string(&state.snapshot()).unwrap();
        let snapshot: ChatSnapshot = serde_json::from_str(&json).unwrap();
        let restored = ChatState::from_snapshot(snapshot);

        assert!(restored.is_open());
        assert_eq!(restored.message_count(), 1);
    }
}
