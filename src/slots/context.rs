//! Per-slot render contexts.
//!
//! Each slot receives its own context type: an immutable snapshot of exactly
//! the data that region needs, assembled by the widget facade at render
//! time. Renderers never reach into shared state; anything a renderer may
//! trigger (send, toggle, stop) travels as a [`Callback`] handle inside the
//! context.

use std::fmt;
use std::sync::Arc;

use crate::message::{ActionExecutionStatus, Message, TextMessage};
use crate::render::RenderNode;

/// Cloneable handle around a host-supplied closure.
///
/// Contexts carry these instead of raw closures so they stay `Clone` and
/// `Debug`. Calling a callback is the only sanctioned way for a renderer's
/// output to cause a state change.
#[derive(Clone)]
pub struct Callback<T = ()> {
    inner: Arc<dyn Fn(T) + Send + Sync>,
}

impl<T> Callback<T> {
    /// Wrap a closure.
    pub fn new(f: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self { inner: Arc::new(f) }
    }

    /// A callback that does nothing. Used when the host wires no handler.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    /// Invoke the underlying closure.
    pub fn call(&self, value: T) {
        (self.inner)(value);
    }
}

impl<T> Default for Callback<T> {
    fn default() -> Self {
        Self::noop()
    }
}

impl<T> fmt::Debug for Callback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback")
    }
}

/// Context for the `Window` slot.
#[derive(Debug, Clone)]
pub struct WindowContext {
    /// Whether the widget is open.
    pub open: bool,
    /// Already-rendered children (header, messages, input, ...), in order.
    pub children: Vec<RenderNode>,
}

/// Context for the `Button` slot.
#[derive(Debug, Clone)]
pub struct ButtonContext {
    /// Whether the widget is open.
    pub open: bool,
    /// Toggles the open state.
    pub toggle: Callback,
}

/// Context for the `Header` slot.
#[derive(Debug, Clone)]
pub struct HeaderContext {
    /// Title displayed in the header.
    pub title: String,
    /// Closes the widget.
    pub close: Callback,
}

/// Context for the `Messages` slot.
#[derive(Debug, Clone)]
pub struct MessagesContext {
    /// The full ordered message sequence.
    pub messages: Vec<Message>,
    /// Whether a response is currently being produced.
    pub in_progress: bool,
}

/// Context for the `Input` slot.
#[derive(Debug, Clone)]
pub struct InputContext {
    /// Placeholder text for the input field.
    pub placeholder: String,
    /// Whether a response is currently being produced; inputs should be
    /// disabled while true.
    pub in_progress: bool,
    /// Sends the typed message.
    pub send: Callback<String>,
}

/// Context for the `ResponseButton` slot.
#[derive(Debug, Clone)]
pub struct ResponseButtonContext {
    /// Whether a response is currently being produced.
    pub in_progress: bool,
    /// Label for the stop control.
    pub stop_label: String,
    /// Label for the regenerate control.
    pub regenerate_label: String,
    /// Stops the in-flight response.
    pub stop: Callback,
    /// Regenerates the latest response.
    pub regenerate: Callback,
}

/// Context for the `TextMessageRender` slot.
#[derive(Debug, Clone)]
pub struct TextMessageContext {
    /// The message to render.
    pub message: TextMessage,
}

/// Context for the `ActionExecutionRender` slot.
#[derive(Debug, Clone)]
pub struct ActionExecutionContext {
    /// Id of the action execution message.
    pub id: String,
    /// Action name.
    pub name: String,
    /// Typed arguments.
    pub arguments: serde_json::Value,
    /// Current lifecycle status.
    pub status: ActionExecutionStatus,
    /// The result payload, once it has arrived.
    pub result: Option<serde_json::Value>,
}

/// Context for the `ResultMessageRender` slot.
#[derive(Debug, Clone)]
pub struct ResultMessageContext {
    /// Id of the result message.
    pub id: String,
    /// Id of the action execution this result settles.
    pub action_execution_id: String,
    /// Name of the executed action.
    pub action_name: String,
    /// Result value.
    pub result: serde_json::Value,
}

/// Context for the `AgentStateRender` slot.
#[derive(Debug, Clone)]
pub struct AgentStateContext {
    /// Name of the agent.
    pub agent_name: String,
    /// Node or step the agent is at.
    pub node_name: String,
    /// Whether the agent is still running.
    pub running: bool,
    /// Arbitrary state payload.
    pub state: serde_json::Value,
}
