//! Rendering slots.
//!
//! A *slot* is a named, replaceable region of the widget's visual output.
//! Each slot has a built-in default renderer; the embedding application may
//! supply an override with the same signature at construction time. The
//! [`SlotRegistry`] resolves each slot to exactly one active renderer and
//! invokes it with that slot's context.
//!
//! # Structure
//!
//! - [`context`]: per-slot context types and the [`Callback`] handle
//! - [`registry`]: override table and the registry itself
//! - `defaults`: built-in renderers

pub mod context;
mod defaults;
pub mod registry;

pub use context::{
    ActionExecutionContext, AgentStateContext, ButtonContext, Callback, HeaderContext,
    InputContext, MessagesContext, ResponseButtonContext, ResultMessageContext,
    TextMessageContext, WindowContext,
};
pub use registry::{
    RenderFn, RendererErrorPolicy, RendererOrigin, SlotOverrides, SlotRegistry, SlotRenderer,
};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The fixed set of slot names.
///
/// Every widget instance has exactly these slots; there is no runtime
/// registration of new ones. The four `*Render` names are the per-variant
/// message renderers the message list dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SlotName {
    /// Container wrapping the open widget.
    Window,
    /// Floating trigger button that opens and closes the widget.
    Button,
    /// Title bar of the open widget.
    Header,
    /// The message list.
    Messages,
    /// The message input area.
    Input,
    /// Stop/regenerate control shown with the latest response.
    ResponseButton,
    /// Renderer for text messages.
    TextMessageRender,
    /// Renderer for action execution messages.
    ActionExecutionRender,
    /// Renderer for action result messages.
    ResultMessageRender,
    /// Renderer for agent state messages.
    AgentStateRender,
}

impl SlotName {
    /// All slot names, in composition order.
    pub const ALL: [SlotName; 10] = [
        Self::Window,
        Self::Button,
        Self::Header,
        Self::Messages,
        Self::Input,
        Self::ResponseButton,
        Self::TextMessageRender,
        Self::ActionExecutionRender,
        Self::ResultMessageRender,
        Self::AgentStateRender,
    ];

    /// The canonical string form, as accepted by [`FromStr`].
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Window => "Window",
            Self::Button => "Button",
            Self::Header => "Header",
            Self::Messages => "Messages",
            Self::Input => "Input",
            Self::ResponseButton => "ResponseButton",
            Self::TextMessageRender => "TextMessageRender",
            Self::ActionExecutionRender => "ActionExecutionRender",
            Self::ResultMessageRender => "ResultMessageRender",
            Self::AgentStateRender => "AgentStateRender",
        }
    }
}

impl fmt::Display for SlotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotName {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ConfigurationError::UnknownSlot {
                name: s.to_string(),
            })
    }
}

/// Errors surfaced while assembling the override table or constructing the
/// registry. Always raised at construction time, never deferred to render.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// An override named a slot outside the fixed set.
    #[error("unknown slot name `{name}`")]
    UnknownSlot {
        /// The name as supplied.
        name: String,
    },

    /// A renderer tagged for one slot was registered under another name.
    #[error("renderer for slot `{supplied}` registered under `{expected}`")]
    RendererMismatch {
        /// The slot the entry was registered under.
        expected: SlotName,
        /// The slot the renderer is actually for.
        supplied: SlotName,
    },
}

/// Errors surfaced while invoking a renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The active renderer returned an error. Never swallowed by the
    /// registry; with [`RendererErrorPolicy::FallbackToDefault`] a faulting
    /// override is retried once with the built-in default before this is
    /// returned.
    #[error("renderer for slot `{slot}` failed: {source}")]
    Renderer {
        /// The slot whose renderer faulted.
        slot: SlotName,
        /// The renderer's own error.
        #[source]
        source: anyhow::Error,
    },

    /// The context lacked information the slot requires.
    #[error("missing context for slot `{slot}`: {detail}")]
    MissingContext {
        /// The slot being rendered.
        slot: SlotName,
        /// What was missing.
        detail: String,
    },
}
