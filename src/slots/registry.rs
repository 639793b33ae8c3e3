//! Slot registry: override table, resolution, and invocation.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use super::context::{
    ActionExecutionContext, AgentStateContext, ButtonContext, HeaderContext, InputContext,
    MessagesContext, ResponseButtonContext, ResultMessageContext, TextMessageContext,
    WindowContext,
};
use super::{ConfigurationError, RenderError, SlotName, defaults};
use crate::render::RenderNode;

/// A renderer for a slot with context type `C`.
///
/// Renderers are pure with respect to the registry: they read the context
/// and return output. They may fail with any error; how a failure surfaces
/// is governed by [`RendererErrorPolicy`].
pub type RenderFn<C> = Arc<dyn Fn(&C) -> anyhow::Result<RenderNode> + Send + Sync>;

/// A renderer bound to its slot and the registry's error policy.
pub(crate) type BoundRenderFn<C> =
    Arc<dyn Fn(&C) -> Result<RenderNode, RenderError> + Send + Sync>;

/// A renderer tagged with the slot it is for.
///
/// Entries in the override table carry their slot in the type, so a renderer
/// can never be invoked with another slot's context.
#[derive(Clone)]
pub enum SlotRenderer {
    /// Renderer for the `Window` slot.
    Window(RenderFn<WindowContext>),
    /// Renderer for the `Button` slot.
    Button(RenderFn<ButtonContext>),
    /// Renderer for the `Header` slot.
    Header(RenderFn<HeaderContext>),
    /// Renderer for the `Messages` slot.
    Messages(RenderFn<MessagesContext>),
    /// Renderer for the `Input` slot.
    Input(RenderFn<InputContext>),
    /// Renderer for the `ResponseButton` slot.
    ResponseButton(RenderFn<ResponseButtonContext>),
    /// Renderer for the `TextMessageRender` slot.
    TextMessage(RenderFn<TextMessageContext>),
    /// Renderer for the `ActionExecutionRender` slot.
    ActionExecution(RenderFn<ActionExecutionContext>),
    /// Renderer for the `ResultMessageRender` slot.
    ResultMessage(RenderFn<ResultMessageContext>),
    /// Renderer for the `AgentStateRender` slot.
    AgentState(RenderFn<AgentStateContext>),
}

impl SlotRenderer {
    /// The slot this renderer is for.
    #[must_use]
    pub fn slot(&self) -> SlotName {
        match self {
            Self::Window(_) => SlotName::Window,
            Self::Button(_) => SlotName::Button,
            Self::Header(_) => SlotName::Header,
            Self::Messages(_) => SlotName::Messages,
            Self::Input(_) => SlotName::Input,
            Self::ResponseButton(_) => SlotName::ResponseButton,
            Self::TextMessage(_) => SlotName::TextMessageRender,
            Self::ActionExecution(_) => SlotName::ActionExecutionRender,
            Self::ResultMessage(_) => SlotName::ResultMessageRender,
            Self::AgentState(_) => SlotName::AgentStateRender,
        }
    }
}

impl fmt::Debug for SlotRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SlotRenderer").field(&self.slot()).finish()
    }
}

/// What happens when a renderer returns an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererErrorPolicy {
    /// Surface the error to the caller.
    #[default]
    Propagate,
    /// If the faulting renderer is an override, log a warning and render the
    /// slot's built-in default instead. Default-renderer failures still
    /// propagate.
    FallbackToDefault,
}

/// Whether a slot's active renderer is the built-in default or an override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererOrigin {
    /// The built-in default renderer is active.
    Default,
    /// A caller-supplied override is active.
    Override,
}

/// Caller-supplied renderer overrides, keyed by slot.
///
/// Built either with the typed setters (slot/renderer agreement is checked
/// by the compiler) or with [`SlotOverrides::insert_named`] when slot names
/// arrive as strings from declarative configuration.
#[derive(Default)]
pub struct SlotOverrides {
    entries: BTreeMap<SlotName, SlotRenderer>,
}

impl SlotOverrides {
    /// An empty override table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the `Window` slot.
    #[must_use]
    pub fn window<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&WindowContext) -> anyhow::Result<RenderNode> + Send + Sync + 'static,
    {
        self.insert(SlotRenderer::Window(Arc::new(renderer)));
        self
    }

    /// Override the `Button` slot.
    #[must_use]
    pub fn button<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&ButtonContext) -> anyhow::Result<RenderNode> + Send + Sync + 'static,
    {
        self.insert(SlotRenderer::Button(Arc::new(renderer)));
        self
    }

    /// Override the `Header` slot.
    #[must_use]
    pub fn header<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&HeaderContext) -> anyhow::Result<RenderNode> + Send + Sync + 'static,
    {
        self.insert(SlotRenderer::Header(Arc::new(renderer)));
        self
    }

    /// Override the `Messages` slot. Replacing it takes over per-variant
    /// dispatch entirely; the four `*Render` slots are only consulted by the
    /// default.
    #[must_use]
    pub fn messages<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&MessagesContext) -> anyhow::Result<RenderNode> + Send + Sync + 'static,
    {
        self.insert(SlotRenderer::Messages(Arc::new(renderer)));
        self
    }

    /// Override the `Input` slot.
    #[must_use]
    pub fn input<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&InputContext) -> anyhow::Result<RenderNode> + Send + Sync + 'static,
    {
        self.insert(SlotRenderer::Input(Arc::new(renderer)));
        self
    }

    /// Override the `ResponseButton` slot.
    #[must_use]
    pub fn response_button<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&ResponseButtonContext) -> anyhow::Result<RenderNode> + Send + Sync + 'static,
    {
        self.insert(SlotRenderer::ResponseButton(Arc::new(renderer)));
        self
    }

    /// Override the `TextMessageRender` slot.
    #[must_use]
    pub fn text_message<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&TextMessageContext) -> anyhow::Result<RenderNode> + Send + Sync + 'static,
    {
        self.insert(SlotRenderer::TextMessage(Arc::new(renderer)));
        self
    }

    /// Override the `ActionExecutionRender` slot.
    #[must_use]
    pub fn action_execution<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&ActionExecutionContext) -> anyhow::Result<RenderNode> + Send + Sync + 'static,
    {
        self.insert(SlotRenderer::ActionExecution(Arc::new(renderer)));
        self
    }

    /// Override the `ResultMessageRender` slot.
    #[must_use]
    pub fn result_message<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&ResultMessageContext) -> anyhow::Result<RenderNode> + Send + Sync + 'static,
    {
        self.insert(SlotRenderer::ResultMessage(Arc::new(renderer)));
        self
    }

    /// Override the `AgentStateRender` slot.
    #[must_use]
    pub fn agent_state<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&AgentStateContext) -> anyhow::Result<RenderNode> + Send + Sync + 'static,
    {
        self.insert(SlotRenderer::AgentState(Arc::new(renderer)));
        self
    }

    /// Register a tagged renderer under its own slot. Later registrations
    /// for the same slot replace earlier ones.
    pub fn insert(&mut self, renderer: SlotRenderer) {
        self.entries.insert(renderer.slot(), renderer);
    }

    /// Register a tagged renderer under a slot name supplied as a string.
    ///
    /// Fails with [`ConfigurationError::UnknownSlot`] when the name is
    /// outside the fixed set, and with
    /// [`ConfigurationError::RendererMismatch`] when the renderer is tagged
    /// for a different slot than the name says.
    pub fn insert_named(
        &mut self,
        name: &str,
        renderer: SlotRenderer,
    ) -> Result<(), ConfigurationError> {
        let slot: SlotName = name.parse()?;
        if slot != renderer.slot() {
            return Err(ConfigurationError::RendererMismatch {
                expected: slot,
                supplied: renderer.slot(),
            });
        }
        self.entries.insert(slot, renderer);
        Ok(())
    }

    /// Whether an override is registered for the slot.
    #[must_use]
    pub fn contains(&self, slot: SlotName) -> bool {
        self.entries.contains_key(&slot)
    }

    /// Number of registered overrides.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no overrides are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for SlotOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotOverrides")
            .field("slots", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// One slot's resolved binding: the default, the active renderer, and where
/// the active one came from. Immutable after construction.
pub(crate) struct Slot<C> {
    name: SlotName,
    default: RenderFn<C>,
    active: RenderFn<C>,
    origin: RendererOrigin,
}

impl<C> Clone for Slot<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            default: Arc::clone(&self.default),
            active: Arc::clone(&self.active),
            origin: self.origin,
        }
    }
}

impl<C> fmt::Debug for Slot<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("name", &self.name)
            .field("origin", &self.origin)
            .finish()
    }
}

impl<C> Slot<C> {
    fn resolve(name: SlotName, default: RenderFn<C>, supplied: Option<RenderFn<C>>) -> Self {
        match supplied {
            Some(renderer) => Self {
                name,
                default,
                active: renderer,
                origin: RendererOrigin::Override,
            },
            None => Self {
                name,
                active: Arc::clone(&default),
                default,
                origin: RendererOrigin::Default,
            },
        }
    }

    fn invoke(&self, ctx: &C, policy: RendererErrorPolicy) -> Result<RenderNode, RenderError> {
        match (self.active)(ctx) {
            Ok(node) => Ok(node),
            Err(source) => {
                if self.origin == RendererOrigin::Override
                    && policy == RendererErrorPolicy::FallbackToDefault
                {
                    warn!(
                        slot = %self.name,
                        error = %source,
                        "override renderer failed, rendering built-in default"
                    );
                    (self.default)(ctx).map_err(|e| as_render_error(self.name, e))
                } else {
                    Err(as_render_error(self.name, source))
                }
            }
        }
    }

    fn bind(&self, policy: RendererErrorPolicy) -> BoundRenderFn<C>
    where
        C: 'static,
    {
        let slot = self.clone();
        Arc::new(move |ctx| slot.invoke(ctx, policy))
    }
}

/// Preserve nested [`RenderError`]s (a variant renderer failing inside the
/// message list keeps its own slot name) instead of re-wrapping them.
fn as_render_error(slot: SlotName, source: anyhow::Error) -> RenderError {
    match source.downcast::<RenderError>() {
        Ok(inner) => inner,
        Err(source) => RenderError::Renderer { slot, source },
    }
}

/// Maps each slot to exactly one active renderer.
///
/// Resolution happens once, here, at construction: override if supplied,
/// built-in default otherwise. After that the registry is immutable: one
/// writer at construction, any number of readers at render time, so render
/// paths take no locks.
pub struct SlotRegistry {
    window: Slot<WindowContext>,
    button: Slot<ButtonContext>,
    header: Slot<HeaderContext>,
    messages: Slot<MessagesContext>,
    input: Slot<InputContext>,
    response_button: Slot<ResponseButtonContext>,
    text_message: Slot<TextMessageContext>,
    action_execution: Slot<ActionExecutionContext>,
    result_message: Slot<ResultMessageContext>,
    agent_state: Slot<AgentStateContext>,
    error_policy: RendererErrorPolicy,
}

impl SlotRegistry {
    /// Build a registry with the default error policy
    /// ([`RendererErrorPolicy::Propagate`]).
    pub fn new(overrides: SlotOverrides) -> Result<Self, ConfigurationError> {
        Self::with_policy(overrides, RendererErrorPolicy::default())
    }

    /// Build a registry with an explicit error policy.
    pub fn with_policy(
        overrides: SlotOverrides,
        error_policy: RendererErrorPolicy,
    ) -> Result<Self, ConfigurationError> {
        let mut entries = overrides.entries;
        let override_count = entries.len();

        macro_rules! bind {
            ($name:expr, $variant:ident, $default:expr) => {
                match entries.remove(&$name) {
                    None => Slot::resolve($name, $default, None),
                    Some(SlotRenderer::$variant(f)) => Slot::resolve($name, $default, Some(f)),
                    Some(other) => {
                        return Err(ConfigurationError::RendererMismatch {
                            expected: $name,
                            supplied: other.slot(),
                        });
                    }
                }
            };
        }

        let window = bind!(SlotName::Window, Window, defaults::window());
        let button = bind!(SlotName::Button, Button, defaults::button());
        let header = bind!(SlotName::Header, Header, defaults::header());
        let input = bind!(SlotName::Input, Input, defaults::input());
        let response_button = bind!(
            SlotName::ResponseButton,
            ResponseButton,
            defaults::response_button()
        );
        let text_message = bind!(
            SlotName::TextMessageRender,
            TextMessage,
            defaults::text_message()
        );
        let action_execution = bind!(
            SlotName::ActionExecutionRender,
            ActionExecution,
            defaults::action_execution()
        );
        let result_message = bind!(
            SlotName::ResultMessageRender,
            ResultMessage,
            defaults::result_message()
        );
        let agent_state = bind!(
            SlotName::AgentStateRender,
            AgentState,
            defaults::agent_state()
        );

        // The Messages default dispatches per-variant through the bindings
        // resolved above, so variant overrides flow through it.
        let messages_default = defaults::messages(
            text_message.bind(error_policy),
            action_execution.bind(error_policy),
            result_message.bind(error_policy),
            agent_state.bind(error_policy),
        );
        let messages = bind!(SlotName::Messages, Messages, messages_default);

        debug!(overrides = override_count, "slot registry constructed");

        Ok(Self {
            window,
            button,
            header,
            messages,
            input,
            response_button,
            text_message,
            action_execution,
            result_message,
            agent_state,
            error_policy,
        })
    }

    /// Where the active renderer for a slot came from.
    #[must_use]
    pub fn origin(&self, slot: SlotName) -> RendererOrigin {
        match slot {
            SlotName::Window => self.window.origin,
            SlotName::Button => self.button.origin,
            SlotName::Header => self.header.origin,
            SlotName::Messages => self.messages.origin,
            SlotName::Input => self.input.origin,
            SlotName::ResponseButton => self.response_button.origin,
            SlotName::TextMessageRender => self.text_message.origin,
            SlotName::ActionExecutionRender => self.action_execution.origin,
            SlotName::ResultMessageRender => self.result_message.origin,
            SlotName::AgentStateRender => self.agent_state.origin,
        }
    }

    /// The configured error policy.
    #[must_use]
    pub fn error_policy(&self) -> RendererErrorPolicy {
        self.error_policy
    }

    /// The active `Window` renderer.
    #[must_use]
    pub fn window_renderer(&self) -> RenderFn<WindowContext> {
        Arc::clone(&self.window.active)
    }

    /// The active `Button` renderer.
    #[must_use]
    pub fn button_renderer(&self) -> RenderFn<ButtonContext> {
        Arc::clone(&self.button.active)
    }

    /// The active `Header` renderer.
    #[must_use]
    pub fn header_renderer(&self) -> RenderFn<HeaderContext> {
        Arc::clone(&self.header.active)
    }

    /// The active `Messages` renderer.
    #[must_use]
    pub fn messages_renderer(&self) -> RenderFn<MessagesContext> {
        Arc::clone(&self.messages.active)
    }

    /// The active `Input` renderer.
    #[must_use]
    pub fn input_renderer(&self) -> RenderFn<InputContext> {
        Arc::clone(&self.input.active)
    }

    /// The active `ResponseButton` renderer.
    #[must_use]
    pub fn response_button_renderer(&self) -> RenderFn<ResponseButtonContext> {
        Arc::clone(&self.response_button.active)
    }

    /// The active `TextMessageRender` renderer.
    #[must_use]
    pub fn text_message_renderer(&self) -> RenderFn<TextMessageContext> {
        Arc::clone(&self.text_message.active)
    }

    /// The active `ActionExecutionRender` renderer.
    #[must_use]
    pub fn action_execution_renderer(&self) -> RenderFn<ActionExecutionContext> {
        Arc::clone(&self.action_execution.active)
    }

    /// The active `ResultMessageRender` renderer.
    #[must_use]
    pub fn result_message_renderer(&self) -> RenderFn<ResultMessageContext> {
        Arc::clone(&self.result_message.active)
    }

    /// The active `AgentStateRender` renderer.
    #[must_use]
    pub fn agent_state_renderer(&self) -> RenderFn<AgentStateContext> {
        Arc::clone(&self.agent_state.active)
    }

    /// Render the `Window` slot.
    pub fn render_window(&self, ctx: &WindowContext) -> Result<RenderNode, RenderError> {
        self.window.invoke(ctx, self.error_policy)
    }

    /// Render the `Button` slot.
    pub fn render_button(&self, ctx: &ButtonContext) -> Result<RenderNode, RenderError> {
        self.button.invoke(ctx, self.error_policy)
    }

    /// Render the `Header` slot.
    pub fn render_header(&self, ctx: &HeaderContext) -> Result<RenderNode, RenderError> {
        self.header.invoke(ctx, self.error_policy)
    }

    /// Render the `Messages` slot.
    pub fn render_messages(&self, ctx: &MessagesContext) -> Result<RenderNode, RenderError> {
        self.messages.invoke(ctx, self.error_policy)
    }

    /// Render the `Input` slot.
    pub fn render_input(&self, ctx: &InputContext) -> Result<RenderNode, RenderError> {
        self.input.invoke(ctx, self.error_policy)
    }

    /// Render the `ResponseButton` slot.
    pub fn render_response_button(
        &self,
        ctx: &ResponseButtonContext,
    ) -> Result<RenderNode, RenderError> {
        self.response_button.invoke(ctx, self.error_policy)
    }

    /// Render the `TextMessageRender` slot.
    pub fn render_text_message(&self, ctx: &TextMessageContext) -> Result<RenderNode, RenderError> {
        self.text_message.invoke(ctx, self.error_policy)
    }

    /// Render the `ActionExecutionRender` slot.
    pub fn render_action_execution(
        &self,
        ctx: &ActionExecutionContext,
    ) -> Result<RenderNode, RenderError> {
        self.action_execution.invoke(ctx, self.error_policy)
    }

    /// Render the `ResultMessageRender` slot.
    pub fn render_result_message(
        &self,
        ctx: &ResultMessageContext,
    ) -> Result<RenderNode, RenderError> {
        self.result_message.invoke(ctx, self.error_policy)
    }

    /// Render the `AgentStateRender` slot.
    pub fn render_agent_state(&self, ctx: &AgentStateContext) -> Result<RenderNode, RenderError> {
        self.agent_state.invoke(ctx, self.error_policy)
    }
}

impl fmt::Debug for SlotRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let overridden = SlotName::ALL
            .into_iter()
            .filter(|slot| self.origin(*slot) == RendererOrigin::Override)
            .collect::<Vec<_>>();
        f.debug_struct("SlotRegistry")
            .field("overridden", &overridden)
            .field("error_policy", &self.error_policy)
            .finish()
    }
}
