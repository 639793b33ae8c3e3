//! Widget facade.
//!
//! Ties the pieces together: declarative options, the slot registry, the
//! chat state, and the host's interaction handlers. One [`ChatWidget`] is
//! one embedded widget instance; `render` produces the full widget tree for
//! the current state.

use tracing::debug;

use crate::config::WidgetOptions;
use crate::render::RenderNode;
use crate::slots::{
    ButtonContext, Callback, ConfigurationError, HeaderContext, InputContext, MessagesContext,
    RenderError, ResponseButtonContext, SlotOverrides, SlotRegistry, WindowContext,
};
use crate::store::ChatState;

/// Host-supplied interaction handlers.
///
/// All default to no-ops so a render-only embedding works without wiring
/// anything.
#[derive(Debug, Clone, Default)]
pub struct WidgetHandlers {
    /// Toggles the widget open/closed (trigger button).
    pub toggle: Callback,
    /// Closes the widget (header).
    pub close: Callback,
    /// Sends the typed message (input).
    pub send: Callback<String>,
    /// Stops the in-flight response (response button).
    pub stop: Callback,
    /// Regenerates the latest response (response button).
    pub regenerate: Callback,
}

/// An embedded chat widget instance.
#[derive(Debug)]
pub struct ChatWidget {
    options: WidgetOptions,
    registry: SlotRegistry,
    state: ChatState,
    handlers: WidgetHandlers,
}

impl ChatWidget {
    /// Build a widget from options and renderer overrides.
    ///
    /// Fails fast on configuration errors; nothing is deferred to the first
    /// render. The options' error policy is installed into the registry.
    pub fn new(
        options: WidgetOptions,
        overrides: SlotOverrides,
    ) -> Result<Self, ConfigurationError> {
        let registry = SlotRegistry::with_policy(overrides, options.behavior.error_policy)?;
        let state = ChatState::new();
        if options.behavior.initially_open {
            state.set_open(true);
        }
        Ok(Self {
            options,
            registry,
            state,
            handlers: WidgetHandlers::default(),
        })
    }

    /// Build a widget with all defaults.
    pub fn with_defaults() -> Result<Self, ConfigurationError> {
        Self::new(WidgetOptions::default(), SlotOverrides::new())
    }

    /// Install interaction handlers.
    #[must_use]
    pub fn with_handlers(mut self, handlers: WidgetHandlers) -> Self {
        self.handlers = handlers;
        self
    }

    /// The widget's chat state handle.
    #[must_use]
    pub fn state(&self) -> &ChatState {
        &self.state
    }

    /// The resolved slot registry.
    #[must_use]
    pub fn registry(&self) -> &SlotRegistry {
        &self.registry
    }

    /// The widget's options.
    #[must_use]
    pub fn options(&self) -> &WidgetOptions {
        &self.options
    }

    /// The installed interaction handlers.
    #[must_use]
    pub fn handlers(&self) -> &WidgetHandlers {
        &self.handlers
    }

    /// Render the whole widget for the current state.
    ///
    /// The trigger button is always present. When open, the window wraps
    /// header, message list, response button (if enabled and there is
    /// anything to act on), and input. This is the stacking the built-in
    /// window default expects.
    pub fn render(&self) -> Result<RenderNode, RenderError> {
        let snapshot = self.state.snapshot();
        debug!(
            open = snapshot.open,
            messages = snapshot.messages.len(),
            "rendering widget"
        );

        let button = self.registry.render_button(&ButtonContext {
            open: snapshot.open,
            toggle: self.handlers.toggle.clone(),
        })?;

        if !snapshot.open {
            return Ok(RenderNode::fragment(vec![button]));
        }

        let header = self.registry.render_header(&HeaderContext {
            title: self.options.labels.title.clone(),
            close: self.handlers.close.clone(),
        })?;

        let messages = self.registry.render_messages(&MessagesContext {
            messages: snapshot.messages.clone(),
            in_progress: snapshot.in_progress,
        })?;

        let mut children = vec![header, messages];

        if self.options.behavior.show_response_button && !snapshot.messages.is_empty() {
            children.push(self.registry.render_response_button(&ResponseButtonContext {
                in_progress: snapshot.in_progress,
                stop_label: self.options.labels.stop.clone(),
                regenerate_label: self.options.labels.regenerate.clone(),
                stop: self.handlers.stop.clone(),
                regenerate: self.handlers.regenerate.clone(),
            })?);
        }

        children.push(self.registry.render_input(&InputContext {
            placeholder: self.options.labels.placeholder.clone(),
            in_progress: snapshot.in_progress,
            send: self.handlers.send.clone(),
        })?);

        let window = self.registry.render_window(&WindowContext {
            open: true,
            children,
        })?;

        Ok(RenderNode::fragment(vec![window, button]))
    }

    /// Render the widget straight to HTML.
    pub fn render_html(&self) -> Result<String, RenderError> {
        Ok(self.render()?.to_html())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_widget_renders_trigger_only() {
        let widget = ChatWidget::with_defaults().unwrap();
        let html = widget.render_html().unwrap();
        assert!(html.contains("chat-trigger"));
        assert!(!html.contains("chat-window"));
    }

    #[test]
    fn test_open_widget_renders_full_shell() {
        let widget = ChatWidget::with_defaults().unwrap();
        widget.state().set_open(true);
        widget.state().add_user_message("hello");

        let html = widget.render_html().unwrap();
        assert!(html.contains("chat-window"));
        assert!(html.contains("chat-header"));
        assert!(html.contains("chat-messages"));
        assert!(html.contains("chat-response-button"));
        assert!(html.contains("chat-input"));
        assert!(html.contains("hello"));
    }

    #[test]
    fn test_response_button_hidden_when_disabled() {
        let mut options = WidgetOptions::default();
        options.behavior.show_response_button = false;
        options.behavior.initially_open = true;
        let widget = ChatWidget::new(options, SlotOverrides::new()).unwrap();
        widget.state().add_user_message("hello");

        let html = widget.render_html().unwrap();
        assert!(!html.contains("chat-response-button"));
    }

    #[test]
    fn test_in_progress_disables_input_and_shows_typing() {
        let widget = ChatWidget::with_defaults().unwrap();
        widget.state().set_open(true);
        widget.state().add_user_message("hello");
        widget.state().set_in_progress(true);

        let html = widget.render_html().unwrap();
        assert!(html.contains("chat-typing"));
        assert!(html.contains("disabled"));
        assert!(html.contains("data-state=\"stop\""));
    }
}
