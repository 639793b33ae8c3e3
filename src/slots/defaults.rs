//! Built-in renderers, one per slot.
//!
//! These ship the widget's standard visuals. Class names follow the host
//! stylesheet's utility conventions; an embedding application that wants a
//! different look overrides the slot instead of restyling these.

use std::sync::Arc;

use crate::message::{ActionExecutionStatus, Message, Role};
use crate::render::{Element, RenderNode};
use crate::slots::context::{
    ActionExecutionContext, AgentStateContext, ButtonContext, HeaderContext, InputContext,
    MessagesContext, ResponseButtonContext, ResultMessageContext, TextMessageContext,
    WindowContext,
};
use crate::slots::registry::{BoundRenderFn, RenderFn};
use crate::slots::{RenderError, SlotName};

pub(crate) fn window() -> RenderFn<WindowContext> {
    Arc::new(|ctx: &WindowContext| {
        let shell = Element::new("div")
            .class("chat-window flex flex-col bg-panel border border-panelBorder rounded-2xl overflow-hidden")
            .attr("data-open", if ctx.open { "true" } else { "false" })
            .children(ctx.children.iter().cloned());
        Ok(shell.into())
    })
}

pub(crate) fn button() -> RenderFn<ButtonContext> {
    Arc::new(|ctx: &ButtonContext| {
        let label = if ctx.open { "Close chat" } else { "Open chat" };
        let glyph = if ctx.open { "×" } else { "💬" };
        let node = Element::new("button")
            .attr("type", "button")
            .class(
                "chat-trigger inline-flex items-center justify-center h-12 w-12 rounded-full \
                 bg-primary text-white shadow-lg",
            )
            .attr("aria-expanded", if ctx.open { "true" } else { "false" })
            .attr("aria-label", label)
            .child(Element::new("span").class("chat-trigger-icon").text(glyph));
        Ok(node.into())
    })
}

pub(crate) fn header() -> RenderFn<HeaderContext> {
    Arc::new(|ctx: &HeaderContext| {
        let node = Element::new("header")
            .class("chat-header flex items-center justify-between px-4 py-3 border-b border-panelBorder")
            .child(
                Element::new("h2")
                    .class("font-semibold text-lg")
                    .text(&ctx.title),
            )
            .child(
                Element::new("button")
                    .attr("type", "button")
                    .class("chat-close text-textMuted hover:text-textPrimary")
                    .attr("aria-label", "Close")
                    .text("×"),
            );
        Ok(node.into())
    })
}

pub(crate) fn input() -> RenderFn<InputContext> {
    Arc::new(|ctx: &InputContext| {
        let mut textarea = Element::new("textarea")
            .class(
                "chat-input w-full min-h-[44px] px-4 py-3 rounded-xl border border-panelBorder \
                 bg-background resize-none",
            )
            .attr("placeholder", &ctx.placeholder)
            .attr("rows", "1");
        if ctx.in_progress {
            textarea = textarea.attr("disabled", "disabled");
        }

        let mut send = Element::new("button")
            .attr("type", "submit")
            .class("chat-send shrink-0 h-11 w-11 rounded-xl bg-primary text-white")
            .attr("aria-label", "Send")
            .text("➤");
        if ctx.in_progress {
            send = send.attr("disabled", "disabled");
        }

        let node = Element::new("div")
            .class("chat-input-area border-t border-panelBorder p-4")
            .child(
                Element::new("form")
                    .class("flex gap-2")
                    .child(textarea)
                    .child(send),
            )
            .child(
                Element::new("p")
                    .class("text-xs text-textMuted mt-2 text-center")
                    .text("Press Enter to send, Shift+Enter for new line"),
            );
        Ok(node.into())
    })
}

pub(crate) fn response_button() -> RenderFn<ResponseButtonContext> {
    Arc::new(|ctx: &ResponseButtonContext| {
        let (label, state) = if ctx.in_progress {
            (ctx.stop_label.as_str(), "stop")
        } else {
            (ctx.regenerate_label.as_str(), "regenerate")
        };
        let node = Element::new("button")
            .attr("type", "button")
            .class("chat-response-button text-sm border border-panelBorder rounded-lg px-3 py-1")
            .attr("data-state", state)
            .text(label);
        Ok(node.into())
    })
}

pub(crate) fn text_message() -> RenderFn<TextMessageContext> {
    Arc::new(|ctx: &TextMessageContext| {
        let role = match ctx.message.role {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        };
        let node = Element::new("div")
            .class(format!("chat-message {role} rounded-xl px-4 py-2"))
            .attr("data-message-id", &ctx.message.id)
            .text(&ctx.message.content);
        Ok(node.into())
    })
}

pub(crate) fn action_execution() -> RenderFn<ActionExecutionContext> {
    Arc::new(|ctx: &ActionExecutionContext| {
        let (state, badge) = match ctx.status {
            ActionExecutionStatus::InProgress => ("in-progress", "Running"),
            ActionExecutionStatus::Complete => ("complete", "Done"),
            ActionExecutionStatus::Error => ("error", "Failed"),
        };
        let node = Element::new("div")
            .class("chat-action flex items-center gap-2 text-sm")
            .attr("data-action-id", &ctx.id)
            .attr("data-state", state)
            .child(
                Element::new("span")
                    .class("chat-action-name font-medium")
                    .text(&ctx.name),
            )
            .child(
                Element::new("span")
                    .class("chat-action-status text-xs text-textMuted")
                    .text(badge),
            );
        Ok(node.into())
    })
}

pub(crate) fn result_message() -> RenderFn<ResultMessageContext> {
    Arc::new(|ctx: &ResultMessageContext| {
        let node = Element::new("div")
            .class("chat-result text-sm text-textMuted")
            .attr("data-action-id", &ctx.action_execution_id)
            .child(
                Element::new("span")
                    .class("chat-result-name font-medium")
                    .text(&ctx.action_name),
            )
            .child(
                Element::new("span")
                    .class("chat-result-value")
                    .text(pretty(&ctx.result)),
            );
        Ok(node.into())
    })
}

pub(crate) fn agent_state() -> RenderFn<AgentStateContext> {
    Arc::new(|ctx: &AgentStateContext| {
        let badge = if ctx.running { "Running" } else { "Idle" };
        let node = Element::new("div")
            .class("chat-agent-state text-sm")
            .attr("data-agent", &ctx.agent_name)
            .child(
                Element::new("div")
                    .class("flex items-center gap-2")
                    .child(Element::new("span").class("font-medium").text(&ctx.agent_name))
                    .child(Element::new("span").class("text-xs text-textMuted").text(&ctx.node_name))
                    .child(Element::new("span").class("chat-agent-badge text-xs").text(badge)),
            )
            .child(
                Element::new("pre")
                    .class("text-xs overflow-x-auto")
                    .text(pretty(&ctx.state)),
            );
        Ok(node.into())
    })
}

/// Build the default `Messages` renderer.
///
/// Dispatches each message, in input order, to the currently active renderer
/// for its variant. The bound renderers are resolved once at registry
/// construction and carry the registry's error policy, so overriding e.g.
/// `ActionExecutionRender` changes what this default emits for action
/// messages without touching the list itself.
pub(crate) fn messages(
    text: BoundRenderFn<TextMessageContext>,
    action: BoundRenderFn<ActionExecutionContext>,
    result: BoundRenderFn<ResultMessageContext>,
    agent: BoundRenderFn<AgentStateContext>,
) -> RenderFn<MessagesContext> {
    Arc::new(move |ctx: &MessagesContext| {
        // Results settle earlier action executions; collect them up front so
        // the action renderer can show its outcome inline.
        let mut results = std::collections::HashMap::new();
        for message in &ctx.messages {
            if let Message::Result(r) = message {
                results.insert(r.action_execution_id.clone(), r.result.clone());
            }
        }

        let mut seen_actions = std::collections::HashSet::new();
        let mut children = Vec::with_capacity(ctx.messages.len());
        for message in &ctx.messages {
            let node = match message {
                Message::Text(m) => text(&TextMessageContext { message: m.clone() })?,
                Message::ActionExecution(m) => {
                    seen_actions.insert(m.id.clone());
                    action(&ActionExecutionContext {
                        id: m.id.clone(),
                        name: m.name.clone(),
                        arguments: m.arguments.clone(),
                        status: m.status,
                        result: results.get(&m.id).cloned(),
                    })?
                }
                Message::Result(m) => {
                    if !seen_actions.contains(&m.action_execution_id) {
                        return Err(anyhow::Error::new(RenderError::MissingContext {
                            slot: SlotName::ResultMessageRender,
                            detail: format!(
                                "result references unknown action execution `{}`",
                                m.action_execution_id
                            ),
                        }));
                    }
                    result(&ResultMessageContext {
                        id: m.id.clone(),
                        action_execution_id: m.action_execution_id.clone(),
                        action_name: m.action_name.clone(),
                        result: m.result.clone(),
                    })?
                }
                Message::AgentState(m) => agent(&AgentStateContext {
                    agent_name: m.agent_name.clone(),
                    node_name: m.node_name.clone(),
                    running: m.running,
                    state: m.state.clone(),
                })?,
            };
            children.push(node);
        }

        let mut list = Element::new("div")
            .class("chat-messages flex-1 overflow-y-auto px-4 py-3")
            .children(children);
        if ctx.in_progress {
            list = list.child(
                Element::new("div")
                    .class("chat-typing text-textMuted")
                    .attr("aria-live", "polite")
                    .text("…"),
            );
        }
        Ok(list.into())
    })
}

fn pretty(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}
