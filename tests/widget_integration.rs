//! End-to-end widget rendering behavior.

use std::sync::{Arc, Mutex};

use chat_slots::render::Element;
use chat_slots::slots::{
    ButtonContext, Callback, HeaderContext, RendererErrorPolicy, RendererOrigin, SlotName,
    SlotOverrides, SlotRegistry,
};
use chat_slots::{ChatWidget, WidgetHandlers, WidgetOptions};

#[test]
fn test_input_override_leaves_header_default() {
    let overrides = SlotOverrides::new().input(|ctx| {
        Ok(Element::new("div")
            .class("custom-input")
            .attr("data-placeholder", &ctx.placeholder)
            .into())
    });
    let registry = SlotRegistry::new(overrides).unwrap();

    assert_eq!(registry.origin(SlotName::Input), RendererOrigin::Override);
    assert_eq!(registry.origin(SlotName::Header), RendererOrigin::Default);

    // Invoking the resolved default directly renders the supplied title.
    let header_renderer = registry.header_renderer();
    let header = header_renderer(&HeaderContext {
        title: "Chat".to_string(),
        close: Callback::noop(),
    })
    .unwrap();
    assert!(header.to_html().contains("Chat"));
}

#[test]
fn test_conversation_renders_in_append_order() {
    let widget = ChatWidget::with_defaults().unwrap();
    let state = widget.state();
    state.set_open(true);

    state.add_user_message("What's the weather in Oslo?");
    let action_id = state.begin_action("get_weather", serde_json::json!({"city": "Oslo"}));
    state
        .complete_action(&action_id, serde_json::json!({"temp_c": 14}))
        .unwrap();
    state.add_assistant_message("It's 14 degrees.");
    state.add_agent_state("forecaster", "summarize", false, serde_json::json!({"done": true}));

    let html = widget.render_html().unwrap();

    let positions = [
        html.find("What&#39;s the weather in Oslo?").unwrap(),
        html.find("get_weather").unwrap(),
        html.find("chat-result").unwrap(),
        html.find("It&#39;s 14 degrees.").unwrap(),
        html.find("forecaster").unwrap(),
    ];
    assert!(
        positions.windows(2).all(|w| w[0] < w[1]),
        "messages out of order: {positions:?}"
    );
    // The settled action shows as done.
    assert!(html.contains("data-state=\"complete\""));
}

#[test]
fn test_rerender_is_stable() {
    let widget = ChatWidget::with_defaults().unwrap();
    widget.state().set_open(true);
    widget.state().add_user_message("hello");

    let first = widget.render().unwrap();
    let second = widget.render().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_state_changes_flow_through_callbacks() {
    let widget = ChatWidget::with_defaults().unwrap();
    let state = widget.state().clone();
    let toggle_state = state.clone();
    let sent = Arc::new(Mutex::new(Vec::new()));
    let sent_sink = Arc::clone(&sent);

    let widget = widget.with_handlers(WidgetHandlers {
        toggle: Callback::new(move |()| {
            toggle_state.toggle_open();
        }),
        send: Callback::new(move |text: String| sent_sink.lock().unwrap().push(text)),
        ..WidgetHandlers::default()
    });

    // A renderer sees the toggle handle in its context; "clicking" is
    // calling the callback, never mutating state from inside the renderer.
    let captured = Arc::new(Mutex::new(None));
    let capture = Arc::clone(&captured);
    let overrides = SlotOverrides::new().button(move |ctx: &ButtonContext| {
        *capture.lock().unwrap() = Some(ctx.toggle.clone());
        Ok(Element::new("button").class("probe").into())
    });
    let registry = SlotRegistry::new(overrides).unwrap();
    registry
        .render_button(&ButtonContext {
            open: state.is_open(),
            toggle: widget.handlers().toggle.clone(),
        })
        .unwrap();

    let toggle = captured.lock().unwrap().clone().unwrap();
    assert!(!state.is_open());
    toggle.call(());
    assert!(state.is_open());

    widget.handlers().send.call("hi".to_string());
    assert_eq!(*sent.lock().unwrap(), vec!["hi"]);
}

#[test]
fn test_fallback_policy_end_to_end() {
    // Capture the fallback warning path under a real subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter("chat_slots=debug")
        .with_test_writer()
        .try_init();

    let mut options = WidgetOptions::default();
    options.behavior.initially_open = true;
    options.behavior.error_policy = RendererErrorPolicy::FallbackToDefault;

    let overrides = SlotOverrides::new().header(|_| Err(anyhow::anyhow!("broken override")));
    let widget = ChatWidget::new(options, overrides).unwrap();

    let html = widget.render_html().unwrap();
    assert!(html.contains("chat-header"));
    assert!(html.contains("Chat"));
}

#[test]
fn test_propagate_policy_end_to_end() {
    let mut options = WidgetOptions::default();
    options.behavior.initially_open = true;

    let overrides = SlotOverrides::new().header(|_| Err(anyhow::anyhow!("broken override")));
    let widget = ChatWidget::new(options, overrides).unwrap();

    let err = widget.render().unwrap_err();
    assert!(err.to_string().contains("Header"));
}

#[test]
fn test_every_slot_overridable() {
    let overrides = SlotOverrides::new()
        .window(|_| Ok(Element::new("div").class("o-window").into()))
        .button(|_| Ok(Element::new("div").class("o-button").into()))
        .header(|_| Ok(Element::new("div").class("o-header").into()))
        .messages(|_| Ok(Element::new("div").class("o-messages").into()))
        .input(|_| Ok(Element::new("div").class("o-input").into()))
        .response_button(|_| Ok(Element::new("div").class("o-response").into()))
        .text_message(|_| Ok(Element::new("div").class("o-text").into()))
        .action_execution(|_| Ok(Element::new("div").class("o-action").into()))
        .result_message(|_| Ok(Element::new("div").class("o-result").into()))
        .agent_state(|_| Ok(Element::new("div").class("o-agent").into()));
    let registry = SlotRegistry::new(overrides).unwrap();

    for slot in SlotName::ALL {
        assert_eq!(registry.origin(slot), RendererOrigin::Override, "{slot}");
    }
}
