//! Rendering-slot core for an embeddable chat widget.
//!
//! A chat widget's UI decomposes into named slots: window, trigger button,
//! header, message list, input area, response button, and the per-variant
//! message renderers. This crate ships a default renderer for every slot and
//! lets the embedding application replace any one of them without touching
//! the others.
//!
//! # Architecture
//!
//! - **Registry**: each slot resolves to exactly one renderer at
//!   construction time (override if supplied, built-in default otherwise)
//!   and stays immutable afterwards
//! - **Contexts**: renderers receive an immutable, slot-specific snapshot;
//!   state changes travel through explicit callback handles
//! - **Output**: renderers return an owned [`render::RenderNode`] tree the
//!   host paints (or serializes) however it likes
//!
//! # Modules
//!
//! - [`slots`]: slot names, contexts, registry, built-in defaults
//! - [`message`]: the tagged union of conversation messages
//! - [`store`]: append-only chat state with render snapshots
//! - [`render`]: the renderable output tree and HTML writer
//! - [`config`]: declarative widget options
//! - [`widget`]: the facade composing everything into one widget
//!
//! # Example
//!
//! ```rust
//! use chat_slots::render::Element;
//! use chat_slots::slots::SlotOverrides;
//! use chat_slots::{ChatWidget, WidgetOptions};
//!
//! let overrides = SlotOverrides::new().header(|ctx| {
//!     Ok(Element::new("div").class("my-header").text(&ctx.title).into())
//! });
//! let widget = ChatWidget::new(WidgetOptions::default(), overrides).unwrap();
//! widget.state().set_open(true);
//! assert!(widget.render_html().unwrap().contains("my-header"));
//! ```

pub mod config;
pub mod message;
pub mod render;
pub mod slots;
pub mod store;
pub mod widget;

pub use config::WidgetOptions;
pub use widget::{ChatWidget, WidgetHandlers};
