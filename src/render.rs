//! Renderable output tree.
//!
//! Renderers produce an owned [`RenderNode`] tree that the host rendering
//! layer interprets. The tree is deliberately small: elements with
//! attributes, text, and fragments. Hosts that paint HTML can call
//! [`RenderNode::to_html`]; hosts with their own paint path (native views,
//! terminal cells) walk the tree directly. Nodes serialize to JSON so they
//! can also be shipped to a client-side renderer over the wire.

use serde::Serialize;

/// A single node of renderable output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderNode {
    /// An element with a tag, attributes, and children.
    Element(Element),
    /// Plain text content. Escaped when written as HTML.
    Text { text: String },
    /// A sequence of sibling nodes with no wrapper element.
    Fragment { children: Vec<RenderNode> },
}

impl RenderNode {
    /// Create a text node.
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            text: content.into(),
        }
    }

    /// Create a fragment from a list of sibling nodes.
    #[must_use]
    pub fn fragment(children: Vec<RenderNode>) -> Self {
        Self::Fragment { children }
    }

    /// Write the node as an HTML string.
    ///
    /// Text content and attribute values are escaped; element tags and
    /// attribute names are emitted as-is (they come from renderer code, not
    /// user input).
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Self::Element(el) => el.write_html(out),
            Self::Text { text } => out.push_str(&escape(text)),
            Self::Fragment { children } => {
                for child in children {
                    child.write_html(out);
                }
            }
        }
    }
}

impl From<Element> for RenderNode {
    fn from(el: Element) -> Self {
        Self::Element(el)
    }
}

/// An element node. Built with a fluent API:
///
/// ```rust
/// use chat_slots::render::Element;
///
/// let node = Element::new("button")
///     .class("chat-trigger")
///     .attr("aria-expanded", "false")
///     .text("Open chat");
/// assert!(node.to_html().contains("chat-trigger"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    /// Tag name, e.g. `div`.
    pub tag: String,
    /// Attribute name/value pairs in insertion order.
    pub attrs: Vec<(String, String)>,
    /// Child nodes in document order.
    pub children: Vec<RenderNode>,
}

/// Tags written without a closing tag.
const VOID_TAGS: &[&str] = &["br", "hr", "img", "input"];

impl Element {
    /// Create an element with the given tag and no attributes or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set the `class` attribute.
    #[must_use]
    pub fn class(self, classes: impl Into<String>) -> Self {
        self.attr("class", classes)
    }

    /// Append an attribute.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Append a child node.
    #[must_use]
    pub fn child(mut self, child: impl Into<RenderNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append a text child.
    #[must_use]
    pub fn text(self, content: impl Into<String>) -> Self {
        self.child(RenderNode::text(content))
    }

    /// Append all nodes as children.
    #[must_use]
    pub fn children(mut self, nodes: impl IntoIterator<Item = RenderNode>) -> Self {
        self.children.extend(nodes);
        self
    }

    /// Write the element as an HTML string.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape(value));
            out.push('"');
        }
        if self.children.is_empty() && VOID_TAGS.contains(&self.tag.as_str()) {
            out.push_str(" />");
            return;
        }
        out.push('>');
        for child in &self.children {
            child.write_html(out);
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_builder() {
        let node = Element::new("div")
            .class("chat-header")
            .child(Element::new("h2").text("Chat"))
            .to_html();
        assert_eq!(node, "<div class=\"chat-header\"><h2>Chat</h2></div>");
    }

    #[test]
    fn test_text_is_escaped() {
        let node = RenderNode::text("<script>alert(\"x\") & more</script>");
        let html = node.to_html();
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&quot;x&quot;"));
        assert!(html.contains("&amp; more"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_attr_values_escaped() {
        let html = Element::new("div").attr("title", "a\"b").to_html();
        assert!(html.contains("title=\"a&quot;b\""));
    }

    #[test]
    fn test_void_tag() {
        let html = Element::new("input").attr("type", "text").to_html();
        assert_eq!(html, "<input type=\"text\" />");
    }

    #[test]
    fn test_fragment_preserves_order() {
        let node = RenderNode::fragment(vec![
            RenderNode::text("one"),
            RenderNode::text("two"),
            RenderNode::text("three"),
        ]);
        assert_eq!(node.to_html(), "onetwothree");
    }

    #[test]
    fn test_serialize_shape() {
        let node: RenderNode = Element::new("span").text("hi").into();
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains("\"kind\":\"element\""));
        assert!(json.contains("\"tag\":\"span\""));
    }
}
