use tracing::warn;

use crate::node::attrs::{
    attr_segments, class_segments, dom_prop_segments, is_renderable_attr, style_segments,
};
use crate::node::{Attr, Element, StringSegment};

/// Extra attribute markup contributed for an element, such as ` data-v-1a2b`.
pub type AttrModule = Box<dyn Fn(&Element) -> Option<String> + Send + Sync>;

/// Helper for rendering element tags
pub struct TagRenderer<'a> {
    pub modules: &'a [AttrModule],
    pub server_rendered_attr: Option<&'a str>,
}

impl TagRenderer<'_> {
    pub fn render_start_tag(&self, element: &Element, is_root: bool) -> String {
        let mut markup = format!("<{}", element.tag);

        let renderable: Vec<Attr> = element
            .attrs
            .iter()
            .filter(|attr| is_renderable_attr(&attr.name))
            .cloned()
            .collect();
        let attrs = literal_attrs(&renderable);
        let props = literal_attrs(&element.props);
        let static_class = element.class.as_deref().map(json_literal);

        let mut segments = attr_segments(&attrs);
        segments.extend(dom_prop_segments(&props, Some(&attrs)));
        segments.extend(attr_segments(&element.bindings));
        if static_class.is_some() {
            segments.extend(class_segments(static_class.as_deref(), None));
        }
        if let Some(style) = element.style.as_deref() {
            segments.extend(style_segments(Some(style), None, None, None));
        }

        for segment in segments {
            match segment {
                StringSegment::Raw(text) => markup.push_str(&text),
                StringSegment::Expression(expr) => {
                    warn!(tag = %element.tag, expr = %expr, "dynamic attribute skipped");
                }
            }
        }

        for module in self.modules {
            if let Some(extra) = module(element) {
                markup.push_str(&extra);
            }
        }

        if is_root {
            if let Some(attr) = self.server_rendered_attr {
                markup.push_str(&format!(" {attr}=\"true\""));
            }
        }

        markup.push('>');
        markup
    }

    pub fn render_end_tag(&self, element: &Element) -> String {
        format!("</{}>", element.tag)
    }
}

/// Helper for rendering text content
pub struct TextRenderer;

impl TextRenderer {
    pub fn escape_html(&self, text: &str) -> String {
        let mut escaped = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&#39;"),
                _ => escaped.push(c),
            }
        }
        escaped
    }
}

fn json_literal(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

// Element attributes hold plain values; the segment helpers expect source
// text, so each value is turned into a string literal first.
fn literal_attrs(attrs: &[Attr]) -> Vec<Attr> {
    attrs
        .iter()
        .map(|attr| Attr::new(attr.name.as_str(), json_literal(&attr.value)))
        .collect()
}
