//! Classification and serialization of element attributes.
//!
//! Attribute values arrive as source text: either a quoted string literal,
//! which can be serialized now, or an expression, which has to be left for
//! whoever evaluates the template. Each helper returns [`StringSegment`]s
//! that say which of the two happened.

use crate::node::types::Attr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringSegment {
    /// Final markup.
    Raw(String),
    /// Code that produces markup when evaluated.
    Expression(String),
}

const BOOLEAN_ATTRS: &[&str] = &[
    "allowfullscreen", "async", "autofocus", "autoplay", "checked", "compact", "controls",
    "declare", "default", "defaultchecked", "defaultmuted", "defaultselected", "defer",
    "disabled", "enabled", "formnovalidate", "hidden", "indeterminate", "inert", "ismap",
    "itemscope", "loop", "multiple", "muted", "nohref", "noresize", "noshade", "novalidate",
    "nowrap", "open", "pauseonexit", "readonly", "required", "reversed", "scoped", "seamless",
    "selected", "sortable", "truespeed", "typemustmatch", "visible",
];

const ENUMERATED_ATTRS: &[&str] = &["contenteditable", "draggable", "spellcheck"];

const KNOWN_ATTRS: &[&str] = &[
    "accept", "accept-charset", "accesskey", "action", "align", "alt", "async", "autocomplete",
    "autofocus", "autoplay", "autosave", "bgcolor", "border", "buffered", "challenge", "charset",
    "checked", "cite", "class", "code", "codebase", "color", "cols", "colspan", "content",
    "contenteditable", "contextmenu", "controls", "coords", "data", "datetime", "default",
    "defer", "dir", "dirname", "disabled", "download", "draggable", "dropzone", "enctype", "for",
    "form", "formaction", "headers", "height", "hidden", "high", "href", "hreflang", "http-equiv",
    "icon", "id", "ismap", "itemprop", "keytype", "kind", "label", "lang", "language", "list",
    "loop", "low", "manifest", "max", "maxlength", "media", "method", "GET", "POST", "min",
    "multiple", "email", "file", "muted", "name", "novalidate", "open", "optimum", "pattern",
    "ping", "placeholder", "poster", "preload", "radiogroup", "readonly", "rel", "required",
    "reversed", "rows", "rowspan", "sandbox", "scope", "scoped", "seamless", "selected", "shape",
    "size", "type", "text", "password", "sizes", "span", "spellcheck", "src", "srcdoc", "srclang",
    "srcset", "start", "step", "style", "summary", "tabindex", "target", "title", "usemap",
    "value", "width", "wrap",
];

const UNARY_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "frame", "hr", "img", "input", "isindex", "keygen",
    "link", "meta", "param", "source", "track", "wbr",
];

pub fn is_boolean_attr(name: &str) -> bool {
    BOOLEAN_ATTRS.contains(&name)
}

pub fn is_enumerated_attr(name: &str) -> bool {
    ENUMERATED_ATTRS.contains(&name)
}

/// Whether `name` may be emitted as an attribute on the server.
pub fn is_renderable_attr(name: &str) -> bool {
    let unsafe_char = name
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '<' | '>' | '/' | '='));
    !unsafe_char
        && (KNOWN_ATTRS.contains(&name) || name.starts_with("data-") || name.starts_with("aria-"))
}

/// Void elements: no end tag and no children.
pub fn is_unary_tag(tag: &str) -> bool {
    UNARY_TAGS.contains(&tag)
}

fn prop_to_attr(name: &str) -> Option<&'static str> {
    match name {
        "acceptCharset" => Some("accept-charset"),
        "className" => Some("class"),
        "htmlFor" => Some("for"),
        "httpEquiv" => Some("http-equiv"),
        _ => None,
    }
}

/// A complete single- or double-quoted string literal.
fn is_quoted_literal(source: &str) -> bool {
    let Some(quote) = source.chars().next().filter(|c| matches!(c, '"' | '\'')) else {
        return false;
    };
    if source.len() < 2 || !source.ends_with(quote) {
        return false;
    }

    let mut chars = source[1..source.len() - 1].chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if chars.next().is_none() {
                return false;
            }
        } else if c == quote {
            return false;
        }
    }
    true
}

pub fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn decode_literal(literal: &str) -> Option<String> {
    serde_json::from_str::<String>(literal).ok()
}

fn json_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Serializes one attribute whose value is given as source text.
pub fn attr_segment(name: &str, value: &str) -> StringSegment {
    if is_quoted_literal(value) {
        let mut literal = if value.starts_with('\'') {
            format!("\"{}\"", &value[1..value.len() - 1])
        } else {
            value.to_string()
        };
        if is_enumerated_attr(name) && literal != "\"false\"" {
            literal = "\"true\"".to_string();
        }

        if is_boolean_attr(name) {
            return StringSegment::Raw(format!(" {name}=\"{name}\""));
        }
        if literal == "\"\"" {
            return StringSegment::Raw(format!(" {name}"));
        }
        if let Some(decoded) = decode_literal(&literal) {
            return StringSegment::Raw(format!(" {name}=\"{}\"", escape_attr(&decoded)));
        }
    }
    StringSegment::Expression(format!("_ssrAttr({},{value})", json_string(name)))
}

pub fn attr_segments(attrs: &[Attr]) -> Vec<StringSegment> {
    attrs
        .iter()
        .map(|attr| attr_segment(&attr.name, &attr.value))
        .collect()
}

/// Serializes DOM properties as attributes.
///
/// Properties are renamed to their attribute names, dropped when not
/// renderable, and dropped when `attrs` already sets the same attribute.
pub fn dom_prop_segments(props: &[Attr], attrs: Option<&[Attr]>) -> Vec<StringSegment> {
    props
        .iter()
        .filter_map(|prop| {
            let name = prop_to_attr(&prop.name)
                .map(str::to_string)
                .unwrap_or_else(|| prop.name.to_lowercase());
            if !is_renderable_attr(&name) {
                return None;
            }
            let shadowed = attrs.is_some_and(|attrs| attrs.iter().any(|a| a.name == name));
            (!shadowed).then(|| attr_segment(&name, &prop.value))
        })
        .collect()
}

/// `static_class` is a quoted literal; `binding` is an expression.
pub fn class_segments(static_class: Option<&str>, binding: Option<&str>) -> Vec<StringSegment> {
    if let (Some(static_class), None) = (static_class, binding) {
        if let Some(decoded) = decode_literal(static_class) {
            return vec![StringSegment::Raw(format!(
                " class=\"{}\"",
                escape_attr(&decoded)
            ))];
        }
    }
    vec![StringSegment::Expression(format!(
        "_ssrClass({},{})",
        static_class.unwrap_or("null"),
        binding.unwrap_or("null")
    ))]
}

/// `static_style` is the raw style text; `parsed_static` its compiled
/// object form; `v_show` a visibility expression.
pub fn style_segments(
    static_style: Option<&str>,
    parsed_static: Option<&str>,
    binding: Option<&str>,
    v_show: Option<&str>,
) -> Vec<StringSegment> {
    if let (Some(static_style), None, None) = (static_style, binding, v_show) {
        return vec![StringSegment::Raw(format!(
            " style=\"{}\"",
            escape_attr(static_style)
        ))];
    }
    let show = v_show
        .map(|expr| format!("{{ display: ({expr}) ? '' : 'none' }}"))
        .unwrap_or_else(|| "null".to_string());
    vec![StringSegment::Expression(format!(
        "_ssrStyle({},{}, {show})",
        parsed_static.unwrap_or("null"),
        binding.unwrap_or("null")
    ))]
}
