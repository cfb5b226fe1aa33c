use anyhow::{bail, Context, Result};

use crate::node::attrs::is_renderable_attr;
use crate::node::types::{Element, Node};

/// Loads a node tree from its JSON form and checks it can be rendered.
pub struct TreeParser;

impl TreeParser {
    pub fn parse_str(&self, json: &str) -> Result<Node> {
        let node: Node = serde_json::from_str(json).context("Failed to parse node tree JSON")?;
        self.validate(&node)?;
        Ok(node)
    }

    pub fn validate(&self, node: &Node) -> Result<()> {
        // Walk with an explicit stack; trees can be deeper than the call stack.
        let mut pending = vec![node];
        while let Some(node) = pending.pop() {
            tracing::trace!(kind = node.kind(), "validating node");
            match node {
                Node::Element(element) => {
                    self.validate_element(element)?;
                    pending.extend(element.children.iter());
                }
                Node::Fragment { children } => pending.extend(children.iter()),
                Node::Component(component) => {
                    if component.name.trim().is_empty() {
                        bail!("Component name must not be empty");
                    }
                    if component.cache_key.as_deref().is_some_and(str::is_empty) {
                        bail!("Component `{}` has an empty cache key", component.name);
                    }
                    pending.push(component.template.as_ref());
                }
                Node::Text { .. } | Node::Raw { .. } => {}
            }
        }
        Ok(())
    }

    fn validate_element(&self, element: &Element) -> Result<()> {
        let tag = element.tag.as_str();
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            bail!("Invalid element tag `{}`", tag);
        }
        for attr in &element.attrs {
            if !is_renderable_attr(&attr.name) {
                tracing::debug!(tag, attr = %attr.name, "attribute will not be rendered");
            }
        }
        Ok(())
    }
}
