use tracing::debug;

use crate::cache::ComponentId;
use crate::config::RenderOptions;
use crate::node::attrs::is_unary_tag;
use crate::node::{Component, Element, Node};
use crate::renderer::components::*;
use crate::renderer::context::RenderContext;
use crate::renderer::traits::NodeRenderer;

/// Node renderer for the bundled [`Node`] tree.
pub struct TreeRenderer {
    modules: Vec<AttrModule>,
    server_rendered_attr: Option<String>,
    extra_unary_tags: Vec<String>,
}

impl TreeRenderer {
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            modules: Vec::new(),
            server_rendered_attr: options.server_rendered_attr.clone(),
            extra_unary_tags: options.extra_unary_tags.clone(),
        }
    }

    pub fn with_module(
        mut self,
        module: impl Fn(&Element) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    fn is_unary(&self, tag: &str) -> bool {
        is_unary_tag(tag) || self.extra_unary_tags.iter().any(|t| t == tag)
    }

    fn render_element<'a>(
        &self,
        element: &'a Element,
        is_root: bool,
        context: &mut RenderContext<&'a Node>,
    ) {
        let tags = TagRenderer {
            modules: &self.modules,
            server_rendered_attr: self.server_rendered_attr.as_deref(),
        };
        let start_tag = tags.render_start_tag(element, is_root);

        if self.is_unary(&element.tag) {
            context.write(&start_tag);
        } else if element.children.is_empty() {
            context.write(&start_tag);
            context.write(&tags.render_end_tag(element));
        } else {
            context.push_element(
                element.children.iter().collect(),
                tags.render_end_tag(element),
            );
            context.write(&start_tag);
        }
    }

    /// Serves `component` from the cache when possible.
    ///
    /// Returns `true` on a hit. On a miss for a cacheable component the
    /// context is switched into caching mode before returning `false`.
    async fn resolve_cached(
        &self,
        component: &Component,
        context: &mut RenderContext<&Node>,
    ) -> bool {
        let (Some(key), Some(cache)) = (component.full_cache_key(), context.cache()) else {
            return false;
        };

        let hit = match cache.contains(&key).await {
            Some(false) => None,
            Some(true) | None => cache.lookup(&key).await,
        };

        match hit {
            Some(hit) => {
                debug!(key = %key, "component cache hit");
                context.register_component(ComponentId::new(component.name.as_str()));
                for registered in hit.components {
                    context.register_component(registered);
                }
                context.write(&hit.html);
                true
            }
            None => {
                debug!(key = %key, "component cache miss");
                context.enter_cached_component(key);
                false
            }
        }
    }
}

impl<'a> NodeRenderer<&'a Node> for TreeRenderer {
    async fn render_node(
        &self,
        node: &'a Node,
        is_root: bool,
        context: &mut RenderContext<&'a Node>,
    ) -> anyhow::Result<()> {
        let mut node = node;
        // A component renders as its template, so descend without
        // suspending until a node that produces output is reached.
        loop {
            match node {
                Node::Text { text } => {
                    context.write(&TextRenderer.escape_html(text));
                    return Ok(());
                }
                Node::Raw { html } => {
                    context.write(html);
                    return Ok(());
                }
                Node::Fragment { children } => {
                    context.push_fragment(children.iter().collect());
                    return Ok(());
                }
                Node::Element(element) => {
                    self.render_element(element, is_root, context);
                    return Ok(());
                }
                Node::Component(component) => {
                    if self.resolve_cached(component, context).await {
                        return Ok(());
                    }
                    let id = ComponentId::new(component.name.as_str());
                    context.enter_component(id.clone());
                    context.register_component(id);
                    node = component.template.as_ref();
                }
            }
        }
    }
}
