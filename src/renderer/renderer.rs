use std::sync::Arc;

use tokio::io::AsyncWrite;
use tracing::info;

use crate::cache::{CacheAdapter, LruRenderCache};
use crate::config::RenderOptions;
use crate::error::{RenderError, RenderResult};
use crate::node::{Element, Node};
use crate::renderer::context::RenderContext;
use crate::renderer::driver::drive;
use crate::renderer::renders::TreeRenderer;

/// Renders [`Node`] trees to async sinks, sharing one component cache
/// between all render operations it starts.
pub struct StreamRenderer {
    tree: TreeRenderer,
    cache: Option<Arc<CacheAdapter>>,
    user_context: serde_json::Value,
}

impl StreamRenderer {
    pub fn new(options: &RenderOptions) -> RenderResult<Self> {
        let cache = if options.cache_enabled {
            let store = LruRenderCache::with_capacity(options.cache_capacity)?;
            info!(capacity = options.cache_capacity, "component cache enabled");
            Some(Arc::new(CacheAdapter::from_cache(Arc::new(store))))
        } else {
            None
        };

        Ok(Self {
            tree: TreeRenderer::new(options),
            cache,
            user_context: serde_json::Value::Null,
        })
    }

    /// Replaces the cache, e.g. with an adapter over an external store.
    pub fn with_cache(mut self, cache: Option<Arc<CacheAdapter>>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_module(
        mut self,
        module: impl Fn(&Element) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.tree = self.tree.with_module(module);
        self
    }

    pub fn with_user_context(mut self, user_context: serde_json::Value) -> Self {
        self.user_context = user_context;
        self
    }

    pub fn cache(&self) -> Option<&Arc<CacheAdapter>> {
        self.cache.as_ref()
    }

    pub async fn render_to_stream<W>(&self, root: &Node, sink: &mut W) -> RenderResult<()>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut context = RenderContext::new(root).with_user_context(self.user_context.clone());
        if let Some(cache) = &self.cache {
            context = context.with_cache(Arc::clone(cache));
        }
        drive(context, &self.tree, sink).await
    }

    pub async fn render_to_string(&self, root: &Node) -> RenderResult<String> {
        let mut output = Vec::new();
        self.render_to_stream(root, &mut output).await?;
        String::from_utf8(output).map_err(RenderError::renderer)
    }
}
