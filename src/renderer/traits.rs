use crate::renderer::context::RenderContext;

/// What the render machine needs from its caller before it can go on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<N> {
    /// Render `node` through the node renderer, then resume.
    Render { node: N, is_root: bool },
    /// Write the text to the live sink, then resume once it is accepted.
    Write(String),
    /// The stack is empty; nothing more will be written.
    Done,
}

/// Renders a single node.
///
/// An implementation inspects `node` and either writes its output through
/// [`RenderContext::write`] or pushes frames for its children. It never
/// drives the context itself; the caller resumes once this returns.
/// Component frames, cache-key computation and cache-hit short-circuiting
/// are the implementation's responsibility.
#[allow(async_fn_in_trait)]
pub trait NodeRenderer<N> {
    async fn render_node(
        &self,
        node: N,
        is_root: bool,
        context: &mut RenderContext<N>,
    ) -> anyhow::Result<()>;
}
