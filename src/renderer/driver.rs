use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::instrument;

use crate::error::{RenderError, RenderResult};
use crate::renderer::context::RenderContext;
use crate::renderer::traits::{NodeRenderer, Step};

/// Runs a render operation to completion against an async sink.
///
/// Each write is awaited before the machine is resumed, so a slow sink
/// applies backpressure to the whole render without blocking the thread.
/// The returned result is the operation's single completion signal.
#[instrument(skip_all)]
pub async fn drive<N, R, W>(
    mut context: RenderContext<N>,
    renderer: &R,
    sink: &mut W,
) -> RenderResult<()>
where
    N: Clone,
    R: NodeRenderer<N> + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    loop {
        match context.resume()? {
            Step::Render { node, is_root } => renderer
                .render_node(node, is_root, &mut context)
                .await
                .map_err(RenderError::Renderer)?,
            Step::Write(text) => sink.write_all(text.as_bytes()).await?,
            Step::Done => {
                sink.flush().await?;
                return Ok(());
            }
        }
    }
}
