use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::cache::{CacheAdapter, CachedRender, ComponentId};
use crate::error::{RenderError, RenderResult};
use crate::renderer::state::RenderState;
use crate::renderer::traits::Step;

/// Output slots of the cached components currently being rendered.
///
/// Slot `i` belongs to the `CachedComponent` frame with `buffer_index == i`,
/// so the slots nest the same way the frames do.
#[derive(Debug, Default)]
pub struct BufferStack {
    segments: Vec<String>,
    components: Vec<BTreeSet<ComponentId>>,
}

impl BufferStack {
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn segment(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(String::as_str)
    }

    pub fn components(&self, index: usize) -> Option<&BTreeSet<ComponentId>> {
        self.components.get(index)
    }

    fn open(&mut self) -> usize {
        self.segments.push(String::new());
        self.components.push(BTreeSet::new());
        self.segments.len() - 1
    }

    fn append(&mut self, text: &str) {
        if let Some(segment) = self.segments.last_mut() {
            segment.push_str(text);
        }
    }

    fn register(&mut self, component: ComponentId) {
        if let Some(set) = self.components.last_mut() {
            set.insert(component);
        }
    }

    fn record(&self, index: usize) -> Option<CachedRender> {
        Some(CachedRender {
            html: self.segments.get(index)?.clone(),
            components: self.components.get(index)?.clone(),
        })
    }

    fn merge_into_parent(&mut self, index: usize, result: &CachedRender) {
        let parent = index - 1;
        self.segments[parent].push_str(&result.html);
        self.components[parent].extend(result.components.iter().cloned());
    }

    fn truncate(&mut self, len: usize) {
        self.segments.truncate(len);
        self.components.truncate(len);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Not yet resumed, or resumed after the previous suspension completed.
    Ready,
    /// A step was handed out and has not been followed by `resume()` yet.
    Suspended,
    Finished,
}

/// State of one render operation.
///
/// The context is owned exclusively by the operation that created it.
/// [`RenderContext::resume`] is the only way to advance it; every step it
/// returns is one suspension that the caller completes before resuming.
#[derive(Debug)]
pub struct RenderContext<N> {
    root: Option<N>,
    states: Vec<RenderState<N>>,
    active: Option<ComponentId>,
    buffers: Option<BufferStack>,
    outbox: Option<String>,
    cache: Option<Arc<CacheAdapter>>,
    user_context: serde_json::Value,
    phase: Phase,
}

impl<N: Clone> RenderContext<N> {
    pub fn new(root: N) -> Self {
        Self {
            root: Some(root),
            states: Vec::new(),
            active: None,
            buffers: None,
            outbox: None,
            cache: None,
            user_context: serde_json::Value::Null,
            phase: Phase::Ready,
        }
    }

    pub fn with_cache(mut self, cache: Arc<CacheAdapter>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_active_component(mut self, component: ComponentId) -> Self {
        self.active = Some(component);
        self
    }

    pub fn with_user_context(mut self, user_context: serde_json::Value) -> Self {
        self.user_context = user_context;
        self
    }

    /// Advances the render until the next suspension point.
    ///
    /// The first call hands out the root node. Afterwards the stack is
    /// drained top-first until a child must be rendered, text must be
    /// written, or the stack is empty. Once `Done` or an error has been
    /// returned, every further call fails with [`RenderError::Finished`].
    pub fn resume(&mut self) -> RenderResult<Step<N>> {
        if self.phase == Phase::Finished {
            return Err(RenderError::Finished);
        }
        self.phase = Phase::Ready;

        match self.advance() {
            Ok(Step::Done) => {
                debug!("render stack drained");
                self.phase = Phase::Finished;
                Ok(Step::Done)
            }
            Ok(step) => {
                self.phase = Phase::Suspended;
                Ok(step)
            }
            Err(err) => {
                warn!(error = %err, "render operation failed");
                self.abort();
                Err(err)
            }
        }
    }

    fn advance(&mut self) -> RenderResult<Step<N>> {
        if let Some(root) = self.root.take() {
            return Ok(Step::Render {
                node: root,
                is_root: true,
            });
        }

        loop {
            if let Some(text) = self.outbox.take() {
                trace!(len = text.len(), "write");
                return Ok(Step::Write(text));
            }

            let Some(top) = self.states.last_mut() else {
                return Ok(Step::Done);
            };

            match top {
                RenderState::Element {
                    children,
                    rendered,
                    total,
                    ..
                }
                | RenderState::Fragment {
                    children,
                    rendered,
                    total,
                } => {
                    let index = *rendered;
                    *rendered += 1;
                    if index < *total {
                        return Ok(Step::Render {
                            node: children[index].clone(),
                            is_root: false,
                        });
                    }
                    if let Some(RenderState::Element { end_tag, .. }) = self.states.pop() {
                        self.write(&end_tag);
                    }
                }
                RenderState::Component { .. } => {
                    trace!(kind = top.kind(), "pop frame");
                    if let Some(RenderState::Component { prev_active }) = self.states.pop() {
                        self.active = prev_active;
                    }
                }
                RenderState::CachedComponent { .. } => {
                    if let Some(RenderState::CachedComponent { buffer_index, key }) =
                        self.states.pop()
                    {
                        self.commit(buffer_index, key)?;
                    }
                }
            }
        }
    }

    /// Stores a finished cached component and hands its output on.
    ///
    /// The outermost cached component leaves caching mode and its HTML goes
    /// to the live writer; a nested one is folded into its parent's slot.
    fn commit(&mut self, buffer_index: usize, key: String) -> RenderResult<()> {
        let buffers = self.buffers.as_mut().ok_or_else(|| {
            RenderError::protocol(format!(
                "cached component `{key}` committed outside caching mode"
            ))
        })?;
        let result = buffers.record(buffer_index).ok_or_else(|| {
            RenderError::protocol(format!(
                "cached component `{key}` has no buffer slot {buffer_index}"
            ))
        })?;

        if let Some(cache) = &self.cache {
            cache
                .set(&key, result.clone())
                .map_err(|source| RenderError::CacheCommit {
                    key: key.clone(),
                    source,
                })?;
        }

        if buffer_index == 0 {
            debug!(key = %key, len = result.html.len(), "committed top-level cached component");
            self.buffers = None;
            self.write(&result.html);
        } else {
            debug!(key = %key, buffer_index, "merged cached component into parent");
            buffers.merge_into_parent(buffer_index, &result);
            buffers.truncate(buffer_index);
        }
        Ok(())
    }

    fn abort(&mut self) {
        self.phase = Phase::Finished;
        self.root = None;
        self.states.clear();
        self.buffers = None;
        self.outbox = None;
    }
}

impl<N> RenderContext<N> {
    /// Emits output: into the innermost cache buffer while caching,
    /// otherwise as a pending write for the next suspension.
    pub fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.phase == Phase::Finished {
            warn!(len = text.len(), "write after render finished, dropped");
            return;
        }
        match self.buffers.as_mut() {
            Some(buffers) => buffers.append(text),
            None => self.outbox.get_or_insert_with(String::new).push_str(text),
        }
    }

    pub fn push_element(&mut self, children: Vec<N>, end_tag: impl Into<String>) {
        self.push_frame(RenderState::element(children, end_tag));
    }

    pub fn push_fragment(&mut self, children: Vec<N>) {
        self.push_frame(RenderState::fragment(children));
    }

    /// Makes `component` the active component until the frames pushed
    /// after this one are drained.
    pub fn enter_component(&mut self, component: ComponentId) {
        let prev_active = self.active.replace(component);
        self.push_frame(RenderState::Component { prev_active });
    }

    /// Starts buffering output for a cacheable component. Must be followed
    /// by the frames that render the component itself.
    pub fn enter_cached_component(&mut self, key: impl Into<String>) {
        let key = key.into();
        self.expect_suspended();
        let buffers = self.buffers.get_or_insert_with(BufferStack::default);
        let buffer_index = buffers.open();
        debug!(key = %key, buffer_index, "entered caching mode");
        self.states
            .push(RenderState::CachedComponent { buffer_index, key });
    }

    fn push_frame(&mut self, state: RenderState<N>) {
        self.expect_suspended();
        trace!(kind = state.kind(), depth = self.states.len() + 1, "push frame");
        self.states.push(state);
    }

    // Frames may only be added while a `Render` step is being handled.
    fn expect_suspended(&self) {
        debug_assert!(
            self.phase == Phase::Suspended,
            "render frames pushed outside a render step"
        );
    }

    /// Records `component` in the innermost cached component, if any.
    pub fn register_component(&mut self, component: ComponentId) {
        if let Some(buffers) = self.buffers.as_mut() {
            buffers.register(component);
        }
    }

    pub fn active_component(&self) -> Option<&ComponentId> {
        self.active.as_ref()
    }

    pub fn is_caching(&self) -> bool {
        self.buffers.is_some()
    }

    pub fn buffers(&self) -> Option<&BufferStack> {
        self.buffers.as_ref()
    }

    pub fn cache(&self) -> Option<Arc<CacheAdapter>> {
        self.cache.clone()
    }

    pub fn user_context(&self) -> &serde_json::Value {
        &self.user_context
    }

    pub fn states(&self) -> &[RenderState<N>] {
        &self.states
    }

    pub fn is_suspended(&self) -> bool {
        self.phase == Phase::Suspended
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }
}
