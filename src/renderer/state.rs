use crate::cache::ComponentId;

/// One frame of in-progress work on the render stack.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderState<N> {
    /// Children of a markup element; `end_tag` is written once they are done.
    Element {
        children: Vec<N>,
        rendered: usize,
        total: usize,
        end_tag: String,
    },
    /// Children with no wrapping markup.
    Fragment {
        children: Vec<N>,
        rendered: usize,
        total: usize,
    },
    /// Restores the active component when the component's scope ends.
    Component { prev_active: Option<ComponentId> },
    /// A cacheable component whose output is accumulating in the buffer
    /// slot `buffer_index` of the context's buffer stack.
    CachedComponent { buffer_index: usize, key: String },
}

impl<N> RenderState<N> {
    pub fn element(children: Vec<N>, end_tag: impl Into<String>) -> Self {
        let total = children.len();
        Self::Element {
            children,
            rendered: 0,
            total,
            end_tag: end_tag.into(),
        }
    }

    pub fn fragment(children: Vec<N>) -> Self {
        let total = children.len();
        Self::Fragment {
            children,
            rendered: 0,
            total,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RenderState::Element { .. } => "element",
            RenderState::Fragment { .. } => "fragment",
            RenderState::Component { .. } => "component",
            RenderState::CachedComponent { .. } => "cached-component",
        }
    }
}
