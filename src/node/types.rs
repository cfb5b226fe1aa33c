use serde::{Deserialize, Serialize};

/// A node of the tree to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Element(Element),
    Fragment {
        #[serde(default)]
        children: Vec<Node>,
    },
    /// Text content, escaped on output.
    Text { text: String },
    /// Markup written verbatim.
    Raw { html: String },
    Component(Component),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text { text: text.into() }
    }

    pub fn fragment(children: Vec<Node>) -> Self {
        Node::Fragment { children }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Node::Element(_) => "element",
            Node::Fragment { .. } => "fragment",
            Node::Text { .. } => "text",
            Node::Raw { .. } => "raw",
            Node::Component(_) => "component",
        }
    }
}

/// A name/value pair as found on an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

impl Attr {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    /// Static attributes with literal values.
    #[serde(default)]
    pub attrs: Vec<Attr>,
    /// DOM properties with literal values, rendered as attributes.
    #[serde(default)]
    pub props: Vec<Attr>,
    /// Attributes bound to an expression.
    #[serde(default)]
    pub bindings: Vec<Attr>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push(Attr::new(name, value));
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

/// A named component and the tree it renders to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    /// Present when the component's output may be cached; combined with
    /// `name` to form the cache key.
    #[serde(default)]
    pub cache_key: Option<String>,
    pub template: Box<Node>,
}

impl Component {
    pub fn new(name: impl Into<String>, template: Node) -> Self {
        Self {
            name: name.into(),
            cache_key: None,
            template: Box::new(template),
        }
    }

    pub fn cached(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    pub fn full_cache_key(&self) -> Option<String> {
        self.cache_key
            .as_ref()
            .map(|key| format!("{}::{}", self.name, key))
    }
}

impl From<Component> for Node {
    fn from(component: Component) -> Self {
        Node::Component(component)
    }
}
