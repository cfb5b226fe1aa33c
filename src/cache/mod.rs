pub mod adapter;
pub mod memory;

pub use adapter::*;
pub use memory::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Identity of a component definition, as registered while rendering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// The memoized output of one cached component subtree.
///
/// `components` lists every component rendered inside the subtree so a
/// later cache hit can re-register them without rendering anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedRender {
    pub html: String,
    pub components: BTreeSet<ComponentId>,
}

/// A synchronous component cache.
///
/// Implementors may be shared between concurrent render operations.
/// Races on the same key are tolerated; the last `set` wins.
#[cfg_attr(test, mockall::automock)]
pub trait RenderCache: Send + Sync {
    fn get(&self, key: &str) -> Option<CachedRender>;

    fn set(&self, key: &str, value: CachedRender) -> anyhow::Result<()>;

    /// Whether [`RenderCache::has`] is a real capability of this cache.
    fn supports_has(&self) -> bool {
        false
    }

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}
