use std::fmt;
use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::warn;

use crate::cache::{CachedRender, RenderCache};
use crate::error::{RenderError, RenderResult};

/// Completion callback handed to a callback-style accessor.
pub type CacheCallback<T> = Box<dyn FnOnce(T) + Send>;

type SyncFn<T> = Box<dyn Fn(&str) -> T + Send + Sync>;
type CallbackFn<T> = Box<dyn Fn(&str, CacheCallback<T>) + Send + Sync>;
type SetFn = Box<dyn Fn(&str, CachedRender) -> anyhow::Result<()> + Send + Sync>;

/// How an integrator exposes a cache read.
///
/// The calling convention is declared up front instead of being guessed
/// from the shape of the function.
pub enum Accessor<T> {
    /// Returns the value directly.
    Sync(SyncFn<T>),
    /// Hands the value to the callback, possibly later.
    Callback(CallbackFn<T>),
}

impl<T> Accessor<T> {
    pub fn sync(f: impl Fn(&str) -> T + Send + Sync + 'static) -> Self {
        Self::Sync(Box::new(f))
    }

    pub fn callback(f: impl Fn(&str, CacheCallback<T>) + Send + Sync + 'static) -> Self {
        Self::Callback(Box::new(f))
    }

    /// Invokes the accessor under the uniform `(key, callback)` contract.
    ///
    /// A synchronous accessor calls `callback` before this returns.
    pub fn call(&self, key: &str, callback: CacheCallback<T>) {
        match self {
            Accessor::Sync(f) => callback(f(key)),
            Accessor::Callback(f) => f(key, callback),
        }
    }
}

impl<T> fmt::Debug for Accessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Sync(_) => f.write_str("Accessor::Sync"),
            Accessor::Callback(_) => f.write_str("Accessor::Callback"),
        }
    }
}

/// A user cache normalized to one asynchronous accessor shape.
pub struct CacheAdapter {
    get: Accessor<Option<CachedRender>>,
    has: Option<Accessor<bool>>,
    set: SetFn,
}

impl CacheAdapter {
    pub fn builder() -> CacheAdapterBuilder {
        CacheAdapterBuilder::default()
    }

    /// Wraps a synchronous [`RenderCache`]. `has` is only exposed when the
    /// cache reports it as a real capability.
    pub fn from_cache<C>(cache: Arc<C>) -> Self
    where
        C: RenderCache + 'static,
    {
        let get_cache = Arc::clone(&cache);
        let set_cache = Arc::clone(&cache);
        let has = if cache.supports_has() {
            let has_cache = Arc::clone(&cache);
            Some(Accessor::sync(move |key| has_cache.has(key)))
        } else {
            None
        };

        Self {
            get: Accessor::sync(move |key| get_cache.get(key)),
            has,
            set: Box::new(move |key, value| set_cache.set(key, value)),
        }
    }

    pub fn get(&self, key: &str, callback: CacheCallback<Option<CachedRender>>) {
        self.get.call(key, callback);
    }

    /// `None` when the cache has no `has` capability; the callback is then
    /// never invoked.
    pub fn has(&self, key: &str, callback: CacheCallback<bool>) -> Option<()> {
        let has = self.has.as_ref()?;
        has.call(key, callback);
        Some(())
    }

    pub fn supports_has(&self) -> bool {
        self.has.is_some()
    }

    pub fn set(&self, key: &str, value: CachedRender) -> anyhow::Result<()> {
        (self.set)(key, value)
    }

    /// Awaitable form of [`CacheAdapter::get`].
    pub async fn lookup(&self, key: &str) -> Option<CachedRender> {
        let (tx, rx) = oneshot::channel();
        self.get(
            key,
            Box::new(move |value| {
                let _ = tx.send(value);
            }),
        );
        match rx.await {
            Ok(value) => value,
            Err(_) => {
                warn!(key, "cache get dropped its callback, treating as a miss");
                None
            }
        }
    }

    /// Awaitable form of [`CacheAdapter::has`].
    pub async fn contains(&self, key: &str) -> Option<bool> {
        let (tx, rx) = oneshot::channel();
        self.has(
            key,
            Box::new(move |hit| {
                let _ = tx.send(hit);
            }),
        )?;
        match rx.await {
            Ok(hit) => Some(hit),
            Err(_) => {
                warn!(key, "cache has dropped its callback, treating as a miss");
                Some(false)
            }
        }
    }
}

impl fmt::Debug for CacheAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheAdapter")
            .field("get", &self.get)
            .field("has", &self.has)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct CacheAdapterBuilder {
    get: Option<Accessor<Option<CachedRender>>>,
    has: Option<Accessor<bool>>,
    set: Option<SetFn>,
}

impl CacheAdapterBuilder {
    pub fn get(mut self, accessor: Accessor<Option<CachedRender>>) -> Self {
        self.get = Some(accessor);
        self
    }

    pub fn has(mut self, accessor: Accessor<bool>) -> Self {
        self.has = Some(accessor);
        self
    }

    pub fn set(
        mut self,
        f: impl Fn(&str, CachedRender) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.set = Some(Box::new(f));
        self
    }

    /// Fails when either `get` or `set` was not supplied.
    pub fn build(self) -> RenderResult<CacheAdapter> {
        let (Some(get), Some(set)) = (self.get, self.set) else {
            return Err(RenderError::config(
                "renderer cache must implement at least get & set",
            ));
        };
        Ok(CacheAdapter {
            get,
            has: self.has,
            set,
        })
    }
}

impl fmt::Debug for CacheAdapterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheAdapterBuilder")
            .field("get", &self.get)
            .field("has", &self.has)
            .field("set", &self.set.is_some())
            .finish()
    }
}
