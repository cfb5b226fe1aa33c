//! # stream-render
//!
//! Streams a node tree to an async sink as HTML, one write at a time,
//! memoizing the output of cacheable components.
//!
//! The core is [`RenderContext`], a non-recursive stack machine that hands
//! out one [`Step`] per suspension. [`drive`] runs it against any
//! `AsyncWrite`, and [`StreamRenderer`] wires it to the bundled node model
//! and LRU cache.

pub mod cache;
pub mod config;
pub mod error;
pub mod node;
pub mod renderer;

#[cfg(test)]
mod tests;

pub use cache::*;
pub use config::*;
pub use error::*;
pub use node::*;
pub use renderer::*;
