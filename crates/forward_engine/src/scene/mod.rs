//! Scene tree
//!
//! Drawable nodes organised as an owned tree. The renderer walks it once per
//! pass: group nodes are traversed, leaf nodes are drawn, and invisible nodes
//! prune their subtree.

mod renderable;

pub use renderable::{Renderable, RenderableCore, RenderableKind};
