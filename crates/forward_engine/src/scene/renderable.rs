//! Renderable scene tree node
//!
//! A node is either a group, which only holds children, or a leaf, which
//! holds the geometry and default shader to draw. Children are owned and
//! their order is draw order.

use crate::foundation::math::Transform;
use crate::render::api::{MeshHandle, ShaderHandle};
use crate::render::{RenderError, RenderResult};

/// Drawable data of a leaf node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderableCore {
    /// Shader used by the standard draw
    pub shader: ShaderHandle,
    /// Geometry to draw
    pub mesh: MeshHandle,
    /// Number of indices submitted per draw
    pub index_count: u32,
}

impl RenderableCore {
    /// Create a drawable core
    pub fn new(shader: ShaderHandle, mesh: MeshHandle, index_count: u32) -> Self {
        Self {
            shader,
            mesh,
            index_count,
        }
    }
}

/// Whether a node draws geometry or aggregates children
#[derive(Debug, Clone, PartialEq)]
pub enum RenderableKind {
    /// Traversed, never drawn
    Group(Vec<Renderable>),
    /// Drawn, never traversed
    Leaf(RenderableCore),
}

/// Node in the scene tree
#[derive(Debug, Clone, PartialEq)]
pub struct Renderable {
    /// Name used for lookups and logging
    pub name: String,
    /// Invisible nodes are skipped along with their whole subtree
    pub is_visible: bool,
    /// Local transform read by binders for the model matrix
    pub transform: Transform,
    kind: RenderableKind,
}

impl Renderable {
    /// Create an empty, visible group node
    pub fn group(name: impl Into<String>) -> Self {
        Self::with_kind(name, RenderableKind::Group(Vec::new()))
    }

    /// Create a visible group node with children
    pub fn group_of(name: impl Into<String>, children: Vec<Renderable>) -> Self {
        Self::with_kind(name, RenderableKind::Group(children))
    }

    /// Create a visible leaf node
    pub fn leaf(name: impl Into<String>, core: RenderableCore) -> Self {
        Self::with_kind(name, RenderableKind::Leaf(core))
    }

    fn with_kind(name: impl Into<String>, kind: RenderableKind) -> Self {
        Self {
            name: name.into(),
            is_visible: true,
            transform: Transform::identity(),
            kind,
        }
    }

    /// Set visibility
    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.is_visible = visible;
        self
    }

    /// Set the local transform
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Whether this node is a group
    pub fn is_group(&self) -> bool {
        matches!(self.kind, RenderableKind::Group(_))
    }

    /// Node kind
    pub fn kind(&self) -> &RenderableKind {
        &self.kind
    }

    /// Drawable core of a leaf; `None` for groups
    pub fn core(&self) -> Option<&RenderableCore> {
        match &self.kind {
            RenderableKind::Leaf(core) => Some(core),
            RenderableKind::Group(_) => None,
        }
    }

    /// Children of a group; empty for leaves
    pub fn children(&self) -> &[Renderable] {
        match &self.kind {
            RenderableKind::Group(children) => children,
            RenderableKind::Leaf(_) => &[],
        }
    }

    /// Mutable children of a group; `None` for leaves
    pub fn children_mut(&mut self) -> Option<&mut Vec<Renderable>> {
        match &mut self.kind {
            RenderableKind::Group(children) => Some(children),
            RenderableKind::Leaf(_) => None,
        }
    }

    /// Append a child to a group
    ///
    /// Leaves cannot have children.
    pub fn add_child(&mut self, child: Renderable) -> RenderResult<()> {
        let name = &self.name;
        match &mut self.kind {
            RenderableKind::Group(children) => {
                children.push(child);
                Ok(())
            }
            RenderableKind::Leaf(_) => Err(RenderError::PreconditionViolation(format!(
                "cannot add child '{}' to leaf node '{name}'",
                child.name
            ))),
        }
    }

    /// Depth-first search for a node by name, including this node
    pub fn find(&self, name: &str) -> Option<&Renderable> {
        if self.name == name {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(name))
    }

    /// Mutable depth-first search for a node by name
    pub fn find_mut(&mut self, name: &str) -> Option<&mut Renderable> {
        if self.name == name {
            return Some(self);
        }
        match &mut self.kind {
            RenderableKind::Group(children) => {
                children.iter_mut().find_map(|child| child.find_mut(name))
            }
            RenderableKind::Leaf(_) => None,
        }
    }

    /// Number of leaves in the subtree regardless of visibility
    pub fn leaf_count(&self) -> usize {
        match &self.kind {
            RenderableKind::Leaf(_) => 1,
            RenderableKind::Group(children) => children.iter().map(Renderable::leaf_count).sum(),
        }
    }

    /// Number of leaves a draw traversal of this subtree would draw
    pub fn visible_leaf_count(&self) -> usize {
        if !self.is_visible {
            return 0;
        }
        match &self.kind {
            RenderableKind::Leaf(_) => 1,
            RenderableKind::Group(children) => {
                children.iter().map(Renderable::visible_leaf_count).sum()
            }
        }
    }
}
