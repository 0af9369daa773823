//! Scene-tree draw traversal

use super::api::{BindContext, GraphicsDevice, RenderBinder, ShaderHandle, Topology};
use super::forward_renderer::ForwardRenderer;
use super::shadow_pass::ShadowPassState;
use super::systems::lighting::{ActiveLights, Light};
use super::RenderResult;
use crate::foundation::math::Mat4;
use crate::scene::{Renderable, RenderableKind};

/// Which program a leaf is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderSelection {
    /// The leaf's own shader
    NodeShader,
    /// One shader for every leaf in the traversal
    Override(ShaderHandle),
}

/// Per-traversal draw parameters, fixed for the whole tree walk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawContext {
    /// Program selection
    pub shader: ShaderSelection,
    /// Projection matrix handed to the binder
    pub projection: Mat4,
    /// View matrix handed to the binder
    pub view: Mat4,
    /// Primitive topology of every draw
    pub topology: Topology,
}

impl DrawContext {
    /// Draw with each leaf's own shader as triangles
    pub fn standard(projection: Mat4, view: Mat4) -> Self {
        Self {
            shader: ShaderSelection::NodeShader,
            projection,
            view,
            topology: Topology::Triangles,
        }
    }

    /// Draw every leaf with `shader`
    pub fn with_shader(mut self, shader: ShaderHandle) -> Self {
        self.shader = ShaderSelection::Override(shader);
        self
    }

    /// Draw every leaf with `topology`
    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }
}

/// Device and light state shared by every node of one traversal
struct Traversal<'a> {
    device: &'a mut dyn GraphicsDevice,
    lights: &'a ActiveLights,
    shadow_light: Option<&'a Light>,
    context: &'a DrawContext,
}

impl Traversal<'_> {
    fn draw_node(&mut self, node: &Renderable, binder: &mut dyn RenderBinder) -> RenderResult<usize> {
        if !node.is_visible {
            return Ok(0);
        }

        match node.kind() {
            RenderableKind::Group(children) => {
                let mut draws = 0;
                for child in children {
                    draws += self.draw_node(child, binder)?;
                }
                Ok(draws)
            }
            RenderableKind::Leaf(core) => {
                let shader = match self.context.shader {
                    ShaderSelection::NodeShader => core.shader,
                    ShaderSelection::Override(shader) => shader,
                };

                self.device.use_program(shader);
                self.device.bind_mesh(Some(core.mesh));

                let bind_context = BindContext {
                    shader,
                    node,
                    projection: &self.context.projection,
                    view: &self.context.view,
                    lights: self.lights,
                    shadow_light: self.shadow_light,
                };
                // The mesh is unbound even when binding or drawing fails
                let result = match binder.bind(&bind_context, self.device) {
                    Ok(()) => self.device.draw_elements(self.context.topology, core.index_count),
                    Err(err) => Err(err),
                };
                self.device.bind_mesh(None);
                result.map(|()| 1)
            }
        }
    }
}

impl ForwardRenderer {
    /// Draw a subtree with each leaf's own shader
    ///
    /// Returns the number of leaves drawn.
    pub fn draw_renderable(
        &mut self,
        node: &Renderable,
        binder: &mut dyn RenderBinder,
        projection: &Mat4,
        view: &Mat4,
    ) -> RenderResult<usize> {
        self.draw_with_context(node, binder, &DrawContext::standard(*projection, *view))
    }

    /// Draw a subtree with one shader for every leaf
    ///
    /// Used for the depth-only shadow sub-passes and for debug views.
    pub fn draw_renderable_with_shader(
        &mut self,
        node: &Renderable,
        shader: ShaderHandle,
        binder: &mut dyn RenderBinder,
        projection: &Mat4,
        view: &Mat4,
    ) -> RenderResult<usize> {
        let context = DrawContext::standard(*projection, *view).with_shader(shader);
        self.draw_with_context(node, binder, &context)
    }

    /// Draw a subtree as lines with one shader for every leaf
    pub fn draw_lines(
        &mut self,
        node: &Renderable,
        shader: ShaderHandle,
        binder: &mut dyn RenderBinder,
        projection: &Mat4,
        view: &Mat4,
    ) -> RenderResult<usize> {
        let context = DrawContext::standard(*projection, *view)
            .with_shader(shader)
            .with_topology(Topology::Lines);
        self.draw_with_context(node, binder, &context)
    }

    fn draw_with_context(
        &mut self,
        node: &Renderable,
        binder: &mut dyn RenderBinder,
        context: &DrawContext,
    ) -> RenderResult<usize> {
        let shadow_light = match self.shadow_state {
            ShadowPassState::Active { light: Some(index) } => self.lights.get(index),
            _ => None,
        };

        let mut traversal = Traversal {
            device: self.device.as_mut(),
            lights: &self.lights,
            shadow_light,
            context,
        };
        let draws = traversal.draw_node(node, binder)?;
        log::trace!("Drew {draws} leaves of '{}'", node.name);
        Ok(draws)
    }
}
