//! Per-draw binder contract
//!
//! The renderer decides what gets drawn; the binder decides what the shader
//! sees. Before every leaf draw the renderer hands the binder a
//! [`BindContext`] and mutable device access, and the binder uploads the
//! model transform, the light array, and any shadow matrices or textures the
//! bound shader expects.

use super::graphics_device::{GraphicsDevice, ShaderHandle};
use crate::foundation::math::Mat4;
use crate::render::systems::lighting::{ActiveLights, Light};
use crate::render::RenderResult;
use crate::scene::Renderable;

/// Everything a binder may read for one leaf draw
#[derive(Debug, Clone, Copy)]
pub struct BindContext<'a> {
    /// Program that is current for this draw
    pub shader: ShaderHandle,
    /// Leaf node being drawn
    pub node: &'a Renderable,
    /// Projection matrix supplied by the caller of the traversal
    pub projection: &'a Mat4,
    /// View matrix supplied by the caller of the traversal
    pub view: &'a Mat4,
    /// Active lights, shadow casters first
    pub lights: &'a ActiveLights,
    /// Light whose shadow map is the current render target, if inside a
    /// shadow sub-pass
    pub shadow_light: Option<&'a Light>,
}

impl BindContext<'_> {
    /// Model matrix of the node being drawn
    pub fn model_matrix(&self) -> Mat4 {
        self.node.transform.to_matrix()
    }

    /// Combined projection * view * model matrix
    pub fn mvp_matrix(&self) -> Mat4 {
        self.projection * self.view * self.model_matrix()
    }

    /// True while rendering into a shadow map
    pub fn is_shadow_pass(&self) -> bool {
        self.shadow_light.is_some()
    }
}

/// Supplies per-draw shader inputs
pub trait RenderBinder {
    /// Upload all uniforms for the draw described by `context`
    fn bind(&mut self, context: &BindContext<'_>, device: &mut dyn GraphicsDevice) -> RenderResult<()>;
}

impl<F> RenderBinder for F
where
    F: FnMut(&BindContext<'_>, &mut dyn GraphicsDevice) -> RenderResult<()>,
{
    fn bind(&mut self, context: &BindContext<'_>, device: &mut dyn GraphicsDevice) -> RenderResult<()> {
        self(context, device)
    }
}
