//! Graphics device double that records every call
//!
//! Clones share one call log, so a test can keep a handle while the
//! renderer owns a boxed clone.

use crate::render::api::{
    BackendResult, Capability, ClearFlags, ColorBuffer, Face, FramebufferHandle, GraphicsDevice,
    MeshHandle, ShaderHandle, TextureFormat, TextureHandle, TextureParameter, Topology,
};
use crate::render::RenderError;
use std::cell::RefCell;
use std::rc::Rc;

/// One recorded device call with its arguments
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    GenTexture(TextureHandle),
    DeleteTexture(TextureHandle),
    ActiveTexture(u32),
    BindTexture(Option<TextureHandle>),
    TexImage2d(TextureFormat, u32, u32),
    TexParameter(TextureParameter),
    GenFramebuffer(FramebufferHandle),
    DeleteFramebuffer(FramebufferHandle),
    BindFramebuffer(Option<FramebufferHandle>),
    FramebufferDepthTexture(TextureHandle),
    DrawBuffers(Vec<ColorBuffer>),
    ReadBuffer(ColorBuffer),
    Clear(ClearFlags),
    Viewport(i32, i32, u32, u32),
    Enable(Capability),
    Disable(Capability),
    CullFace(Face),
    PolygonOffset(f32, f32),
    UseProgram(ShaderHandle),
    BindMesh(Option<MeshHandle>),
    DrawElements(Topology, u32),
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<DeviceCall>,
    next_handle: u32,
    textures_allocated: Vec<TextureHandle>,
    textures_released: Vec<TextureHandle>,
    framebuffers_allocated: Vec<FramebufferHandle>,
    framebuffers_released: Vec<FramebufferHandle>,
    fail_gen_texture: bool,
    fail_tex_image: bool,
    fail_draws: bool,
}

/// Device that records calls instead of executing them
#[derive(Debug, Default, Clone)]
pub struct RecordingDevice {
    state: Rc<RefCell<State>>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call recorded since creation or the last `clear_calls`
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn textures_allocated(&self) -> usize {
        self.state.borrow().textures_allocated.len()
    }

    pub fn textures_released(&self) -> usize {
        self.state.borrow().textures_released.len()
    }

    /// Deleted textures in deletion order
    pub fn released_textures(&self) -> Vec<TextureHandle> {
        self.state.borrow().textures_released.clone()
    }

    pub fn framebuffers_allocated(&self) -> Vec<FramebufferHandle> {
        self.state.borrow().framebuffers_allocated.clone()
    }

    pub fn framebuffers_released(&self) -> usize {
        self.state.borrow().framebuffers_released.len()
    }

    /// Number of indexed draws submitted
    pub fn draw_count(&self) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| matches!(call, DeviceCall::DrawElements(..)))
            .count()
    }

    /// Depth attachments in attachment order
    pub fn depth_attachments(&self) -> Vec<TextureHandle> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                DeviceCall::FramebufferDepthTexture(texture) => Some(*texture),
                _ => None,
            })
            .collect()
    }

    /// Last face selected for culling
    pub fn last_cull_face(&self) -> Option<Face> {
        self.state.borrow().calls.iter().rev().find_map(|call| match call {
            DeviceCall::CullFace(face) => Some(*face),
            _ => None,
        })
    }

    pub fn fail_gen_texture(&self, fail: bool) {
        self.state.borrow_mut().fail_gen_texture = fail;
    }

    pub fn fail_tex_image(&self, fail: bool) {
        self.state.borrow_mut().fail_tex_image = fail;
    }

    pub fn fail_draws(&self, fail: bool) {
        self.state.borrow_mut().fail_draws = fail;
    }

    fn record(&self, call: DeviceCall) {
        self.state.borrow_mut().calls.push(call);
    }

    fn next_id(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        state.next_handle += 1;
        state.next_handle
    }
}

impl GraphicsDevice for RecordingDevice {
    fn gen_texture(&mut self) -> BackendResult<TextureHandle> {
        if self.state.borrow().fail_gen_texture {
            return Err(RenderError::ResourceCreationFailed("texture name".to_string()));
        }
        let texture = TextureHandle(self.next_id());
        self.state.borrow_mut().textures_allocated.push(texture);
        self.record(DeviceCall::GenTexture(texture));
        Ok(texture)
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        self.state.borrow_mut().textures_released.push(texture);
        self.record(DeviceCall::DeleteTexture(texture));
    }

    fn active_texture(&mut self, unit: u32) {
        self.record(DeviceCall::ActiveTexture(unit));
    }

    fn bind_texture(&mut self, texture: Option<TextureHandle>) {
        self.record(DeviceCall::BindTexture(texture));
    }

    fn tex_image_2d(&mut self, format: TextureFormat, width: u32, height: u32) -> BackendResult<()> {
        self.record(DeviceCall::TexImage2d(format, width, height));
        if self.state.borrow().fail_tex_image {
            return Err(RenderError::ResourceCreationFailed("texture storage".to_string()));
        }
        Ok(())
    }

    fn tex_parameter(&mut self, parameter: TextureParameter) {
        self.record(DeviceCall::TexParameter(parameter));
    }

    fn gen_framebuffer(&mut self) -> BackendResult<FramebufferHandle> {
        let framebuffer = FramebufferHandle(self.next_id());
        self.state.borrow_mut().framebuffers_allocated.push(framebuffer);
        self.record(DeviceCall::GenFramebuffer(framebuffer));
        Ok(framebuffer)
    }

    fn delete_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        self.state.borrow_mut().framebuffers_released.push(framebuffer);
        self.record(DeviceCall::DeleteFramebuffer(framebuffer));
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>) {
        self.record(DeviceCall::BindFramebuffer(framebuffer));
    }

    fn framebuffer_depth_texture(&mut self, texture: TextureHandle) {
        self.record(DeviceCall::FramebufferDepthTexture(texture));
    }

    fn draw_buffers(&mut self, buffers: &[ColorBuffer]) {
        self.record(DeviceCall::DrawBuffers(buffers.to_vec()));
    }

    fn read_buffer(&mut self, buffer: ColorBuffer) {
        self.record(DeviceCall::ReadBuffer(buffer));
    }

    fn clear(&mut self, flags: ClearFlags) {
        self.record(DeviceCall::Clear(flags));
    }

    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.record(DeviceCall::Viewport(x, y, width, height));
    }

    fn enable(&mut self, capability: Capability) {
        self.record(DeviceCall::Enable(capability));
    }

    fn disable(&mut self, capability: Capability) {
        self.record(DeviceCall::Disable(capability));
    }

    fn cull_face(&mut self, face: Face) {
        self.record(DeviceCall::CullFace(face));
    }

    fn polygon_offset(&mut self, factor: f32, units: f32) {
        self.record(DeviceCall::PolygonOffset(factor, units));
    }

    fn use_program(&mut self, shader: ShaderHandle) {
        self.record(DeviceCall::UseProgram(shader));
    }

    fn bind_mesh(&mut self, mesh: Option<MeshHandle>) {
        self.record(DeviceCall::BindMesh(mesh));
    }

    fn draw_elements(&mut self, topology: Topology, index_count: u32) -> BackendResult<()> {
        if self.state.borrow().fail_draws {
            return Err(RenderError::BackendError("draw submission rejected".to_string()));
        }
        self.record(DeviceCall::DrawElements(topology, index_count));
        Ok(())
    }
}
