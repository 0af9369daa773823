//! Device that logs every call instead of talking to a GPU
//!
//! Useful for headless runs and for eyeballing the call stream of a frame
//! with `RUST_LOG=forward_engine=trace`.

use crate::render::api::{
    BackendResult, Capability, ClearFlags, ColorBuffer, Face, FramebufferHandle, GraphicsDevice,
    MeshHandle, ShaderHandle, TextureFormat, TextureHandle, TextureParameter, Topology,
};
use crate::render::RenderError;
use std::collections::HashSet;

/// Counters collected by [`LoggingDevice`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeviceStats {
    /// Textures created
    pub textures_created: u32,
    /// Textures deleted
    pub textures_deleted: u32,
    /// Framebuffers created
    pub framebuffers_created: u32,
    /// Framebuffers deleted
    pub framebuffers_deleted: u32,
    /// Indexed draws submitted
    pub draw_calls: u64,
    /// Indices submitted across all draws
    pub indices_submitted: u64,
}

/// Graphics device that hands out handles and logs at `trace` level
#[derive(Debug, Default)]
pub struct LoggingDevice {
    next_handle: u32,
    live_textures: HashSet<TextureHandle>,
    live_framebuffers: HashSet<FramebufferHandle>,
    bound_mesh: Option<MeshHandle>,
    stats: DeviceStats,
}

impl LoggingDevice {
    /// Create a device with no resources
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters collected so far
    pub fn stats(&self) -> DeviceStats {
        self.stats
    }

    /// Textures created and not yet deleted
    pub fn live_textures(&self) -> usize {
        self.live_textures.len()
    }

    /// Framebuffers created and not yet deleted
    pub fn live_framebuffers(&self) -> usize {
        self.live_framebuffers.len()
    }

    fn next_id(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl GraphicsDevice for LoggingDevice {
    fn gen_texture(&mut self) -> BackendResult<TextureHandle> {
        let texture = TextureHandle(self.next_id());
        self.live_textures.insert(texture);
        self.stats.textures_created += 1;
        log::trace!("gen_texture -> {texture:?}");
        Ok(texture)
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        if self.live_textures.remove(&texture) {
            self.stats.textures_deleted += 1;
            log::trace!("delete_texture({texture:?})");
        } else {
            log::warn!("delete_texture({texture:?}) on unknown texture");
        }
    }

    fn active_texture(&mut self, unit: u32) {
        log::trace!("active_texture({unit})");
    }

    fn bind_texture(&mut self, texture: Option<TextureHandle>) {
        log::trace!("bind_texture({texture:?})");
    }

    fn tex_image_2d(&mut self, format: TextureFormat, width: u32, height: u32) -> BackendResult<()> {
        if width == 0 || height == 0 {
            return Err(RenderError::ResourceCreationFailed(format!(
                "{format:?} texture storage of {width}x{height}"
            )));
        }
        log::trace!("tex_image_2d({format:?}, {width}, {height})");
        Ok(())
    }

    fn tex_parameter(&mut self, parameter: TextureParameter) {
        log::trace!("tex_parameter({parameter:?})");
    }

    fn gen_framebuffer(&mut self) -> BackendResult<FramebufferHandle> {
        let framebuffer = FramebufferHandle(self.next_id());
        self.live_framebuffers.insert(framebuffer);
        self.stats.framebuffers_created += 1;
        log::trace!("gen_framebuffer -> {framebuffer:?}");
        Ok(framebuffer)
    }

    fn delete_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        if self.live_framebuffers.remove(&framebuffer) {
            self.stats.framebuffers_deleted += 1;
            log::trace!("delete_framebuffer({framebuffer:?})");
        } else {
            log::warn!("delete_framebuffer({framebuffer:?}) on unknown framebuffer");
        }
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>) {
        log::trace!("bind_framebuffer({framebuffer:?})");
    }

    fn framebuffer_depth_texture(&mut self, texture: TextureHandle) {
        log::trace!("framebuffer_depth_texture({texture:?})");
    }

    fn draw_buffers(&mut self, buffers: &[ColorBuffer]) {
        log::trace!("draw_buffers({buffers:?})");
    }

    fn read_buffer(&mut self, buffer: ColorBuffer) {
        log::trace!("read_buffer({buffer:?})");
    }

    fn clear(&mut self, flags: ClearFlags) {
        log::trace!("clear({flags:?})");
    }

    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        log::trace!("viewport({x}, {y}, {width}, {height})");
    }

    fn enable(&mut self, capability: Capability) {
        log::trace!("enable({capability:?})");
    }

    fn disable(&mut self, capability: Capability) {
        log::trace!("disable({capability:?})");
    }

    fn cull_face(&mut self, face: Face) {
        log::trace!("cull_face({face:?})");
    }

    fn polygon_offset(&mut self, factor: f32, units: f32) {
        log::trace!("polygon_offset({factor}, {units})");
    }

    fn use_program(&mut self, shader: ShaderHandle) {
        log::trace!("use_program({shader:?})");
    }

    fn bind_mesh(&mut self, mesh: Option<MeshHandle>) {
        self.bound_mesh = mesh;
        log::trace!("bind_mesh({mesh:?})");
    }

    fn draw_elements(&mut self, topology: Topology, index_count: u32) -> BackendResult<()> {
        if self.bound_mesh.is_none() {
            return Err(RenderError::BackendError(
                "draw_elements with no mesh bound".to_string(),
            ));
        }
        self.stats.draw_calls += 1;
        self.stats.indices_submitted += u64::from(index_count);
        log::trace!("draw_elements({topology:?}, {index_count})");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_unique_and_tracked() {
        let mut device = LoggingDevice::new();
        let a = device.gen_texture().unwrap();
        let b = device.gen_texture().unwrap();
        let fb = device.gen_framebuffer().unwrap();

        assert_ne!(a, b);
        assert_eq!(device.live_textures(), 2);

        device.delete_texture(a);
        device.delete_texture(a);
        device.delete_framebuffer(fb);

        assert_eq!(device.live_textures(), 1);
        assert_eq!(device.live_framebuffers(), 0);
        assert_eq!(device.stats().textures_deleted, 1);
    }

    #[test]
    fn test_draw_requires_bound_mesh() {
        let mut device = LoggingDevice::new();
        assert!(device.draw_elements(Topology::Triangles, 3).is_err());

        device.bind_mesh(Some(MeshHandle(1)));
        device.draw_elements(Topology::Triangles, 36).unwrap();
        device.draw_elements(Topology::Lines, 4).unwrap();

        let stats = device.stats();
        assert_eq!(stats.draw_calls, 2);
        assert_eq!(stats.indices_submitted, 40);
    }

    #[test]
    fn test_zero_sized_texture_is_rejected() {
        let mut device = LoggingDevice::new();
        assert!(matches!(
            device.tex_image_2d(TextureFormat::Depth32, 0, 512),
            Err(RenderError::ResourceCreationFailed(_))
        ));
    }
}
