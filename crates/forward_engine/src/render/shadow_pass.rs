//! Shadow pass state machine
//!
//! ```text
//! Unprepared --setup_shadow_pass--> Ready --begin_shadow_pass--> Active
//!                                     ^                            |
//!                                     +-------end_shadow_pass------+
//! ```
//!
//! `enable_shadow_light` is only legal while `Active` and may run once per
//! shadow-casting light. Calls outside their legal state are rejected before
//! any device call is issued.

use super::api::{
    Capability, ClearFlags, ColorBuffer, Face, FramebufferHandle, RenderBinder, ShaderHandle,
};
use super::forward_renderer::ForwardRenderer;
use super::systems::lighting::Light;
use super::{RenderError, RenderResult};
use crate::scene::Renderable;

/// Where the renderer is in the shadow pass lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowPassState {
    /// Shadow framebuffer not allocated yet
    Unprepared,
    /// Framebuffer allocated, not inside a shadow pass
    Ready,
    /// Inside a shadow pass; holds the slot of the light being rendered
    Active {
        /// Slot of the light whose shadow map is the current depth target
        light: Option<usize>,
    },
}

impl ShadowPassState {
    /// Whether a shadow pass is in progress
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }
}

impl ForwardRenderer {
    /// Current shadow pass state
    pub fn shadow_pass_state(&self) -> ShadowPassState {
        self.shadow_state
    }

    /// Shared shadow framebuffer, once set up
    pub fn shadow_framebuffer(&self) -> Option<FramebufferHandle> {
        self.shadow_framebuffer
    }

    /// Light currently bound as the shadow render target
    pub fn current_shadow_light(&self) -> Option<&Light> {
        match self.shadow_state {
            ShadowPassState::Active { light: Some(index) } => self.lights.get(index),
            _ => None,
        }
    }

    /// Allocate the shared shadow framebuffer
    ///
    /// Must run once before the first shadow pass. The framebuffer writes
    /// depth only: all color draw and read buffers are disabled.
    pub fn setup_shadow_pass(&mut self) -> RenderResult<()> {
        if self.shadow_state != ShadowPassState::Unprepared {
            return Err(self.illegal_transition("setup_shadow_pass"));
        }

        let framebuffer = self.device.gen_framebuffer()?;
        self.device.bind_framebuffer(Some(framebuffer));
        self.device.draw_buffers(&[ColorBuffer::None]);
        self.device.read_buffer(ColorBuffer::None);
        self.device.bind_framebuffer(None);

        self.shadow_framebuffer = Some(framebuffer);
        self.shadow_state = ShadowPassState::Ready;
        log::info!("Shadow framebuffer {framebuffer:?} created");
        Ok(())
    }

    /// Bind the shadow framebuffer and switch to shadow rendering state
    ///
    /// Front faces are culled and polygon offset is enabled to keep surfaces
    /// from shadowing themselves. The light list is validated first, since
    /// shadow sub-passes walk the shadow-caster prefix.
    pub fn begin_shadow_pass(&mut self) -> RenderResult<()> {
        if self.shadow_state != ShadowPassState::Ready {
            return Err(self.illegal_transition("begin_shadow_pass"));
        }
        let framebuffer = self
            .shadow_framebuffer
            .ok_or_else(|| RenderError::PreconditionViolation("shadow framebuffer missing".to_string()))?;
        self.lights.validate()?;

        self.device.bind_framebuffer(Some(framebuffer));
        self.device.enable(Capability::PolygonOffsetFill);
        self.device.polygon_offset(
            self.shadow_config.polygon_offset_factor,
            self.shadow_config.polygon_offset_units,
        );
        self.device.enable(Capability::CullFace);
        self.device.cull_face(Face::Front);

        self.shadow_state = ShadowPassState::Active { light: None };
        log::debug!(
            "Shadow pass started ({} shadow-casting lights)",
            self.lights.active_shadow_light_count()
        );
        Ok(())
    }

    /// Make an active light's shadow map the current depth target
    ///
    /// Recomputes the light's shadow matrices, attaches its depth texture,
    /// clears it, and sets the viewport to the map size. Draws issued
    /// afterwards render into this light's shadow map.
    pub fn enable_shadow_light(&mut self, index: usize) -> RenderResult<()> {
        if !self.shadow_state.is_active() {
            return Err(self.illegal_transition("enable_shadow_light"));
        }

        let light = self.lights.get_mut(index).ok_or_else(|| {
            RenderError::PreconditionViolation(format!("no active light in slot {index}"))
        })?;
        light.update_shadow_map_data();
        let shadow_map = light.shadow_map().ok_or_else(|| {
            RenderError::PreconditionViolation(format!(
                "light in slot {index} has no shadow map"
            ))
        })?;
        let (texture, size) = (shadow_map.texture(), shadow_map.texture_size());

        self.device.framebuffer_depth_texture(texture);
        self.device.clear(ClearFlags::DEPTH);
        self.device.viewport(0, 0, size, size);

        self.shadow_state = ShadowPassState::Active { light: Some(index) };
        log::trace!("Shadow light {index} enabled ({size}x{size} map {texture:?})");
        Ok(())
    }

    /// Restore normal rendering state after all shadow sub-passes
    ///
    /// Back-face culling is restored then culling and polygon offset are
    /// disabled, the default framebuffer is bound again, and the viewport is
    /// reset to the output resolution.
    pub fn end_shadow_pass(&mut self) -> RenderResult<()> {
        if !self.shadow_state.is_active() {
            return Err(self.illegal_transition("end_shadow_pass"));
        }

        self.device.cull_face(Face::Back);
        self.device.disable(Capability::CullFace);
        self.device.disable(Capability::PolygonOffsetFill);
        self.device.bind_framebuffer(None);
        let (width, height) = self.resolution();
        self.device.viewport(0, 0, width, height);

        self.shadow_state = ShadowPassState::Ready;
        log::debug!("Shadow pass ended");
        Ok(())
    }

    /// Render every shadow-casting light's shadow map for this frame
    ///
    /// Draws `scene` once per shadow caster with `shadow_shader`, using that
    /// light's shadow projection and view. The pass is always closed, even
    /// when a sub-pass fails.
    pub fn render_shadow_maps(
        &mut self,
        scene: &Renderable,
        shadow_shader: ShaderHandle,
        binder: &mut dyn RenderBinder,
    ) -> RenderResult<()> {
        self.begin_shadow_pass()?;
        let result = self.render_shadow_sub_passes(scene, shadow_shader, binder);
        let ended = self.end_shadow_pass();
        result.and(ended)
    }

    fn render_shadow_sub_passes(
        &mut self,
        scene: &Renderable,
        shadow_shader: ShaderHandle,
        binder: &mut dyn RenderBinder,
    ) -> RenderResult<()> {
        for index in 0..self.lights.active_shadow_light_count() {
            self.enable_shadow_light(index)?;

            let shadow_map = self
                .lights
                .get(index)
                .and_then(Light::shadow_map)
                .ok_or_else(|| {
                    RenderError::PreconditionViolation(format!("light {index} lost its shadow map"))
                })?;
            let (projection, view) = (*shadow_map.projection(), *shadow_map.view());

            self.draw_renderable_with_shader(scene, shadow_shader, binder, &projection, &view)?;
        }
        Ok(())
    }

    fn illegal_transition(&self, operation: &str) -> RenderError {
        log::warn!("Rejected {operation} in shadow pass state {:?}", self.shadow_state);
        RenderError::PreconditionViolation(format!(
            "{operation} is not allowed in shadow pass state {:?}",
            self.shadow_state
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::render::tests::recording_device::{DeviceCall, RecordingDevice};

    fn ready_renderer() -> (ForwardRenderer, RecordingDevice) {
        let device = RecordingDevice::new();
        let mut renderer = ForwardRenderer::new(Box::new(device.clone()));
        renderer.initialize(800, 600).unwrap();
        renderer.setup_shadow_pass().unwrap();
        (renderer, device)
    }

    #[test]
    fn test_setup_configures_depth_only_framebuffer() {
        let device = RecordingDevice::new();
        let mut renderer = ForwardRenderer::new(Box::new(device.clone()));

        renderer.setup_shadow_pass().unwrap();

        let fb = device.framebuffers_allocated()[0];
        assert_eq!(
            device.calls(),
            vec![
                DeviceCall::GenFramebuffer(fb),
                DeviceCall::BindFramebuffer(Some(fb)),
                DeviceCall::DrawBuffers(vec![ColorBuffer::None]),
                DeviceCall::ReadBuffer(ColorBuffer::None),
                DeviceCall::BindFramebuffer(None),
            ]
        );
        assert_eq!(renderer.shadow_pass_state(), ShadowPassState::Ready);
    }

    #[test]
    fn test_setup_twice_is_rejected() {
        let (mut renderer, device) = ready_renderer();
        device.clear_calls();

        assert!(matches!(renderer.setup_shadow_pass(), Err(RenderError::PreconditionViolation(_))));
        assert!(device.calls().is_empty());
        assert_eq!(device.framebuffers_allocated().len(), 1);
    }

    #[test]
    fn test_begin_before_setup_is_rejected() {
        let device = RecordingDevice::new();
        let mut renderer = ForwardRenderer::new(Box::new(device.clone()));

        assert!(renderer.begin_shadow_pass().is_err());
        assert!(device.calls().is_empty());
        assert_eq!(renderer.shadow_pass_state(), ShadowPassState::Unprepared);
    }

    #[test]
    fn test_begin_sets_culling_and_offset() {
        let (mut renderer, device) = ready_renderer();
        device.clear_calls();

        renderer.begin_shadow_pass().unwrap();

        let fb = device.framebuffers_allocated()[0];
        assert_eq!(
            device.calls(),
            vec![
                DeviceCall::BindFramebuffer(Some(fb)),
                DeviceCall::Enable(Capability::PolygonOffsetFill),
                DeviceCall::PolygonOffset(4.0, 4.0),
                DeviceCall::Enable(Capability::CullFace),
                DeviceCall::CullFace(Face::Front),
            ]
        );
        assert_eq!(renderer.shadow_pass_state(), ShadowPassState::Active { light: None });
        assert!(renderer.current_shadow_light().is_none());
    }

    #[test]
    fn test_reentering_begin_is_rejected() {
        let (mut renderer, device) = ready_renderer();
        renderer.begin_shadow_pass().unwrap();
        device.clear_calls();

        assert!(renderer.begin_shadow_pass().is_err());
        assert!(device.calls().is_empty());
        assert!(renderer.shadow_pass_state().is_active());
    }

    #[test]
    fn test_enable_and_end_outside_pass_are_rejected() {
        let (mut renderer, device) = ready_renderer();
        device.clear_calls();

        assert!(renderer.enable_shadow_light(0).is_err());
        assert!(renderer.end_shadow_pass().is_err());
        assert!(device.calls().is_empty());
    }

    #[test]
    fn test_enable_light_without_shadow_map_is_rejected() {
        let (mut renderer, device) = ready_renderer();
        renderer.add_light(Light::new()).unwrap();
        renderer.begin_shadow_pass().unwrap();
        device.clear_calls();

        let result = renderer.enable_shadow_light(0);

        assert!(matches!(result, Err(RenderError::PreconditionViolation(_))));
        assert!(device.calls().is_empty());
        assert!(renderer.current_shadow_light().is_none());
    }

    #[test]
    fn test_enable_binds_light_texture_and_viewport() {
        let (mut renderer, device) = ready_renderer();
        renderer.add_light(Light::new().with_position(Vec3::new(0.0, 10.0, 10.0))).unwrap();
        renderer
            .attach_shadow_caster_with(0, 512, 1.0, 40.0, Vec3::new(0.0, -1.0, -1.0))
            .unwrap();
        renderer.begin_shadow_pass().unwrap();
        device.clear_calls();

        renderer.enable_shadow_light(0).unwrap();

        let texture = renderer.lights().get(0).unwrap().shadow_map().unwrap().texture();
        assert_eq!(
            device.calls(),
            vec![
                DeviceCall::FramebufferDepthTexture(texture),
                DeviceCall::Clear(ClearFlags::DEPTH),
                DeviceCall::Viewport(0, 0, 512, 512),
            ]
        );
        let current = renderer.current_shadow_light().unwrap();
        assert_eq!(current.position, Vec3::new(0.0, 10.0, 10.0));
        assert_ne!(*current.shadow_map().unwrap().view(), crate::foundation::math::Mat4::identity());
    }

    #[test]
    fn test_end_restores_state_and_viewport() {
        let (mut renderer, device) = ready_renderer();
        renderer.begin_shadow_pass().unwrap();
        device.clear_calls();

        renderer.end_shadow_pass().unwrap();

        assert_eq!(
            device.calls(),
            vec![
                DeviceCall::CullFace(Face::Back),
                DeviceCall::Disable(Capability::CullFace),
                DeviceCall::Disable(Capability::PolygonOffsetFill),
                DeviceCall::BindFramebuffer(None),
                DeviceCall::Viewport(0, 0, 800, 600),
            ]
        );
        assert_eq!(renderer.shadow_pass_state(), ShadowPassState::Ready);

        // The pass can be entered again next frame
        renderer.begin_shadow_pass().unwrap();
        renderer.end_shadow_pass().unwrap();
    }

    #[test]
    fn test_begin_rejects_out_of_order_shadow_casters() {
        let (mut renderer, device) = ready_renderer();
        let mut caster = Light::new();
        caster
            .attach_shadow_caster(renderer.device_mut(), 256, 1.0, 20.0, Vec3::new(0.0, 0.0, -1.0))
            .unwrap();
        renderer.lights_mut().unwrap().set(0, Some(Light::new())).unwrap();
        renderer.lights_mut().unwrap().set(1, Some(caster)).unwrap();
        device.clear_calls();

        assert!(matches!(renderer.begin_shadow_pass(), Err(RenderError::PreconditionViolation(_))));
        assert!(device.calls().is_empty());
        assert_eq!(renderer.shadow_pass_state(), ShadowPassState::Ready);

        renderer.lights_mut().unwrap().sort_shadow_casters_first();
        assert!(renderer.begin_shadow_pass().is_ok());
    }

    #[test]
    fn test_light_list_is_locked_during_pass() {
        let (mut renderer, _device) = ready_renderer();
        renderer.add_light(Light::new()).unwrap();
        renderer.begin_shadow_pass().unwrap();

        assert!(renderer.remove_light(0).is_err());
        assert!(renderer.attach_shadow_caster(0, Vec3::new(0.0, 0.0, -1.0)).is_err());

        renderer.end_shadow_pass().unwrap();
        assert!(renderer.remove_light(0).is_ok());
    }
}
