//! Forward renderer state and resolution lifecycle

use super::api::{FramebufferHandle, GraphicsDevice};
use super::shadow_pass::ShadowPassState;
use super::systems::lighting::{ActiveLights, Light};
use super::window::PresentSurface;
use super::{RenderError, RenderResult};
use crate::core::{RendererConfig, ShadowConfig};
use crate::foundation::math::Vec3;
use crate::foundation::time::FrameClock;

/// Callback run after the output resolution changes
///
/// Receives the renderer and the new width and height. Used to resize
/// overlays or camera projections that depend on the output size.
pub type ResizeCallback = Box<dyn FnMut(&mut ForwardRenderer, u32, u32)>;

/// Forward renderer with per-light shadow mapping
///
/// Owns the graphics device, the active lights and the shadow framebuffer
/// shared by every shadow-casting light. See the module docs of
/// [`crate::render`] for the per-frame call order.
pub struct ForwardRenderer {
    pub(super) device: Box<dyn GraphicsDevice>,
    pub(super) lights: ActiveLights,
    pub(super) shadow_config: ShadowConfig,
    pub(super) shadow_framebuffer: Option<FramebufferHandle>,
    pub(super) shadow_state: ShadowPassState,
    width: u32,
    height: u32,
    clock: FrameClock,
    on_screen_size_changed: Option<ResizeCallback>,
}

impl std::fmt::Debug for ForwardRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForwardRenderer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("lights", &self.lights)
            .field("shadow_framebuffer", &self.shadow_framebuffer)
            .field("shadow_state", &self.shadow_state)
            .finish_non_exhaustive()
    }
}

impl ForwardRenderer {
    /// Create a renderer on top of a device
    ///
    /// The renderer has no resolution until [`ForwardRenderer::initialize`]
    /// runs.
    pub fn new(device: Box<dyn GraphicsDevice>) -> Self {
        Self {
            device,
            lights: ActiveLights::new(),
            shadow_config: ShadowConfig::default(),
            shadow_framebuffer: None,
            shadow_state: ShadowPassState::Unprepared,
            width: 0,
            height: 0,
            clock: FrameClock::new(),
            on_screen_size_changed: None,
        }
    }

    /// Create and initialize a renderer from configuration
    pub fn from_config(device: Box<dyn GraphicsDevice>, config: &RendererConfig) -> RenderResult<Self> {
        config
            .shadow
            .validate()
            .map_err(|e| RenderError::InvalidParameter(e.to_string()))?;

        let mut renderer = Self::new(device);
        renderer.shadow_config = config.shadow.clone();
        renderer.initialize(config.width, config.height)?;
        Ok(renderer)
    }

    /// Set the output resolution
    pub fn initialize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidParameter(format!(
                "resolution must be non-zero, got {width}x{height}"
            )));
        }
        self.width = width;
        self.height = height;
        log::info!("Forward renderer initialized at {width}x{height}");
        Ok(())
    }

    /// Re-initialize for a new output size and run the resize callback
    ///
    /// The callback may install a replacement through
    /// [`ForwardRenderer::set_resize_callback`]; the replacement is kept and
    /// runs on the next change.
    pub fn change_resolution(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.initialize(width, height)?;

        if let Some(mut callback) = self.on_screen_size_changed.take() {
            callback(self, width, height);
            if self.on_screen_size_changed.is_none() {
                self.on_screen_size_changed = Some(callback);
            }
        }
        Ok(())
    }

    /// Replace the resize callback
    pub fn set_resize_callback(&mut self, callback: impl FnMut(&mut ForwardRenderer, u32, u32) + 'static) {
        self.on_screen_size_changed = Some(Box::new(callback));
    }

    /// Current output width and height
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Width divided by height
    ///
    /// The caller must make sure the renderer is initialized; a zero height
    /// is not guarded against.
    #[allow(clippy::cast_precision_loss)]
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Record the frame start time
    ///
    /// Returns the seconds elapsed since the previous frame started, or 0.0
    /// for the first frame.
    pub fn begin_frame(&mut self) -> f32 {
        let delta = self.clock.tick();
        log::trace!("Begin frame {} (dt={delta:.4}s)", self.clock.frame_count());
        delta
    }

    /// Frame clock with the last frame timestamp
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Present the frame and service the platform event queue
    ///
    /// Blocks until the surface returns; this is the only point per frame
    /// where control leaves the renderer.
    pub fn end_frame(&mut self, surface: &mut dyn PresentSurface) {
        surface.swap_buffers();
        surface.poll_events();
    }

    /// Shadow settings in use
    pub fn shadow_config(&self) -> &ShadowConfig {
        &self.shadow_config
    }

    /// Active lights
    pub fn lights(&self) -> &ActiveLights {
        &self.lights
    }

    /// Mutable active lights
    ///
    /// Not available during a shadow pass: the pass refers to lights by slot.
    pub fn lights_mut(&mut self) -> RenderResult<&mut ActiveLights> {
        self.ensure_not_in_shadow_pass("modify the light list")?;
        Ok(&mut self.lights)
    }

    /// Add a light to the active list, shadow casters kept in front
    pub fn add_light(&mut self, light: Light) -> RenderResult<usize> {
        self.ensure_not_in_shadow_pass("add a light")?;
        self.lights.push(light)
    }

    /// Take a light out of the active list
    ///
    /// The caller owns the light afterwards; release it with
    /// [`Light::destroy`] and [`ForwardRenderer::device_mut`].
    pub fn remove_light(&mut self, index: usize) -> RenderResult<Light> {
        self.ensure_not_in_shadow_pass("remove a light")?;
        self.lights.remove(index)
    }

    /// Attach (or replace) the shadow map of an active light
    ///
    /// Uses the configured texture size and planes. The list is reordered
    /// afterwards so shadow casters stay in front; the light's new slot is
    /// returned.
    pub fn attach_shadow_caster(&mut self, index: usize, direction: Vec3) -> RenderResult<usize> {
        let shadow = &self.shadow_config;
        let (texture_size, near, far) = (shadow.texture_size, shadow.near, shadow.far);
        self.attach_shadow_caster_with(index, texture_size, near, far, direction)
    }

    /// Attach (or replace) the shadow map of an active light with explicit
    /// texture size and planes
    pub fn attach_shadow_caster_with(
        &mut self,
        index: usize,
        texture_size: u32,
        near: f32,
        far: f32,
        direction: Vec3,
    ) -> RenderResult<usize> {
        self.ensure_not_in_shadow_pass("attach a shadow caster")?;

        let light = self.lights.get_mut(index).ok_or_else(|| {
            RenderError::PreconditionViolation(format!("no active light in slot {index}"))
        })?;
        light.attach_shadow_caster(self.device.as_mut(), texture_size, near, far, direction)?;

        // Stable partition: the light lands behind the casters that precede it
        let new_index = (0..index)
            .filter_map(|slot| self.lights.get(slot))
            .filter(|light| light.is_shadow_caster())
            .count();
        self.lights.sort_shadow_casters_first();
        Ok(new_index)
    }

    /// Graphics device
    pub fn device(&self) -> &dyn GraphicsDevice {
        self.device.as_ref()
    }

    /// Mutable graphics device
    pub fn device_mut(&mut self) -> &mut dyn GraphicsDevice {
        self.device.as_mut()
    }

    /// Release the shadow framebuffer and every light's shadow texture
    ///
    /// A renderer dropped without this leaks its GPU resources.
    pub fn destroy(mut self) {
        if self.shadow_state.is_active() {
            log::warn!("Renderer destroyed during a shadow pass");
        }
        self.lights.destroy_all(self.device.as_mut());
        if let Some(framebuffer) = self.shadow_framebuffer.take() {
            self.device.delete_framebuffer(framebuffer);
        }
        log::info!("Forward renderer destroyed");
    }

    /// Shadow framebuffer still owned, i.e. not released by `destroy`
    fn leaked_framebuffer(&self) -> Option<FramebufferHandle> {
        self.shadow_framebuffer
    }

    fn ensure_not_in_shadow_pass(&self, action: &str) -> RenderResult<()> {
        if self.shadow_state.is_active() {
            return Err(RenderError::PreconditionViolation(format!(
                "cannot {action} while a shadow pass is active"
            )));
        }
        Ok(())
    }
}

impl Drop for ForwardRenderer {
    fn drop(&mut self) {
        if let Some(framebuffer) = self.leaked_framebuffer() {
            log::warn!(
                "Forward renderer dropped without destroy; shadow framebuffer {framebuffer:?} leaked"
            );
        }
    }
}
