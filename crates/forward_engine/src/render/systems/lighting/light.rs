//! Light source used by the forward renderer

use bytemuck::{Pod, Zeroable};

use super::shadow_map::ShadowMap;
use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::render::api::GraphicsDevice;
use crate::render::RenderResult;

/// Positional light with an optional shadow map
///
/// A light that owns a [`ShadowMap`] is shadow-casting. The direction is not
/// normalized for the caller.
#[derive(Debug)]
pub struct Light {
    /// Location of the light in world space
    pub position: Vec3,
    /// Direction the light points in
    pub direction: Vec3,
    /// Emitted color
    pub diffuse_color: Vec4,
    /// Strength of the diffuse contribution
    pub diffuse_intensity: f32,
    /// Strength of the ambient contribution
    pub ambient_intensity: f32,
    /// Attenuation coefficient
    pub attenuation: f32,
    shadow_map: Option<ShadowMap>,
}

impl Default for Light {
    fn default() -> Self {
        Self::new()
    }
}

impl Light {
    /// Create a white light at the origin with no shadow map
    pub fn new() -> Self {
        Self {
            position: Vec3::zeros(),
            direction: Vec3::zeros(),
            diffuse_color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            diffuse_intensity: 1.0,
            ambient_intensity: 0.0,
            attenuation: 0.0,
            shadow_map: None,
        }
    }

    /// Set the position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Set the direction
    pub fn with_direction(mut self, direction: Vec3) -> Self {
        self.direction = direction;
        self
    }

    /// Set diffuse color and intensity
    pub fn with_diffuse(mut self, color: Vec4, intensity: f32) -> Self {
        self.diffuse_color = color;
        self.diffuse_intensity = intensity;
        self
    }

    /// Set ambient intensity
    pub fn with_ambient_intensity(mut self, intensity: f32) -> Self {
        self.ambient_intensity = intensity;
        self
    }

    /// Set the attenuation coefficient
    pub fn with_attenuation(mut self, attenuation: f32) -> Self {
        self.attenuation = attenuation;
        self
    }

    /// Whether this light owns a shadow map
    pub fn is_shadow_caster(&self) -> bool {
        self.shadow_map.is_some()
    }

    /// Shadow map, if the light casts shadows
    pub fn shadow_map(&self) -> Option<&ShadowMap> {
        self.shadow_map.as_ref()
    }

    /// Mutable shadow map, if the light casts shadows
    pub fn shadow_map_mut(&mut self) -> Option<&mut ShadowMap> {
        self.shadow_map.as_mut()
    }

    /// Make this light cast shadows, replacing any existing shadow map
    ///
    /// The new map is allocated first; only once that succeeds is the
    /// previous map's texture released and the new one swapped in. A failed
    /// allocation leaves the light unchanged.
    pub fn attach_shadow_caster(
        &mut self,
        device: &mut dyn GraphicsDevice,
        texture_size: u32,
        near: f32,
        far: f32,
        direction: Vec3,
    ) -> RenderResult<()> {
        let shadow_map = ShadowMap::create(device, texture_size, near, far, direction)?;
        if let Some(previous) = self.shadow_map.replace(shadow_map) {
            previous.release(device);
        }
        Ok(())
    }

    /// Recompute the shadow map matrices from the current position
    ///
    /// Does nothing for lights without a shadow map. Must run after the
    /// light's position is final for the frame and before its shadow pass.
    pub fn update_shadow_map_data(&mut self) {
        if let Some(shadow_map) = self.shadow_map.as_mut() {
            shadow_map.recompute(self.position);
        }
    }

    /// Destroy the light, releasing its shadow texture if it has one
    pub fn destroy(mut self, device: &mut dyn GraphicsDevice) {
        if let Some(shadow_map) = self.shadow_map.take() {
            shadow_map.release(device);
        }
    }

    /// Pack the light into its GPU uniform layout
    pub fn to_uniform(&self) -> LightUniform {
        let (shadow_matrix, casts_shadow) = match &self.shadow_map {
            Some(map) => (*map.biased_matrix(), 1.0),
            None => (Mat4::identity(), 0.0),
        };

        LightUniform {
            position: [self.position.x, self.position.y, self.position.z, 1.0],
            direction: [self.direction.x, self.direction.y, self.direction.z, 0.0],
            diffuse_color: self.diffuse_color.into(),
            params: [
                self.diffuse_intensity,
                self.ambient_intensity,
                self.attenuation,
                casts_shadow,
            ],
            shadow_matrix: shadow_matrix.into(),
        }
    }
}

/// Light data for GPU uniform buffers (std140 compatible)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightUniform {
    /// World position [x, y, z, 1]
    pub position: [f32; 4],
    /// Direction [x, y, z, 0]
    pub direction: [f32; 4],
    /// Diffuse color [r, g, b, a]
    pub diffuse_color: [f32; 4],
    /// [diffuse intensity, ambient intensity, attenuation, casts shadow]
    pub params: [f32; 4],
    /// World to shadow texture space, column-major; identity without shadows
    pub shadow_matrix: [[f32; 4]; 4],
}
