//! Shadow map owned by a shadow-casting light
//!
//! Holds the depth texture a light renders into during the shadow pass plus
//! the matrices derived from the light's position. The view, view-projection
//! and biased matrices are only valid after [`ShadowMap::recompute`] has run
//! for the light's current position.

use std::mem::ManuallyDrop;

use crate::foundation::math::{Mat4, Mat4Ext, Vec3};
use crate::render::api::{
    CompareMode, GraphicsDevice, TextureFilter, TextureFormat, TextureHandle, TextureParameter,
    TextureWrap,
};
use crate::render::{RenderError, RenderResult};

/// Half extent of the symmetric shadow frustum at the near plane
///
/// There is no field-of-view parameter; the frustum is only meaningful for
/// directional-style lights.
pub const SHADOW_FRUSTUM_HALF_EXTENT: f32 = 0.5;

/// Border color of shadow textures: samples outside the map read as lit
pub const SHADOW_BORDER_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Depth texture and projection data for one light's shadow pass
#[derive(Debug)]
pub struct ShadowMap {
    texture: TextureHandle,
    texture_size: u32,
    direction: Vec3,
    near: f32,
    far: f32,
    up: Vec3,
    projection: Mat4,
    view: Mat4,
    view_projection: Mat4,
    biased: Mat4,
}

impl ShadowMap {
    /// Allocate the depth texture and set up the shadow projection
    ///
    /// The texture is a square 32-bit depth image with linear filtering,
    /// clamp-to-border wrapping on a white border and hardware depth
    /// comparison enabled. No texture is left bound afterwards.
    pub fn create(
        device: &mut dyn GraphicsDevice,
        texture_size: u32,
        near: f32,
        far: f32,
        direction: Vec3,
    ) -> RenderResult<Self> {
        if texture_size == 0 {
            return Err(RenderError::InvalidParameter(
                "shadow map texture size must be non-zero".to_string(),
            ));
        }
        if near <= 0.0 || far <= near {
            return Err(RenderError::InvalidParameter(format!(
                "shadow map planes must satisfy 0 < near < far, got near={near} far={far}"
            )));
        }

        let h = SHADOW_FRUSTUM_HALF_EXTENT;
        let projection = Mat4::frustum(-h, h, -h, h, near, far);

        let texture = device.gen_texture()?;
        device.active_texture(0);
        device.bind_texture(Some(texture));
        if let Err(e) = device.tex_image_2d(TextureFormat::Depth32, texture_size, texture_size) {
            device.bind_texture(None);
            device.delete_texture(texture);
            return Err(e);
        }
        device.tex_parameter(TextureParameter::MagFilter(TextureFilter::Linear));
        device.tex_parameter(TextureParameter::MinFilter(TextureFilter::Linear));
        device.tex_parameter(TextureParameter::BorderColor(SHADOW_BORDER_COLOR));
        device.tex_parameter(TextureParameter::WrapS(TextureWrap::ClampToBorder));
        device.tex_parameter(TextureParameter::WrapT(TextureWrap::ClampToBorder));
        device.tex_parameter(TextureParameter::CompareMode(CompareMode::CompareRefToTexture));
        device.bind_texture(None);

        log::debug!(
            "Created {texture_size}x{texture_size} shadow map {:?} (near={near}, far={far})",
            texture
        );

        Ok(Self {
            texture,
            texture_size,
            direction,
            near,
            far,
            up: Vec3::new(0.0, 1.0, 0.0),
            projection,
            view: Mat4::identity(),
            view_projection: Mat4::identity(),
            biased: Mat4::identity(),
        })
    }

    /// Recompute view, view-projection and biased matrices
    ///
    /// The view looks from `light_position` toward
    /// `light_position + direction`.
    pub fn recompute(&mut self, light_position: Vec3) {
        let target = light_position + self.direction;
        self.view = Mat4::look_at(light_position, target, self.up);
        self.view_projection = self.projection * self.view;
        self.biased = Mat4::shadow_bias() * self.view_projection;
    }

    /// Release the depth texture
    ///
    /// Consumes the map, so the texture can only be released once.
    pub fn release(self, device: &mut dyn GraphicsDevice) {
        let this = ManuallyDrop::new(self);
        log::debug!("Releasing shadow map texture {:?}", this.texture);
        device.delete_texture(this.texture);
    }

    /// Depth texture rendered into during the shadow pass
    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    /// Edge length of the square depth texture
    pub fn texture_size(&self) -> u32 {
        self.texture_size
    }

    /// Direction shadows are cast in
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Change the cast direction; takes effect on the next recompute
    pub fn set_direction(&mut self, direction: Vec3) {
        self.direction = direction;
    }

    /// Near plane distance
    pub fn near(&self) -> f32 {
        self.near
    }

    /// Far plane distance
    pub fn far(&self) -> f32 {
        self.far
    }

    /// Up vector used for the view matrix
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Change the up vector; takes effect on the next recompute
    pub fn set_up(&mut self, up: Vec3) {
        self.up = up;
    }

    /// Shadow projection matrix
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// Light view matrix
    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    /// Projection * view
    pub fn view_projection(&self) -> &Mat4 {
        &self.view_projection
    }

    /// Bias * projection * view, mapping world space to shadow texture space
    pub fn biased_matrix(&self) -> &Mat4 {
        &self.biased
    }
}

impl Drop for ShadowMap {
    fn drop(&mut self) {
        log::warn!(
            "Shadow map texture {:?} dropped without release; GPU texture leaked",
            self.texture
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Point3, Vec4};
    use crate::render::tests::recording_device::{DeviceCall, RecordingDevice};
    use approx::assert_relative_eq;

    #[test]
    fn test_create_configures_depth_texture() {
        let mut device = RecordingDevice::new();
        let map = ShadowMap::create(&mut device, 1024, 1.0, 50.0, Vec3::new(0.0, -1.0, 0.0)).unwrap();
        let texture = map.texture();

        assert_eq!(
            device.calls(),
            vec![
                DeviceCall::GenTexture(texture),
                DeviceCall::ActiveTexture(0),
                DeviceCall::BindTexture(Some(texture)),
                DeviceCall::TexImage2d(TextureFormat::Depth32, 1024, 1024),
                DeviceCall::TexParameter(TextureParameter::MagFilter(TextureFilter::Linear)),
                DeviceCall::TexParameter(TextureParameter::MinFilter(TextureFilter::Linear)),
                DeviceCall::TexParameter(TextureParameter::BorderColor([1.0, 1.0, 1.0, 1.0])),
                DeviceCall::TexParameter(TextureParameter::WrapS(TextureWrap::ClampToBorder)),
                DeviceCall::TexParameter(TextureParameter::WrapT(TextureWrap::ClampToBorder)),
                DeviceCall::TexParameter(TextureParameter::CompareMode(CompareMode::CompareRefToTexture)),
                DeviceCall::BindTexture(None),
            ]
        );

        map.release(&mut device);
        assert_eq!(device.textures_released(), 1);
    }

    #[test]
    fn test_create_rejects_bad_parameters() {
        let mut device = RecordingDevice::new();
        let dir = Vec3::new(0.0, -1.0, 0.0);

        assert!(matches!(
            ShadowMap::create(&mut device, 0, 1.0, 10.0, dir),
            Err(RenderError::InvalidParameter(_))
        ));
        assert!(matches!(
            ShadowMap::create(&mut device, 512, 0.0, 10.0, dir),
            Err(RenderError::InvalidParameter(_))
        ));
        assert!(matches!(
            ShadowMap::create(&mut device, 512, 5.0, 5.0, dir),
            Err(RenderError::InvalidParameter(_))
        ));
        assert!(device.calls().is_empty());
    }

    #[test]
    fn test_failed_image_allocation_frees_texture() {
        let mut device = RecordingDevice::new();
        device.fail_tex_image(true);

        let result = ShadowMap::create(&mut device, 512, 1.0, 10.0, Vec3::new(0.0, 0.0, -1.0));

        assert!(matches!(result, Err(RenderError::ResourceCreationFailed(_))));
        assert_eq!(device.textures_allocated(), 1);
        assert_eq!(device.textures_released(), 1);
    }

    #[test]
    fn test_projection_is_symmetric_frustum() {
        let mut device = RecordingDevice::new();
        let map = ShadowMap::create(&mut device, 256, 2.0, 20.0, Vec3::new(0.0, 0.0, -1.0)).unwrap();

        let expected = Mat4::frustum(-0.5, 0.5, -0.5, 0.5, 2.0, 20.0);
        assert_relative_eq!(*map.projection(), expected, epsilon = 1e-6);
        assert_eq!(map.up(), Vec3::new(0.0, 1.0, 0.0));

        map.release(&mut device);
    }

    #[test]
    fn test_biased_matrix_maps_target_into_texture_space() {
        let mut device = RecordingDevice::new();
        let mut map = ShadowMap::create(&mut device, 256, 1.0, 20.0, Vec3::new(0.0, 0.0, -1.0)).unwrap();
        let position = Vec3::new(3.0, 4.0, 5.0);
        map.recompute(position);

        // A point straight ahead of the light projects to the map center
        let ahead = Point3::from(position + Vec3::new(0.0, 0.0, -5.0));
        let clip = map.biased_matrix() * ahead.to_homogeneous();
        let uv = Vec4::new(clip.x / clip.w, clip.y / clip.w, clip.z / clip.w, 1.0);

        assert_relative_eq!(uv.x, 0.5, epsilon = 1e-5);
        assert_relative_eq!(uv.y, 0.5, epsilon = 1e-5);
        assert!(uv.z > 0.0 && uv.z < 1.0);

        assert_relative_eq!(
            *map.biased_matrix(),
            Mat4::shadow_bias() * map.projection() * map.view(),
            epsilon = 1e-5
        );

        map.release(&mut device);
    }
}
