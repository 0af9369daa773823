//! Per-draw uniform staging for the demo shaders

use bytemuck::Zeroable;
use forward_engine::foundation::math::Mat4;
use forward_engine::render::{
    BindContext, GraphicsDevice, LightUniform, RenderBinder, RenderResult, MAX_FORWARD_LIGHTS,
};

/// First texture unit used for shadow maps; unit 0 is the material texture
const SHADOW_TEXTURE_UNIT: u32 = 1;

/// Packs transforms and lights the way the demo shaders expect them
///
/// The logging device has no uniform API, so the packed bytes are kept in a
/// staging buffer whose size is reported at the end of the run.
#[derive(Debug, Default)]
pub struct SceneBinder {
    staging: Vec<u8>,
    shadow_binds: u64,
    lit_binds: u64,
}

impl SceneBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes staged for the last draw
    pub fn staged_bytes(&self) -> usize {
        self.staging.len()
    }

    /// (shadow pass binds, lit pass binds)
    pub fn bind_counts(&self) -> (u64, u64) {
        (self.shadow_binds, self.lit_binds)
    }

    fn stage_matrix(&mut self, matrix: &Mat4) {
        self.staging.extend_from_slice(bytemuck::cast_slice(matrix.as_slice()));
    }
}

impl RenderBinder for SceneBinder {
    fn bind(&mut self, context: &BindContext<'_>, device: &mut dyn GraphicsDevice) -> RenderResult<()> {
        self.staging.clear();

        if context.is_shadow_pass() {
            // Depth shader only needs the light-space MVP
            self.stage_matrix(&context.mvp_matrix());
            self.shadow_binds += 1;
            return Ok(());
        }

        self.stage_matrix(&context.model_matrix());
        self.stage_matrix(&(context.projection * context.view));

        let mut lights = [LightUniform::zeroed(); MAX_FORWARD_LIGHTS];
        for (slot, light) in lights.iter_mut().zip(context.lights.iter()) {
            *slot = light.to_uniform();
        }
        self.staging.extend_from_slice(bytemuck::cast_slice(&lights));

        for (unit, light) in (SHADOW_TEXTURE_UNIT..).zip(context.lights.shadow_casters()) {
            if let Some(map) = light.shadow_map() {
                device.active_texture(unit);
                device.bind_texture(Some(map.texture()));
            }
        }
        device.active_texture(0);

        self.lit_binds += 1;
        Ok(())
    }
}
