//! # Renderer Configuration
//!
//! Configuration for the forward renderer: the initial output resolution and
//! the shadow pass tuning values. Loadable from TOML or RON through the
//! [`Config`] trait.

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};

/// # Shadow Configuration
///
/// Defaults used when attaching shadow casters and the depth-offset bias
/// applied while rendering shadow maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    /// Edge length of each square shadow depth texture
    pub texture_size: u32,
    /// Near plane of the shadow projection
    pub near: f32,
    /// Far plane of the shadow projection
    pub far: f32,
    /// Slope-scaled polygon offset factor used during the shadow pass
    pub polygon_offset_factor: f32,
    /// Constant polygon offset units used during the shadow pass
    pub polygon_offset_units: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            texture_size: 2048,
            near: 1.0,
            far: 100.0,
            polygon_offset_factor: 4.0,
            polygon_offset_units: 4.0,
        }
    }
}

impl ShadowConfig {
    /// Set the shadow texture edge length
    pub fn with_texture_size(mut self, size: u32) -> Self {
        self.texture_size = size;
        self
    }

    /// Set the shadow projection planes
    pub fn with_planes(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    /// Set the polygon offset applied during the shadow pass
    pub fn with_polygon_offset(mut self, factor: f32, units: f32) -> Self {
        self.polygon_offset_factor = factor;
        self.polygon_offset_units = units;
        self
    }

    /// Validate the shadow settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.texture_size == 0 {
            return Err(ConfigError::Invalid("Shadow texture size must be at least 1".to_string()));
        }
        if self.near <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "Shadow near plane must be positive, got {}",
                self.near
            )));
        }
        if self.far <= self.near {
            return Err(ConfigError::Invalid(format!(
                "Shadow far plane ({}) must be beyond the near plane ({})",
                self.far, self.near
            )));
        }
        Ok(())
    }
}

/// # Renderer Configuration
///
/// Initial output resolution plus shadow settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Shadow pass settings
    pub shadow: ShadowConfig,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            shadow: ShadowConfig::default(),
        }
    }
}

impl RendererConfig {
    /// Create a configuration for the given resolution
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Set custom shadow configuration
    pub fn with_shadow(mut self, shadow: ShadowConfig) -> Self {
        self.shadow = shadow;
        self
    }
}

impl Config for RendererConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "Resolution must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        self.shadow.validate()
    }
}
