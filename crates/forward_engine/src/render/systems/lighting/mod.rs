//! Lighting system
//!
//! Lights, the shadow maps they own, and the fixed-capacity active light list
//! the forward renderer draws with.

mod active_lights;
mod light;
mod shadow_map;

pub use active_lights::{ActiveLights, MAX_FORWARD_LIGHTS};
pub use light::{Light, LightUniform};
pub use shadow_map::{ShadowMap, SHADOW_BORDER_COLOR, SHADOW_FRUSTUM_HALF_EXTENT};
