//! # Rendering System
//!
//! Shadow-casting forward renderer. Lighting is computed while geometry is
//! drawn to the final output, with an optional depth-only pass per
//! shadow-casting light beforehand.
//!
//! ## Architecture
//!
//! - **ForwardRenderer**: owns the active lights and the shared shadow
//!   framebuffer, drives the shadow pass state machine and the scene-tree
//!   draw traversal
//! - **GraphicsDevice**: the device contract the renderer issues all GPU
//!   state changes and draws through
//! - **RenderBinder**: supplied per draw call, uploads every per-draw shader
//!   input (transforms, light array, shadow matrices and textures)
//! - **Lighting**: lights, their owned shadow maps, and the fixed-capacity
//!   active light list
//!
//! ## Frame Order
//!
//! ```text
//! begin_frame
//!   begin_shadow_pass
//!     enable_shadow_light(0) -> draw_renderable_with_shader(depth shader)
//!     enable_shadow_light(1) -> ...
//!   end_shadow_pass
//!   draw_renderable (lit pass, binder samples the finished shadow maps)
//! end_frame (present + poll)
//! ```
//!
//! Every shadow sub-pass completes before the lit pass starts, so the binder
//! never samples a shadow texture that is still a render target.

pub mod api;
pub mod backends;
pub mod systems;
pub mod window;

mod draw;
mod forward_renderer;
mod shadow_pass;

#[cfg(test)]
mod tests;

pub use api::{
    BackendResult, BindContext, Capability, ClearFlags, ColorBuffer, CompareMode, Face,
    FramebufferHandle, GraphicsDevice, MeshHandle, RenderBinder, ShaderHandle, TextureFilter,
    TextureFormat, TextureHandle, TextureParameter, TextureWrap, Topology,
};
pub use backends::LoggingDevice;
pub use draw::{DrawContext, ShaderSelection};
pub use forward_renderer::{ForwardRenderer, ResizeCallback};
pub use shadow_pass::ShadowPassState;
pub use systems::lighting::{ActiveLights, Light, LightUniform, ShadowMap, MAX_FORWARD_LIGHTS};
pub use window::{HeadlessSurface, PresentSurface};

use thiserror::Error;

/// High-level rendering error types
///
/// Errors are split by who has to act on them: invalid parameters and
/// precondition violations are caller mistakes and are rejected before any
/// device state is touched; resource and backend failures come from the
/// device and are propagated unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A parameter is out of its valid range
    ///
    /// Raised for zero resolutions and degenerate shadow map settings.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// An operation was called in a state where it is not allowed
    ///
    /// Covers shadow pass calls out of order, enabling a light without a
    /// shadow map, light list ordering violations, and structural misuse
    /// of the scene tree.
    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),

    /// Resource creation or management failed
    ///
    /// Occurs when GPU resources (textures, framebuffers) cannot be created.
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// Backend-specific error occurred
    ///
    /// Wraps device errors (draw submission and similar) in a generic form.
    #[error("Backend error: {0}")]
    BackendError(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
