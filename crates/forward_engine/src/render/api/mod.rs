//! Public rendering API
//!
//! The two capability contracts the renderer is built against: the graphics
//! device it issues state changes and draws to, and the binder that supplies
//! per-draw shader inputs.

pub mod graphics_device;
pub mod render_binder;

pub use graphics_device::{
    BackendResult, Capability, ClearFlags, ColorBuffer, CompareMode, Face, FramebufferHandle,
    GraphicsDevice, MeshHandle, ShaderHandle, TextureFilter, TextureFormat, TextureHandle,
    TextureParameter, TextureWrap, Topology,
};
pub use render_binder::{BindContext, RenderBinder};
