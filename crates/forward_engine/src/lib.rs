//! # Forward Engine
//!
//! Shadow-casting forward renderer core.
//!
//! ## Features
//!
//! - **Forward Lighting**: up to four active lights handed to a per-draw binder
//! - **Shadow Mapping**: one depth texture per shadow-casting light, rendered
//!   in a checked shadow pass before the lit pass
//! - **Scene Tree**: group and leaf nodes with visibility pruning and shader
//!   or topology overrides
//! - **Device Agnostic**: all GPU work goes through the `GraphicsDevice` trait
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use forward_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut renderer = ForwardRenderer::new(Box::new(LoggingDevice::new()));
//!     renderer.initialize(1280, 720)?;
//!     renderer.setup_shadow_pass()?;
//!
//!     let sun = renderer.add_light(Light::new().with_position(Vec3::new(0.0, 10.0, 10.0)))?;
//!     renderer.attach_shadow_caster(sun, Vec3::new(0.0, -1.0, -1.0))?;
//!
//!     let scene = Renderable::leaf("cube", RenderableCore::new(ShaderHandle(1), MeshHandle(1), 36));
//!     let mut binder = |_: &BindContext<'_>, _: &mut dyn GraphicsDevice| -> RenderResult<()> { Ok(()) };
//!     let mut surface = HeadlessSurface::new();
//!
//!     renderer.begin_frame();
//!     renderer.render_shadow_maps(&scene, ShaderHandle(2), &mut binder)?;
//!     let projection = Mat4::frustum(-1.0, 1.0, -0.5625, 0.5625, 1.0, 100.0);
//!     let view = Mat4::look_at(Vec3::new(0.0, 2.0, 8.0), Vec3::zeros(), Vec3::y());
//!     renderer.draw_renderable(&scene, &mut binder, &projection, &view)?;
//!     renderer.end_frame(&mut surface);
//!
//!     renderer.destroy();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod core;
pub mod foundation;
pub mod render;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::Config,
        core::{RendererConfig, ShadowConfig},
        foundation::math::{Mat4, Mat4Ext, Transform, Vec3, Vec4},
        render::{
            BindContext, ForwardRenderer, GraphicsDevice, HeadlessSurface, Light, LightUniform,
            LoggingDevice, MeshHandle, PresentSurface, RenderBinder, RenderError, RenderResult,
            ShaderHandle,
        },
        scene::{Renderable, RenderableCore},
    };
}
