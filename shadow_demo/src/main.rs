//! Shadow demo
//!
//! Runs the forward renderer over a small scene: one orbiting shadow-casting
//! sun, a static shadow-casting spot and a plain fill light. Each frame
//! renders both shadow maps, draws the lit scene, and overlays a wireframe.
//!
//! ```text
//! shadow_demo [CONFIG.toml|CONFIG.ron] [FRAMES]
//! ```
//!
//! Runs headless against the logging device unless built with the `window`
//! feature. Set `RUST_LOG=forward_engine=trace` to see every device call.

mod binder;
mod scene;

use binder::SceneBinder;
use forward_engine::config::Config;
use forward_engine::core::RendererConfig;
use forward_engine::foundation::logging;
use forward_engine::foundation::math::{Mat4, Mat4Ext, Vec3, Vec4};
use forward_engine::render::{
    BindContext, ForwardRenderer, GraphicsDevice, Light, LoggingDevice, PresentSurface, RenderResult,
};
use scene::assets;

const DEFAULT_FRAMES: u32 = 120;
const SUN_ORBIT_RADIUS: f32 = 12.0;
const SUN_HEIGHT: f32 = 10.0;
/// Radians per second
const SUN_ORBIT_SPEED: f32 = 0.5;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_default("info");

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => RendererConfig::load_from_file(&path)?,
        None => RendererConfig::default(),
    };
    let frames = match args.next() {
        Some(count) => count.parse()?,
        None => DEFAULT_FRAMES,
    };

    log::info!("Starting shadow demo for {frames} frames");
    let stats = run(&config, frames)?;
    log::info!("{stats}");
    Ok(())
}

/// Summary printed after the run
struct RunStats {
    frames: u32,
    draws: usize,
    shadow_binds: u64,
    lit_binds: u64,
    staged_bytes: usize,
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Rendered {} frames: {} lit draws, {} shadow binds, {} lit binds, {} bytes staged per lit draw",
            self.frames, self.draws, self.shadow_binds, self.lit_binds, self.staged_bytes
        )
    }
}

fn run(config: &RendererConfig, frames: u32) -> Result<RunStats, Box<dyn std::error::Error>> {
    let mut surface = open_surface(config)?;
    let mut renderer = ForwardRenderer::from_config(Box::new(LoggingDevice::new()), config)?;
    renderer.set_resize_callback(|renderer, width, height| {
        log::info!(
            "Output resized to {width}x{height} (aspect {:.3})",
            renderer.aspect_ratio()
        );
    });
    renderer.setup_shadow_pass()?;
    add_lights(&mut renderer)?;

    let scene = scene::build();
    let mut binder = SceneBinder::new();

    let mut sun_angle = 0.0_f32;
    let mut draws = 0;
    for _ in 0..frames {
        let dt = renderer.begin_frame();

        sun_angle += SUN_ORBIT_SPEED * dt;
        if let Some(sun) = renderer.lights_mut()?.get_mut(0) {
            sun.position = Vec3::new(
                sun_angle.cos() * SUN_ORBIT_RADIUS,
                SUN_HEIGHT,
                sun_angle.sin() * SUN_ORBIT_RADIUS,
            );
            let direction = -sun.position.normalize();
            if let Some(map) = sun.shadow_map_mut() {
                map.set_direction(direction);
            }
        }

        renderer.render_shadow_maps(&scene, assets::DEPTH_SHADER, &mut binder)?;

        let (projection, view) = camera(&renderer);
        draws += renderer.draw_renderable(&scene, &mut binder, &projection, &view)?;
        renderer.draw_lines(&scene, assets::WIRE_SHADER, &mut flat_color, &projection, &view)?;

        renderer.end_frame(surface.as_mut());
    }

    renderer.destroy();

    let (shadow_binds, lit_binds) = binder.bind_counts();
    Ok(RunStats {
        frames,
        draws,
        shadow_binds,
        lit_binds,
        staged_bytes: binder.staged_bytes(),
    })
}

fn add_lights(renderer: &mut ForwardRenderer) -> RenderResult<()> {
    let sun = renderer.add_light(
        Light::new()
            .with_position(Vec3::new(SUN_ORBIT_RADIUS, SUN_HEIGHT, 0.0))
            .with_diffuse(Vec4::new(1.0, 0.95, 0.85, 1.0), 1.0)
            .with_ambient_intensity(0.1),
    )?;
    renderer.attach_shadow_caster(sun, Vec3::new(-SUN_ORBIT_RADIUS, -SUN_HEIGHT, 0.0).normalize())?;

    let spot = renderer.add_light(
        Light::new()
            .with_position(Vec3::new(-3.0, 6.0, 5.0))
            .with_diffuse(Vec4::new(0.6, 0.7, 1.0, 1.0), 0.8)
            .with_attenuation(0.05),
    )?;
    renderer.attach_shadow_caster(spot, Vec3::new(0.5, -1.0, -0.8).normalize())?;

    renderer.add_light(
        Light::new()
            .with_position(Vec3::new(0.0, 2.0, -8.0))
            .with_diffuse(Vec4::new(1.0, 0.6, 0.4, 1.0), 0.3),
    )?;

    log::info!(
        "{} lights active, {} casting shadows",
        renderer.lights().active_light_count(),
        renderer.lights().active_shadow_light_count()
    );
    Ok(())
}

/// Binder for the wireframe overlay, whose shader takes no per-draw inputs
fn flat_color(_: &BindContext<'_>, _: &mut dyn GraphicsDevice) -> RenderResult<()> {
    Ok(())
}

/// Perspective camera looking at the scene origin
fn camera(renderer: &ForwardRenderer) -> (Mat4, Mat4) {
    const NEAR: f32 = 0.5;
    const FAR: f32 = 100.0;
    const HALF_HEIGHT: f32 = 0.3;

    let half_width = HALF_HEIGHT * renderer.aspect_ratio();
    let projection = Mat4::frustum(-half_width, half_width, -HALF_HEIGHT, HALF_HEIGHT, NEAR, FAR);
    let view = Mat4::look_at(Vec3::new(0.0, 6.0, 16.0), Vec3::zeros(), Vec3::y());
    (projection, view)
}

#[cfg(not(feature = "window"))]
fn open_surface(_config: &RendererConfig) -> RenderResult<Box<dyn PresentSurface>> {
    Ok(Box::new(forward_engine::render::HeadlessSurface::new()))
}

#[cfg(feature = "window")]
fn open_surface(config: &RendererConfig) -> RenderResult<Box<dyn PresentSurface>> {
    let surface =
        forward_engine::render::window::GlfwSurface::new(config.width, config.height, "Shadow Demo")?;
    Ok(Box::new(surface))
}
