//! Demo scene: a floor, a ring of pillars and a hidden debug marker

use forward_engine::foundation::math::{Transform, Vec3};
use forward_engine::render::{MeshHandle, ShaderHandle};
use forward_engine::scene::{Renderable, RenderableCore};

/// Programs and meshes the demo pretends to have uploaded
pub mod assets {
    use super::{MeshHandle, ShaderHandle};

    /// Lit shader sampling the shadow maps
    pub const LIT_SHADER: ShaderHandle = ShaderHandle(1);
    /// Depth-only shader for shadow sub-passes
    pub const DEPTH_SHADER: ShaderHandle = ShaderHandle(2);
    /// Flat color shader for the wireframe overlay
    pub const WIRE_SHADER: ShaderHandle = ShaderHandle(3);

    pub const FLOOR_MESH: MeshHandle = MeshHandle(1);
    pub const PILLAR_MESH: MeshHandle = MeshHandle(2);
    pub const MARKER_MESH: MeshHandle = MeshHandle(3);

    pub const QUAD_INDICES: u32 = 6;
    pub const CUBE_INDICES: u32 = 36;
}

const PILLAR_COUNT: usize = 6;
const PILLAR_RING_RADIUS: f32 = 4.0;

/// Build the scene tree drawn every frame
pub fn build() -> Renderable {
    let floor = Renderable::leaf(
        "floor",
        RenderableCore::new(assets::LIT_SHADER, assets::FLOOR_MESH, assets::QUAD_INDICES),
    )
    .with_transform(Transform {
        scale: Vec3::new(20.0, 1.0, 20.0),
        ..Transform::identity()
    });

    let pillars = (0..PILLAR_COUNT)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let angle = i as f32 / PILLAR_COUNT as f32 * std::f32::consts::TAU;
            let position = Vec3::new(angle.cos(), 0.0, angle.sin()) * PILLAR_RING_RADIUS;
            Renderable::leaf(
                format!("pillar_{i}"),
                RenderableCore::new(assets::LIT_SHADER, assets::PILLAR_MESH, assets::CUBE_INDICES),
            )
            .with_transform(Transform {
                scale: Vec3::new(0.5, 3.0, 0.5),
                ..Transform::from_position(position)
            })
        })
        .collect();

    let marker = Renderable::leaf(
        "light_marker",
        RenderableCore::new(assets::LIT_SHADER, assets::MARKER_MESH, assets::CUBE_INDICES),
    )
    .with_visibility(false);

    Renderable::group_of(
        "root",
        vec![floor, Renderable::group_of("pillars", pillars), marker],
    )
}
