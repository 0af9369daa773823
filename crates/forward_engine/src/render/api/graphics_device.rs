//! Graphics device abstraction
//!
//! The forward renderer never talks to a graphics API directly. Everything it
//! needs from the GPU goes through [`GraphicsDevice`]: texture and framebuffer
//! objects, fixed-function state toggles, and draw submission. The call set
//! mirrors a classic bind-to-edit API so a GL-style backend can implement it
//! one-to-one.

use crate::render::RenderError;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Handle to a texture object owned by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Handle to a framebuffer object owned by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferHandle(pub u32);

/// Handle to a linked shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u32);

/// Handle to uploaded mesh geometry (vertex array with an index buffer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

/// Storage format for texture images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    /// 32-bit depth, no color channels
    Depth32,
    /// 8-bit RGBA color
    Rgba8,
}

/// Texture sampling filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    /// Nearest texel
    Nearest,
    /// Bilinear interpolation
    Linear,
}

/// Texture coordinate wrap mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureWrap {
    /// Repeat the texture
    Repeat,
    /// Clamp to the edge texel
    ClampToEdge,
    /// Clamp to the configured border color
    ClampToBorder,
}

/// Depth texture comparison mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareMode {
    /// Sampling returns raw depth
    None,
    /// Sampling compares the reference value against stored depth
    CompareRefToTexture,
}

/// A single texture parameter assignment on the bound texture
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextureParameter {
    /// Minification filter
    MinFilter(TextureFilter),
    /// Magnification filter
    MagFilter(TextureFilter),
    /// Wrap mode along S
    WrapS(TextureWrap),
    /// Wrap mode along T
    WrapT(TextureWrap),
    /// Border color used by [`TextureWrap::ClampToBorder`]
    BorderColor([f32; 4]),
    /// Depth comparison mode
    CompareMode(CompareMode),
}

/// Color attachment selector for draw/read buffer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBuffer {
    /// No color output
    None,
    /// Color attachment by index
    Attachment(u32),
}

/// Toggleable fixed-function capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Face culling
    CullFace,
    /// Depth offset for filled polygons
    PolygonOffsetFill,
    /// Depth testing
    DepthTest,
}

/// Which polygon faces are culled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    /// Front faces
    Front,
    /// Back faces
    Back,
}

/// Primitive topology for draw submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Indexed triangle list
    Triangles,
    /// Indexed line list
    Lines,
}

bitflags::bitflags! {
    /// Buffers affected by a clear
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearFlags: u32 {
        /// Color attachments
        const COLOR = 0b001;
        /// Depth attachment
        const DEPTH = 0b010;
        /// Stencil attachment
        const STENCIL = 0b100;
    }
}

/// Graphics device contract consumed by the forward renderer
///
/// Texture and framebuffer editing follows bind-to-edit semantics: parameter
/// and image calls apply to the currently bound texture, attachment calls to
/// the currently bound framebuffer. Allocation and draw submission report
/// failures; plain state toggles cannot fail.
pub trait GraphicsDevice {
    /// Create a new texture object
    fn gen_texture(&mut self) -> BackendResult<TextureHandle>;

    /// Delete a texture object
    fn delete_texture(&mut self, texture: TextureHandle);

    /// Select the active texture unit for subsequent binds
    fn active_texture(&mut self, unit: u32);

    /// Bind a 2D texture, or unbind with `None`
    fn bind_texture(&mut self, texture: Option<TextureHandle>);

    /// Allocate storage for the bound 2D texture
    fn tex_image_2d(&mut self, format: TextureFormat, width: u32, height: u32) -> BackendResult<()>;

    /// Set a parameter on the bound 2D texture
    fn tex_parameter(&mut self, parameter: TextureParameter);

    /// Create a new framebuffer object
    fn gen_framebuffer(&mut self) -> BackendResult<FramebufferHandle>;

    /// Delete a framebuffer object
    fn delete_framebuffer(&mut self, framebuffer: FramebufferHandle);

    /// Bind a framebuffer, or the default output with `None`
    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>);

    /// Attach a texture as the bound framebuffer's depth target
    fn framebuffer_depth_texture(&mut self, texture: TextureHandle);

    /// Select color outputs of the bound framebuffer
    fn draw_buffers(&mut self, buffers: &[ColorBuffer]);

    /// Select the color source for reads from the bound framebuffer
    fn read_buffer(&mut self, buffer: ColorBuffer);

    /// Clear buffers of the bound framebuffer
    fn clear(&mut self, flags: ClearFlags);

    /// Set the viewport rectangle
    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32);

    /// Enable a capability
    fn enable(&mut self, capability: Capability);

    /// Disable a capability
    fn disable(&mut self, capability: Capability);

    /// Select which faces are culled when culling is enabled
    fn cull_face(&mut self, face: Face);

    /// Set the polygon depth offset
    fn polygon_offset(&mut self, factor: f32, units: f32);

    /// Make a shader program current
    fn use_program(&mut self, shader: ShaderHandle);

    /// Bind mesh geometry, or unbind with `None`
    fn bind_mesh(&mut self, mesh: Option<MeshHandle>);

    /// Submit an indexed draw of the bound mesh
    fn draw_elements(&mut self, topology: Topology, index_count: u32) -> BackendResult<()>;
}
