//! GLFW window surface

use super::PresentSurface;
use crate::render::{RenderError, RenderResult};
use glfw::{Context, Glfw, GlfwReceiver, PWindow, WindowEvent, WindowMode};

/// GLFW window with a current OpenGL context
pub struct GlfwSurface {
    /// GLFW library handle
    pub glfw: Glfw,
    /// Window owning the context
    pub window: PWindow,
    events: GlfwReceiver<(f64, WindowEvent)>,
}

impl GlfwSurface {
    /// Open a window and make its OpenGL 3.3 core context current
    pub fn new(width: u32, height: u32, title: &str) -> RenderResult<Self> {
        let mut glfw = glfw::init(glfw::fail_on_errors)
            .map_err(|e| RenderError::BackendError(format!("GLFW init failed: {e:?}")))?;
        glfw.window_hint(glfw::WindowHint::ContextVersion(3, 3));
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(glfw::OpenGlProfileHint::Core));

        let (mut window, events) = glfw
            .create_window(width, height, title, WindowMode::Windowed)
            .ok_or_else(|| RenderError::ResourceCreationFailed("GLFW window".to_string()))?;
        window.set_framebuffer_size_polling(true);
        window.set_close_polling(true);
        window.make_current();

        log::info!("Opened {width}x{height} window '{title}'");
        Ok(Self { glfw, window, events })
    }

    /// Whether the user asked to close the window
    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    /// New framebuffer size if the window was resized since the last poll
    ///
    /// Feed the result to
    /// [`ForwardRenderer::change_resolution`](crate::render::ForwardRenderer::change_resolution).
    pub fn take_resize(&self) -> Option<(u32, u32)> {
        glfw::flush_messages(&self.events)
            .filter_map(|(_, event)| match event {
                WindowEvent::FramebufferSize(w, h) => Some((w, h)),
                _ => None,
            })
            .last()
            .and_then(|(w, h)| Some((u32::try_from(w).ok()?, u32::try_from(h).ok()?)))
    }
}

impl PresentSurface for GlfwSurface {
    fn swap_buffers(&mut self) {
        self.window.swap_buffers();
    }

    fn poll_events(&mut self) {
        self.glfw.poll_events();
    }
}
