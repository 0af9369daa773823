//! Presentation surfaces
//!
//! The renderer hands control to a [`PresentSurface`] once per frame in
//! [`ForwardRenderer::end_frame`](crate::render::ForwardRenderer::end_frame):
//! the finished frame is presented, then pending platform events are
//! processed. This is the only blocking point of a frame.
//!
//! - **`HeadlessSurface`**: counts presents and polls, for tests and
//!   offscreen runs
//! - **`GlfwSurface`**: GLFW window with an OpenGL context (feature
//!   `glfw-window`)

#[cfg(feature = "glfw-window")]
mod glfw_surface;

#[cfg(feature = "glfw-window")]
pub use glfw_surface::GlfwSurface;

/// Presents frames and services the platform event queue
pub trait PresentSurface {
    /// Present the back buffer
    fn swap_buffers(&mut self);

    /// Process pending window system events
    fn poll_events(&mut self);
}

/// Surface with no window behind it
#[derive(Debug, Default, Clone)]
pub struct HeadlessSurface {
    presented_frames: u64,
    event_polls: u64,
}

impl HeadlessSurface {
    /// Create a headless surface
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames presented so far
    pub fn presented_frames(&self) -> u64 {
        self.presented_frames
    }

    /// Number of event polls so far
    pub fn event_polls(&self) -> u64 {
        self.event_polls
    }
}

impl PresentSurface for HeadlessSurface {
    fn swap_buffers(&mut self) {
        self.presented_frames += 1;
        log::trace!("Headless present #{}", self.presented_frames);
    }

    fn poll_events(&mut self) {
        self.event_polls += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_surface_counts() {
        let mut surface = HeadlessSurface::new();
        surface.swap_buffers();
        surface.poll_events();
        surface.poll_events();

        assert_eq!(surface.presented_frames(), 1);
        assert_eq!(surface.event_polls(), 2);
    }
}
