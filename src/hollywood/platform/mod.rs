// Window system collaborators
//
// A Platform gives the compositor a place to draw and a stream of
// input. The headless platform is always available, SDL2 is behind the
// `sdl` feature.
//
// Austin Shafer - 2020
pub mod headless;
#[cfg(feature = "sdl")]
pub mod sdl;

use crate::hollywood::glcomp::RenderBackend;
use crate::hollywood::input::event::InputEvent;
use utils::Result;

use std::os::unix::io::RawFd;

/// Something the window system told us
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    Input(InputEvent),
    /// The output changed size
    Resized((u32, u32)),
    /// The output contents were lost and need a repaint
    Redraw,
    /// One of the fds added with add_watch_fd is readable
    UserFdReadable,
    Quit,
}

pub trait Platform {
    fn get_output_size(&self) -> (u32, u32);

    /// Create the backend that draws to this platform's output
    fn create_backend(&mut self) -> Result<Box<dyn RenderBackend>>;

    /// Wake up `dispatch` when `fd` is readable
    fn add_watch_fd(&mut self, fd: RawFd);

    fn remove_watch_fd(&mut self, fd: RawFd);

    /// Wait up to `timeout` ms for events and return them
    ///
    /// None waits until something happens.
    fn dispatch(&mut self, timeout: Option<usize>) -> Result<Vec<PlatformEvent>>;

    /// Present the frame that was just painted
    fn swap_buffers(&mut self);
}
