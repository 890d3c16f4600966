//! # GL Compositor
//!
//! Also known as the `glcomp` subsystem.
//!
//! `glcomp` takes the current state of the `atmosphere` and draws the
//! windows on the user's display. It does not decide where anything
//! goes, positions come from `input` and the protocol layers.
//!
//! Every window that needs chrome is drawn in two steps. First an
//! intermediate framebuffer the size of the window plus its shadow is
//! allocated, and the shadow and server side decorations are painted
//! into it. That framebuffer is blitted to the output and the client's
//! texture is blitted on top. The framebuffer is released before the
//! next window is drawn.
//!
//! ### Code
//! * `backend` - The `RenderBackend` trait all drawing goes through
//! * `gl` - The OpenGL backend, built on `glow`
//! * `headless` - A backend that draws nothing, for running without a
//! display
//! * `transform` - Quad placement matrices
//! * `shaders` - GLSL sources
//! * `decoration` - Title bar, icon and gems
//! * `shadow` - Drop shadows
//! * `output` - The per display paint loop

// Austin Shafer - 2020
extern crate cgmath;
extern crate thiserror;

pub mod backend;
pub mod decoration;
pub mod gl;
pub mod headless;
pub mod output;
pub mod shaders;
pub mod shadow;
pub mod transform;

#[cfg(test)]
mod tests;

pub use backend::{
    Color, FramebufferId, Origin, ProgramId, RenderBackend, TextureId, Uniform,
};
pub use output::OutputWindow;

use cgmath::{Matrix3, SquareMatrix};
use utils::region::Rect;
use utils::{log, Result};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Could not create a {0}x{1} framebuffer: {2}")]
    Framebuffer(u32, u32, String),
    #[error("Could not compile shader program: {0}")]
    Shader(String),
    #[error("Could not create texture: {0}")]
    Texture(String),
    #[error("Unknown {0}")]
    InvalidHandle(&'static str),
}

/// A consumer of screen contents
///
/// Attached with `OutputWindow::setup_screen_copy_frame`. The next
/// painted frame is handed to it once, then it is dropped.
pub trait ScreenCopyFrame {
    /// `pixels` is RGBA8, top row first
    fn copy(&mut self, size: (u32, u32), pixels: Vec<u8>);
}

/// The programs we draw with
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ProgramKind {
    Blit,
    Panel,
    Shadow,
}

/// Shared drawing state of one output
///
/// Owns the backend and the shader programs. Programs are compiled the
/// first time a renderer asks for them and kept for the lifetime of
/// the context.
pub struct RenderContext {
    rc_backend: Box<dyn RenderBackend>,
    rc_blit: Option<ProgramId>,
    rc_panel: Option<ProgramId>,
    rc_shadow: Option<ProgramId>,
}

impl RenderContext {
    pub fn new(backend: Box<dyn RenderBackend>) -> Self {
        Self {
            rc_backend: backend,
            rc_blit: None,
            rc_panel: None,
            rc_shadow: None,
        }
    }

    pub fn backend(&mut self) -> &mut dyn RenderBackend {
        self.rc_backend.as_mut()
    }

    fn program(&mut self, kind: ProgramKind) -> Result<ProgramId> {
        let slot = match kind {
            ProgramKind::Blit => &mut self.rc_blit,
            ProgramKind::Panel => &mut self.rc_panel,
            ProgramKind::Shadow => &mut self.rc_shadow,
        };

        if let Some(prog) = *slot {
            return Ok(prog);
        }

        let fragment = match kind {
            ProgramKind::Blit => shaders::BLIT_FRAGMENT,
            ProgramKind::Panel => shaders::PANEL_FRAGMENT,
            ProgramKind::Shadow => shaders::SHADOW_FRAGMENT,
        };
        log::debug!("Compiling {:?} program", kind);
        let prog = self
            .rc_backend
            .compile_program(shaders::QUAD_VERTEX, fragment)?;
        *slot = Some(prog);
        Ok(prog)
    }

    pub fn blit_program(&mut self) -> Result<ProgramId> {
        self.program(ProgramKind::Blit)
    }

    pub fn panel_program(&mut self) -> Result<ProgramId> {
        self.program(ProgramKind::Panel)
    }

    pub fn shadow_program(&mut self) -> Result<ProgramId> {
        self.program(ProgramKind::Shadow)
    }

    /// Draw a texture into `rect` of the bound target
    ///
    /// `viewport` is the full target, `source` picks the texels.
    pub fn blit(
        &mut self,
        texture: TextureId,
        rect: &Rect<f32>,
        viewport: &Rect<f32>,
        source: Matrix3<f32>,
        alpha: f32,
    ) -> Result<()> {
        let prog = self.blit_program()?;
        let uniforms = [
            ("u_target", Uniform::Mat4(transform::target_transform(rect, viewport))),
            ("u_source", Uniform::Mat3(source)),
            ("u_size", Uniform::Vec2([rect.width(), rect.height()])),
            ("u_alpha", Uniform::Float(alpha)),
        ];

        self.rc_backend.draw_quad(prog, &uniforms, Some(texture))
    }

    /// Draw all of a TopLeft texture into `rect`
    pub fn blit_whole(
        &mut self,
        texture: TextureId,
        rect: &Rect<f32>,
        viewport: &Rect<f32>,
    ) -> Result<()> {
        self.blit(texture, rect, viewport, Matrix3::identity(), 1.0)
    }
}
