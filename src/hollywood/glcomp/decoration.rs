// Server side decorations
//
// Title bar panel, window icon and the close/maximize/minimize gems.
// Drawn into the surface's intermediate framebuffer after the shadow.
//
// Austin Shafer - 2020
use super::backend::{Color, RenderBackend, TextureId, Uniform};
use super::transform::target_transform;
use super::RenderContext;
use crate::hollywood::atmosphere::{DecorationMetrics, Surface};
use crate::hollywood::config::ViewMode;
use cgmath::{Matrix3, SquareMatrix};
use utils::region::Rect;
use utils::{log, Context, Result};

use std::path::Path;

/// Corner radius of the panel before scaling
const PANEL_RADIUS: f32 = 6.0;
/// How much an inactive window's panel is faded
const INACTIVE_LIGHTEN: f32 = 0.35;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DecorationColors {
    pub dc_window: Color,
    pub dc_text: Color,
    pub dc_stroke: Color,
}

impl DecorationColors {
    fn window_color(mode: ViewMode) -> Color {
        match mode {
            ViewMode::Light => Color::new(0xef as f32 / 255.0, 0xef as f32 / 255.0, 0xef as f32 / 255.0, 1.0),
            ViewMode::Dark => Color::new(0x1c as f32 / 255.0, 0x1b as f32 / 255.0, 0x22 as f32 / 255.0, 1.0),
        }
    }

    pub fn for_view_mode(mode: ViewMode) -> Self {
        let opposite = match mode {
            ViewMode::Light => ViewMode::Dark,
            ViewMode::Dark => ViewMode::Light,
        };

        Self {
            dc_window: Self::window_color(mode),
            dc_text: match mode {
                ViewMode::Light => Color::BLACK,
                ViewMode::Dark => Color::new(1.0, 1.0, 1.0, 1.0),
            },
            dc_stroke: Self::window_color(opposite).with_alpha(0.3),
        }
    }
}

/// Theme images shared by every decorated surface
#[derive(Debug, Default)]
pub struct GemTextures {
    pub gt_close: Option<TextureId>,
    pub gt_minimize: Option<TextureId>,
    pub gt_maximize: Option<TextureId>,
    pub gt_restore: Option<TextureId>,
    /// Window icon used for XWayland windows without one
    pub gt_xorg: Option<TextureId>,
    /// Window icon used for native windows without one
    pub gt_wayland: Option<TextureId>,
}

/// Decode a png and upload it
pub fn load_texture(backend: &mut dyn RenderBackend, path: &Path) -> Result<TextureId> {
    let img = image::open(path)
        .with_context(|| format!("Could not open image {:?}", path))?
        .to_rgba8();
    let (width, height) = img.dimensions();

    backend.create_texture((width, height), &img.into_raw())
}

impl GemTextures {
    /// Load the theme images for `mode` from `icon_dir`
    ///
    /// Gems live in `<icon_dir>/Light` or `<icon_dir>/Dark`. Any image
    /// that can't be loaded is left empty and simply not drawn.
    pub fn load(backend: &mut dyn RenderBackend, icon_dir: &Path, mode: ViewMode) -> Self {
        let theme_dir = icon_dir.join(match mode {
            ViewMode::Light => "Light",
            ViewMode::Dark => "Dark",
        });

        let mut load = |path: &Path| match load_texture(backend, path) {
            Ok(tex) => Some(tex),
            Err(e) => {
                log::debug!("Skipping theme image: {:#}", e);
                None
            }
        };

        Self {
            gt_close: load(&theme_dir.join("window-close.png")),
            gt_minimize: load(&theme_dir.join("window-minimize.png")),
            gt_maximize: load(&theme_dir.join("window-maximize.png")),
            gt_restore: load(&theme_dir.join("window-restore.png")),
            gt_xorg: load(&icon_dir.join("xorg.png")),
            gt_wayland: load(&icon_dir.join("wayland.png")),
        }
    }

    pub fn destroy(&mut self, backend: &mut dyn RenderBackend) {
        for tex in [
            self.gt_close.take(),
            self.gt_minimize.take(),
            self.gt_maximize.take(),
            self.gt_restore.take(),
            self.gt_xorg.take(),
            self.gt_wayland.take(),
        ]
        .iter()
        .flatten()
        {
            backend.destroy_texture(*tex);
        }
    }
}

/// Draws the chrome of one surface
pub struct DecorationRenderer {
    dr_colors: DecorationColors,
}

impl DecorationRenderer {
    pub fn new(mode: ViewMode) -> Self {
        Self {
            dr_colors: DecorationColors::for_view_mode(mode),
        }
    }

    pub fn get_colors(&self) -> DecorationColors {
        self.dr_colors
    }

    /// Paint the decorations of `surf` into the bound framebuffer
    ///
    /// `fb_size` is the size of the bound framebuffer, which must be
    /// the surface's render size at `scale`.
    pub fn paint(
        &self,
        ctx: &mut RenderContext,
        gems: &GemTextures,
        surf: &Surface,
        metrics: &DecorationMetrics,
        scale: f32,
        activated: bool,
        fb_size: (f32, f32),
    ) -> Result<()> {
        let fb_rect = Rect::new(0.0, 0.0, fb_size.0, fb_size.1);
        let shadow = surf.shadow_size() * scale;
        let size = surf.decorated_size(metrics);
        let panel = Rect::new(shadow, shadow, size.0 * scale, size.1 * scale);

        let color = match activated {
            true => self.dr_colors.dc_window,
            false => self.dr_colors.dc_window.lighter(INACTIVE_LIGHTEN),
        };

        let prog = ctx.panel_program()?;
        let uniforms = [
            ("u_target", Uniform::Mat4(target_transform(&panel, &fb_rect))),
            ("u_source", Uniform::Mat3(Matrix3::identity())),
            ("u_size", Uniform::Vec2([panel.width(), panel.height()])),
            ("u_radius", Uniform::Float(PANEL_RADIUS * scale)),
            ("u_color", Uniform::Vec4(color.as_array())),
            ("u_stroke", Uniform::Vec4(self.dr_colors.dc_stroke.as_array())),
            ("u_stroke_width", Uniform::Float(scale)),
        ];
        ctx.backend().draw_quad(prog, &uniforms, None)?;

        // punch out the client area
        let border = metrics.dm_border * scale;
        let decoration = metrics.dm_decoration * scale;
        ctx.backend().scissor_clear(
            Rect::new(
                (shadow + border) as i32,
                (shadow + decoration) as i32,
                (surf.s_size.0 * scale) as i32,
                (surf.s_size.1 * scale) as i32,
            ),
            Color::TRANSPARENT,
        );

        let layout = surf.gem_layout(metrics, scale);

        let icon = surf.s_icon.or(match surf.is_xwayland() {
            true => gems.gt_xorg,
            false => gems.gt_wayland,
        });
        if let Some(icon) = icon {
            ctx.blit_whole(icon, &layout.gl_icon, &fb_rect)?;
        }

        let maximize_tex = match surf.is_maximized() {
            true => gems.gt_restore,
            false => gems.gt_maximize,
        };
        for (rect, tex) in [
            (layout.gl_close, gems.gt_close),
            (layout.gl_maximize, maximize_tex),
            (layout.gl_minimize, gems.gt_minimize),
        ]
        .iter()
        {
            if let (Some(rect), Some(tex)) = (rect, tex) {
                ctx.blit(*tex, rect, &fb_rect, Matrix3::identity(), 1.0)?;
            }
        }

        Ok(())
    }
}
