// The paint loop of one display
//
// An OutputWindow draws the atmosphere's surfaces back to front once
// per frame and owns the input router for its display.
//
// Austin Shafer - 2020
use super::backend::{Color, Origin, RenderBackend, TextureId};
use super::decoration::{load_texture, DecorationColors, DecorationRenderer, GemTextures};
use super::shadow::ShadowRenderer;
use super::transform::{flip_viewport, source_transform};
use super::{RenderContext, ScreenCopyFrame};
use crate::hollywood::atmosphere::surface::SHADOW_THRESHOLD;
use crate::hollywood::atmosphere::{
    Atmosphere, CompositorEvent, OutputId, SurfaceFlags, SurfaceId, WalkOrder,
};
use crate::hollywood::config::{Config, ViewMode};
use crate::hollywood::input::event::InputEvent;
use crate::hollywood::input::seat::Seat;
use crate::hollywood::input::Input;
use utils::region::Rect;
use utils::timing::StopWatch;
use utils::{log, Result};

use std::collections::HashMap;
use std::path::PathBuf;

/// A rect in whole pixels, rounding outwards
fn pixel_rect(rect: &Rect<f32>) -> Rect<i32> {
    let left = rect.left().floor();
    let top = rect.top().floor();
    Rect::new(
        left as i32,
        top as i32,
        (rect.right().ceil() - left) as i32,
        (rect.bottom().ceil() - top) as i32,
    )
}

pub struct OutputWindow {
    ow_id: OutputId,
    ow_ctx: RenderContext,
    ow_input: Input,
    ow_background: Color,
    /// Wallpaper texture, drawn stretched over the output
    ow_wallpaper: Option<TextureId>,
    ow_icon_dir: PathBuf,
    /// One renderer per decorated surface, created when first drawn
    ow_decorations: HashMap<SurfaceId, DecorationRenderer>,
    /// The view mode ow_decorations and ow_gems were built for
    ow_decoration_mode: ViewMode,
    ow_gems: GemTextures,
    ow_shadow: ShadowRenderer,
    /// Pending one-shot screen copy
    ow_screencopy: Option<Box<dyn ScreenCopyFrame>>,
    ow_frame_timer: StopWatch,
}

impl OutputWindow {
    pub fn new(
        id: OutputId,
        backend: Box<dyn RenderBackend>,
        config: &Config,
        input: Input,
    ) -> Result<Self> {
        let mut ctx = RenderContext::new(backend);

        let background = match Color::from_hex(&config.background_color) {
            Ok(c) => c,
            Err(e) => {
                log::error!("Ignoring background color: {}", e);
                Color::BLACK
            }
        };

        let wallpaper = match config.wallpaper.as_ref() {
            Some(path) => match load_texture(ctx.backend(), path) {
                Ok(tex) => Some(tex),
                Err(e) => {
                    log::error!("Could not load wallpaper: {:#}", e);
                    None
                }
            },
            None => None,
        };

        let gems = GemTextures::load(ctx.backend(), &config.icon_dir, config.view_mode);

        Ok(Self {
            ow_id: id,
            ow_ctx: ctx,
            ow_input: input,
            ow_background: background,
            ow_wallpaper: wallpaper,
            ow_icon_dir: config.icon_dir.clone(),
            ow_decorations: HashMap::new(),
            ow_decoration_mode: config.view_mode,
            ow_gems: gems,
            ow_shadow: ShadowRenderer::new(),
            ow_screencopy: None,
            ow_frame_timer: StopWatch::new(),
        })
    }

    pub fn get_id(&self) -> OutputId {
        self.ow_id
    }

    pub fn get_input(&self) -> &Input {
        &self.ow_input
    }

    pub fn get_input_mut(&mut self) -> &mut Input {
        &mut self.ow_input
    }

    pub fn get_context(&mut self) -> &mut RenderContext {
        &mut self.ow_ctx
    }

    /// The display changed size
    pub fn resize(&mut self, atmos: &mut Atmosphere, size: (u32, u32)) {
        log::debug!("Output {} resized to {:?}", self.ow_id, size);
        self.ow_ctx.backend().resize(size);

        let rect = Rect::new(0.0, 0.0, size.0 as f32, size.1 as f32);
        atmos.set_output_rect(rect);
        atmos.set_available_geometry(rect);
    }

    pub fn handle_input_event(
        &mut self,
        atmos: &mut Atmosphere,
        seat: &mut dyn Seat,
        ev: &InputEvent,
    ) {
        self.ow_input.handle_input_event(atmos, seat, ev);
    }

    /// Copy the next frame into `frame`
    pub fn setup_screen_copy_frame(&mut self, frame: Box<dyn ScreenCopyFrame>) {
        self.ow_screencopy = Some(frame);
    }

    /// The colors the decoration of `id` is drawn with
    pub fn decoration_colors(&self, id: SurfaceId) -> Option<DecorationColors> {
        self.ow_decorations.get(&id).map(|d| d.get_colors())
    }

    /// Drop all decoration state built for the old view mode
    fn rebuild_decorations(&mut self, mode: ViewMode) {
        log::debug!("View mode changed to {:?}, rebuilding decorations", mode);
        self.ow_decorations.clear();
        self.ow_gems.destroy(self.ow_ctx.backend());
        self.ow_gems = GemTextures::load(self.ow_ctx.backend(), &self.ow_icon_dir, mode);
        self.ow_decoration_mode = mode;
    }

    /// Draw one frame
    pub fn paint(&mut self, atmos: &mut Atmosphere) -> Result<()> {
        if atmos.is_sleeping() {
            let backend = self.ow_ctx.backend();
            backend.bind_framebuffer(None);
            backend.clear(Color::BLACK);
            atmos.clear_changed();
            return Ok(());
        }

        self.ow_frame_timer.start();
        atmos.add_compositor_event(CompositorEvent::FrameStarted);

        let output = atmos.get_output_rect();
        {
            let backend = self.ow_ctx.backend();
            backend.bind_framebuffer(None);
            backend.viewport(pixel_rect(&output));
            backend.clear(self.ow_background);
        }

        if !atmos.get_login_manager() && !atmos.get_mini_mode() {
            if let Some(wallpaper) = self.ow_wallpaper {
                self.ow_ctx.blit_whole(wallpaper, &output, &output)?;
            }
        }

        let mode = atmos.get_view_mode();
        if mode != self.ow_decoration_mode {
            self.rebuild_decorations(mode);
        }
        self.ow_decorations.retain(|id, _| atmos.surface_exists(*id));

        for step in atmos.collect_surfaces(WalkOrder::Paint) {
            self.draw_surface(atmos, step.ws_id, &output)?;
        }

        if let Some(mut frame) = self.ow_screencopy.take() {
            let size = (output.width() as u32, output.height() as u32);
            let pixels = self.ow_ctx.backend().read_pixels(pixel_rect(&output))?;
            frame.copy(size, pixels);
        }

        atmos.add_compositor_event(CompositorEvent::FrameDone);
        atmos.clear_changed();

        self.ow_frame_timer.end();
        log::profiling!(
            "Output {} frame took {} ms",
            self.ow_id,
            self.ow_frame_timer.get_duration().as_millis()
        );
        Ok(())
    }

    /// Draw one surface and its chrome
    ///
    /// Surfaces that can't be drawn this frame are skipped silently.
    fn draw_surface(
        &mut self,
        atmos: &Atmosphere,
        id: SurfaceId,
        output: &Rect<f32>,
    ) -> Result<()> {
        let surf = match atmos.get_surface(id) {
            Some(s) => s,
            None => {
                log::debug!("Not drawing recycled surface {:?}", id);
                return Ok(());
            }
        };
        if !surf.has_flag(SurfaceFlags::READY) {
            return Ok(());
        }
        let view = match surf.get_view(self.ow_id) {
            Some(v) => v,
            None => return Ok(()),
        };
        let texture = match view.sv_texture {
            Some(t) => t,
            None => return Ok(()),
        };
        if !surf.has_flag(SurfaceFlags::HAS_CONTENT) && !view.sv_buffer_locked {
            return Ok(());
        }

        let metrics = atmos.get_decoration_metrics();
        if surf.surface_rect().is_empty() || !surf.decorated_rect(&metrics).overlaps(output) {
            return Ok(());
        }

        let direct = surf.is_fullscreen()
            || surf.has_flag(SurfaceFlags::FULLSCREEN_SHELL)
            || surf.has_flag(SurfaceFlags::SUBSURFACE);
        let shadowed =
            surf.shadow_size() > SHADOW_THRESHOLD && atmos.get_drag_icon() != Some(id);
        let decorated = surf.server_decorated();

        if !direct && (shadowed || decorated) {
            // chrome is drawn at the client's buffer scale
            let scale = surf.s_buffer_scale.max(1.0);
            let render_size = surf.render_size(&metrics);
            let fb_size = (
                (render_size.0 * scale).ceil(),
                (render_size.1 * scale).ceil(),
            );

            let fb = self
                .ow_ctx
                .backend()
                .create_framebuffer((fb_size.0 as u32, fb_size.1 as u32))?;

            let mode = self.ow_decoration_mode;
            // release the framebuffer even if drawing into it failed
            let res = (|| -> Result<()> {
                let backend = self.ow_ctx.backend();
                backend.bind_framebuffer(Some(fb));
                backend.viewport(Rect::new(0, 0, fb_size.0 as i32, fb_size.1 as i32));
                backend.clear(Color::TRANSPARENT);

                if shadowed {
                    self.ow_shadow
                        .paint(&mut self.ow_ctx, surf, &metrics, scale, fb_size)?;
                }
                if decorated {
                    let renderer = self
                        .ow_decorations
                        .entry(id)
                        .or_insert_with(|| DecorationRenderer::new(mode));
                    renderer.paint(
                        &mut self.ow_ctx,
                        &self.ow_gems,
                        surf,
                        &metrics,
                        scale,
                        atmos.is_activated(id),
                        fb_size,
                    )?;
                }

                let backend = self.ow_ctx.backend();
                backend.bind_framebuffer(None);
                backend.viewport(pixel_rect(output));

                if let Some(fb_tex) = backend.framebuffer_texture(fb) {
                    let whole = Rect::new(0.0, 0.0, fb_size.0, fb_size.1);
                    self.ow_ctx.blit(
                        fb_tex,
                        &surf.render_rect(&metrics),
                        output,
                        source_transform(&whole, fb_size, Origin::BottomLeft),
                        1.0,
                    )?;
                }
                Ok(())
            })();

            let backend = self.ow_ctx.backend();
            backend.bind_framebuffer(None);
            backend.destroy_framebuffer(fb);
            res?;
        }

        // the client content
        let scale = surf.s_buffer_scale.max(1.0);
        let tex_size = (surf.s_buffer_size.0 / scale, surf.s_buffer_size.1 / scale);
        let mut src = surf
            .s_source_geometry
            .unwrap_or_else(|| Rect::new(0.0, 0.0, tex_size.0, tex_size.1));
        if view.sv_origin == Origin::BottomLeft {
            src = flip_viewport(&src, tex_size.1);
        }

        self.ow_ctx.blit(
            texture,
            &surf.surface_rect(),
            output,
            source_transform(&src, tex_size, view.sv_origin),
            1.0,
        )
    }
}
