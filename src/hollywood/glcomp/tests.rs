// Tests for the paint loop
//
// Austin Shafer - 2020
use super::backend::*;
use super::decoration::DecorationColors;
use super::shadow::{ShadowParams, LIGHT_ANGLE};
use super::transform::*;
use super::*;
use crate::hollywood::atmosphere::{
    Atmosphere, CompositorEvent, Layer, Surface, SurfaceFlags, SurfaceId, SurfaceType,
};
use crate::hollywood::config::{Config, ViewMode};
use crate::hollywood::input::Input;
use crate::hollywood::shortcuts::ShortcutManager;
use cgmath::{Vector3, Vector4};
use utils::region::Rect;
use utils::Result;

use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct SpyLog {
    clears: Vec<Color>,
    programs: u32,
    fbs_created: u32,
    fb_sizes: Vec<(u32, u32)>,
    fbs_destroyed: u32,
    /// texture of every quad drawn
    draws: Vec<Option<TextureId>>,
    scissors: Vec<Rect<i32>>,
}

/// Records what the renderers ask for
struct SpyBackend {
    sb_log: Rc<RefCell<SpyLog>>,
    sb_next_id: u32,
}

impl RenderBackend for SpyBackend {
    fn resize(&mut self, _size: (u32, u32)) {}

    fn clear(&mut self, color: Color) {
        self.sb_log.borrow_mut().clears.push(color);
    }

    fn viewport(&mut self, _rect: Rect<i32>) {}

    fn scissor_clear(&mut self, rect: Rect<i32>, _color: Color) {
        self.sb_log.borrow_mut().scissors.push(rect);
    }

    fn create_framebuffer(&mut self, size: (u32, u32)) -> Result<FramebufferId> {
        let mut log = self.sb_log.borrow_mut();
        log.fbs_created += 1;
        log.fb_sizes.push(size);
        drop(log);
        self.sb_next_id += 1;
        Ok(FramebufferId(self.sb_next_id))
    }

    fn bind_framebuffer(&mut self, _fb: Option<FramebufferId>) {}

    fn framebuffer_texture(&self, fb: FramebufferId) -> Option<TextureId> {
        Some(TextureId(1000 + fb.0))
    }

    fn destroy_framebuffer(&mut self, _fb: FramebufferId) {
        self.sb_log.borrow_mut().fbs_destroyed += 1;
    }

    fn create_texture(&mut self, _size: (u32, u32), _rgba: &[u8]) -> Result<TextureId> {
        self.sb_next_id += 1;
        Ok(TextureId(self.sb_next_id))
    }

    fn destroy_texture(&mut self, _tex: TextureId) {}

    fn compile_program(&mut self, _vertex: &str, _fragment: &str) -> Result<ProgramId> {
        self.sb_log.borrow_mut().programs += 1;
        self.sb_next_id += 1;
        Ok(ProgramId(self.sb_next_id))
    }

    fn draw_quad(
        &mut self,
        _program: ProgramId,
        _uniforms: &[(&str, Uniform)],
        texture: Option<TextureId>,
    ) -> Result<()> {
        self.sb_log.borrow_mut().draws.push(texture);
        Ok(())
    }

    fn read_pixels(&mut self, rect: Rect<i32>) -> Result<Vec<u8>> {
        Ok(vec![0; (rect.width() * rect.height() * 4) as usize])
    }
}

fn setup() -> (Atmosphere, OutputWindow, Rc<RefCell<SpyLog>>) {
    let config = Config::default();
    let log = Rc::new(RefCell::new(SpyLog::default()));
    let backend = SpyBackend {
        sb_log: log.clone(),
        sb_next_id: 0,
    };

    let input = Input::new(ShortcutManager::new(&config.shortcuts).unwrap());
    let output = OutputWindow::new(0, Box::new(backend), &config, input).unwrap();
    (Atmosphere::new(&config), output, log)
}

/// A toplevel that is ready to draw with texture `tex`
fn add_window(atmos: &mut Atmosphere, flags: SurfaceFlags, tex: u32) -> SurfaceId {
    let mut surf = Surface::new(SurfaceType::TopLevel);
    surf.s_pos = (200.0, 200.0);
    surf.s_size = (400.0, 300.0);
    surf.s_buffer_size = (400.0, 300.0);
    surf.s_flags =
        flags | SurfaceFlags::READY | SurfaceFlags::HAS_CONTENT | SurfaceFlags::XDG_TOPLEVEL;
    surf.get_view_mut(0).sv_texture = Some(TextureId(tex));

    let id = atmos.create_surface(surf);
    atmos.add_to_layer(id, Layer::Normal);
    id
}

fn drain_events(atmos: &mut Atmosphere) -> Vec<CompositorEvent> {
    let mut ret = Vec::new();
    while let Some(ev) = atmos.get_next_compositor_event() {
        ret.push(ev);
    }
    ret
}

#[test]
fn sleeping_only_clears() {
    let (mut atmos, mut output, log) = setup();
    add_window(&mut atmos, SurfaceFlags::SSD, 10);
    atmos.sleep();
    drain_events(&mut atmos);
    atmos.a_walk_count.set(0);

    output.paint(&mut atmos).unwrap();

    assert_eq!(atmos.a_walk_count.get(), 0);
    let log = log.borrow();
    assert_eq!(log.clears, vec![Color::BLACK]);
    assert!(log.draws.is_empty());
    assert_eq!(log.fbs_created, 0);
    assert!(drain_events(&mut atmos).is_empty());
}

#[test]
fn frame_events_bracket_the_frame() {
    let (mut atmos, mut output, _log) = setup();
    add_window(&mut atmos, SurfaceFlags::NONE, 10);
    drain_events(&mut atmos);

    output.paint(&mut atmos).unwrap();

    assert_eq!(
        drain_events(&mut atmos),
        vec![CompositorEvent::FrameStarted, CompositorEvent::FrameDone]
    );
    assert!(!atmos.is_changed());
}

#[test]
fn decorated_window_uses_one_framebuffer() {
    let (mut atmos, mut output, log) = setup();
    let id = add_window(&mut atmos, SurfaceFlags::SSD, 10);

    output.paint(&mut atmos).unwrap();

    let log = log.borrow();
    assert_eq!(log.fbs_created, 1);
    assert_eq!(log.fbs_destroyed, 1);
    // shadow, panel, framebuffer blit, content
    assert!(log.draws.contains(&Some(TextureId(10))));
    assert!(log.draws.contains(&None));
    assert!(output.decoration_colors(id).is_some());
}

#[test]
fn framebuffer_follows_buffer_scale() {
    let (mut atmos, mut output, log) = setup();
    let id = add_window(&mut atmos, SurfaceFlags::SSD, 10);
    {
        let surf = atmos.get_surface_mut(id).unwrap();
        surf.s_buffer_scale = 2.0;
        surf.s_buffer_size = (800.0, 600.0);
    }

    output.paint(&mut atmos).unwrap();

    // 400x300 plus border, title bar and 45px of shadow per side
    assert_eq!(log.borrow().fb_sizes, vec![(984, 842)]);
}

#[test]
fn fullscreen_skips_decorations() {
    let (mut atmos, mut output, log) = setup();
    let id = add_window(&mut atmos, SurfaceFlags::SSD | SurfaceFlags::FULLSCREEN, 10);

    output.paint(&mut atmos).unwrap();

    let log = log.borrow();
    assert_eq!(log.fbs_created, 0);
    assert_eq!(log.draws, vec![Some(TextureId(10))]);
    assert!(output.decoration_colors(id).is_none());
}

#[test]
fn fullscreen_shell_skips_decorations() {
    let (mut atmos, mut output, log) = setup();
    let id = add_window(&mut atmos, SurfaceFlags::SSD | SurfaceFlags::FULLSCREEN_SHELL, 10);

    output.paint(&mut atmos).unwrap();

    let log = log.borrow();
    assert_eq!(log.fbs_created, 0);
    assert_eq!(log.draws, vec![Some(TextureId(10))]);
    assert!(output.decoration_colors(id).is_none());
}

/// A shadowed popup under an undecorated, unshadowed window
fn add_popup(atmos: &mut Atmosphere, flags: SurfaceFlags) {
    let parent = add_window(atmos, SurfaceFlags::CLIENT_SHADOW, 10);

    let mut popup = Surface::new(SurfaceType::Popup);
    popup.s_pos = (250.0, 250.0);
    popup.s_size = (100.0, 50.0);
    popup.s_buffer_size = (100.0, 50.0);
    popup.s_flags = flags | SurfaceFlags::READY | SurfaceFlags::HAS_CONTENT;
    popup.get_view_mut(0).sv_texture = Some(TextureId(11));
    let popup = atmos.create_surface(popup);
    atmos.set_parent(popup, parent);
}

#[test]
fn popup_shadow_uses_a_framebuffer() {
    let (mut atmos, mut output, log) = setup();
    add_popup(&mut atmos, SurfaceFlags::empty());

    output.paint(&mut atmos).unwrap();

    assert_eq!(log.borrow().fbs_created, 1);
}

#[test]
fn subsurface_skips_shadow() {
    let (mut atmos, mut output, log) = setup();
    add_popup(&mut atmos, SurfaceFlags::SUBSURFACE);

    output.paint(&mut atmos).unwrap();

    let log = log.borrow();
    assert_eq!(log.fbs_created, 0);
    assert_eq!(log.draws, vec![Some(TextureId(10)), Some(TextureId(11))]);
}

#[test]
fn undecorated_tool_has_no_chrome() {
    let (mut atmos, mut output, log) = setup();
    let mut surf = Surface::new(SurfaceType::TopLevelTool);
    surf.s_size = (100.0, 100.0);
    surf.s_buffer_size = (100.0, 100.0);
    surf.s_flags = SurfaceFlags::READY | SurfaceFlags::HAS_CONTENT;
    surf.get_view_mut(0).sv_texture = Some(TextureId(7));
    let id = atmos.create_surface(surf);
    atmos.add_to_layer(id, Layer::Normal);

    output.paint(&mut atmos).unwrap();

    let log = log.borrow();
    assert_eq!(log.fbs_created, 0);
    assert_eq!(log.draws, vec![Some(TextureId(7))]);
}

#[test]
fn programs_compiled_once() {
    let (mut atmos, mut output, log) = setup();
    add_window(&mut atmos, SurfaceFlags::SSD, 10);
    add_window(&mut atmos, SurfaceFlags::SSD, 11);

    output.paint(&mut atmos).unwrap();
    output.paint(&mut atmos).unwrap();

    // blit, panel and shadow
    assert_eq!(log.borrow().programs, 3);
    assert_eq!(log.borrow().fbs_created, 4);
    assert_eq!(log.borrow().fbs_destroyed, 4);
}

#[test]
fn theme_switch_is_idempotent() {
    let (mut atmos, mut output, _log) = setup();
    let id = add_window(&mut atmos, SurfaceFlags::SSD, 10);

    output.paint(&mut atmos).unwrap();
    let light = output.decoration_colors(id).unwrap();
    assert_eq!(light, DecorationColors::for_view_mode(ViewMode::Light));

    atmos.set_view_mode(ViewMode::Dark);
    output.paint(&mut atmos).unwrap();
    let dark = output.decoration_colors(id).unwrap();
    assert_ne!(light, dark);

    atmos.set_view_mode(ViewMode::Light);
    output.paint(&mut atmos).unwrap();
    assert_eq!(output.decoration_colors(id).unwrap(), light);
}

#[test]
fn minimized_is_not_drawn() {
    let (mut atmos, mut output, log) = setup();
    add_window(&mut atmos, SurfaceFlags::NONE, 10);
    let hidden = add_window(&mut atmos, SurfaceFlags::NONE, 11);
    atmos.set_minimized(hidden, true);

    output.paint(&mut atmos).unwrap();

    let log = log.borrow();
    assert!(log.draws.contains(&Some(TextureId(10))));
    assert!(!log.draws.contains(&Some(TextureId(11))));
}

#[test]
fn not_ready_or_untextured_is_skipped() {
    let (mut atmos, mut output, log) = setup();
    let no_tex = add_window(&mut atmos, SurfaceFlags::SSD, 10);
    atmos.get_surface_mut(no_tex).unwrap().get_view_mut(0).sv_texture = None;
    let not_ready = add_window(&mut atmos, SurfaceFlags::SSD, 11);
    atmos
        .get_surface_mut(not_ready)
        .unwrap()
        .set_flag(SurfaceFlags::READY, false);
    let empty = add_window(&mut atmos, SurfaceFlags::NONE, 12);
    atmos.set_surface_size(empty, (0.0, 0.0));
    let offscreen = add_window(&mut atmos, SurfaceFlags::NONE, 13);
    atmos.set_surface_position(offscreen, (5000.0, 5000.0));

    output.paint(&mut atmos).unwrap();

    let log = log.borrow();
    assert_eq!(log.fbs_created, 0);
    assert!(log.draws.is_empty());
}

#[test]
fn locked_buffer_is_drawn_without_content() {
    let (mut atmos, mut output, log) = setup();
    let id = add_window(&mut atmos, SurfaceFlags::NONE, 10);
    {
        let surf = atmos.get_surface_mut(id).unwrap();
        surf.set_flag(SurfaceFlags::HAS_CONTENT, false);
        surf.get_view_mut(0).sv_buffer_locked = true;
    }

    output.paint(&mut atmos).unwrap();

    assert!(log.borrow().draws.contains(&Some(TextureId(10))));
}

struct CopySpy(Rc<RefCell<Vec<(u32, u32)>>>);

impl ScreenCopyFrame for CopySpy {
    fn copy(&mut self, size: (u32, u32), pixels: Vec<u8>) {
        assert_eq!(pixels.len(), (size.0 * size.1 * 4) as usize);
        self.0.borrow_mut().push(size);
    }
}

#[test]
fn screencopy_is_one_shot() {
    let (mut atmos, mut output, _log) = setup();
    let copies = Rc::new(RefCell::new(Vec::new()));
    output.setup_screen_copy_frame(Box::new(CopySpy(copies.clone())));

    output.paint(&mut atmos).unwrap();
    output.paint(&mut atmos).unwrap();

    assert_eq!(*copies.borrow(), vec![(1280, 720)]);
}

#[test]
fn shadow_clears_window_interior() {
    let (mut atmos, mut output, log) = setup();
    add_window(&mut atmos, SurfaceFlags::SSD, 10);

    output.paint(&mut atmos).unwrap();

    // shadow 45, border 1, content 400x300 plus the 30 px title bar
    assert!(log
        .borrow()
        .scissors
        .contains(&Rect::new(46, 46, 400, 330)));
}

#[test]
fn target_transform_corners() {
    let viewport = Rect::new(0.0, 0.0, 200.0, 100.0);
    let m = target_transform(&viewport, &viewport);

    let top_left = m * Vector4::new(0.0, 0.0, 0.0, 1.0);
    assert_eq!((top_left.x, top_left.y), (-1.0, 1.0));
    let bottom_right = m * Vector4::new(1.0, 1.0, 0.0, 1.0);
    assert_eq!((bottom_right.x, bottom_right.y), (1.0, -1.0));

    let m = target_transform(&Rect::new(100.0, 50.0, 100.0, 50.0), &viewport);
    let top_left = m * Vector4::new(0.0, 0.0, 0.0, 1.0);
    assert_eq!((top_left.x, top_left.y), (0.0, 0.0));
}

#[test]
fn source_transform_origins() {
    let whole = Rect::new(0.0, 0.0, 64.0, 32.0);

    let m = source_transform(&whole, (64.0, 32.0), Origin::TopLeft);
    let uv = m * Vector3::new(1.0, 1.0, 1.0);
    assert_eq!((uv.x, uv.y), (1.0, 1.0));

    let m = source_transform(&whole, (64.0, 32.0), Origin::BottomLeft);
    let top = m * Vector3::new(0.0, 0.0, 1.0);
    assert_eq!((top.x, top.y), (0.0, 1.0));
    let bottom = m * Vector3::new(0.0, 1.0, 1.0);
    assert_eq!((bottom.x, bottom.y), (0.0, 0.0));
}

#[test]
fn short_viewport_sits_at_the_bottom() {
    let src = Rect::new(0.0, 10.0, 100.0, 50.0);
    assert_eq!(flip_viewport(&src, 100.0), Rect::new(0.0, 40.0, 100.0, 50.0));

    let full = Rect::new(0.0, 0.0, 100.0, 100.0);
    assert_eq!(flip_viewport(&full, 100.0), full);
}

#[test]
fn shadow_params_follow_light_angle() {
    let p = ShadowParams::from_light_angle(LIGHT_ANGLE);
    let z = 1.0 + (4.0 * LIGHT_ANGLE).sin();

    assert!((p.sp_z - z).abs() < 1e-5);
    assert!((p.sp_radius - (28.0 + z)).abs() < 1e-5);
    assert!((p.sp_sigma - 10.0 * z).abs() < 1e-4);
    assert!(p.sp_corner >= 0.0 && p.sp_corner <= p.sp_radius);
}

#[test]
fn colors() {
    let c = Color::from_hex("#1c1b22").unwrap();
    assert_eq!(c, DecorationColors::for_view_mode(ViewMode::Dark).dc_window);
    assert_eq!(Color::from_hex("#00000080").unwrap().a, 128.0 / 255.0);
    assert!(Color::from_hex("#12345").is_err());
    assert!(Color::from_hex("#gggggg").is_err());

    let light = DecorationColors::for_view_mode(ViewMode::Light);
    assert_eq!(light.dc_text, Color::BLACK);
    assert_eq!(light.dc_window.lighter(1.0), Color::new(1.0, 1.0, 1.0, 1.0));
}
