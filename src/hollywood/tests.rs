// Tests for the event loop
//
// Austin Shafer - 2020
use super::*;
use crate::hollywood::atmosphere::{Layer, Surface, SurfaceFlags, SurfaceType};
use crate::hollywood::glcomp::headless::HeadlessBackend;
use crate::hollywood::glcomp::RenderBackend;
use crate::hollywood::input::event::{InputEvent, PointerMove};
use utils::region::Rect;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::os::unix::io::RawFd;
use std::rc::Rc;

/// Hands out a scripted batch of events per dispatch
struct ScriptedPlatform {
    sp_size: (u32, u32),
    sp_batches: VecDeque<Vec<PlatformEvent>>,
    sp_swaps: Rc<Cell<usize>>,
}

impl Platform for ScriptedPlatform {
    fn get_output_size(&self) -> (u32, u32) {
        self.sp_size
    }

    fn create_backend(&mut self) -> Result<Box<dyn RenderBackend>> {
        Ok(Box::new(HeadlessBackend::new(self.sp_size)))
    }

    fn add_watch_fd(&mut self, _fd: RawFd) {}

    fn remove_watch_fd(&mut self, _fd: RawFd) {}

    fn dispatch(&mut self, _timeout: Option<usize>) -> Result<Vec<PlatformEvent>> {
        Ok(self
            .sp_batches
            .pop_front()
            .unwrap_or_else(|| vec![PlatformEvent::Quit]))
    }

    fn swap_buffers(&mut self) {
        self.sp_swaps.set(self.sp_swaps.get() + 1);
    }
}

#[derive(Clone, Default)]
struct RecordingSeat {
    rs_events: Rc<RefCell<Vec<SeatEvent>>>,
}

impl Seat for RecordingSeat {
    fn deliver(&mut self, ev: SeatEvent) {
        self.rs_events.borrow_mut().push(ev);
    }
}

struct Harness {
    hw: Hollywood,
    swaps: Rc<Cell<usize>>,
    seat: RecordingSeat,
}

fn config() -> Config {
    let mut config = Config::default();
    config.xwayland.enabled = false;
    config.icon_dir = PathBuf::from("/nonexistent");
    config
}

fn harness(config: &Config, batches: Vec<Vec<PlatformEvent>>) -> Harness {
    let swaps = Rc::new(Cell::new(0));
    let seat = RecordingSeat::default();
    let platform = ScriptedPlatform {
        sp_size: (800, 600),
        sp_batches: batches.into(),
        sp_swaps: swaps.clone(),
    };

    Harness {
        hw: Hollywood::spin(config, Box::new(platform), Box::new(seat.clone())).unwrap(),
        swaps,
        seat,
    }
}

#[test]
fn output_takes_the_platform_size() {
    let h = harness(&config(), Vec::new());
    assert_eq!(
        h.hw.get_atmosphere().get_output_rect(),
        Rect::new(0.0, 0.0, 800.0, 600.0)
    );
}

#[test]
fn quit_stops_the_loop() {
    let mut h = harness(&config(), vec![vec![PlatformEvent::Quit]]);
    assert!(!h.hw.dispatch(None).unwrap());
}

#[test]
fn run_forever_returns_on_quit() {
    let mut h = harness(&config(), vec![Vec::new(), Vec::new()]);
    h.hw.run_forever().unwrap();
}

#[test]
fn frames_are_only_painted_when_something_changed() {
    let mut h = harness(&config(), vec![Vec::new(), Vec::new(), vec![PlatformEvent::Redraw]]);

    // the first frame is always drawn
    assert!(h.hw.dispatch(None).unwrap());
    assert_eq!(h.swaps.get(), 1);

    assert!(h.hw.dispatch(None).unwrap());
    assert_eq!(h.swaps.get(), 1);

    assert!(h.hw.dispatch(None).unwrap());
    assert_eq!(h.swaps.get(), 2);
}

#[test]
fn resizes_update_the_output() {
    let mut h = harness(&config(), vec![vec![PlatformEvent::Resized((1920, 1080))]]);
    h.hw.dispatch(None).unwrap();

    let atmos = h.hw.get_atmosphere();
    assert_eq!(atmos.get_output_rect(), Rect::new(0.0, 0.0, 1920.0, 1080.0));
    assert_eq!(
        atmos.get_available_geometry(),
        Rect::new(0.0, 0.0, 1920.0, 1080.0)
    );
}

#[test]
fn client_events_reach_the_frontend() {
    let mut h = harness(
        &config(),
        vec![vec![PlatformEvent::Input(InputEvent::PointerMove(PointerMove {
            pm_pos: (150.0, 150.0),
            pm_delta: (150.0, 150.0),
        }))]],
    );

    let mut surf = Surface::new(SurfaceType::TopLevel);
    surf.set_flag(SurfaceFlags::XDG_TOPLEVEL | SurfaceFlags::READY, true);
    surf.s_pos = (100.0, 100.0);
    surf.s_size = (200.0, 200.0);
    let atmos = h.hw.get_atmosphere_mut();
    let id = atmos.create_surface(surf);
    atmos.add_to_layer(id, Layer::Normal);

    h.hw.dispatch(None).unwrap();

    assert!(h.seat.rs_events.borrow().contains(&SeatEvent::PointerMotion {
        surface: id,
        local: (50.0, 50.0),
    }));
}

#[test]
fn missing_xwayland_is_not_fatal() {
    let mut config = config();
    config.xwayland.enabled = true;
    config.xwayland.binary = "/nonexistent/Xwayland".to_string();

    let mut h = harness(&config, Vec::new());
    assert!(h.hw.get_xwayland_mut().is_none());

    let atmos = h.hw.get_atmosphere_mut();
    let mut failed = false;
    while let Some(ev) = atmos.get_next_compositor_event() {
        if let CompositorEvent::XWaylandFailed(_) = ev {
            failed = true;
        }
    }
    assert!(failed);
}

#[test]
fn screenshots_are_written_as_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shot.png");

    let mut frame = ScreenshotFrame {
        sf_path: path.clone(),
    };
    let mut pixels = Vec::new();
    for _ in 0..4 {
        pixels.extend_from_slice(&[255, 0, 0, 255]);
    }
    frame.copy((2, 2), pixels);

    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (2, 2));
    assert_eq!(img.get_pixel(1, 1).0, [255, 0, 0, 255]);
}

#[test]
fn short_screen_copies_are_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shot.png");

    let mut frame = ScreenshotFrame {
        sf_path: path.clone(),
    };
    frame.copy((4, 4), vec![0; 8]);
    assert!(!path.exists());
}
