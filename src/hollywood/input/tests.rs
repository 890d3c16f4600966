// Tests for input routing and grabs
//
// Austin Shafer - 2020
use super::edges::*;
use super::event::*;
use super::seat::{QueuedSeat, SeatEvent};
use super::*;
use crate::hollywood::atmosphere::surface::GemLayout;
use crate::hollywood::atmosphere::{CompositorEvent, Surface};
use crate::hollywood::config::{Config, ShortcutConfig};
use crate::hollywood::shortcuts::{ShortcutAction, ShortcutManager};
use utils::region::Rect;
use xkbcommon::xkb;

struct Harness {
    atmos: Atmosphere,
    input: Input,
    seat: QueuedSeat,
}

impl Harness {
    fn new() -> Self {
        let shortcuts = ShortcutManager::new(&ShortcutConfig::default()).unwrap();
        Self {
            atmos: Atmosphere::new(&Config::default()),
            input: Input::new(shortcuts),
            seat: QueuedSeat::new(),
        }
    }

    fn window(&mut self, pos: (f32, f32), size: (f32, f32), ssd: bool) -> SurfaceId {
        let mut surf = Surface::new(SurfaceType::TopLevel);
        surf.set_flag(SurfaceFlags::XDG_TOPLEVEL | SurfaceFlags::READY, true);
        surf.set_flag(SurfaceFlags::SSD, ssd);
        surf.s_pos = pos;
        surf.s_size = size;

        let id = self.atmos.create_surface(surf);
        self.atmos.add_to_layer(id, Layer::Normal);
        id
    }

    fn send(&mut self, ev: InputEvent) {
        self.input
            .handle_input_event(&mut self.atmos, &mut self.seat, &ev);
    }

    fn move_to(&mut self, x: f32, y: f32) {
        let last = self.atmos.get_cursor_pos();
        self.send(InputEvent::PointerMove(PointerMove {
            pm_pos: (x, y),
            pm_delta: (x - last.0, y - last.1),
        }));
    }

    fn button(&mut self, button: u32, pressed: bool, mods: Mods) {
        self.send(InputEvent::PointerButton(PointerButton {
            pb_button: button,
            pb_pressed: pressed,
            pb_mods: mods,
        }));
    }

    /// Hover then press, only the press's events stay queued
    fn click_at(&mut self, x: f32, y: f32) {
        self.move_to(x, y);
        self.seat.drain();
        self.button(BTN_LEFT, true, Mods::NONE);
    }

    fn key(&mut self, keysym: u32, mods: Mods) {
        self.send(InputEvent::Key(Key {
            k_scancode: 30,
            k_keysym: keysym,
            k_mods: mods,
            k_pressed: true,
        }));
    }

    /// Everything delivered except raw motion
    fn events(&mut self) -> Vec<SeatEvent> {
        self.seat
            .drain()
            .into_iter()
            .filter(|ev| match ev {
                SeatEvent::RelativeMotion { .. } => false,
                _ => true,
            })
            .collect()
    }
}

#[test]
fn left_edge_is_detected() {
    let rect = Rect::new(100.0, 100.0, 300.0, 200.0);
    let edge = near_edge(&rect, 100.0, 200.0);

    assert_eq!(edge, ResizeEdge::LEFT);
    assert_eq!(cursor_for_edge(edge), CursorShape::SizeHor);
}

#[test]
fn corners_and_interior() {
    let rect = Rect::new(100.0, 100.0, 300.0, 200.0);

    assert_eq!(near_edge(&rect, 95.0, 95.0), ResizeEdge::TOP_LEFT);
    assert_eq!(near_edge(&rect, 400.0, 300.0), ResizeEdge::BOTTOM_RIGHT);
    assert_eq!(near_edge(&rect, 250.0, 200.0), ResizeEdge::NONE);
    // next to the edge's line but far away from the window
    assert_eq!(near_edge(&rect, 100.0, 500.0), ResizeEdge::NONE);

    assert_eq!(
        cursor_for_edge(ResizeEdge::TOP_RIGHT),
        CursorShape::SizeBDiag
    );
    assert_eq!(
        cursor_for_edge(ResizeEdge::TOP_LEFT),
        CursorShape::SizeFDiag
    );
    assert_eq!(cursor_for_edge(ResizeEdge::BOTTOM), CursorShape::SizeVer);
}

#[test]
fn anchor_round_trips_for_top_left() {
    let anchor = anchor_position((100.0, 100.0), ResizeEdge::TOP_LEFT, (300.0, 200.0));
    assert_eq!(anchor, (400.0, 300.0));
    assert_eq!(
        anchored_position(anchor, ResizeEdge::TOP_LEFT, (300.0, 200.0)),
        (100.0, 100.0)
    );
    // the bottom right edge moves nothing
    assert_eq!(
        anchor_position((100.0, 100.0), ResizeEdge::BOTTOM_RIGHT, (300.0, 200.0)),
        (100.0, 100.0)
    );
}

#[test]
fn hovering_an_edge_changes_the_cursor() {
    let mut h = Harness::new();
    h.window((100.0, 100.0), (300.0, 200.0), false);

    h.move_to(100.0, 200.0);
    assert_eq!(h.input.get_cursor(), CursorShape::SizeHor);

    h.move_to(250.0, 200.0);
    assert_eq!(h.input.get_cursor(), CursorShape::Arrow);
}

#[test]
fn press_on_edge_resizes() {
    let mut h = Harness::new();
    let id = h.window((100.0, 100.0), (300.0, 200.0), false);

    h.click_at(100.0, 200.0);
    match h.input.get_grab() {
        Grab::ResizeGrab {
            rg_surface,
            rg_edge,
            rg_initial_size,
            ..
        } => {
            assert_eq!(rg_surface, id);
            assert_eq!(rg_edge, ResizeEdge::LEFT);
            assert_eq!(rg_initial_size, (300.0, 200.0));
        }
        g => panic!("expected a resize grab, got {:?}", g),
    }
    assert_eq!(
        h.atmos.get_surface(id).unwrap().s_resize_anchor,
        Some((ResizeEdge::LEFT, (400.0, 100.0)))
    );
    h.events();

    h.move_to(80.0, 200.0);
    assert_eq!(
        h.events(),
        vec![SeatEvent::Resize {
            surface: id,
            initial_size: (300.0, 200.0),
            delta: (-20.0, 0.0),
            edge: ResizeEdge::LEFT,
        }]
    );

    h.button(BTN_LEFT, false, Mods::NONE);
    assert_eq!(h.input.get_grab(), Grab::NoGrab);
    assert_eq!(h.events(), vec![SeatEvent::ResizeFinished { surface: id }]);
    assert_eq!(h.atmos.get_surface(id).unwrap().s_resize_anchor, None);
}

#[test]
fn alt_press_moves_the_window() {
    let mut h = Harness::new();
    let id = h.window((100.0, 100.0), (300.0, 200.0), false);

    h.move_to(200.0, 150.0);
    h.button(BTN_LEFT, true, Mods::ALT);
    assert_eq!(
        h.input.get_grab(),
        Grab::MoveGrab {
            mg_surface: id,
            mg_offset: (100.0, 50.0),
        }
    );

    h.move_to(300.0, 250.0);
    assert_eq!(h.atmos.get_surface(id).unwrap().s_pos, (200.0, 200.0));
}

#[test]
fn only_one_grab_at_a_time() {
    let mut h = Harness::new();
    let id = h.window((100.0, 100.0), (300.0, 200.0), false);
    let other = h.window((600.0, 100.0), (300.0, 200.0), false);

    h.move_to(200.0, 150.0);
    h.button(BTN_LEFT, true, Mods::ALT);
    let grab = h.input.get_grab();
    h.events();

    // a second press on an edge of another window changes nothing
    h.move_to(600.0, 200.0);
    h.button(BTN_RIGHT, true, Mods::NONE);
    assert_eq!(h.input.get_grab(), grab);
    assert!(h.events().is_empty());
    assert_eq!(h.atmos.get_surface(other).unwrap().s_resize_anchor, None);

    // still held, still grabbed
    h.button(BTN_RIGHT, false, Mods::NONE);
    assert_eq!(h.input.get_grab(), grab);

    // client initiated grabs are refused too
    h.input.start_resize(&mut h.atmos, ResizeEdge::BOTTOM, false);
    h.input.start_drag(&mut h.atmos, None);
    assert_eq!(h.input.get_grab(), grab);

    h.button(BTN_LEFT, false, Mods::NONE);
    assert_eq!(h.input.get_grab(), Grab::NoGrab);
    assert_eq!(h.events(), vec![SeatEvent::MoveFinished { surface: id }]);
}

#[test]
fn content_press_reaches_the_client() {
    let mut h = Harness::new();
    let a = h.window((100.0, 100.0), (300.0, 200.0), false);
    let b = h.window((500.0, 100.0), (300.0, 200.0), false);
    h.atmos.raise(b);

    h.click_at(250.0, 200.0);
    assert_eq!(h.input.get_grab(), Grab::NoGrab);
    assert_eq!(h.input.get_selected(), Some(a));
    assert_eq!(h.atmos.get_raised(), Some(a));

    let events = h.events();
    assert!(events.contains(&SeatEvent::PointerMotion {
        surface: a,
        local: (150.0, 100.0),
    }));
    assert_eq!(
        events.last(),
        Some(&SeatEvent::PointerButton {
            surface: a,
            button: BTN_LEFT,
            pressed: true,
        })
    );

    // the pressed surface keeps the pointer until release
    h.move_to(600.0, 200.0);
    assert_eq!(
        h.events(),
        vec![SeatEvent::PointerMotion {
            surface: a,
            local: (500.0, 100.0),
        }]
    );

    h.button(BTN_LEFT, false, Mods::NONE);
    assert_eq!(
        h.events(),
        vec![SeatEvent::PointerButton {
            surface: a,
            button: BTN_LEFT,
            pressed: false,
        }]
    );
    assert_eq!(h.input.get_selected(), None);
}

/// Center of a gem in output coordinates
fn gem_center(h: &Harness, id: SurfaceId, pick: fn(&GemLayout) -> Option<Rect<f32>>) -> (f32, f32) {
    let metrics = h.atmos.get_decoration_metrics();
    let gems = h.atmos.get_surface(id).unwrap().gem_rects(&metrics);
    let rect = pick(&gems).unwrap();
    (
        rect.left() + rect.width() / 2.0,
        rect.top() + rect.height() / 2.0,
    )
}

#[test]
fn close_gem_closes() {
    let mut h = Harness::new();
    let id = h.window((100.0, 100.0), (300.0, 200.0), true);

    let pos = gem_center(&h, id, |g| g.gl_close);
    h.click_at(pos.0, pos.1);

    assert_eq!(h.input.get_grab(), Grab::NoGrab);
    assert_eq!(h.events(), vec![SeatEvent::Close { surface: id }]);
    h.button(BTN_LEFT, false, Mods::NONE);
    assert!(h.events().is_empty());
}

#[test]
fn maximize_gem_toggles() {
    let mut h = Harness::new();
    let id = h.window((100.0, 100.0), (300.0, 200.0), true);

    let pos = gem_center(&h, id, |g| g.gl_maximize);
    h.click_at(pos.0, pos.1);
    assert_eq!(
        h.events(),
        vec![SeatEvent::SetMaximized {
            surface: id,
            maximized: true,
        }]
    );
}

#[test]
fn minimize_gem_minimizes() {
    let mut h = Harness::new();
    let id = h.window((100.0, 100.0), (300.0, 200.0), true);
    h.atmos.raise(id);

    let pos = gem_center(&h, id, |g| g.gl_minimize);
    h.click_at(pos.0, pos.1);
    assert!(h.atmos.get_surface(id).unwrap().is_minimized());
    assert!(!h.atmos.is_activated(id));
    assert!(h.events().is_empty());
}

#[test]
fn title_bar_drag_moves() {
    let mut h = Harness::new();
    let id = h.window((100.0, 100.0), (300.0, 200.0), true);

    // in the title bar, away from the gems and edges
    h.click_at(200.0, 85.0);
    assert_eq!(
        h.input.get_grab(),
        Grab::MoveGrab {
            mg_surface: id,
            mg_offset: (100.0, -15.0),
        }
    );
    assert_eq!(h.atmos.get_raised(), Some(id));

    h.move_to(250.0, 95.0);
    assert_eq!(h.atmos.get_surface(id).unwrap().s_pos, (150.0, 110.0));
}

#[test]
fn maximized_title_bar_does_not_move() {
    let mut h = Harness::new();
    let id = h.window((100.0, 100.0), (300.0, 200.0), true);
    h.atmos
        .get_surface_mut(id)
        .unwrap()
        .set_flag(SurfaceFlags::MAXIMIZED, true);

    h.click_at(200.0, 85.0);
    assert_eq!(h.input.get_grab(), Grab::NoGrab);
}

#[test]
fn drag_and_drop() {
    let mut h = Harness::new();
    let source = h.window((100.0, 100.0), (300.0, 200.0), false);
    let target = h.window((500.0, 100.0), (300.0, 200.0), false);
    let icon = h.atmos.create_surface(Surface::new(SurfaceType::Unknown));

    h.click_at(200.0, 200.0);
    h.input.start_drag(&mut h.atmos, Some(icon));
    assert_eq!(h.input.get_grab(), Grab::DragGrab { dg_icon: Some(icon) });
    assert_eq!(h.atmos.get_drag_icon(), Some(icon));
    assert!(h.atmos.get_layers().lc_overlay.contains(&icon));
    h.events();

    h.move_to(600.0, 200.0);
    assert_eq!(
        h.events(),
        vec![SeatEvent::DragMotion {
            surface: Some(target),
            local: (100.0, 100.0),
        }]
    );
    assert_eq!(h.atmos.get_surface(icon).unwrap().s_pos, (600.0, 200.0));

    h.button(BTN_LEFT, false, Mods::NONE);
    assert_eq!(
        h.events(),
        vec![SeatEvent::Drop {
            surface: Some(target)
        }]
    );
    assert_eq!(h.atmos.get_drag_icon(), None);
    assert!(!h.atmos.get_layers().lc_overlay.contains(&icon));
    assert!(h.atmos.surface_exists(source));
}

#[test]
fn client_grabs_need_a_press() {
    let mut h = Harness::new();
    h.window((100.0, 100.0), (300.0, 200.0), false);

    h.input.start_move(&mut h.atmos);
    h.input.start_drag(&mut h.atmos, None);
    assert_eq!(h.input.get_grab(), Grab::NoGrab);

    h.click_at(200.0, 200.0);
    h.input.start_move(&mut h.atmos);
    assert!(matches!(h.input.get_grab(), Grab::MoveGrab { .. }));
}

#[test]
fn destroyed_selection_is_dropped() {
    let mut h = Harness::new();
    let id = h.window((100.0, 100.0), (300.0, 200.0), false);

    h.click_at(200.0, 200.0);
    h.atmos.destroy_surface(id);
    h.events();

    h.move_to(210.0, 200.0);
    h.button(BTN_LEFT, false, Mods::NONE);
    assert!(h.events().is_empty());
    assert_eq!(h.input.get_selected(), None);
}

#[test]
fn shortcuts_are_not_forwarded() {
    let mut h = Harness::new();

    h.key(xkb::keysyms::KEY_Tab, Mods::ALT);
    assert!(h.events().is_empty());
    assert_eq!(
        h.atmos.get_next_compositor_event(),
        Some(CompositorEvent::Shortcut(ShortcutAction::SwitchWindow))
    );

    h.key(xkb::keysyms::KEY_a, Mods::NONE);
    assert_eq!(
        h.events(),
        vec![SeatEvent::Key {
            scancode: 30,
            pressed: true,
        }]
    );
}

#[test]
fn input_wakes_the_display() {
    let mut h = Harness::new();
    h.atmos.sleep();
    assert!(h.atmos.is_sleeping());

    h.button(BTN_LEFT, true, Mods::NONE);
    assert!(!h.atmos.is_sleeping());
}

#[test]
fn scrolling_prefers_pixels() {
    let mut h = Harness::new();
    let id = h.window((100.0, 100.0), (300.0, 200.0), false);
    h.move_to(200.0, 200.0);
    h.events();

    h.send(InputEvent::Axis(Axis {
        ax_angle_delta: (0.0, 15.0),
        ax_pixel_delta: Some((0.0, 3.0)),
    }));
    h.send(InputEvent::Axis(Axis {
        ax_angle_delta: (-15.0, 0.0),
        ax_pixel_delta: None,
    }));

    assert_eq!(
        h.events(),
        vec![
            SeatEvent::Axis {
                surface: id,
                orientation: Orientation::Vertical,
                delta: 3.0,
            },
            SeatEvent::Axis {
                surface: id,
                orientation: Orientation::Horizontal,
                delta: -15.0,
            },
        ]
    );
}

#[test]
fn scrolling_wakes_the_display() {
    let mut h = Harness::new();
    h.atmos.sleep();

    h.send(InputEvent::Axis(Axis {
        ax_angle_delta: (0.0, 15.0),
        ax_pixel_delta: None,
    }));
    assert!(!h.atmos.is_sleeping());
}

#[test]
fn button_release_wakes_the_display() {
    let mut h = Harness::new();
    h.atmos.sleep();

    h.button(BTN_LEFT, false, Mods::NONE);
    assert!(!h.atmos.is_sleeping());
}

#[test]
fn key_release_wakes_the_display() {
    let mut h = Harness::new();
    h.atmos.sleep();

    h.send(InputEvent::Key(Key {
        k_scancode: 30,
        k_keysym: xkb::keysyms::KEY_a,
        k_mods: Mods::NONE,
        k_pressed: false,
    }));
    assert!(!h.atmos.is_sleeping());
}

#[test]
fn zero_pixel_scroll_is_still_pixels() {
    let mut h = Harness::new();
    let id = h.window((100.0, 100.0), (300.0, 200.0), false);
    h.move_to(200.0, 200.0);
    h.events();

    h.send(InputEvent::Axis(Axis {
        ax_angle_delta: (0.0, 15.0),
        ax_pixel_delta: Some((0.0, 0.0)),
    }));

    assert_eq!(
        h.events(),
        vec![SeatEvent::Axis {
            surface: id,
            orientation: Orientation::Vertical,
            delta: 0.0,
        }]
    );
}
