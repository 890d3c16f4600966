// Tests for the surface registry and layer ordering
//
// Austin Shafer - 2020
use super::surface::gem_layout;
use super::*;
use crate::hollywood::config::Config;
use crate::hollywood::input::edges::ResizeEdge;

fn toplevel(atmos: &mut Atmosphere, pos: (f32, f32), size: (f32, f32)) -> SurfaceId {
    let mut surf = Surface::new(SurfaceType::TopLevel);
    surf.set_flag(SurfaceFlags::XDG_TOPLEVEL | SurfaceFlags::READY, true);
    surf.s_pos = pos;
    surf.s_size = size;

    let id = atmos.create_surface(surf);
    atmos.add_to_layer(id, Layer::Normal);
    id
}

fn in_layer(atmos: &mut Atmosphere, layer: Layer) -> SurfaceId {
    let mut surf = Surface::new(SurfaceType::LayerShell);
    surf.s_size = (10.0, 10.0);
    let id = atmos.create_surface(surf);
    atmos.add_to_layer(id, layer);
    id
}

fn paint_order(atmos: &Atmosphere) -> Vec<SurfaceId> {
    atmos
        .collect_surfaces(WalkOrder::Paint)
        .iter()
        .map(|s| s.ws_id)
        .collect()
}

fn hit_order(atmos: &Atmosphere) -> Vec<SurfaceId> {
    atmos
        .collect_surfaces(WalkOrder::HitTest)
        .iter()
        .map(|s| s.ws_id)
        .collect()
}

fn drain_events(atmos: &mut Atmosphere) -> Vec<CompositorEvent> {
    let mut ret = Vec::new();
    while let Some(ev) = atmos.get_next_compositor_event() {
        ret.push(ev);
    }
    ret
}

#[test]
fn layers_paint_back_to_front() {
    let mut atmos = Atmosphere::new(&Config::default());
    let overlay = in_layer(&mut atmos, Layer::Overlay);
    let top = in_layer(&mut atmos, Layer::Top);
    let normal = toplevel(&mut atmos, (0.0, 0.0), (10.0, 10.0));
    let bottom = in_layer(&mut atmos, Layer::Bottom);
    let background = in_layer(&mut atmos, Layer::Background);

    assert_eq!(
        paint_order(&atmos),
        vec![background, bottom, normal, top, overlay]
    );
    assert_eq!(
        hit_order(&atmos),
        vec![overlay, top, normal, bottom, background]
    );
}

#[test]
fn raise_goes_on_top() {
    let mut atmos = Atmosphere::new(&Config::default());
    let a = toplevel(&mut atmos, (0.0, 0.0), (100.0, 100.0));
    let b = toplevel(&mut atmos, (0.0, 0.0), (100.0, 100.0));
    let c = toplevel(&mut atmos, (0.0, 0.0), (100.0, 100.0));

    assert_eq!(atmos.surface_at(50.0, 50.0), Some(c));

    atmos.raise(a);
    assert_eq!(paint_order(&atmos), vec![b, c, a]);
    assert_eq!(atmos.surface_at(50.0, 50.0), Some(a));
    assert!(atmos.is_activated(a));
    assert_eq!(atmos.get_activated(), Some(a));
}

#[test]
fn last_raised_always_wins() {
    let mut atmos = Atmosphere::new(&Config::default());
    let ids: Vec<SurfaceId> = (0..5)
        .map(|_| toplevel(&mut atmos, (0.0, 0.0), (100.0, 100.0)))
        .collect();

    for i in [3, 1, 4, 1, 0, 2, 2, 4].iter() {
        let id = ids[*i];
        atmos.raise(id);

        assert_eq!(paint_order(&atmos).last(), Some(&id));
        assert_eq!(hit_order(&atmos).first(), Some(&id));
        assert_eq!(atmos.surface_at(10.0, 10.0), Some(id));
    }
}

#[test]
fn raise_notifies_activation_changes() {
    let mut atmos = Atmosphere::new(&Config::default());
    let a = toplevel(&mut atmos, (0.0, 0.0), (100.0, 100.0));
    let b = toplevel(&mut atmos, (0.0, 0.0), (100.0, 100.0));
    atmos.raise(a);
    drain_events(&mut atmos);

    atmos.raise(b);
    assert_eq!(
        drain_events(&mut atmos),
        vec![
            CompositorEvent::SurfaceDeactivated(a),
            CompositorEvent::SurfaceActivated(b)
        ]
    );

    // raising the raised surface is a no-op
    atmos.raise(b);
    assert!(drain_events(&mut atmos).is_empty());
}

#[test]
fn raise_brings_transient_along() {
    let mut atmos = Atmosphere::new(&Config::default());
    let parent = toplevel(&mut atmos, (0.0, 0.0), (100.0, 100.0));
    let other = toplevel(&mut atmos, (0.0, 0.0), (100.0, 100.0));

    let mut dialog = Surface::new(SurfaceType::Transient);
    dialog.s_size = (20.0, 20.0);
    let dialog = atmos.create_surface(dialog);
    atmos.set_parent(dialog, parent);

    atmos.raise(parent);
    assert_eq!(paint_order(&atmos), vec![other, parent, dialog]);
    assert_eq!(atmos.get_activated(), Some(dialog));
    assert_eq!(atmos.get_raised(), Some(parent));
}

#[test]
fn children_follow_their_parent() {
    let mut atmos = Atmosphere::new(&Config::default());
    let parent = toplevel(&mut atmos, (0.0, 0.0), (100.0, 100.0));
    let mut popup = Surface::new(SurfaceType::Popup);
    popup.s_pos = (10.0, 10.0);
    popup.s_size = (20.0, 20.0);
    let popup = atmos.create_surface(popup);
    atmos.set_parent(popup, parent);

    let steps = atmos.collect_surfaces(WalkOrder::Paint);
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].ws_id, parent);
    assert!(!steps[0].ws_child);
    assert_eq!(steps[1].ws_id, popup);
    assert!(steps[1].ws_child);
    assert_eq!(steps[1].ws_layer, Layer::Normal);

    assert_eq!(hit_order(&atmos), vec![popup, parent]);
    assert_eq!(atmos.surface_at(15.0, 15.0), Some(popup));
    assert_eq!(atmos.surface_at(50.0, 50.0), Some(parent));
}

#[test]
fn background_children_paint_over_windows() {
    let mut atmos = Atmosphere::new(&Config::default());
    let desktop = in_layer(&mut atmos, Layer::Background);
    let window = toplevel(&mut atmos, (0.0, 0.0), (100.0, 100.0));

    let menu = atmos.create_surface(Surface::new(SurfaceType::Popup));
    atmos.set_parent(menu, desktop);

    assert_eq!(paint_order(&atmos), vec![desktop, window, menu]);
}

#[test]
fn minimized_trees_are_skipped() {
    let mut atmos = Atmosphere::new(&Config::default());
    let a = toplevel(&mut atmos, (0.0, 0.0), (100.0, 100.0));
    let b = toplevel(&mut atmos, (0.0, 0.0), (100.0, 100.0));
    let child = atmos.create_surface(Surface::new(SurfaceType::Popup));
    atmos.set_parent(child, b);
    atmos.raise(b);

    atmos.set_minimized(b, true);
    assert_eq!(paint_order(&atmos), vec![a]);
    assert_eq!(hit_order(&atmos), vec![a]);
    assert_eq!(atmos.surface_at(50.0, 50.0), Some(a));
    // the next window took over
    assert_eq!(atmos.get_raised(), Some(a));
    assert!(!atmos.is_activated(b));

    atmos.set_minimized(b, false);
    assert_eq!(paint_order(&atmos), vec![a, b, child]);
    assert!(atmos.is_activated(b));
}

#[test]
fn cursor_surfaces_are_never_hit() {
    let mut atmos = Atmosphere::new(&Config::default());
    let mut cursor = Surface::new(SurfaceType::Unknown);
    cursor.set_flag(SurfaceFlags::CURSOR, true);
    cursor.s_size = (100.0, 100.0);
    let cursor = atmos.create_surface(cursor);
    atmos.add_to_layer(cursor, Layer::Overlay);

    assert_eq!(atmos.surface_at(10.0, 10.0), None);
    atmos.raise(cursor);
    assert_eq!(atmos.get_activated(), None);
}

#[test]
fn stale_ids_are_ignored() {
    let mut atmos = Atmosphere::new(&Config::default());
    let old = toplevel(&mut atmos, (0.0, 0.0), (100.0, 100.0));
    atmos.destroy_surface(old);

    // the slot is reused, the old id must not reach the new surface
    let new = toplevel(&mut atmos, (0.0, 0.0), (100.0, 100.0));
    assert_ne!(old, new);
    assert!(!atmos.surface_exists(old));
    assert!(atmos.get_surface(old).is_none());

    // a dangling id left in a collection is skipped
    atmos.a_layers.lc_zorder.insert(0, old);
    assert_eq!(paint_order(&atmos), vec![new]);

    atmos.raise(old);
    assert_eq!(atmos.get_raised(), None);
    atmos.destroy_surface(old);
    assert!(atmos.surface_exists(new));
}

#[test]
fn closing_the_last_window_focuses_the_desktop() {
    let mut atmos = Atmosphere::new(&Config::default());
    let desktop = in_layer(&mut atmos, Layer::Background);
    let window = toplevel(&mut atmos, (0.0, 0.0), (100.0, 100.0));
    atmos.raise(window);
    drain_events(&mut atmos);

    atmos.destroy_surface(window);
    assert_eq!(atmos.get_activated(), Some(desktop));
    assert!(drain_events(&mut atmos).contains(&CompositorEvent::SurfaceActivated(desktop)));
}

#[test]
fn minimizing_the_last_window_focuses_the_desktop() {
    let mut atmos = Atmosphere::new(&Config::default());
    let desktop = in_layer(&mut atmos, Layer::Background);
    let window = toplevel(&mut atmos, (0.0, 0.0), (100.0, 100.0));
    atmos.raise(window);

    atmos.set_minimized(window, true);
    assert_eq!(atmos.get_activated(), Some(desktop));
    assert!(!atmos.is_activated(window));
}

#[test]
fn destroying_raised_window_raises_next() {
    let mut atmos = Atmosphere::new(&Config::default());
    let a = toplevel(&mut atmos, (0.0, 0.0), (100.0, 100.0));
    let b = toplevel(&mut atmos, (0.0, 0.0), (100.0, 100.0));
    let child = atmos.create_surface(Surface::new(SurfaceType::Popup));
    atmos.set_parent(child, b);
    atmos.raise(b);
    drain_events(&mut atmos);

    atmos.destroy_surface(b);
    assert!(!atmos.surface_exists(child));
    assert_eq!(atmos.get_raised(), Some(a));

    let events = drain_events(&mut atmos);
    assert!(events.contains(&CompositorEvent::SurfaceDestroyed(b)));
    assert!(events.contains(&CompositorEvent::SurfaceDestroyed(child)));
    assert!(events.contains(&CompositorEvent::SurfaceActivated(a)));
}

#[test]
fn reparenting_leaves_collections() {
    let mut atmos = Atmosphere::new(&Config::default());
    let a = toplevel(&mut atmos, (0.0, 0.0), (100.0, 100.0));
    let b = toplevel(&mut atmos, (0.0, 0.0), (100.0, 100.0));

    atmos.set_parent(b, a);
    assert!(!atmos.get_layers().lc_zorder.contains(&b));
    assert_eq!(atmos.get_surface(b).unwrap().s_layer, None);

    // children can't join a collection
    atmos.add_to_layer(b, Layer::Top);
    assert!(atmos.get_layers().lc_top.is_empty());

    // and nothing can be its own parent
    atmos.set_parent(a, a);
    assert_eq!(atmos.get_surface(a).unwrap().s_parent, None);
}

#[test]
fn decorated_frames_are_hit_with_margin() {
    let mut atmos = Atmosphere::new(&Config::default());
    let id = toplevel(&mut atmos, (100.0, 100.0), (300.0, 200.0));
    atmos
        .get_surface_mut(id)
        .unwrap()
        .set_flag(SurfaceFlags::SSD, true);

    // title bar
    assert_eq!(atmos.surface_at(200.0, 85.0), Some(id));
    // just outside the border
    assert_eq!(atmos.surface_at(96.0, 200.0), Some(id));
    assert_eq!(atmos.surface_at(80.0, 200.0), None);
}

#[test]
fn drag_icon_is_not_hit() {
    let mut atmos = Atmosphere::new(&Config::default());
    let window = toplevel(&mut atmos, (0.0, 0.0), (100.0, 100.0));
    let icon = in_layer(&mut atmos, Layer::Overlay);
    atmos.set_drag_icon(Some(icon));

    assert_eq!(atmos.surface_at(5.0, 5.0), Some(window));

    atmos.destroy_surface(icon);
    assert_eq!(atmos.get_drag_icon(), None);
}

#[test]
fn anchored_resize_keeps_corner() {
    let mut atmos = Atmosphere::new(&Config::default());
    let id = toplevel(&mut atmos, (100.0, 100.0), (300.0, 200.0));
    atmos.get_surface_mut(id).unwrap().s_resize_anchor =
        Some((ResizeEdge::TOP_LEFT, (400.0, 300.0)));

    atmos.set_surface_size(id, (250.0, 150.0));
    let surf = atmos.get_surface(id).unwrap();
    assert_eq!(surf.s_size, (250.0, 150.0));
    assert_eq!(surf.s_pos, (150.0, 150.0));
}

#[test]
fn positions_are_clamped() {
    let mut atmos = Atmosphere::new(&Config::default());
    atmos.set_available_geometry(Rect::new(0.0, 30.0, 800.0, 570.0));

    assert_eq!(atmos.corrected_position((-5.0, 10.0)), (0.0, 30.0));
    assert_eq!(atmos.corrected_position((900.0, 700.0)), (799.0, 599.0));
    assert_eq!(atmos.corrected_position((20.0, 40.0)), (20.0, 40.0));
}

#[test]
fn idle_timeout_sleeps() {
    let mut config = Config::default();
    config.idle_timeout_ms = 0;
    let mut atmos = Atmosphere::new(&config);

    atmos.add_idle_inhibitor();
    atmos.check_idle();
    assert!(!atmos.is_sleeping());
    atmos.remove_idle_inhibitor();

    atmos.check_idle();
    assert!(atmos.is_sleeping());
    assert_eq!(
        drain_events(&mut atmos),
        vec![CompositorEvent::SleepChanged(true)]
    );

    atmos.wake();
    assert!(!atmos.is_sleeping());
    assert_eq!(
        drain_events(&mut atmos),
        vec![CompositorEvent::SleepChanged(false)]
    );
}

#[test]
fn idle_countdown_is_reported() {
    let mut config = Config::default();
    config.idle_timeout_ms = 60_000;
    let mut atmos = Atmosphere::new(&config);

    let remaining = atmos.check_idle();
    assert!(remaining > 0 && remaining <= 60_000);
    assert!(!atmos.is_sleeping());
}

#[test]
fn gems_are_laid_out_right_to_left() {
    let layout = gem_layout((0.0, 0.0), 300.0, 28.0, 22.0, 3.0, Capabilities::ALL);

    let close = layout.gl_close.unwrap();
    let maximize = layout.gl_maximize.unwrap();
    let minimize = layout.gl_minimize.unwrap();

    assert_eq!(close.right(), 297.0);
    assert_eq!(maximize.right(), close.right() - 25.0);
    assert_eq!(minimize.right(), maximize.right() - 25.0);
    assert!(!close.overlaps(&maximize));
    assert!(!maximize.overlaps(&minimize));

    // vertically centered, icon on the left
    assert_eq!(close.top(), 3.0);
    assert_eq!(layout.gl_icon.left(), 3.0);
}

#[test]
fn missing_capabilities_take_no_space() {
    let caps = Capabilities::CAN_CLOSE | Capabilities::CAN_MINIMIZE;
    let layout = gem_layout((10.0, 20.0), 300.0, 28.0, 22.0, 3.0, caps);

    assert!(layout.gl_maximize.is_none());
    assert_eq!(layout.gl_close.unwrap().right(), 307.0);
    assert_eq!(layout.gl_minimize.unwrap().right(), 282.0);
}

#[test]
fn gem_hit_rects_match_the_title_bar() {
    let mut atmos = Atmosphere::new(&Config::default());
    let id = toplevel(&mut atmos, (100.0, 100.0), (300.0, 200.0));
    atmos
        .get_surface_mut(id)
        .unwrap()
        .set_flag(SurfaceFlags::SSD, true);

    let metrics = atmos.get_decoration_metrics();
    let surf = atmos.get_surface(id).unwrap();
    let title = surf.title_bar_rect(&metrics);
    let gems = surf.gem_rects(&metrics);

    for rect in [gems.gl_close, gems.gl_maximize, gems.gl_minimize].iter() {
        let rect = rect.unwrap();
        assert!(title.contains(rect.left(), rect.top()));
        assert!(rect.bottom() <= title.bottom());
        // border below the shadow, then centered in the title bar
        assert_eq!(rect.top(), 75.0);
    }
    assert_eq!(gems.gl_icon.top(), 75.0);

    // the same layout inside the framebuffer
    let fb = surf.gem_layout(&metrics, 1.0);
    assert_eq!(fb.gl_close.unwrap().top(), 50.0);
    assert_eq!(fb.gl_icon.left(), 49.0);
}
