//! # Input routing
//!
//! Input takes the events the platform reads and decides which surface
//! they belong to. Pointer presses can start one of three grabs that
//! take over the pointer until every button is released:
//!
//! * `MoveGrab` - the window follows the pointer.
//! * `ResizeGrab` - one or two edges of the window follow the pointer.
//! * `DragGrab` - a drag and drop is in progress.
//!
//! Without a grab, events go to the surface under the pointer, or to
//! the surface the pointer was pressed on until it is released.

// Austin Shafer - 2020
pub mod edges;
pub mod event;
pub mod seat;

#[cfg(test)]
mod tests;

use crate::hollywood::atmosphere::{Atmosphere, Layer, SurfaceFlags, SurfaceId, SurfaceType};
use crate::hollywood::shortcuts::ShortcutManager;
use edges::{CursorShape, ResizeEdge};
use event::*;
use seat::{Seat, SeatEvent};
use utils::log;

/// The current pointer grab
///
/// There is exactly one of these per output window, so two grabs can
/// never be active at once.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Grab {
    NoGrab,
    MoveGrab {
        mg_surface: SurfaceId,
        /// pointer position relative to the window origin
        mg_offset: (f32, f32),
    },
    ResizeGrab {
        rg_surface: SurfaceId,
        rg_edge: ResizeEdge,
        /// content size when the grab started
        rg_initial_size: (f32, f32),
        /// pointer position when the grab started
        rg_initial_mouse: (f32, f32),
    },
    DragGrab {
        dg_icon: Option<SurfaceId>,
    },
}

pub struct Input {
    i_grab: Grab,
    /// The surface the pointer was pressed on
    i_selected: Option<SurfaceId>,
    /// buttons currently held
    i_buttons: Vec<u32>,
    i_mods: Mods,
    i_cursor: CursorShape,
    i_shortcuts: ShortcutManager,
}

/// Convert a global point to surface local coordinates
fn surface_local(atmos: &Atmosphere, id: SurfaceId, pos: (f32, f32)) -> (f32, f32) {
    match atmos.get_surface(id) {
        Some(surf) => (pos.0 - surf.s_pos.0, pos.1 - surf.s_pos.1),
        None => pos,
    }
}

impl Input {
    pub fn new(shortcuts: ShortcutManager) -> Self {
        Self {
            i_grab: Grab::NoGrab,
            i_selected: None,
            i_buttons: Vec::new(),
            i_mods: Mods::NONE,
            i_cursor: CursorShape::Arrow,
            i_shortcuts: shortcuts,
        }
    }

    pub fn get_grab(&self) -> Grab {
        self.i_grab
    }

    pub fn get_cursor(&self) -> CursorShape {
        self.i_cursor
    }

    pub fn get_selected(&self) -> Option<SurfaceId> {
        self.i_selected
    }

    /// Dispatch one input event
    pub fn handle_input_event(
        &mut self,
        atmos: &mut Atmosphere,
        seat: &mut dyn Seat,
        ev: &InputEvent,
    ) {
        match ev {
            InputEvent::PointerMove(m) => self.handle_pointer_move(atmos, seat, m),
            InputEvent::PointerButton(b) => match b.pb_pressed {
                true => self.handle_press(atmos, seat, b),
                false => self.handle_release(atmos, seat, b),
            },
            InputEvent::Axis(a) => self.handle_axis(atmos, seat, a),
            InputEvent::Key(k) => match k.k_pressed {
                true => self.handle_key_press(atmos, seat, k),
                false => self.handle_key_release(atmos, seat, k),
            },
            InputEvent::Touch(t) => self.handle_touch(atmos, seat, t),
        }
    }

    /// The selected surface, if it is still alive
    fn live_selected(&mut self, atmos: &Atmosphere) -> Option<SurfaceId> {
        match self.i_selected {
            Some(id) if atmos.surface_exists(id) => Some(id),
            Some(id) => {
                log::debug!("Selected surface {:?} was destroyed", id);
                self.i_selected = None;
                None
            }
            None => None,
        }
    }

    /// Which edge of a window the pointer is on
    ///
    /// Only normal windows that can be resized report edges.
    fn edge_at(atmos: &Atmosphere, id: SurfaceId, pos: (f32, f32)) -> ResizeEdge {
        let surf = match atmos.get_surface(id) {
            Some(s) => s,
            None => return ResizeEdge::NONE,
        };

        match surf.s_type {
            SurfaceType::TopLevel | SurfaceType::TopLevelTool
                if !surf.is_maximized() && !surf.is_fullscreen() && !surf.is_special() =>
            {
                edges::near_edge(
                    &surf.decorated_rect(&atmos.get_decoration_metrics()),
                    pos.0,
                    pos.1,
                )
            }
            _ => ResizeEdge::NONE,
        }
    }

    fn begin_move(&mut self, atmos: &Atmosphere, id: SurfaceId, pos: (f32, f32)) {
        let offset = surface_local(atmos, id, pos);
        log::debug!("Starting move grab of {:?}", id);
        self.i_grab = Grab::MoveGrab {
            mg_surface: id,
            mg_offset: offset,
        };
    }

    fn begin_resize(
        &mut self,
        atmos: &mut Atmosphere,
        id: SurfaceId,
        edge: ResizeEdge,
        pos: (f32, f32),
        anchored: bool,
    ) {
        let surf = match atmos.get_surface_mut(id) {
            Some(s) => s,
            None => return,
        };
        let size = surf.s_size;
        if anchored {
            surf.s_resize_anchor = Some((edge, edges::anchor_position(surf.s_pos, edge, size)));
        }

        log::debug!("Starting resize grab of {:?} on edge {:?}", id, edge);
        self.i_grab = Grab::ResizeGrab {
            rg_surface: id,
            rg_edge: edge,
            rg_initial_size: size,
            rg_initial_mouse: pos,
        };
        self.i_cursor = edges::cursor_for_edge(edge);
    }

    /// Handle a press on the server side title bar
    ///
    /// Returns true if the press was consumed by the compositor.
    fn handle_title_bar_press(
        &mut self,
        atmos: &mut Atmosphere,
        seat: &mut dyn Seat,
        id: SurfaceId,
        pos: (f32, f32),
        edge: ResizeEdge,
    ) -> bool {
        let (gems, maximized, fullscreen) = match atmos.get_surface(id) {
            Some(s) => (
                s.gem_rects(&atmos.get_decoration_metrics()),
                s.is_maximized(),
                s.is_fullscreen(),
            ),
            None => return true,
        };
        let hit = |rect: Option<utils::region::Rect<f32>>| match rect {
            Some(r) => r.contains(pos.0, pos.1),
            None => false,
        };

        // Only one action per press
        if hit(gems.gl_minimize) {
            log::debug!("Minimize gem pressed on {:?}", id);
            atmos.set_minimized(id, true);
            self.i_selected = None;
            return true;
        }
        if hit(gems.gl_maximize) {
            log::debug!("Maximize gem pressed on {:?}", id);
            seat.deliver(SeatEvent::SetMaximized {
                surface: id,
                maximized: !maximized,
            });
            self.i_selected = None;
            return true;
        }
        if hit(gems.gl_close) {
            log::debug!("Close gem pressed on {:?}", id);
            seat.deliver(SeatEvent::Close { surface: id });
            self.i_selected = None;
            return true;
        }

        if !edge.is_empty() {
            self.begin_resize(atmos, id, edge, pos, true);
            return true;
        }
        if !maximized && !fullscreen {
            atmos.raise(id);
            self.begin_move(atmos, id, pos);
            return true;
        }

        false
    }

    fn handle_press(&mut self, atmos: &mut Atmosphere, seat: &mut dyn Seat, ev: &PointerButton) {
        if atmos.is_sleeping() {
            atmos.wake();
        }
        atmos.reset_idle();
        self.i_mods = ev.pb_mods;
        if !self.i_buttons.contains(&ev.pb_button) {
            self.i_buttons.push(ev.pb_button);
        }

        if self.i_grab != Grab::NoGrab {
            return;
        }

        let pos = atmos.get_cursor_pos();
        let target = match self.live_selected(atmos) {
            Some(id) => id,
            None => {
                let id = match atmos.surface_at(pos.0, pos.1) {
                    Some(id) => id,
                    None => return,
                };
                self.i_selected = Some(id);

                if self.press_selects(atmos, seat, id, pos, ev.pb_mods) {
                    return;
                }

                // Let the client know where the press is before it
                // gets the button
                seat.deliver(SeatEvent::PointerMotion {
                    surface: id,
                    local: surface_local(atmos, id, pos),
                });
                id
            }
        };

        seat.deliver(SeatEvent::PointerButton {
            surface: target,
            button: ev.pb_button,
            pressed: true,
        });
    }

    /// Window management for a press on a newly selected surface
    ///
    /// Returns true if the compositor took the press.
    fn press_selects(
        &mut self,
        atmos: &mut Atmosphere,
        seat: &mut dyn Seat,
        id: SurfaceId,
        pos: (f32, f32),
        mods: Mods,
    ) -> bool {
        let (ssd, title_bar, ty, shell_desktop) = match atmos.get_surface(id) {
            Some(s) => (
                s.server_decorated(),
                s.title_bar_rect(&atmos.get_decoration_metrics()),
                s.s_type,
                s.has_flag(SurfaceFlags::SHELL_DESKTOP),
            ),
            None => return true,
        };
        let edge = Self::edge_at(atmos, id, pos);

        if mods.intersects(Mods::ALT | Mods::LOGO) {
            self.begin_move(atmos, id, pos);
            return true;
        }

        if ssd && title_bar.contains(pos.0, pos.1) {
            if self.handle_title_bar_press(atmos, seat, id, pos, edge) {
                return true;
            }
        } else if !edge.is_empty() {
            self.begin_resize(atmos, id, edge, pos, true);
            return true;
        }

        match ty {
            SurfaceType::Desktop => atmos.activate(id),
            _ if shell_desktop => atmos.activate(id),
            SurfaceType::TopLevel | SurfaceType::TopLevelTool | SurfaceType::Transient => {
                atmos.raise(id)
            }
            _ => {}
        }

        false
    }

    fn handle_release(&mut self, atmos: &mut Atmosphere, seat: &mut dyn Seat, ev: &PointerButton) {
        if atmos.is_sleeping() {
            atmos.wake();
        }
        self.i_buttons.retain(|b| *b != ev.pb_button);
        self.i_mods = ev.pb_mods;

        if self.i_grab == Grab::NoGrab {
            if let Some(id) = self.live_selected(atmos) {
                seat.deliver(SeatEvent::PointerButton {
                    surface: id,
                    button: ev.pb_button,
                    pressed: false,
                });
            }
        }

        if self.i_buttons.is_empty() {
            self.end_grab(atmos, seat);
        }
        atmos.reset_idle();
    }

    /// Finish whatever grab is active and forget the selection
    fn end_grab(&mut self, atmos: &mut Atmosphere, seat: &mut dyn Seat) {
        match self.i_grab {
            Grab::DragGrab { dg_icon } => {
                let pos = atmos.get_cursor_pos();
                let target = atmos.surface_at(pos.0, pos.1);
                log::debug!("Dropping onto {:?}", target);
                seat.deliver(SeatEvent::Drop { surface: target });
                if let Some(icon) = dg_icon {
                    atmos.remove_from_layers(icon);
                }
                atmos.set_drag_icon(None);
            }
            Grab::MoveGrab { mg_surface, .. } => {
                seat.deliver(SeatEvent::MoveFinished {
                    surface: mg_surface,
                });
            }
            Grab::ResizeGrab { rg_surface, .. } => {
                if let Some(surf) = atmos.get_surface_mut(rg_surface) {
                    surf.s_resize_anchor = None;
                }
                seat.deliver(SeatEvent::ResizeFinished {
                    surface: rg_surface,
                });
            }
            Grab::NoGrab => {}
        }

        self.i_selected = None;
        self.i_grab = Grab::NoGrab;
        self.i_cursor = CursorShape::Arrow;
    }

    fn handle_pointer_move(
        &mut self,
        atmos: &mut Atmosphere,
        seat: &mut dyn Seat,
        ev: &PointerMove,
    ) {
        if atmos.is_sleeping() {
            atmos.wake();
        }

        seat.deliver(SeatEvent::RelativeMotion {
            delta: ev.pm_delta,
        });
        let pos = atmos.corrected_position(ev.pm_pos);
        atmos.set_cursor_pos(pos);

        match self.i_grab {
            Grab::NoGrab => {
                let target = match self.live_selected(atmos) {
                    Some(id) => Some(id),
                    None => atmos.surface_at(pos.0, pos.1),
                };

                match target {
                    Some(id) => {
                        seat.deliver(SeatEvent::PointerMotion {
                            surface: id,
                            local: surface_local(atmos, id, pos),
                        });
                        self.i_cursor = edges::cursor_for_edge(Self::edge_at(atmos, id, pos));
                    }
                    None => self.i_cursor = CursorShape::Arrow,
                }
            }
            Grab::MoveGrab {
                mg_surface,
                mg_offset,
            } => {
                atmos.set_surface_position(mg_surface, (pos.0 - mg_offset.0, pos.1 - mg_offset.1));
            }
            Grab::ResizeGrab {
                rg_surface,
                rg_edge,
                rg_initial_size,
                rg_initial_mouse,
            } => {
                if !atmos.surface_exists(rg_surface) {
                    log::debug!("Resized surface {:?} is gone", rg_surface);
                    return;
                }
                seat.deliver(SeatEvent::Resize {
                    surface: rg_surface,
                    initial_size: rg_initial_size,
                    delta: (pos.0 - rg_initial_mouse.0, pos.1 - rg_initial_mouse.1),
                    edge: rg_edge,
                });
            }
            Grab::DragGrab { dg_icon } => {
                let target = atmos.surface_at(pos.0, pos.1);
                let local = match target {
                    Some(id) => surface_local(atmos, id, pos),
                    None => pos,
                };
                seat.deliver(SeatEvent::DragMotion {
                    surface: target,
                    local,
                });
                if let Some(icon) = dg_icon {
                    atmos.set_surface_position(icon, pos);
                }
            }
        }

        atmos.reset_idle();
    }

    fn handle_axis(&mut self, atmos: &mut Atmosphere, seat: &mut dyn Seat, ev: &Axis) {
        if atmos.is_sleeping() {
            atmos.wake();
        }
        let pos = atmos.get_cursor_pos();
        let target = match self.live_selected(atmos) {
            Some(id) => Some(id),
            None => atmos.surface_at(pos.0, pos.1),
        };

        let (orientation, angle) = match ev.ax_angle_delta.1 != 0.0 {
            true => (Orientation::Vertical, ev.ax_angle_delta.1),
            false => (Orientation::Horizontal, ev.ax_angle_delta.0),
        };
        let delta = match (ev.ax_pixel_delta, orientation) {
            (Some(pixels), Orientation::Vertical) => pixels.1,
            (Some(pixels), Orientation::Horizontal) => pixels.0,
            (None, _) => angle,
        };

        if let Some(id) = target {
            seat.deliver(SeatEvent::Axis {
                surface: id,
                orientation,
                delta,
            });
        }
        atmos.reset_idle();
    }

    fn handle_key_press(&mut self, atmos: &mut Atmosphere, seat: &mut dyn Seat, ev: &Key) {
        if atmos.is_sleeping() {
            atmos.wake();
        }
        atmos.reset_idle();
        self.i_mods = ev.k_mods;

        if self
            .i_shortcuts
            .check_and_handle(atmos, ev.k_mods, ev.k_keysym)
        {
            return;
        }

        seat.deliver(SeatEvent::Key {
            scancode: ev.k_scancode,
            pressed: true,
        });
    }

    fn handle_key_release(&mut self, atmos: &mut Atmosphere, seat: &mut dyn Seat, ev: &Key) {
        if atmos.is_sleeping() {
            atmos.wake();
        }
        self.i_mods = ev.k_mods;
        seat.deliver(SeatEvent::Key {
            scancode: ev.k_scancode,
            pressed: false,
        });
        atmos.reset_idle();
    }

    fn handle_touch(&mut self, atmos: &mut Atmosphere, seat: &mut dyn Seat, ev: &Touch) {
        if atmos.is_sleeping() {
            atmos.wake();
        }

        let target = match self.live_selected(atmos) {
            Some(id) => Some(id),
            None => atmos.surface_at(ev.t_pos.0, ev.t_pos.1),
        };
        if let Some(id) = target {
            seat.deliver(SeatEvent::Touch {
                surface: id,
                id: ev.t_id,
                phase: ev.t_phase,
                local: surface_local(atmos, id, ev.t_pos),
            });
        }
        atmos.reset_idle();
    }

    // ------------------------------
    // Client initiated grabs
    // ------------------------------

    /// A client asked to move its window (xdg_toplevel.move)
    pub fn start_move(&mut self, atmos: &mut Atmosphere) {
        let id = match self.live_selected(atmos) {
            Some(id) => id,
            None => {
                log::debug!("start_move without a selected surface");
                return;
            }
        };
        if self.i_grab != Grab::NoGrab {
            log::debug!("start_move while {:?} is active", self.i_grab);
            return;
        }

        let pos = atmos.get_cursor_pos();
        self.begin_move(atmos, id, pos);
    }

    /// A client asked to resize its window from `edge`
    ///
    /// If `anchored` the opposite corner stays in place.
    pub fn start_resize(&mut self, atmos: &mut Atmosphere, edge: ResizeEdge, anchored: bool) {
        let id = match self.live_selected(atmos) {
            Some(id) => id,
            None => {
                log::debug!("start_resize without a selected surface");
                return;
            }
        };
        if self.i_grab != Grab::NoGrab {
            log::debug!("start_resize while {:?} is active", self.i_grab);
            return;
        }

        let pos = atmos.get_cursor_pos();
        self.begin_resize(atmos, id, edge, pos, anchored);
    }

    /// A client started a drag and drop
    ///
    /// The icon is shown in front of everything until the drop.
    pub fn start_drag(&mut self, atmos: &mut Atmosphere, icon: Option<SurfaceId>) {
        if self.live_selected(atmos).is_none() {
            log::debug!("start_drag without a selected surface");
            return;
        }
        if self.i_grab != Grab::NoGrab {
            log::debug!("start_drag while {:?} is active", self.i_grab);
            return;
        }

        if let Some(icon) = icon {
            let pos = atmos.get_cursor_pos();
            atmos.add_to_layer(icon, Layer::Overlay);
            atmos.set_surface_position(icon, pos);
        }
        atmos.set_drag_icon(icon);
        self.i_grab = Grab::DragGrab { dg_icon: icon };
    }
}
