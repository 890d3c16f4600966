// The XWayland window manager
//
// X clients show up twice: as an X window we hear about over the wm
// connection, and as a wl_surface on the server's wayland connection.
// The client links the two with a WL_SURFACE_ID message, which may
// arrive before or after the wl_surface exists. Until both halves are
// known a window is unpaired and invisible to the rest of the
// compositor.
//
// Austin Shafer - 2020
pub mod atoms;
pub mod cursor;
pub mod event;
pub mod selection;
pub mod server;
pub mod shell_surface;
pub mod x11;


use crate::hollywood::atmosphere::{
    Atmosphere, CompositorEvent, Layer, SurfaceFlags, SurfaceId, SurfaceType,
};
use crate::hollywood::input::edges::{CursorShape, ResizeEdge};
use crate::hollywood::input::seat::SeatEvent;
use cursor::{CursorCache, XCursor};
use event::{ClientMessage, WindowProperty, XWindow, XwmEvent};
use selection::{ClipboardEvent, SelectionBridge};
use server::{XWaylandError, XWaylandServer};
use shell_surface::{PairStatus, WmState, XWaylandShellSurface};
use x11::{X11rbConnection, XConnection};

use utils::region::Rect;
use utils::{log, Result};

use std::collections::{HashMap, VecDeque};
use std::os::unix::io::RawFd;

/// Things only the compositor can do for a window
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum XwmRequest {
    /// The client wants an interactive move
    StartMove { surface: SurfaceId },
    StartResize {
        surface: SurfaceId,
        edge: ResizeEdge,
    },
    /// A move or resize the client started should end
    CancelGrab { surface: SurfaceId },
}

/// What a `_NET_WM_MOVERESIZE` direction asks for
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MoveResize {
    Move,
    Resize(ResizeEdge),
    Cancel,
}

pub fn move_resize_from_direction(direction: u32) -> Option<MoveResize> {
    let edge = match direction {
        0 => ResizeEdge::TOP_LEFT,
        1 => ResizeEdge::TOP,
        2 => ResizeEdge::TOP_RIGHT,
        3 => ResizeEdge::RIGHT,
        4 => ResizeEdge::BOTTOM_RIGHT,
        5 => ResizeEdge::BOTTOM,
        6 => ResizeEdge::BOTTOM_LEFT,
        7 => ResizeEdge::LEFT,
        // keyboard move
        8 | 10 => return Some(MoveResize::Move),
        11 => return Some(MoveResize::Cancel),
        _ => return None,
    };
    Some(MoveResize::Resize(edge))
}

fn to_f32_rect(r: &Rect<i32>) -> Rect<f32> {
    Rect::new(
        r.r_pos.0 as f32,
        r.r_pos.1 as f32,
        r.r_size.0 as f32,
        r.r_size.1 as f32,
    )
}

pub struct XWaylandManager {
    xm_conn: Box<dyn XConnection>,
    /// Every window we know of, paired or not
    xm_windows: HashMap<XWindow, XWaylandShellSurface>,
    /// The window with _NET_ACTIVE_WINDOW and input focus
    xm_active: Option<XWindow>,
    xm_cursors: CursorCache,
    xm_selection: SelectionBridge,
    xm_requests: VecDeque<XwmRequest>,
}

impl XWaylandManager {
    pub fn new(conn: Box<dyn XConnection>) -> Self {
        Self {
            xm_conn: conn,
            xm_windows: HashMap::new(),
            xm_active: None,
            xm_cursors: CursorCache::default(),
            xm_selection: SelectionBridge::new(),
            xm_requests: VecDeque::new(),
        }
    }

    /// Connect to a server that reported its display
    pub fn connect(server: &mut XWaylandServer) -> std::result::Result<Self, XWaylandError> {
        let fd = server
            .take_wm_fd()
            .ok_or_else(|| XWaylandError::Connection("the wm socket was already taken".into()))?;
        let conn = X11rbConnection::connect(fd)
            .map_err(|e| XWaylandError::Connection(format!("{:#}", e)))?;

        Ok(Self::new(Box::new(conn)))
    }

    pub fn get_fd(&self) -> Option<RawFd> {
        self.xm_conn.fd()
    }

    pub fn get_active_window(&self) -> Option<XWindow> {
        self.xm_active
    }

    /// The record of a window that has been paired with its surface
    pub fn shell_surface_from_id(&self, window: XWindow) -> Option<&XWaylandShellSurface> {
        self.xm_windows
            .get(&window)
            .filter(|rec| rec.paired_surface().is_some())
    }

    /// Windows still waiting for their wl_surface
    pub fn unpaired_windows(&self) -> Vec<XWindow> {
        let mut ret: Vec<XWindow> = self
            .xm_windows
            .values()
            .filter(|rec| rec.xs_status == PairStatus::Unpaired)
            .map(|rec| rec.xs_window)
            .collect();
        ret.sort_unstable();
        ret
    }

    pub fn get_next_request(&mut self) -> Option<XwmRequest> {
        self.xm_requests.pop_front()
    }

    pub fn get_next_clipboard_event(&mut self) -> Option<ClipboardEvent> {
        self.xm_selection.get_next_clipboard_event()
    }

    /// A wayland client set the clipboard
    pub fn set_wayland_selection(&mut self, mimes: Vec<String>, data: Vec<u8>) -> Result<()> {
        self.xm_selection
            .set_wayland_selection(self.xm_conn.as_mut(), mimes, data)?;
        self.xm_conn.flush()
    }

    pub fn clear_wayland_selection(&mut self) -> Result<()> {
        self.xm_selection
            .clear_wayland_selection(self.xm_conn.as_mut())?;
        self.xm_conn.flush()
    }

    /// A wayland client pasted while an X client owns the clipboard
    pub fn request_selection_data(&mut self, mime: &str) -> Result<()> {
        self.xm_selection
            .request_data(self.xm_conn.as_mut(), mime)?;
        self.xm_conn.flush()
    }

    /// Show the cursor for `shape` on our window
    pub fn set_cursor(&mut self, shape: CursorShape) -> Result<()> {
        self.xm_cursors
            .set_cursor(self.xm_conn.as_mut(), XCursor::from_shape(shape))
    }

    /// Handle everything the X server has sent
    pub fn dispatch_events(&mut self, atmos: &mut Atmosphere) -> Result<()> {
        while let Some(ev) = self.xm_conn.next_event()? {
            if let Err(e) = self.handle_event(atmos, ev) {
                log::error!("Failed to handle X event: {:#}", e);
            }
        }
        self.xm_conn.flush()
    }

    pub fn handle_event(&mut self, atmos: &mut Atmosphere, ev: XwmEvent) -> Result<()> {
        log::debug!("X event {:?}", ev);

        match ev {
            XwmEvent::CreateNotify {
                window,
                geometry,
                override_redirect,
            } => {
                self.xm_windows.insert(
                    window,
                    XWaylandShellSurface::new(window, geometry, override_redirect),
                );
            }
            XwmEvent::MapRequest { window } => self.handle_map_request(window)?,
            XwmEvent::MapNotify { window } => {
                if let Some(rec) = self.xm_windows.get_mut(&window) {
                    rec.xs_mapped = true;
                    if rec.xs_props_dirty {
                        self.read_properties(atmos, window)?;
                    }
                    self.show(atmos, window);
                }
            }
            XwmEvent::UnmapNotify { window } => {
                if let Some(rec) = self.xm_windows.get_mut(&window) {
                    rec.xs_mapped = false;
                    if !rec.xs_override_redirect {
                        rec.xs_wm_state = WmState::Withdrawn;
                        self.xm_conn.set_wm_state(window, WmState::Withdrawn)?;
                    }
                    self.hide(atmos, window);
                }
                if self.xm_active == Some(window) {
                    self.set_active_window(None)?;
                }
            }
            XwmEvent::ReparentNotify { window, x, y, .. } => {
                if let Some(rec) = self.xm_windows.get_mut(&window) {
                    rec.xs_geometry.r_pos = (x, y);
                    if let Some(id) = rec.paired_surface() {
                        atmos.set_surface_position(id, (x as f32, y as f32));
                    }
                }
            }
            XwmEvent::ConfigureRequest {
                window,
                x,
                y,
                width,
                height,
            } => self.handle_configure_request(atmos, window, x, y, width, height)?,
            XwmEvent::ConfigureNotify { window, geometry } => {
                if let Some(rec) = self.xm_windows.get_mut(&window) {
                    rec.xs_geometry = geometry;
                    if let Some(id) = rec.paired_surface() {
                        atmos.set_surface_position(
                            id,
                            (geometry.r_pos.0 as f32, geometry.r_pos.1 as f32),
                        );
                        atmos.set_surface_size(
                            id,
                            (geometry.r_size.0 as f32, geometry.r_size.1 as f32),
                        );
                    }
                }
            }
            XwmEvent::DestroyNotify { window } => {
                if let Some(rec) = self.xm_windows.remove(&window) {
                    if let Some(id) = rec.paired_surface() {
                        atmos.destroy_surface(id);
                    }
                }
                if self.xm_active == Some(window) {
                    self.xm_active = None;
                }
            }
            XwmEvent::PropertyNotify {
                window,
                property: WindowProperty::Other(atom),
                deleted,
            } => {
                if deleted
                    && self
                        .xm_selection
                        .property_deleted(self.xm_conn.as_mut(), window, atom)?
                {
                    return Ok(());
                }
            }
            XwmEvent::PropertyNotify { window, .. } => {
                if let Some(rec) = self.xm_windows.get_mut(&window) {
                    rec.xs_props_dirty = true;
                    self.read_properties(atmos, window)?;
                }
            }
            XwmEvent::ClientMessage { window, message } => {
                self.handle_client_message(atmos, window, message)?
            }
            XwmEvent::FocusIn { window } => {
                // don't let clients steal focus from the active window
                if self.xm_active.is_some() && self.xm_active != Some(window) {
                    let active = self.xm_active;
                    self.xm_conn.set_input_focus(active)?;
                }
            }
            XwmEvent::Selection(sel) => {
                self.xm_selection.handle_event(self.xm_conn.as_mut(), sel)?
            }
        }
        Ok(())
    }

    fn handle_map_request(&mut self, window: XWindow) -> Result<()> {
        // We may have missed its CreateNotify, the geometry arrives
        // with the next ConfigureNotify
        let rec = self.xm_windows.entry(window).or_insert_with(|| {
            log::debug!("Map request for unknown window {}", window);
            XWaylandShellSurface::new(window, Rect::default(), false)
        });

        rec.xs_wm_state = WmState::Normal;
        let (maximized, fullscreen) = (rec.xs_maximized, rec.xs_fullscreen);
        self.xm_conn.set_wm_state(window, WmState::Normal)?;
        self.xm_conn.set_net_wm_state(window, maximized, fullscreen)?;
        self.xm_conn.map_window(window)
    }

    fn handle_configure_request(
        &mut self,
        atmos: &mut Atmosphere,
        window: XWindow,
        x: Option<i32>,
        y: Option<i32>,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<()> {
        let rec = match self.xm_windows.get_mut(&window) {
            Some(r) => r,
            None => return Ok(()),
        };

        // The window manager owns the geometry of these, tell the
        // client what it actually is.
        if rec.xs_maximized || rec.xs_fullscreen {
            return self.xm_conn.configure_window(window, rec.xs_geometry);
        }

        let mut geom = rec.xs_geometry;
        if let Some(x) = x {
            geom.r_pos.0 = x;
        }
        if let Some(y) = y {
            geom.r_pos.1 = y;
        }
        if let Some(w) = width {
            geom.r_size.0 = w as i32;
        }
        if let Some(h) = height {
            geom.r_size.1 = h as i32;
        }

        // keep the title bar reachable
        if rec.wants_decorations() {
            let m = atmos.get_decoration_metrics();
            let min_y = (atmos.get_available_geometry().top() + m.dm_decoration) as i32;
            geom.r_pos.1 = geom.r_pos.1.max(min_y);
        }

        rec.xs_geometry = geom;
        if let Some(id) = rec.paired_surface() {
            atmos.set_surface_position(id, (geom.r_pos.0 as f32, geom.r_pos.1 as f32));
            atmos.set_surface_size(id, (geom.r_size.0 as f32, geom.r_size.1 as f32));
        }
        self.xm_conn.configure_window(window, geom)
    }

    fn handle_client_message(
        &mut self,
        atmos: &mut Atmosphere,
        window: XWindow,
        message: ClientMessage,
    ) -> Result<()> {
        match message {
            ClientMessage::SurfaceId(wl_id) => {
                let rec = match self.xm_windows.get_mut(&window) {
                    Some(r) => r,
                    None => {
                        log::debug!("WL_SURFACE_ID for unknown window {}", window);
                        return Ok(());
                    }
                };
                rec.xs_surface_id = Some(wl_id);

                // the wl_surface may not exist yet, surface_created
                // finishes the pairing then
                match atmos.find_surface_by_wl_id(wl_id) {
                    Some(id) => self.pair(atmos, window, id)?,
                    None => log::debug!("Window {} waits for wl_surface {}", window, wl_id),
                }
            }
            ClientMessage::MoveResize { direction, .. } => {
                let id = match self.paired(window) {
                    Some(id) => id,
                    None => return Ok(()),
                };
                let req = match move_resize_from_direction(direction) {
                    Some(MoveResize::Move) => XwmRequest::StartMove { surface: id },
                    Some(MoveResize::Resize(edge)) => XwmRequest::StartResize { surface: id, edge },
                    Some(MoveResize::Cancel) => XwmRequest::CancelGrab { surface: id },
                    None => {
                        log::error!("Unknown _NET_WM_MOVERESIZE direction {}", direction);
                        return Ok(());
                    }
                };
                self.xm_requests.push_back(req);
            }
            ClientMessage::ChangeState(WmState::Iconic) => {
                if let Some(rec) = self.xm_windows.get_mut(&window) {
                    rec.xs_wm_state = WmState::Iconic;
                    self.xm_conn.set_wm_state(window, WmState::Iconic)?;
                }
                if let Some(id) = self.paired(window) {
                    atmos.set_minimized(id, true);
                }
            }
            ClientMessage::ChangeState(state) => {
                log::debug!("Ignoring WM_CHANGE_STATE to {:?}", state);
            }
            ClientMessage::NetWmState {
                action,
                maximize,
                fullscreen,
            } => {
                let (was_max, was_full) = match self.xm_windows.get(&window) {
                    Some(rec) => (rec.xs_maximized, rec.xs_fullscreen),
                    None => return Ok(()),
                };
                if fullscreen {
                    self.set_fullscreen(atmos, window, action.apply(was_full))?;
                }
                if maximize {
                    self.set_maximized(atmos, window, action.apply(was_max))?;
                }
            }
            ClientMessage::Other(atom) => {
                log::debug!("Ignoring client message {} for window {}", atom, window);
            }
        }
        Ok(())
    }

    /// A wl_surface was created on the Xwayland connection
    pub fn surface_created(&mut self, atmos: &mut Atmosphere, surface: SurfaceId) -> Result<()> {
        let wl_id = match atmos.get_surface(surface).and_then(|s| s.s_wl_surface_id) {
            Some(id) => id,
            None => return Ok(()),
        };

        let window = self
            .xm_windows
            .values()
            .find(|rec| {
                rec.xs_status == PairStatus::Unpaired && rec.xs_surface_id == Some(wl_id)
            })
            .map(|rec| rec.xs_window);

        match window {
            Some(window) => self.pair(atmos, window, surface),
            None => Ok(()),
        }
    }

    /// The wl_surface of a window went away before the window did
    pub fn surface_destroyed(&mut self, surface: SurfaceId) {
        for rec in self.xm_windows.values_mut() {
            if rec.xs_status == PairStatus::Paired(surface) {
                log::debug!("Window {} lost its surface", rec.xs_window);
                rec.xs_status = PairStatus::Unpaired;
                rec.xs_surface_id = None;
            }
        }
    }

    fn paired(&self, window: XWindow) -> Option<SurfaceId> {
        self.xm_windows.get(&window).and_then(|r| r.paired_surface())
    }

    fn pair(&mut self, atmos: &mut Atmosphere, window: XWindow, surface: SurfaceId) -> Result<()> {
        let rec = match self.xm_windows.get_mut(&window) {
            Some(r) => r,
            None => return Ok(()),
        };
        rec.xs_status = PairStatus::Paired(surface);
        log::debug!("Paired window {} with surface {:?}", window, surface);

        if let Some(surf) = atmos.get_surface_mut(surface) {
            surf.s_xwayland_window = Some(window);
        }
        if rec.xs_props_dirty {
            self.read_properties(atmos, window)?;
        } else {
            self.sync_surface(atmos, window);
        }

        let mapped = self
            .xm_windows
            .get(&window)
            .map(|r| r.xs_mapped)
            .unwrap_or(false);
        if mapped {
            self.show(atmos, window);
        }
        Ok(())
    }

    fn read_properties(&mut self, atmos: &mut Atmosphere, window: XWindow) -> Result<()> {
        let props = self.xm_conn.read_properties(window)?;
        if let Some(rec) = self.xm_windows.get_mut(&window) {
            rec.apply_properties(props);
        }
        self.sync_surface(atmos, window);
        Ok(())
    }

    /// Copy the record's state into the paired surface
    fn sync_surface(&self, atmos: &mut Atmosphere, window: XWindow) {
        let rec = match self.xm_windows.get(&window) {
            Some(r) => r,
            None => return,
        };
        let id = match rec.paired_surface() {
            Some(id) => id,
            None => return,
        };
        let surf = match atmos.get_surface_mut(id) {
            Some(s) => s,
            None => return,
        };

        surf.s_type = if rec.xs_override_redirect || rec.xs_window_type.is_popup() {
            SurfaceType::Popup
        } else if rec.xs_transient_for.is_some() {
            SurfaceType::Transient
        } else {
            SurfaceType::TopLevel
        };
        surf.s_title = rec.xs_title.clone();
        surf.s_app_id = rec.xs_app_id.clone();
        surf.set_flag(SurfaceFlags::SSD, rec.wants_decorations());
        surf.set_flag(SurfaceFlags::MAXIMIZED, rec.xs_maximized);
        surf.set_flag(SurfaceFlags::FULLSCREEN, rec.xs_fullscreen);

        let g = rec.xs_geometry;
        surf.s_pos = (g.r_pos.0 as f32, g.r_pos.1 as f32);
        surf.s_size = (g.r_size.0 as f32, g.r_size.1 as f32);
        atmos.mark_changed();
    }

    /// Put a mapped, paired window on screen
    fn show(&mut self, atmos: &mut Atmosphere, window: XWindow) {
        let rec = match self.xm_windows.get(&window) {
            Some(r) => r,
            None => return,
        };
        let id = match rec.paired_surface() {
            Some(id) => id,
            None => return,
        };

        let parent = rec.xs_transient_for.and_then(|w| self.paired(w));
        match parent {
            Some(parent) => {
                atmos.set_parent(id, parent);
                if let Some(surf) = atmos.get_surface_mut(id) {
                    surf.set_flag(SurfaceFlags::MINIMIZED, false);
                }
            }
            None if rec.xs_override_redirect || rec.xs_window_type.is_popup() => {
                atmos.add_to_layer(id, Layer::Top);
            }
            None => {
                atmos.add_to_layer(id, Layer::Normal);
                atmos.raise(id);
            }
        }
    }

    fn hide(&mut self, atmos: &mut Atmosphere, window: XWindow) {
        let id = match self.paired(window) {
            Some(id) => id,
            None => return,
        };
        let has_parent = atmos
            .get_surface(id)
            .map(|s| s.s_parent.is_some())
            .unwrap_or(false);

        if has_parent {
            // children can't leave their parent, hide the tree instead
            if let Some(surf) = atmos.get_surface_mut(id) {
                surf.set_flag(SurfaceFlags::MINIMIZED, true);
            }
            atmos.mark_changed();
        } else {
            atmos.remove_from_layers(id);
            if atmos.get_raised() == Some(id) || atmos.get_activated() == Some(id) {
                atmos.raise_next_in_line();
            }
        }
    }

    /// Give `window` the X input focus and _NET_ACTIVE_WINDOW
    pub fn set_active_window(&mut self, window: Option<XWindow>) -> Result<()> {
        if self.xm_active == window {
            return Ok(());
        }

        if let Some(old) = self.xm_active.and_then(|w| self.xm_windows.get_mut(&w)) {
            old.xs_activated = false;
        }
        if let Some(rec) = window.and_then(|w| self.xm_windows.get_mut(&w)) {
            rec.xs_activated = true;
        }

        self.xm_active = window;
        self.xm_conn.set_active_window(window)?;
        self.xm_conn.set_input_focus(window)?;
        self.xm_conn.flush()
    }

    /// Close a window, politely if the client supports it
    pub fn close(&mut self, window: XWindow) -> Result<()> {
        let delete = match self.xm_windows.get(&window) {
            Some(rec) => rec.xs_delete_window,
            None => return Ok(()),
        };

        match delete {
            true => self.xm_conn.send_delete_window(window)?,
            false => {
                log::debug!("Window {} has no WM_DELETE_WINDOW, killing it", window);
                self.xm_conn.kill_client(window)?;
            }
        }
        self.xm_conn.flush()
    }

    /// The geometry a maximized window gets, leaving room for its title bar
    fn maximized_geometry(atmos: &Atmosphere, decorated: bool) -> Rect<i32> {
        let avail = atmos.get_available_geometry();
        let mut r = avail;
        if decorated {
            let m = atmos.get_decoration_metrics();
            r = Rect::new(
                avail.left() + m.dm_border,
                avail.top() + m.dm_decoration,
                avail.width() - m.dm_border * 2.0,
                avail.height() - m.dm_decoration - m.dm_border,
            );
        }
        Rect::new(
            r.left() as i32,
            r.top() as i32,
            r.width() as i32,
            r.height() as i32,
        )
    }

    fn set_state_geometry(
        &mut self,
        atmos: &mut Atmosphere,
        window: XWindow,
        geometry: Rect<i32>,
    ) -> Result<()> {
        let rec = match self.xm_windows.get_mut(&window) {
            Some(r) => r,
            None => return Ok(()),
        };
        rec.xs_geometry = geometry;
        let (maximized, fullscreen) = (rec.xs_maximized, rec.xs_fullscreen);

        self.xm_conn.set_net_wm_state(window, maximized, fullscreen)?;
        self.xm_conn.configure_window(window, geometry)?;
        self.sync_surface(atmos, window);
        self.xm_conn.flush()
    }

    pub fn set_maximized(
        &mut self,
        atmos: &mut Atmosphere,
        window: XWindow,
        maximized: bool,
    ) -> Result<()> {
        let rec = match self.xm_windows.get_mut(&window) {
            Some(r) => r,
            None => return Ok(()),
        };
        if rec.xs_maximized == maximized {
            return Ok(());
        }

        let geometry = if maximized {
            if rec.xs_saved_geometry.is_none() {
                rec.xs_saved_geometry = Some(rec.xs_geometry);
            }
            Self::maximized_geometry(atmos, rec.wants_decorations())
        } else {
            match rec.xs_fullscreen {
                true => rec.xs_geometry,
                false => rec.xs_saved_geometry.take().unwrap_or(rec.xs_geometry),
            }
        };
        rec.xs_maximized = maximized;
        self.set_state_geometry(atmos, window, geometry)
    }

    pub fn set_fullscreen(
        &mut self,
        atmos: &mut Atmosphere,
        window: XWindow,
        fullscreen: bool,
    ) -> Result<()> {
        let rec = match self.xm_windows.get_mut(&window) {
            Some(r) => r,
            None => return Ok(()),
        };
        if rec.xs_fullscreen == fullscreen {
            return Ok(());
        }

        let geometry = if fullscreen {
            if rec.xs_saved_geometry.is_none() {
                rec.xs_saved_geometry = Some(rec.xs_geometry);
            }
            let out = atmos.get_output_rect();
            Rect::new(
                out.left() as i32,
                out.top() as i32,
                out.width() as i32,
                out.height() as i32,
            )
        } else if rec.xs_maximized {
            Self::maximized_geometry(atmos, rec.wants_decorations())
        } else {
            rec.xs_saved_geometry.take().unwrap_or(rec.xs_geometry)
        };
        rec.xs_fullscreen = fullscreen;
        self.set_state_geometry(atmos, window, geometry)
    }

    /// One step of an interactive resize
    pub fn resize(
        &mut self,
        atmos: &mut Atmosphere,
        window: XWindow,
        initial_size: (f32, f32),
        delta: (f32, f32),
        edge: ResizeEdge,
    ) -> Result<()> {
        let (id, size) = match self.xm_windows.get(&window) {
            Some(rec) => match rec.paired_surface() {
                Some(id) => (id, rec.size_for_resize(initial_size, delta, edge)),
                None => return Ok(()),
            },
            None => return Ok(()),
        };

        // moves the surface if a corner is anchored
        atmos.set_surface_size(id, (size.0 as f32, size.1 as f32));
        self.send_surface_geometry(atmos, window)
    }

    /// Tell the client where its surface ended up
    pub fn send_surface_geometry(&mut self, atmos: &Atmosphere, window: XWindow) -> Result<()> {
        let id = match self.paired(window) {
            Some(id) => id,
            None => return Ok(()),
        };
        let rect = match atmos.get_surface(id) {
            Some(s) => s.surface_rect(),
            None => return Ok(()),
        };
        let geometry = Rect::new(
            rect.left().round() as i32,
            rect.top().round() as i32,
            rect.width().round() as i32,
            rect.height().round() as i32,
        );

        if let Some(rec) = self.xm_windows.get_mut(&window) {
            rec.xs_geometry = geometry;
        }
        self.xm_conn.configure_window(window, geometry)?;
        self.xm_conn.flush()
    }

    /// Handle a seat event aimed at an X window
    ///
    /// Returns false if the surface isn't one of ours, the wayland
    /// frontend gets the event then.
    pub fn handle_seat_event(&mut self, atmos: &mut Atmosphere, ev: &SeatEvent) -> Result<bool> {
        let surface = match ev {
            SeatEvent::Close { surface }
            | SeatEvent::SetMaximized { surface, .. }
            | SeatEvent::Resize { surface, .. }
            | SeatEvent::MoveFinished { surface }
            | SeatEvent::ResizeFinished { surface } => *surface,
            _ => return Ok(false),
        };
        let window = match atmos.get_surface(surface).and_then(|s| s.s_xwayland_window) {
            Some(w) => w,
            None => return Ok(false),
        };

        match *ev {
            SeatEvent::Close { .. } => self.close(window)?,
            SeatEvent::SetMaximized { maximized, .. } => {
                self.set_maximized(atmos, window, maximized)?
            }
            SeatEvent::Resize {
                initial_size,
                delta,
                edge,
                ..
            } => self.resize(atmos, window, initial_size, delta, edge)?,
            SeatEvent::MoveFinished { .. } | SeatEvent::ResizeFinished { .. } => {
                self.send_surface_geometry(atmos, window)?
            }
            _ => {}
        }
        Ok(true)
    }

    /// Follow activation changes of the compositor
    pub fn handle_compositor_event(
        &mut self,
        atmos: &Atmosphere,
        ev: &CompositorEvent,
    ) -> Result<()> {
        match ev {
            CompositorEvent::SurfaceActivated(id) => {
                let window = atmos.get_surface(*id).and_then(|s| s.s_xwayland_window);
                // wayland windows take the focus away from X
                self.set_active_window(window)?;
            }
            CompositorEvent::SurfaceDestroyed(id) => self.surface_destroyed(*id),
            _ => {}
        }
        Ok(())
    }
}
