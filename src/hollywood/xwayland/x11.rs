// The X connection of the window manager
//
// XConnection is everything the window manager asks of the X server.
// X11rbConnection implements it over the socket Xwayland was handed
// with -wm, translating x11rb events into XwmEvents on the way in.
//
// Austin Shafer - 2020
use super::atoms::Atoms;
use super::event::*;
use super::shell_surface::{
    parse_motif_decorations, parse_normal_hints, WindowProperties, WmState, WmWindowType,
};
use utils::region::Rect;
use utils::{log, Context, Result};

use x11rb::connection::Connection as _;
use x11rb::protocol::composite::{ConnectionExt as _, Redirect};
use x11rb::protocol::xfixes::{ConnectionExt as _, SelectionEventMask};
use x11rb::protocol::xproto::{
    Atom, AtomEnum, ChangeWindowAttributesAux, ClientMessageEvent, ConfigWindow,
    ConfigureWindowAux, ConnectionExt as _, CreateWindowAux, EventMask, GetPropertyReply,
    InputFocus, PropMode, Property, SelectionNotifyEvent, Window, WindowClass,
};
use x11rb::protocol::Event;
use x11rb::rust_connection::{DefaultStream, RustConnection};
use x11rb::wrapper::ConnectionExt as _;

use std::os::unix::io::{AsRawFd, OwnedFd, RawFd};
use std::os::unix::net::UnixStream;

/// The data of a selection property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionProperty {
    Targets(Vec<SelectionTarget>),
    Data(Vec<u8>),
    /// An incremental transfer of about this many bytes follows
    Incr(u32),
}

pub trait XConnection {
    /// The socket to watch for readability, if there is one
    fn fd(&self) -> Option<RawFd>;
    /// The next event we care about, None once the queue is empty
    fn next_event(&mut self) -> Result<Option<XwmEvent>>;
    fn flush(&mut self) -> Result<()>;

    fn read_properties(&mut self, window: XWindow) -> Result<WindowProperties>;
    fn map_window(&mut self, window: XWindow) -> Result<()>;
    fn configure_window(&mut self, window: XWindow, geometry: Rect<i32>) -> Result<()>;
    fn set_wm_state(&mut self, window: XWindow, state: WmState) -> Result<()>;
    fn set_net_wm_state(&mut self, window: XWindow, maximized: bool, fullscreen: bool)
        -> Result<()>;
    fn set_active_window(&mut self, window: Option<XWindow>) -> Result<()>;
    fn set_input_focus(&mut self, window: Option<XWindow>) -> Result<()>;
    /// Ask the client to close the window with WM_DELETE_WINDOW
    fn send_delete_window(&mut self, window: XWindow) -> Result<()>;
    fn kill_client(&mut self, window: XWindow) -> Result<()>;

    /// Create a cursor from the core cursor font
    fn create_glyph_cursor(&mut self, glyph: u16) -> Result<u32>;
    /// Show `cursor` on the window manager's window
    fn set_wm_cursor(&mut self, cursor: u32) -> Result<()>;

    fn own_clipboard(&mut self, own: bool) -> Result<()>;
    /// Convert CLIPBOARD into our selection window
    fn convert_clipboard(&mut self, target: SelectionTarget) -> Result<()>;
    /// Read and delete the converted selection from our window
    fn read_selection(&mut self) -> Result<SelectionProperty>;
    fn write_selection(
        &mut self,
        requestor: XWindow,
        property: XAtom,
        value: &SelectionProperty,
    ) -> Result<()>;
    /// Answer a conversion request, None refuses it
    fn send_selection_notify(
        &mut self,
        requestor: XWindow,
        target: SelectionTarget,
        property: Option<XAtom>,
        time: u32,
    ) -> Result<()>;
    /// Get PropertyNotify events for a window we don't manage
    fn watch_property_changes(&mut self, window: XWindow) -> Result<()>;
}

pub struct X11rbConnection {
    xc_conn: RustConnection,
    xc_atoms: Atoms,
    xc_root: Window,
    /// Our window holding WM_S0, the cursor is set on this
    xc_wm_window: Window,
    /// Our window for clipboard conversions
    xc_selection_window: Window,
}

impl X11rbConnection {
    /// Connect over the -wm socket and become the window manager
    pub fn connect(fd: OwnedFd) -> Result<Self> {
        let stream = DefaultStream::from_unix_stream(UnixStream::from(fd))
            .context("Could not wrap the XWayland wm socket")?
            .0;
        // Xwayland only has screen 0
        let conn = RustConnection::connect_to_stream(stream, 0)
            .context("Could not connect to XWayland")?;
        let atoms = Atoms::new(&conn)?.reply()?;
        let screen = conn.setup().roots[0].clone();
        let root = screen.root;

        conn.change_window_attributes(
            root,
            &ChangeWindowAttributesAux::default().event_mask(
                EventMask::SUBSTRUCTURE_REDIRECT
                    | EventMask::SUBSTRUCTURE_NOTIFY
                    | EventMask::PROPERTY_CHANGE,
            ),
        )?;
        conn.composite_redirect_subwindows(root, Redirect::MANUAL)?;

        let wm_window = conn.generate_id()?;
        conn.create_window(
            screen.root_depth,
            wm_window,
            root,
            0,
            0,
            1,
            1,
            0,
            WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &CreateWindowAux::default(),
        )?;
        conn.change_property32(
            PropMode::REPLACE,
            wm_window,
            atoms._NET_SUPPORTING_WM_CHECK,
            AtomEnum::WINDOW,
            &[wm_window],
        )?;
        conn.change_property32(
            PropMode::REPLACE,
            root,
            atoms._NET_SUPPORTING_WM_CHECK,
            AtomEnum::WINDOW,
            &[wm_window],
        )?;
        conn.change_property8(
            PropMode::REPLACE,
            wm_window,
            atoms._NET_WM_NAME,
            atoms.UTF8_STRING,
            b"hollywood",
        )?;
        conn.change_property32(
            PropMode::REPLACE,
            root,
            atoms._NET_SUPPORTED,
            AtomEnum::ATOM,
            &[
                atoms._NET_WM_STATE,
                atoms._NET_WM_STATE_MAXIMIZED_VERT,
                atoms._NET_WM_STATE_MAXIMIZED_HORZ,
                atoms._NET_WM_STATE_FULLSCREEN,
                atoms._NET_WM_MOVERESIZE,
                atoms._NET_ACTIVE_WINDOW,
            ],
        )?;

        // No X client is accepted before WM_S0 has an owner
        conn.set_selection_owner(wm_window, atoms.WM_S0, x11rb::CURRENT_TIME)?;
        conn.set_selection_owner(wm_window, atoms._NET_WM_CM_S0, x11rb::CURRENT_TIME)?;

        let selection_window = conn.generate_id()?;
        conn.create_window(
            screen.root_depth,
            selection_window,
            root,
            0,
            0,
            10,
            10,
            0,
            WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &CreateWindowAux::default().event_mask(EventMask::PROPERTY_CHANGE),
        )?;
        conn.xfixes_query_version(5, 0)?.reply()?;
        conn.xfixes_select_selection_input(
            selection_window,
            atoms.CLIPBOARD,
            SelectionEventMask::SET_SELECTION_OWNER
                | SelectionEventMask::SELECTION_WINDOW_DESTROY
                | SelectionEventMask::SELECTION_CLIENT_CLOSE,
        )?;
        conn.flush()?;

        log::debug!(
            "Became the X window manager with window {} on root {}",
            wm_window,
            root
        );

        Ok(Self {
            xc_conn: conn,
            xc_atoms: atoms,
            xc_root: root,
            xc_wm_window: wm_window,
            xc_selection_window: selection_window,
        })
    }

    fn get_property(&self, window: Window, property: Atom, ty: Atom) -> Result<GetPropertyReply> {
        Ok(self
            .xc_conn
            .get_property(false, window, property, ty, 0, 2048)?
            .reply()?)
    }

    fn get_words(&self, window: Window, property: Atom, ty: Atom) -> Result<Vec<u32>> {
        let reply = self.get_property(window, property, ty)?;
        let words = match reply.value32() {
            Some(words) => words.collect(),
            None => Vec::new(),
        };
        Ok(words)
    }

    fn window_type_from_atom(&self, atom: Atom) -> Option<WmWindowType> {
        let a = &self.xc_atoms;
        let ty = if atom == a._NET_WM_WINDOW_TYPE_NORMAL {
            WmWindowType::Toplevel
        } else if atom == a._NET_WM_WINDOW_TYPE_TOOLTIP {
            WmWindowType::Tooltip
        } else if atom == a._NET_WM_WINDOW_TYPE_UTILITY {
            WmWindowType::Utility
        } else if atom == a._NET_WM_WINDOW_TYPE_DND {
            WmWindowType::Dnd
        } else if atom == a._NET_WM_WINDOW_TYPE_DROPDOWN_MENU {
            WmWindowType::Dropdown
        } else if atom == a._NET_WM_WINDOW_TYPE_MENU {
            WmWindowType::Menu
        } else if atom == a._NET_WM_WINDOW_TYPE_NOTIFICATION {
            WmWindowType::Notification
        } else if atom == a._NET_WM_WINDOW_TYPE_POPUP_MENU {
            WmWindowType::Popup
        } else if atom == a._NET_WM_WINDOW_TYPE_COMBO {
            WmWindowType::Combo
        } else if atom == a._NET_WM_WINDOW_TYPE_SPLASH {
            WmWindowType::Splash
        } else {
            return None;
        };
        Some(ty)
    }

    fn target_from_atom(&self, atom: Atom) -> SelectionTarget {
        let a = &self.xc_atoms;
        if atom == a.TARGETS {
            SelectionTarget::Targets
        } else if atom == a.UTF8_STRING || atom == a.TEXT_PLAIN_UTF8 {
            SelectionTarget::Utf8String
        } else if atom == a.TEXT || atom == a.TEXT_PLAIN {
            SelectionTarget::Text
        } else if atom == u32::from(AtomEnum::STRING) {
            SelectionTarget::String
        } else if atom == a.TIMESTAMP {
            SelectionTarget::Timestamp
        } else {
            SelectionTarget::Other(atom)
        }
    }

    fn atom_from_target(&self, target: SelectionTarget) -> Atom {
        let a = &self.xc_atoms;
        match target {
            SelectionTarget::Targets => a.TARGETS,
            SelectionTarget::Utf8String => a.UTF8_STRING,
            SelectionTarget::Text => a.TEXT,
            SelectionTarget::String => AtomEnum::STRING.into(),
            SelectionTarget::Timestamp => a.TIMESTAMP,
            SelectionTarget::Other(atom) => atom,
        }
    }

    fn property_from_atom(&self, atom: Atom) -> WindowProperty {
        let a = &self.xc_atoms;
        if atom == a._NET_WM_NAME || atom == a.WM_NAME {
            WindowProperty::Title
        } else if atom == a.WM_CLASS {
            WindowProperty::Class
        } else if atom == a._NET_WM_WINDOW_TYPE {
            WindowProperty::WindowType
        } else if atom == a.WM_TRANSIENT_FOR {
            WindowProperty::TransientFor
        } else if atom == a.WM_PROTOCOLS {
            WindowProperty::Protocols
        } else if atom == a.WM_NORMAL_HINTS {
            WindowProperty::NormalHints
        } else if atom == a._MOTIF_WM_HINTS {
            WindowProperty::MotifHints
        } else {
            WindowProperty::Other(atom)
        }
    }

    fn translate_client_message(&self, ty: Atom, data: [u32; 5]) -> ClientMessage {
        let a = &self.xc_atoms;
        if ty == a.WL_SURFACE_ID {
            ClientMessage::SurfaceId(data[0])
        } else if ty == a._NET_WM_MOVERESIZE {
            ClientMessage::MoveResize {
                x_root: data[0] as i32,
                y_root: data[1] as i32,
                direction: data[2],
            }
        } else if ty == a.WM_CHANGE_STATE {
            match WmState::from_raw(data[0]) {
                Some(state) => ClientMessage::ChangeState(state),
                None => ClientMessage::Other(ty),
            }
        } else if ty == a._NET_WM_STATE {
            let props = [data[1], data[2]];
            match NetWmStateAction::from_raw(data[0]) {
                Some(action) => ClientMessage::NetWmState {
                    action,
                    maximize: props.iter().any(|p| {
                        *p == a._NET_WM_STATE_MAXIMIZED_VERT
                            || *p == a._NET_WM_STATE_MAXIMIZED_HORZ
                    }),
                    fullscreen: props.iter().any(|p| *p == a._NET_WM_STATE_FULLSCREEN),
                },
                None => ClientMessage::Other(ty),
            }
        } else {
            ClientMessage::Other(ty)
        }
    }

    /// Turn an x11rb event into one of ours
    ///
    /// Events about our own windows, and ones we never act on, are
    /// dropped.
    fn translate(&self, event: Event) -> Result<Option<XwmEvent>> {
        let ours = |w: Window| w == self.xc_wm_window || w == self.xc_selection_window;

        let ev = match event {
            Event::CreateNotify(e) => {
                if ours(e.window) {
                    return Ok(None);
                }
                // we want to hear about property changes and focus
                self.xc_conn.change_window_attributes(
                    e.window,
                    &ChangeWindowAttributesAux::default()
                        .event_mask(EventMask::PROPERTY_CHANGE | EventMask::FOCUS_CHANGE),
                )?;
                XwmEvent::CreateNotify {
                    window: e.window,
                    geometry: Rect::new(e.x as i32, e.y as i32, e.width as i32, e.height as i32),
                    override_redirect: e.override_redirect,
                }
            }
            Event::MapRequest(e) => XwmEvent::MapRequest { window: e.window },
            Event::MapNotify(e) if !ours(e.window) => XwmEvent::MapNotify { window: e.window },
            Event::UnmapNotify(e) => XwmEvent::UnmapNotify { window: e.window },
            Event::ReparentNotify(e) => XwmEvent::ReparentNotify {
                window: e.window,
                parent: e.parent,
                x: e.x as i32,
                y: e.y as i32,
            },
            Event::ConfigureRequest(e) => {
                let mask = u16::from(e.value_mask);
                let has = |bit: ConfigWindow| mask & u16::from(bit) != 0;
                XwmEvent::ConfigureRequest {
                    window: e.window,
                    x: has(ConfigWindow::X).then(|| e.x as i32),
                    y: has(ConfigWindow::Y).then(|| e.y as i32),
                    width: has(ConfigWindow::WIDTH).then(|| e.width as u32),
                    height: has(ConfigWindow::HEIGHT).then(|| e.height as u32),
                }
            }
            Event::ConfigureNotify(e) if !ours(e.window) => XwmEvent::ConfigureNotify {
                window: e.window,
                geometry: Rect::new(e.x as i32, e.y as i32, e.width as i32, e.height as i32),
            },
            Event::DestroyNotify(e) => XwmEvent::DestroyNotify { window: e.window },
            Event::PropertyNotify(e) => {
                let deleted = e.state == Property::DELETE;
                if e.window == self.xc_selection_window {
                    if e.atom == self.xc_atoms._WL_SELECTION && !deleted {
                        XwmEvent::Selection(SelectionEvent::ChunkReady)
                    } else {
                        return Ok(None);
                    }
                } else {
                    XwmEvent::PropertyNotify {
                        window: e.window,
                        property: self.property_from_atom(e.atom),
                        deleted,
                    }
                }
            }
            Event::ClientMessage(e) => XwmEvent::ClientMessage {
                window: e.window,
                message: self.translate_client_message(e.type_, e.data.as_data32()),
            },
            Event::FocusIn(e) => XwmEvent::FocusIn { window: e.event },
            Event::SelectionNotify(e) if e.requestor == self.xc_selection_window => {
                XwmEvent::Selection(SelectionEvent::Notify {
                    target: self.target_from_atom(e.target),
                    success: e.property != x11rb::NONE,
                })
            }
            Event::SelectionRequest(e) if e.selection == self.xc_atoms.CLIPBOARD => {
                // obsolete clients leave the property empty
                let property = match e.property {
                    x11rb::NONE => e.target,
                    p => p,
                };
                XwmEvent::Selection(SelectionEvent::Request {
                    requestor: e.requestor,
                    target: self.target_from_atom(e.target),
                    property,
                    time: e.time,
                })
            }
            Event::XfixesSelectionNotify(e) if e.selection == self.xc_atoms.CLIPBOARD => {
                let owner = match e.owner {
                    x11rb::NONE => None,
                    w if w == self.xc_selection_window => return Ok(None),
                    w => Some(w),
                };
                XwmEvent::Selection(SelectionEvent::OwnerChanged { owner })
            }
            Event::Error(e) => {
                log::error!("X11 error: {:?}", e);
                return Ok(None);
            }
            _ => return Ok(None),
        };

        Ok(Some(ev))
    }
}

impl XConnection for X11rbConnection {
    fn fd(&self) -> Option<RawFd> {
        Some(self.xc_conn.stream().as_raw_fd())
    }

    fn next_event(&mut self) -> Result<Option<XwmEvent>> {
        while let Some(event) = self.xc_conn.poll_for_event()? {
            if let Some(ev) = self.translate(event)? {
                return Ok(Some(ev));
            }
        }
        Ok(None)
    }

    fn flush(&mut self) -> Result<()> {
        self.xc_conn.flush()?;
        Ok(())
    }

    fn read_properties(&mut self, window: XWindow) -> Result<WindowProperties> {
        let a = self.xc_atoms;
        let mut ret = WindowProperties::default();

        let name = self.get_property(window, a._NET_WM_NAME, a.UTF8_STRING)?;
        let name = match name.value.is_empty() {
            true => self.get_property(window, a.WM_NAME, AtomEnum::ANY.into())?,
            false => name,
        };
        if !name.value.is_empty() {
            ret.wp_title = Some(String::from_utf8_lossy(&name.value).into_owned());
        }

        // instance and class, both nul terminated
        let class = self.get_property(window, a.WM_CLASS, AtomEnum::STRING.into())?;
        ret.wp_app_id = class
            .value
            .split(|b| *b == 0)
            .filter(|s| !s.is_empty())
            .nth(1)
            .map(|s| String::from_utf8_lossy(s).into_owned());

        ret.wp_window_type = self
            .get_words(window, a._NET_WM_WINDOW_TYPE, AtomEnum::ATOM.into())?
            .iter()
            .find_map(|atom| self.window_type_from_atom(*atom));

        ret.wp_transient_for = self
            .get_words(window, a.WM_TRANSIENT_FOR, AtomEnum::WINDOW.into())?
            .first()
            .copied()
            .filter(|w| *w != x11rb::NONE);

        ret.wp_delete_window = self
            .get_words(window, a.WM_PROTOCOLS, AtomEnum::ATOM.into())?
            .contains(&a.WM_DELETE_WINDOW);

        ret.wp_size_hints = parse_normal_hints(&self.get_words(
            window,
            a.WM_NORMAL_HINTS,
            AtomEnum::ANY.into(),
        )?);
        ret.wp_decorate = parse_motif_decorations(&self.get_words(
            window,
            a._MOTIF_WM_HINTS,
            AtomEnum::ANY.into(),
        )?);

        Ok(ret)
    }

    fn map_window(&mut self, window: XWindow) -> Result<()> {
        self.xc_conn.map_window(window)?;
        Ok(())
    }

    fn configure_window(&mut self, window: XWindow, geometry: Rect<i32>) -> Result<()> {
        self.xc_conn.configure_window(
            window,
            &ConfigureWindowAux::new()
                .x(geometry.r_pos.0)
                .y(geometry.r_pos.1)
                .width(geometry.r_size.0.max(1) as u32)
                .height(geometry.r_size.1.max(1) as u32),
        )?;
        Ok(())
    }

    fn set_wm_state(&mut self, window: XWindow, state: WmState) -> Result<()> {
        let atom = self.xc_atoms.WM_STATE;
        // state and icon window
        self.xc_conn.change_property32(
            PropMode::REPLACE,
            window,
            atom,
            atom,
            &[state as u32, x11rb::NONE],
        )?;
        Ok(())
    }

    fn set_net_wm_state(
        &mut self,
        window: XWindow,
        maximized: bool,
        fullscreen: bool,
    ) -> Result<()> {
        let a = self.xc_atoms;
        let mut state = Vec::new();
        if maximized {
            state.push(a._NET_WM_STATE_MAXIMIZED_VERT);
            state.push(a._NET_WM_STATE_MAXIMIZED_HORZ);
        }
        if fullscreen {
            state.push(a._NET_WM_STATE_FULLSCREEN);
        }
        self.xc_conn.change_property32(
            PropMode::REPLACE,
            window,
            a._NET_WM_STATE,
            AtomEnum::ATOM,
            &state,
        )?;
        Ok(())
    }

    fn set_active_window(&mut self, window: Option<XWindow>) -> Result<()> {
        self.xc_conn.change_property32(
            PropMode::REPLACE,
            self.xc_root,
            self.xc_atoms._NET_ACTIVE_WINDOW,
            AtomEnum::WINDOW,
            &[window.unwrap_or(x11rb::NONE)],
        )?;
        Ok(())
    }

    fn set_input_focus(&mut self, window: Option<XWindow>) -> Result<()> {
        self.xc_conn.set_input_focus(
            InputFocus::POINTER_ROOT,
            window.unwrap_or(x11rb::NONE),
            x11rb::CURRENT_TIME,
        )?;
        Ok(())
    }

    fn send_delete_window(&mut self, window: XWindow) -> Result<()> {
        let a = self.xc_atoms;
        let ev = ClientMessageEvent::new(
            32,
            window,
            a.WM_PROTOCOLS,
            [a.WM_DELETE_WINDOW, x11rb::CURRENT_TIME, 0, 0, 0],
        );
        self.xc_conn
            .send_event(false, window, EventMask::NO_EVENT, ev)?;
        Ok(())
    }

    fn kill_client(&mut self, window: XWindow) -> Result<()> {
        self.xc_conn.kill_client(window)?;
        Ok(())
    }

    fn create_glyph_cursor(&mut self, glyph: u16) -> Result<u32> {
        let font = self.xc_conn.generate_id()?;
        self.xc_conn.open_font(font, b"cursor")?;

        let cursor = self.xc_conn.generate_id()?;
        self.xc_conn.create_glyph_cursor(
            cursor,
            font,
            font,
            glyph,
            glyph + 1,
            0,
            0,
            0,
            0xffff,
            0xffff,
            0xffff,
        )?;
        self.xc_conn.close_font(font)?;
        Ok(cursor)
    }

    fn set_wm_cursor(&mut self, cursor: u32) -> Result<()> {
        self.xc_conn.change_window_attributes(
            self.xc_wm_window,
            &ChangeWindowAttributesAux::default().cursor(cursor),
        )?;
        self.xc_conn.flush()?;
        Ok(())
    }

    fn own_clipboard(&mut self, own: bool) -> Result<()> {
        let owner = match own {
            true => self.xc_selection_window,
            false => x11rb::NONE,
        };
        self.xc_conn
            .set_selection_owner(owner, self.xc_atoms.CLIPBOARD, x11rb::CURRENT_TIME)?;
        Ok(())
    }

    fn convert_clipboard(&mut self, target: SelectionTarget) -> Result<()> {
        self.xc_conn.convert_selection(
            self.xc_selection_window,
            self.xc_atoms.CLIPBOARD,
            self.atom_from_target(target),
            self.xc_atoms._WL_SELECTION,
            x11rb::CURRENT_TIME,
        )?;
        Ok(())
    }

    fn read_selection(&mut self) -> Result<SelectionProperty> {
        // deleting the property asks an INCR owner for the next chunk
        let reply = self
            .xc_conn
            .get_property(
                true,
                self.xc_selection_window,
                self.xc_atoms._WL_SELECTION,
                AtomEnum::ANY,
                0,
                0x1fff_ffff,
            )?
            .reply()?;

        let prop = if reply.type_ == self.xc_atoms.INCR {
            let size = reply.value32().and_then(|mut w| w.next()).unwrap_or(0);
            SelectionProperty::Incr(size)
        } else if reply.type_ == u32::from(AtomEnum::ATOM) {
            let targets = match reply.value32() {
                Some(words) => words.map(|atom| self.target_from_atom(atom)).collect(),
                None => Vec::new(),
            };
            SelectionProperty::Targets(targets)
        } else {
            SelectionProperty::Data(reply.value)
        };
        Ok(prop)
    }

    fn write_selection(
        &mut self,
        requestor: XWindow,
        property: XAtom,
        value: &SelectionProperty,
    ) -> Result<()> {
        match value {
            SelectionProperty::Targets(targets) => {
                let atoms: Vec<Atom> = targets.iter().map(|t| self.atom_from_target(*t)).collect();
                self.xc_conn.change_property32(
                    PropMode::REPLACE,
                    requestor,
                    property,
                    AtomEnum::ATOM,
                    &atoms,
                )?;
            }
            SelectionProperty::Data(data) => {
                self.xc_conn.change_property8(
                    PropMode::REPLACE,
                    requestor,
                    property,
                    self.xc_atoms.UTF8_STRING,
                    data,
                )?;
            }
            SelectionProperty::Incr(size) => {
                self.xc_conn.change_property32(
                    PropMode::REPLACE,
                    requestor,
                    property,
                    self.xc_atoms.INCR,
                    &[*size],
                )?;
            }
        }
        self.xc_conn.flush()?;
        Ok(())
    }

    fn send_selection_notify(
        &mut self,
        requestor: XWindow,
        target: SelectionTarget,
        property: Option<XAtom>,
        time: u32,
    ) -> Result<()> {
        let ev = SelectionNotifyEvent {
            response_type: x11rb::protocol::xproto::SELECTION_NOTIFY_EVENT,
            sequence: 0,
            time,
            requestor,
            selection: self.xc_atoms.CLIPBOARD,
            target: self.atom_from_target(target),
            property: property.unwrap_or(x11rb::NONE),
        };
        self.xc_conn
            .send_event(false, requestor, EventMask::NO_EVENT, ev)?;
        self.xc_conn.flush()?;
        Ok(())
    }

    fn watch_property_changes(&mut self, window: XWindow) -> Result<()> {
        self.xc_conn.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::default().event_mask(EventMask::PROPERTY_CHANGE),
        )?;
        Ok(())
    }
}
