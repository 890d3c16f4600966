// Window manager events
//
// The X connection translates what the X server sends into these so
// the window manager is one match over a plain enum, and so tests can
// script a server.
//
// Austin Shafer - 2020
use super::shell_surface::WmState;
use utils::region::Rect;

/// An X11 window id
pub type XWindow = u32;
/// An X11 atom, only used where the value is opaque to us
pub type XAtom = u32;

/// Cached window properties a PropertyNotify can invalidate
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WindowProperty {
    Title,
    Class,
    WindowType,
    TransientFor,
    Protocols,
    NormalHints,
    MotifHints,
    /// Anything else, the selection bridge may want it
    Other(XAtom),
}

/// What a `_NET_WM_STATE` message wants done
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NetWmStateAction {
    Remove,
    Add,
    Toggle,
}

impl NetWmStateAction {
    pub fn from_raw(action: u32) -> Option<Self> {
        match action {
            0 => Some(NetWmStateAction::Remove),
            1 => Some(NetWmStateAction::Add),
            2 => Some(NetWmStateAction::Toggle),
            _ => None,
        }
    }

    /// Apply this action to the current value of a state
    pub fn apply(&self, current: bool) -> bool {
        match self {
            NetWmStateAction::Remove => false,
            NetWmStateAction::Add => true,
            NetWmStateAction::Toggle => !current,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// `_NET_WM_MOVERESIZE`, direction as defined by EWMH
    MoveResize { x_root: i32, y_root: i32, direction: u32 },
    /// `WM_CHANGE_STATE`
    ChangeState(WmState),
    /// `_NET_WM_STATE` touching the maximized and fullscreen states
    NetWmState {
        action: NetWmStateAction,
        maximize: bool,
        fullscreen: bool,
    },
    /// `WL_SURFACE_ID`, pairs the window with a wl_surface
    SurfaceId(u32),
    Other(XAtom),
}

/// A clipboard conversion target
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SelectionTarget {
    Targets,
    Utf8String,
    Text,
    String,
    Timestamp,
    Other(XAtom),
}

impl SelectionTarget {
    /// The mime type a wayland client would use for this target
    pub fn mime_type(&self) -> Option<&'static str> {
        match self {
            SelectionTarget::Utf8String => Some("text/plain;charset=utf-8"),
            SelectionTarget::Text | SelectionTarget::String => Some("text/plain"),
            _ => None,
        }
    }

    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime {
            "text/plain;charset=utf-8" | "UTF8_STRING" => Some(SelectionTarget::Utf8String),
            "text/plain" | "TEXT" => Some(SelectionTarget::Text),
            "STRING" => Some(SelectionTarget::String),
            _ => None,
        }
    }
}

/// Clipboard traffic, handled by the selection bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    /// An X client took the clipboard, or it was released (None)
    OwnerChanged { owner: Option<XWindow> },
    /// A conversion we asked for finished
    Notify {
        target: SelectionTarget,
        success: bool,
    },
    /// An X client wants the clipboard we own
    Request {
        requestor: XWindow,
        target: SelectionTarget,
        property: XAtom,
        time: u32,
    },
    /// The next chunk of an incremental transfer to us is ready
    ChunkReady,
}

#[derive(Debug, Clone, PartialEq)]
pub enum XwmEvent {
    CreateNotify {
        window: XWindow,
        geometry: Rect<i32>,
        override_redirect: bool,
    },
    MapRequest {
        window: XWindow,
    },
    MapNotify {
        window: XWindow,
    },
    UnmapNotify {
        window: XWindow,
    },
    ReparentNotify {
        window: XWindow,
        parent: XWindow,
        x: i32,
        y: i32,
    },
    /// Only the fields in the request's value mask are set
    ConfigureRequest {
        window: XWindow,
        x: Option<i32>,
        y: Option<i32>,
        width: Option<u32>,
        height: Option<u32>,
    },
    ConfigureNotify {
        window: XWindow,
        geometry: Rect<i32>,
    },
    DestroyNotify {
        window: XWindow,
    },
    PropertyNotify {
        window: XWindow,
        property: WindowProperty,
        deleted: bool,
    },
    ClientMessage {
        window: XWindow,
        message: ClientMessage,
    },
    FocusIn {
        window: XWindow,
    },
    Selection(SelectionEvent),
}
