// The window manager's record of one X window
//
// Austin Shafer - 2020
use super::event::XWindow;
use crate::hollywood::atmosphere::SurfaceId;
use crate::hollywood::input::edges::ResizeEdge;
use utils::region::Rect;

/// ICCCM WM_STATE values
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WmState {
    Withdrawn = 0,
    Normal = 1,
    Iconic = 3,
}

impl WmState {
    pub fn from_raw(state: u32) -> Option<Self> {
        match state {
            0 => Some(WmState::Withdrawn),
            1 => Some(WmState::Normal),
            3 => Some(WmState::Iconic),
            _ => None,
        }
    }
}

/// `_NET_WM_WINDOW_TYPE`, the ones we tell apart
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WmWindowType {
    Toplevel,
    Tooltip,
    Utility,
    Dnd,
    Dropdown,
    Menu,
    Notification,
    Popup,
    Combo,
    Splash,
}

impl WmWindowType {
    /// Menus and friends are placed by the client and never decorated
    pub fn is_popup(&self) -> bool {
        match self {
            WmWindowType::Toplevel | WmWindowType::Utility | WmWindowType::Splash => false,
            _ => true,
        }
    }
}

/// The parts of WM_NORMAL_HINTS we honor
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct WmSizeHints {
    pub min_size: Option<(i32, i32)>,
    pub max_size: Option<(i32, i32)>,
}

const P_MIN_SIZE: u32 = 1 << 4;
const P_MAX_SIZE: u32 = 1 << 5;

/// Parse the raw 32 bit words of WM_NORMAL_HINTS
///
/// The layout is flags, x, y, width, height, min width, min height,
/// max width, max height, followed by fields we ignore.
pub fn parse_normal_hints(words: &[u32]) -> WmSizeHints {
    let mut ret = WmSizeHints::default();
    if words.len() < 9 {
        return ret;
    }

    let flags = words[0];
    if flags & P_MIN_SIZE != 0 {
        ret.min_size = Some((words[5] as i32, words[6] as i32));
    }
    if flags & P_MAX_SIZE != 0 && words[7] > 0 && words[8] > 0 {
        ret.max_size = Some((words[7] as i32, words[8] as i32));
    }
    ret
}

const MWM_HINTS_DECORATIONS: u32 = 1 << 1;

/// Does `_MOTIF_WM_HINTS` ask for decorations
///
/// None if the property doesn't say.
pub fn parse_motif_decorations(words: &[u32]) -> Option<bool> {
    if words.len() < 3 || words[0] & MWM_HINTS_DECORATIONS == 0 {
        return None;
    }
    Some(words[2] != 0)
}

/// Everything read from a window's properties in one go
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WindowProperties {
    pub wp_title: Option<String>,
    /// The class part of WM_CLASS
    pub wp_app_id: Option<String>,
    pub wp_window_type: Option<WmWindowType>,
    pub wp_transient_for: Option<XWindow>,
    /// WM_PROTOCOLS lists WM_DELETE_WINDOW
    pub wp_delete_window: bool,
    pub wp_size_hints: WmSizeHints,
    pub wp_decorate: Option<bool>,
}

/// Has the wl_surface for this window shown up yet
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PairStatus {
    Unpaired,
    Paired(SurfaceId),
}

#[derive(Debug, Clone)]
pub struct XWaylandShellSurface {
    pub xs_window: XWindow,
    pub xs_status: PairStatus,
    /// wl_surface protocol id from WL_SURFACE_ID
    pub xs_surface_id: Option<u32>,
    pub xs_geometry: Rect<i32>,
    /// Geometry to go back to when unmaximized
    pub xs_saved_geometry: Option<Rect<i32>>,
    pub xs_override_redirect: bool,
    pub xs_mapped: bool,
    pub xs_wm_state: WmState,
    pub xs_window_type: WmWindowType,
    pub xs_transient_for: Option<XWindow>,
    pub xs_title: String,
    pub xs_app_id: String,
    pub xs_size_hints: WmSizeHints,
    pub xs_delete_window: bool,
    pub xs_decorate: bool,
    pub xs_activated: bool,
    pub xs_maximized: bool,
    pub xs_fullscreen: bool,
    /// Properties changed since they were last read
    pub xs_props_dirty: bool,
}

impl XWaylandShellSurface {
    pub fn new(window: XWindow, geometry: Rect<i32>, override_redirect: bool) -> Self {
        Self {
            xs_window: window,
            xs_status: PairStatus::Unpaired,
            xs_surface_id: None,
            xs_geometry: geometry,
            xs_saved_geometry: None,
            xs_override_redirect: override_redirect,
            xs_mapped: false,
            xs_wm_state: WmState::Withdrawn,
            xs_window_type: WmWindowType::Toplevel,
            xs_transient_for: None,
            xs_title: String::new(),
            xs_app_id: String::new(),
            xs_size_hints: WmSizeHints::default(),
            xs_delete_window: false,
            xs_decorate: !override_redirect,
            xs_activated: false,
            xs_maximized: false,
            xs_fullscreen: false,
            xs_props_dirty: true,
        }
    }

    pub fn paired_surface(&self) -> Option<SurfaceId> {
        match self.xs_status {
            PairStatus::Paired(id) => Some(id),
            PairStatus::Unpaired => None,
        }
    }

    /// Should the compositor draw a title bar for this window
    pub fn wants_decorations(&self) -> bool {
        self.xs_decorate
            && !self.xs_override_redirect
            && !self.xs_window_type.is_popup()
            && !self.xs_fullscreen
    }

    pub fn apply_properties(&mut self, props: WindowProperties) {
        if let Some(title) = props.wp_title {
            self.xs_title = title;
        }
        if let Some(app_id) = props.wp_app_id {
            self.xs_app_id = app_id;
        }
        self.xs_window_type = props.wp_window_type.unwrap_or(match props.wp_transient_for {
            Some(_) => WmWindowType::Utility,
            None => WmWindowType::Toplevel,
        });
        self.xs_transient_for = props.wp_transient_for;
        self.xs_delete_window = props.wp_delete_window;
        self.xs_size_hints = props.wp_size_hints;
        self.xs_decorate = props.wp_decorate.unwrap_or(!self.xs_override_redirect);
        self.xs_props_dirty = false;
    }

    /// The size an interactive resize from `initial` by `delta` asks for
    ///
    /// Dragging a left or top edge grows the window when moving away
    /// from it. The result respects the client's size hints.
    pub fn size_for_resize(
        &self,
        initial: (f32, f32),
        delta: (f32, f32),
        edge: ResizeEdge,
    ) -> (i32, i32) {
        let mut width = initial.0;
        let mut height = initial.1;

        if edge.contains(ResizeEdge::LEFT) {
            width -= delta.0;
        } else if edge.contains(ResizeEdge::RIGHT) {
            width += delta.0;
        }
        if edge.contains(ResizeEdge::TOP) {
            height -= delta.1;
        } else if edge.contains(ResizeEdge::BOTTOM) {
            height += delta.1;
        }

        let (min_w, min_h) = self.xs_size_hints.min_size.unwrap_or((1, 1));
        let mut width = (width as i32).max(min_w.max(1));
        let mut height = (height as i32).max(min_h.max(1));
        if let Some((max_w, max_h)) = self.xs_size_hints.max_size {
            width = width.min(max_w);
            height = height.min(max_h);
        }
        (width, height)
    }
}
