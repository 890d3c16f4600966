// Per-surface state shared by the renderer, input and XWayland
//
// A Surface is one client window or popup. It is owned by the
// Atmosphere's registry, children are owned through the registry as
// well and only hold their parent's id.
//
// Austin Shafer - 2020
use super::layers::Layer;
use super::SurfaceId;
use crate::hollywood::glcomp::{Origin, TextureId};
use crate::hollywood::input::edges::ResizeEdge;
use utils::region::Rect;

/// Shadows are only drawn when larger than this
pub const SHADOW_THRESHOLD: f32 = 1.0;
pub const POPUP_SHADOW_SIZE: f32 = 15.0;
pub const TOPLEVEL_SHADOW_SIZE: f32 = 45.0;

/// Gem and icon size in the decoration bar, before scaling
pub const ICON_SIZE: f32 = 22.0;
/// Space between gems, before scaling
pub const GEM_PADDING: f32 = 3.0;

/// The id of an output window
pub type OutputId = u32;

/// The role of a surface
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SurfaceType {
    Unknown,
    TopLevel,
    Transient,
    Popup,
    TopLevelTool,
    MenuServer,
    LayerShell,
    Desktop,
}

bitflags::bitflags! {
    /// Role and state bits for a surface
    pub struct SurfaceFlags: u32 {
        const NONE = 0;
        /// The client negotiated server side decorations
        const SSD = 1 << 0;
        const MINIMIZED = 1 << 1;
        const MAXIMIZED = 1 << 2;
        const FULLSCREEN = 1 << 3;
        /// Owned by a fullscreen shell, drawn without an intermediate fb
        const FULLSCREEN_SHELL = 1 << 4;
        const SUBSURFACE = 1 << 5;
        /// This surface is the cursor image
        const CURSOR = 1 << 6;
        /// Desktop surface of the shell
        const SHELL_DESKTOP = 1 << 7;
        /// The client draws its own shadow (gtk)
        const CLIENT_SHADOW = 1 << 8;
        /// This surface has an xdg (or qt) toplevel role object
        const XDG_TOPLEVEL = 1 << 9;
        /// The client has committed and the surface may be drawn
        const READY = 1 << 10;
        /// A buffer has been attached
        const HAS_CONTENT = 1 << 11;
    }
}

bitflags::bitflags! {
    /// Window management actions the client allows
    pub struct Capabilities: u8 {
        const NONE = 0;
        const CAN_MINIMIZE = 1 << 0;
        const CAN_MAXIMIZE = 1 << 1;
        const CAN_CLOSE = 1 << 2;
        const ALL = Self::CAN_MINIMIZE.bits | Self::CAN_MAXIMIZE.bits | Self::CAN_CLOSE.bits;
    }
}

/// The global sizes for server side decorations
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DecorationMetrics {
    /// Height of the title bar
    pub dm_decoration: f32,
    /// Width of the border on the other three sides
    pub dm_border: f32,
}

/// Where the decoration gems live
///
/// All rects are in pixels relative to the top left of the surface's
/// render rect (the intermediate framebuffer).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GemLayout {
    pub gl_icon: Rect<f32>,
    pub gl_close: Option<Rect<f32>>,
    pub gl_maximize: Option<Rect<f32>>,
    pub gl_minimize: Option<Rect<f32>>,
}

impl GemLayout {
    /// Move every gem by (dx, dy)
    pub fn translated(&self, dx: f32, dy: f32) -> GemLayout {
        GemLayout {
            gl_icon: self.gl_icon.translated(dx, dy),
            gl_close: self.gl_close.map(|r| r.translated(dx, dy)),
            gl_maximize: self.gl_maximize.map(|r| r.translated(dx, dy)),
            gl_minimize: self.gl_minimize.map(|r| r.translated(dx, dy)),
        }
    }
}

/// Lay out the gems of a decoration bar
///
/// `start` is the top left of the bar, `width` the width of the
/// surface content. Gems go right to left: close, maximize/restore,
/// minimize. A gem whose capability is missing takes no space. The
/// window icon is left aligned.
pub fn gem_layout(
    start: (f32, f32),
    width: f32,
    decoration: f32,
    icon_size: f32,
    padding: f32,
    caps: Capabilities,
) -> GemLayout {
    let y = start.1 + (decoration - icon_size) / 2.0;
    let mut x = start.0 + width - padding - icon_size;

    let mut next_gem = |allowed: bool| -> Option<Rect<f32>> {
        if !allowed {
            return None;
        }
        let ret = Rect::new(x, y, icon_size, icon_size);
        x -= padding + icon_size;
        Some(ret)
    };

    let close = next_gem(caps.contains(Capabilities::CAN_CLOSE));
    let maximize = next_gem(caps.contains(Capabilities::CAN_MAXIMIZE));
    let minimize = next_gem(caps.contains(Capabilities::CAN_MINIMIZE));

    GemLayout {
        gl_icon: Rect::new(start.0 + padding, y, icon_size, icon_size),
        gl_close: close,
        gl_maximize: maximize,
        gl_minimize: minimize,
    }
}

/// The projection of a surface onto one output
#[derive(Debug, Clone)]
pub struct SurfaceView {
    pub sv_output: OutputId,
    /// The texture holding this surface's contents on this output
    pub sv_texture: Option<TextureId>,
    pub sv_origin: Origin,
    /// The client buffer is held by the compositor, so the texture is
    /// valid even without new content.
    pub sv_buffer_locked: bool,
}

impl SurfaceView {
    pub fn new(output: OutputId) -> Self {
        Self {
            sv_output: output,
            sv_texture: None,
            sv_origin: Origin::TopLeft,
            sv_buffer_locked: false,
        }
    }
}

/// A client window
#[derive(Debug, Clone)]
pub struct Surface {
    pub s_type: SurfaceType,
    pub s_flags: SurfaceFlags,
    pub s_caps: Capabilities,
    /// The collection this surface is a member of. Children never are.
    pub s_layer: Option<Layer>,
    pub s_parent: Option<SurfaceId>,
    pub s_children: Vec<SurfaceId>,
    /// output space position of the content
    pub s_pos: (f32, f32),
    /// size of the content, not including decorations
    pub s_size: (f32, f32),
    pub s_buffer_scale: f32,
    pub s_buffer_size: (f32, f32),
    /// Optional viewport into the buffer, in buffer coordinates
    pub s_source_geometry: Option<Rect<f32>>,
    pub s_title: String,
    pub s_app_id: String,
    /// Texture of the window icon, None until one was decoded
    pub s_icon: Option<TextureId>,
    /// The X11 window backing this surface, if it came from XWayland
    pub s_xwayland_window: Option<u32>,
    /// The wl_surface protocol id, used to pair XWayland windows
    pub s_wl_surface_id: Option<u32>,
    /// While resizing from the top or left, the corner that has to
    /// stay in place when the client commits a new size
    pub s_resize_anchor: Option<(ResizeEdge, (f32, f32))>,
    pub s_views: Vec<SurfaceView>,
}

impl Surface {
    pub fn new(ty: SurfaceType) -> Self {
        Self {
            s_type: ty,
            s_flags: SurfaceFlags::NONE,
            s_caps: Capabilities::ALL,
            s_layer: None,
            s_parent: None,
            s_children: Vec::new(),
            s_pos: (0.0, 0.0),
            s_size: (0.0, 0.0),
            s_buffer_scale: 1.0,
            s_buffer_size: (0.0, 0.0),
            s_source_geometry: None,
            s_title: String::new(),
            s_app_id: String::new(),
            s_icon: None,
            s_xwayland_window: None,
            s_wl_surface_id: None,
            s_resize_anchor: None,
            s_views: Vec::new(),
        }
    }

    pub fn has_flag(&self, flag: SurfaceFlags) -> bool {
        self.s_flags.contains(flag)
    }

    pub fn set_flag(&mut self, flag: SurfaceFlags, val: bool) {
        self.s_flags.set(flag, val);
    }

    pub fn is_minimized(&self) -> bool {
        self.has_flag(SurfaceFlags::MINIMIZED)
    }

    pub fn is_maximized(&self) -> bool {
        self.has_flag(SurfaceFlags::MAXIMIZED)
    }

    pub fn is_fullscreen(&self) -> bool {
        self.has_flag(SurfaceFlags::FULLSCREEN)
    }

    pub fn is_xwayland(&self) -> bool {
        self.s_xwayland_window.is_some()
    }

    /// Special shell objects are never raised, decorated or hit
    pub fn is_special(&self) -> bool {
        self.has_flag(SurfaceFlags::CURSOR)
    }

    /// Can this surface hold the raised toplevel slot
    pub fn is_toplevel_like(&self) -> bool {
        self.has_flag(SurfaceFlags::XDG_TOPLEVEL)
            || self.is_xwayland()
            || self.s_layer == Some(Layer::Background)
    }

    /// Does the compositor draw the title bar and border
    pub fn server_decorated(&self) -> bool {
        if self.is_xwayland() {
            return self.has_flag(SurfaceFlags::SSD);
        }
        if !self.has_flag(SurfaceFlags::XDG_TOPLEVEL)
            || self.is_special()
            || self.s_type == SurfaceType::LayerShell
        {
            return false;
        }

        self.has_flag(SurfaceFlags::SSD)
    }

    pub fn shadow_size(&self) -> f32 {
        if self.s_type == SurfaceType::LayerShell
            || self.is_maximized()
            || self.is_fullscreen()
            || self.has_flag(SurfaceFlags::CLIENT_SHADOW)
        {
            return 0.0;
        }

        match self.s_type {
            SurfaceType::Popup => POPUP_SHADOW_SIZE,
            SurfaceType::TopLevel => TOPLEVEL_SHADOW_SIZE,
            _ => 0.0,
        }
    }

    pub fn surface_rect(&self) -> Rect<f32> {
        Rect::new(self.s_pos.0, self.s_pos.1, self.s_size.0, self.s_size.1)
    }

    /// Size of the content plus the border and title bar
    pub fn decorated_size(&self, m: &DecorationMetrics) -> (f32, f32) {
        if !self.server_decorated() {
            return self.s_size;
        }

        (
            self.s_size.0 + m.dm_border * 2.0,
            self.s_size.1 + m.dm_border + m.dm_decoration,
        )
    }

    /// Size of the intermediate framebuffer, decorations plus shadow
    pub fn render_size(&self, m: &DecorationMetrics) -> (f32, f32) {
        let mut size = self.decorated_size(m);
        let shadow = self.shadow_size();

        if shadow > SHADOW_THRESHOLD {
            size.0 += shadow * 2.0;
            size.1 += shadow * 2.0;
        }
        size
    }

    /// Top left of the title bar
    pub fn decoration_position(&self, m: &DecorationMetrics) -> (f32, f32) {
        (
            self.s_pos.0 - m.dm_border,
            self.s_pos.1 - m.dm_decoration,
        )
    }

    pub fn decorated_rect(&self, m: &DecorationMetrics) -> Rect<f32> {
        if !self.server_decorated() {
            return self.surface_rect();
        }

        let pos = self.decoration_position(m);
        let size = self.decorated_size(m);
        Rect::new(pos.0, pos.1, size.0, size.1)
    }

    pub fn render_position(&self, m: &DecorationMetrics) -> (f32, f32) {
        if self.is_fullscreen() {
            return self.s_pos;
        }

        let mut pos = self.s_pos;
        if self.server_decorated() {
            pos.0 -= m.dm_border;
            pos.1 -= m.dm_decoration;
        }

        let shadow = self.shadow_size();
        if shadow > SHADOW_THRESHOLD && !self.is_maximized() {
            pos.0 -= shadow;
            pos.1 -= shadow;
        }
        pos
    }

    pub fn render_rect(&self, m: &DecorationMetrics) -> Rect<f32> {
        let pos = self.render_position(m);
        let size = self.render_size(m);
        Rect::new(pos.0, pos.1, size.0, size.1)
    }

    pub fn title_bar_rect(&self, m: &DecorationMetrics) -> Rect<f32> {
        let pos = self.decoration_position(m);
        Rect::new(
            pos.0,
            pos.1,
            self.s_size.0 + m.dm_border * 2.0,
            m.dm_decoration,
        )
    }

    /// Gems laid out in framebuffer pixels at `scale`
    pub fn gem_layout(&self, m: &DecorationMetrics, scale: f32) -> GemLayout {
        let shadow = match self.shadow_size() > SHADOW_THRESHOLD {
            true => self.shadow_size() * scale,
            false => 0.0,
        };
        gem_layout(
            (shadow + m.dm_border * scale, shadow + m.dm_border * scale),
            self.s_size.0 * scale,
            m.dm_decoration * scale,
            ICON_SIZE * scale,
            GEM_PADDING * scale,
            self.s_caps,
        )
    }

    /// Gems in output coordinates, for hit testing
    pub fn gem_rects(&self, m: &DecorationMetrics) -> GemLayout {
        let pos = self.render_position(m);
        self.gem_layout(m, 1.0).translated(pos.0, pos.1)
    }

    pub fn get_view(&self, output: OutputId) -> Option<&SurfaceView> {
        self.s_views.iter().find(|v| v.sv_output == output)
    }

    /// Get the view for `output`, creating it if needed
    pub fn get_view_mut(&mut self, output: OutputId) -> &mut SurfaceView {
        let index = match self.s_views.iter().position(|v| v.sv_output == output) {
            Some(i) => i,
            None => {
                self.s_views.push(SurfaceView::new(output));
                self.s_views.len() - 1
            }
        };

        &mut self.s_views[index]
    }
}
