//! # Atmosphere: the compositor's shared state
//!
//! Atmosphere holds everything the subsystems need to agree on: the
//! registry of surfaces, the layer collections that order them, and a
//! set of global properties such as the raised window, the cursor
//! position and whether the display is asleep. Input writes to it,
//! the output window reads it once per frame to draw.
//!
//! The registry is authoritative. A `SurfaceId` that is not in it,
//! including one whose slot has since been reused, is never drawn or
//! hit.

// Austin Shafer - 2020
extern crate paste;
use paste::paste;

pub mod layers;
mod registry;
pub mod surface;

#[cfg(test)]
mod tests;

pub use layers::{Layer, LayerCollections, WalkOrder, WalkStep};
pub use registry::SurfaceId;
pub use surface::{
    Capabilities, DecorationMetrics, OutputId, Surface, SurfaceFlags, SurfaceType, SurfaceView,
};

use crate::hollywood::config::{Config, ViewMode};
use crate::hollywood::input::edges;
use crate::hollywood::shortcuts::ShortcutAction;
use registry::Registry;
use utils::log;
use utils::region::Rect;
use utils::timing::TimingManager;

use std::collections::VecDeque;

/// Notifications for the session and protocol layers
///
/// These are queued while handling input or painting and drained by
/// the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum CompositorEvent {
    FrameStarted,
    FrameDone,
    SurfaceActivated(SurfaceId),
    SurfaceDeactivated(SurfaceId),
    SurfaceDestroyed(SurfaceId),
    /// true when the display went to sleep
    SleepChanged(bool),
    Shortcut(ShortcutAction),
    /// The X server is up and DISPLAY is set
    XWaylandReady { display: u32 },
    XWaylandFailed(String),
    XWaylandExited,
}

/// Global state tracking
///
/// Keep in mind this only holds any shared data, data
/// exclusive to subsystems will be held by said subsystem
pub struct Atmosphere {
    a_surfaces: Registry<Surface>,
    a_layers: LayerCollections,
    /// The display is off, painting only clears to black
    a_sleeping: bool,
    a_view_mode: ViewMode,
    /// Height of server side title bars
    a_decoration_size: f32,
    /// Width of server side borders
    a_border_size: f32,
    /// The surface with keyboard focus
    a_activated: Option<SurfaceId>,
    /// The toplevel most recently raised
    a_raised: Option<SurfaceId>,
    pub a_cursor_pos: (f32, f32),
    /// The full output rect
    a_output_rect: Rect<f32>,
    /// The output rect minus panels, windows are kept inside this
    a_available_geometry: Rect<f32>,
    /// Running as a login manager, no wallpaper
    a_login_manager: bool,
    a_mini_mode: bool,
    /// The icon of an active drag and drop
    a_drag_icon: Option<SurfaceId>,

    /// The display sleeps once this runs out
    a_idle: TimingManager,
    /// Number of clients currently inhibiting idle
    a_idle_inhibitors: u32,
    a_changed: bool,
    /// Events for the event loop to hand to the session
    a_events: VecDeque<CompositorEvent>,
    #[cfg(test)]
    pub(crate) a_walk_count: std::cell::Cell<u32>,
}

// Implement getters/setters for our global properties
macro_rules! define_global_getters {
    ($name:ident, $val:ty) => {
        paste! {
            pub fn [<get_ $name>](&self) -> $val {
                self.[< a_ $name>].clone()
            }
            pub fn [<set_ $name>](&mut self, val: $val) {
                self.mark_changed();
                self.[<a_ $name>] = val;
            }
        }
    };
}

impl Atmosphere {
    define_global_getters!(view_mode, ViewMode);
    define_global_getters!(decoration_size, f32);
    define_global_getters!(border_size, f32);
    define_global_getters!(activated, Option<SurfaceId>);
    define_global_getters!(raised, Option<SurfaceId>);
    define_global_getters!(cursor_pos, (f32, f32));
    define_global_getters!(output_rect, Rect<f32>);
    define_global_getters!(available_geometry, Rect<f32>);
    define_global_getters!(login_manager, bool);
    define_global_getters!(mini_mode, bool);
    define_global_getters!(drag_icon, Option<SurfaceId>);
}

impl Atmosphere {
    pub fn new(config: &Config) -> Atmosphere {
        let output = Rect::new(
            0.0,
            0.0,
            config.output_size.0 as f32,
            config.output_size.1 as f32,
        );

        Atmosphere {
            a_surfaces: Registry::new(),
            a_layers: LayerCollections::default(),
            a_sleeping: false,
            a_view_mode: config.view_mode,
            a_decoration_size: config.decoration_size,
            a_border_size: config.border_size,
            a_activated: None,
            a_raised: None,
            a_cursor_pos: (0.0, 0.0),
            a_output_rect: output,
            a_available_geometry: output,
            a_login_manager: config.login_manager,
            a_mini_mode: config.mini_mode,
            a_drag_icon: None,
            a_idle: TimingManager::new(config.idle_timeout_ms),
            a_idle_inhibitors: 0,
            a_changed: true,
            a_events: VecDeque::new(),
            #[cfg(test)]
            a_walk_count: std::cell::Cell::new(0),
        }
    }

    /// Has anything been changed that needs a repaint
    pub fn is_changed(&self) -> bool {
        self.a_changed
    }
    pub fn clear_changed(&mut self) {
        self.a_changed = false;
    }
    pub fn mark_changed(&mut self) {
        self.a_changed = true;
    }

    pub fn get_decoration_metrics(&self) -> DecorationMetrics {
        DecorationMetrics {
            dm_decoration: self.a_decoration_size,
            dm_border: self.a_border_size,
        }
    }

    pub fn get_layers(&self) -> &LayerCollections {
        &self.a_layers
    }

    // ------------------------------
    // Surface lifecycle
    // ------------------------------

    /// Add a surface to the registry
    ///
    /// It is not visible until it is added to a layer or to a parent.
    pub fn create_surface(&mut self, surf: Surface) -> SurfaceId {
        let id = self.a_surfaces.insert(surf);
        log::debug!("Created surface {:?}", id);
        id
    }

    /// Remove a surface and all of its children
    ///
    /// Any global property pointing at it is cleared, and if it was
    /// the raised window the next one in line is raised.
    pub fn destroy_surface(&mut self, id: SurfaceId) {
        let surf = match self.a_surfaces.remove(id) {
            Some(s) => s,
            None => {
                log::debug!("Destroying surface {:?} that is already gone", id);
                return;
            }
        };
        log::debug!("Destroying surface {:?}", id);

        self.a_layers.remove(id);
        if let Some(parent) = surf.s_parent {
            if let Some(p) = self.a_surfaces.get_mut(parent) {
                p.s_children.retain(|c| *c != id);
            }
        }
        for child in surf.s_children.iter() {
            self.destroy_surface(*child);
        }

        if self.a_drag_icon == Some(id) {
            self.a_drag_icon = None;
        }
        if self.a_raised == Some(id) || self.a_activated == Some(id) {
            self.raise_next_in_line();
        }

        self.add_compositor_event(CompositorEvent::SurfaceDestroyed(id));
        self.mark_changed();
    }

    /// Is this id live
    pub fn surface_exists(&self, id: SurfaceId) -> bool {
        self.a_surfaces.contains(id)
    }

    pub fn get_surface(&self, id: SurfaceId) -> Option<&Surface> {
        self.a_surfaces.get(id)
    }

    /// Mutably borrow a surface
    ///
    /// This marks the atmosphere as changed, since the only reason to
    /// get a mutable surface is to change something that is drawn.
    pub fn get_surface_mut(&mut self, id: SurfaceId) -> Option<&mut Surface> {
        self.a_changed = true;
        self.a_surfaces.get_mut(id)
    }

    /// Iterate over every live surface
    pub fn surfaces(&self) -> impl Iterator<Item = (SurfaceId, &Surface)> {
        self.a_surfaces.iter()
    }

    /// Make `child` a child of `parent`
    ///
    /// The child leaves any layer it was in and is drawn after its
    /// parent from now on.
    pub fn set_parent(&mut self, child: SurfaceId, parent: SurfaceId) {
        if !self.surface_exists(child) || !self.surface_exists(parent) || child == parent {
            log::error!("Invalid parent {:?} for surface {:?}", parent, child);
            return;
        }

        self.a_layers.remove(child);
        let old_parent = match self.a_surfaces.get_mut(child) {
            Some(c) => {
                c.s_layer = None;
                c.s_parent.replace(parent)
            }
            None => return,
        };
        if let Some(old) = old_parent {
            if let Some(p) = self.a_surfaces.get_mut(old) {
                p.s_children.retain(|c| *c != child);
            }
        }
        if let Some(p) = self.a_surfaces.get_mut(parent) {
            p.s_children.push(child);
        }
        self.mark_changed();
    }

    /// Find the surface created for a wl_surface protocol id
    pub fn find_surface_by_wl_id(&self, wl_id: u32) -> Option<SurfaceId> {
        self.a_surfaces
            .iter()
            .find(|(_, s)| s.s_wl_surface_id == Some(wl_id))
            .map(|(id, _)| id)
    }

    /// Find the surface backing an X11 window
    pub fn find_surface_by_xwindow(&self, window: u32) -> Option<SurfaceId> {
        self.a_surfaces
            .iter()
            .find(|(_, s)| s.s_xwayland_window == Some(window))
            .map(|(id, _)| id)
    }

    pub fn set_surface_position(&mut self, id: SurfaceId, pos: (f32, f32)) {
        if let Some(surf) = self.a_surfaces.get_mut(id) {
            surf.s_pos = pos;
            self.a_changed = true;
        }
    }

    /// Record a new content size
    ///
    /// If an interactive resize anchored one corner, the surface is
    /// moved so that corner stays put.
    pub fn set_surface_size(&mut self, id: SurfaceId, size: (f32, f32)) {
        if let Some(surf) = self.a_surfaces.get_mut(id) {
            surf.s_size = size;
            if let Some((edge, anchor)) = surf.s_resize_anchor {
                surf.s_pos = edges::anchored_position(anchor, edge, size);
            }
            self.a_changed = true;
        }
    }

    /// Clamp a point into the usable area of the output
    pub fn corrected_position(&self, pos: (f32, f32)) -> (f32, f32) {
        let geom = self.a_available_geometry;
        (
            utils::partial_clamp(pos.0, geom.left(), geom.right() - 1.0),
            utils::partial_clamp(pos.1, geom.top(), geom.bottom() - 1.0),
        )
    }

    // ------------------------------
    // Idle and sleep
    // ------------------------------

    pub fn is_sleeping(&self) -> bool {
        self.a_sleeping
    }

    /// Turn the display back on
    pub fn wake(&mut self) {
        if self.a_sleeping {
            log::info!("Waking up");
            self.a_sleeping = false;
            self.add_compositor_event(CompositorEvent::SleepChanged(false));
        }
        self.a_idle.reset();
        self.mark_changed();
    }

    /// Restart the idle countdown, called for every input event
    pub fn reset_idle(&mut self) {
        self.a_idle.reset();
    }

    pub fn add_idle_inhibitor(&mut self) {
        self.a_idle_inhibitors += 1;
    }

    pub fn remove_idle_inhibitor(&mut self) {
        self.a_idle_inhibitors = self.a_idle_inhibitors.saturating_sub(1);
        self.a_idle.reset();
    }

    /// Put the display to sleep if the idle timer ran out
    ///
    /// Returns the number of ms until the next check is needed.
    pub fn check_idle(&mut self) -> usize {
        if self.a_idle_inhibitors > 0 {
            self.a_idle.reset();
            return self.a_idle.time_remaining();
        }
        if self.a_sleeping {
            return self.a_idle.get_period() as usize;
        }

        if self.a_idle.is_overdue() {
            self.sleep();
            return self.a_idle.get_period() as usize;
        }
        self.a_idle.time_remaining()
    }

    /// Turn the display off
    pub fn sleep(&mut self) {
        if !self.a_sleeping {
            log::info!("Idle timeout reached, going to sleep");
            self.a_sleeping = true;
            self.add_compositor_event(CompositorEvent::SleepChanged(true));
            self.mark_changed();
        }
    }

    // ------------------------------
    // Event queue
    // ------------------------------

    /// Adds a one-time event to the queue
    pub fn add_compositor_event(&mut self, ev: CompositorEvent) {
        self.a_events.push_back(ev);
    }

    /// pulls a one-time event off the queue
    pub fn get_next_compositor_event(&mut self) -> Option<CompositorEvent> {
        self.a_events.pop_front()
    }
}
