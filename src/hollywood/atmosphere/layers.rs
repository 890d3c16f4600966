// Layer collections and the desktop z-order
//
// Every surface that is not a child of another lives in exactly one
// of five ordered lists. The back of each list is drawn first. Paint
// order and hit-test order are produced by the same walk, hit-testing
// simply runs it front to back.
//
// Austin Shafer - 2020
use super::surface::{SurfaceFlags, SurfaceType};
use super::{Atmosphere, CompositorEvent, SurfaceId};
use utils::log;

/// How far outside a window's frame a press still counts as a
/// resize edge
pub const EDGE_MARGIN: f32 = 5.0;

/// The five classes of surfaces, back to front
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Layer {
    Background,
    Bottom,
    /// Regular windows, ordered by the z-order list
    Normal,
    Top,
    Overlay,
}

/// The direction of a surface walk
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WalkOrder {
    /// back to front, parents before children
    Paint,
    /// front to back, children before parents
    HitTest,
}

/// One step of a surface walk
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WalkStep {
    pub ws_id: SurfaceId,
    /// The layer of the root of this surface's tree
    pub ws_layer: Layer,
    /// true if this is a child reached through its parent
    pub ws_child: bool,
}

/// The ordered surface lists
#[derive(Debug, Default)]
pub struct LayerCollections {
    pub lc_background: Vec<SurfaceId>,
    pub lc_bottom: Vec<SurfaceId>,
    /// Normal windows, the last entry is on top
    pub lc_zorder: Vec<SurfaceId>,
    pub lc_top: Vec<SurfaceId>,
    pub lc_overlay: Vec<SurfaceId>,
}

impl LayerCollections {
    pub fn get(&self, layer: Layer) -> &Vec<SurfaceId> {
        match layer {
            Layer::Background => &self.lc_background,
            Layer::Bottom => &self.lc_bottom,
            Layer::Normal => &self.lc_zorder,
            Layer::Top => &self.lc_top,
            Layer::Overlay => &self.lc_overlay,
        }
    }

    pub fn get_mut(&mut self, layer: Layer) -> &mut Vec<SurfaceId> {
        match layer {
            Layer::Background => &mut self.lc_background,
            Layer::Bottom => &mut self.lc_bottom,
            Layer::Normal => &mut self.lc_zorder,
            Layer::Top => &mut self.lc_top,
            Layer::Overlay => &mut self.lc_overlay,
        }
    }

    /// Remove id from whichever list holds it
    pub fn remove(&mut self, id: SurfaceId) {
        for layer in [
            Layer::Background,
            Layer::Bottom,
            Layer::Normal,
            Layer::Top,
            Layer::Overlay,
        ] {
            self.get_mut(layer).retain(|s| *s != id);
        }
    }
}

/// What part of the walk a pass covers
#[derive(Copy, Clone)]
enum Pass {
    /// Only the surfaces in the list
    Direct(Layer),
    /// Only the children of the surfaces in the list
    Children(Layer),
    /// The surfaces and their children
    Recursive(Layer),
}

/// The paint sequence. Hit testing runs it in reverse.
const PAINT_PASSES: [Pass; 7] = [
    Pass::Direct(Layer::Background),
    Pass::Direct(Layer::Bottom),
    Pass::Recursive(Layer::Normal),
    Pass::Children(Layer::Background),
    Pass::Children(Layer::Bottom),
    Pass::Recursive(Layer::Top),
    Pass::Recursive(Layer::Overlay),
];

impl Atmosphere {
    /// Walk every visible surface in `order`
    ///
    /// The visitor returns false to stop the walk. Minimized and cursor
    /// surfaces are skipped together with their children. Ids no longer
    /// in the registry are skipped.
    ///
    /// Returns false if the visitor stopped the walk.
    pub fn walk_surfaces<F>(&self, order: WalkOrder, mut visitor: F) -> bool
    where
        F: FnMut(WalkStep) -> bool,
    {
        #[cfg(test)]
        self.a_walk_count.set(self.a_walk_count.get() + 1);

        let passes: Vec<Pass> = match order {
            WalkOrder::Paint => PAINT_PASSES.to_vec(),
            WalkOrder::HitTest => PAINT_PASSES.iter().rev().cloned().collect(),
        };

        for pass in passes {
            let (layer, with_self, with_children) = match pass {
                Pass::Direct(l) => (l, true, false),
                Pass::Children(l) => (l, false, true),
                Pass::Recursive(l) => (l, true, true),
            };

            let list = self.a_layers.get(layer);
            let ids: Vec<SurfaceId> = match order {
                WalkOrder::Paint => list.clone(),
                WalkOrder::HitTest => list.iter().rev().cloned().collect(),
            };

            for id in ids {
                if !self.walk_tree(order, id, layer, with_self, with_children, false, &mut visitor) {
                    return false;
                }
            }
        }

        true
    }

    /// Walk one surface tree
    fn walk_tree<F>(
        &self,
        order: WalkOrder,
        id: SurfaceId,
        layer: Layer,
        with_self: bool,
        with_children: bool,
        is_child: bool,
        visitor: &mut F,
    ) -> bool
    where
        F: FnMut(WalkStep) -> bool,
    {
        let surf = match self.a_surfaces.get(id) {
            Some(s) => s,
            None => {
                log::debug!("Skipping recycled surface {:?}", id);
                return true;
            }
        };

        if surf.is_minimized() || surf.is_special() {
            return true;
        }

        let step = WalkStep {
            ws_id: id,
            ws_layer: layer,
            ws_child: is_child,
        };

        if order == WalkOrder::Paint && with_self && !visitor(step) {
            return false;
        }

        if with_children {
            let children: Vec<SurfaceId> = match order {
                WalkOrder::Paint => surf.s_children.clone(),
                WalkOrder::HitTest => surf.s_children.iter().rev().cloned().collect(),
            };

            for child in children {
                if !self.walk_tree(order, child, layer, true, true, true, visitor) {
                    return false;
                }
            }
        }

        if order == WalkOrder::HitTest && with_self && !visitor(step) {
            return false;
        }

        true
    }

    /// Collect a walk into a list
    pub fn collect_surfaces(&self, order: WalkOrder) -> Vec<WalkStep> {
        let mut ret = Vec::new();
        self.walk_surfaces(order, |step| {
            ret.push(step);
            true
        });
        ret
    }

    /// Find the topmost surface under the point
    ///
    /// Normal windows are hit on their decorated frame grown by the
    /// resize margin, everything else on its content rect. The active
    /// drag icon is never hit.
    pub fn surface_at(&self, x: f32, y: f32) -> Option<SurfaceId> {
        let metrics = self.get_decoration_metrics();
        let drag_icon = self.get_drag_icon();
        let mut ret = None;

        self.walk_surfaces(WalkOrder::HitTest, |step| {
            if Some(step.ws_id) == drag_icon {
                return true;
            }
            let surf = match self.a_surfaces.get(step.ws_id) {
                Some(s) => s,
                None => return true,
            };

            let rect = match (step.ws_layer, step.ws_child) {
                (Layer::Normal, false) => surf.decorated_rect(&metrics).expanded(EDGE_MARGIN),
                _ => surf.surface_rect(),
            };

            if rect.contains(x, y) {
                ret = Some(step.ws_id);
                return false;
            }
            true
        });

        ret
    }

    /// Put a surface into one of the collections
    ///
    /// This moves it out of any collection it was in before. Children
    /// of another surface can't be members.
    pub fn add_to_layer(&mut self, id: SurfaceId, layer: Layer) {
        let surf = match self.a_surfaces.get_mut(id) {
            Some(s) => s,
            None => return,
        };
        if surf.s_parent.is_some() {
            log::error!("Surface {:?} has a parent, not adding it to {:?}", id, layer);
            return;
        }

        surf.s_layer = Some(layer);
        self.a_layers.remove(id);
        self.a_layers.get_mut(layer).push(id);
        self.mark_changed();
    }

    pub fn remove_from_layers(&mut self, id: SurfaceId) {
        self.a_layers.remove(id);
        if let Some(surf) = self.a_surfaces.get_mut(id) {
            surf.s_layer = None;
        }
        self.mark_changed();
    }

    /// Is id the raised toplevel and visible
    pub fn is_activated(&self, id: SurfaceId) -> bool {
        match self.a_surfaces.get(id) {
            Some(surf) => self.a_raised == Some(id) && !surf.is_minimized(),
            None => false,
        }
    }

    /// Bring a surface to the front of the z-order and focus it
    ///
    /// Surfaces outside of the z-order are only activated. Raising
    /// cascades to the first transient child so dialogs stay in front
    /// of their parent.
    pub fn raise(&mut self, id: SurfaceId) {
        let (ty, children) = match self.a_surfaces.get(id) {
            Some(surf) => {
                if surf.is_special() {
                    return;
                }
                (surf.s_type, surf.s_children.clone())
            }
            None => {
                log::debug!("Ignoring raise of recycled surface {:?}", id);
                return;
            }
        };

        if self.is_activated(id) {
            return;
        }

        if !self.a_layers.lc_zorder.contains(&id) {
            self.activate(id);
            return;
        }

        self.a_layers.lc_zorder.retain(|s| *s != id);
        self.a_layers.lc_zorder.push(id);
        self.activate(id);

        if ty != SurfaceType::Popup {
            self.a_raised = Some(id);
        }
        self.mark_changed();

        let transient = children.into_iter().find(|child| {
            self.a_surfaces
                .get(*child)
                .map(|s| s.s_type == SurfaceType::Transient)
                .unwrap_or(false)
        });
        if let Some(child) = transient {
            self.raise(child);
        }
    }

    /// Give a surface focus
    ///
    /// Toplevel-like surfaces also take the raised slot, and the
    /// previous holder is told it lost activation.
    pub fn activate(&mut self, id: SurfaceId) {
        let toplevel_like = match self.a_surfaces.get(id) {
            Some(surf) if !surf.is_special() => surf.is_toplevel_like(),
            Some(_) => return,
            None => {
                log::debug!("Ignoring activation of recycled surface {:?}", id);
                return;
            }
        };

        if toplevel_like && self.a_raised != Some(id) {
            if let Some(prev) = self.a_raised.take() {
                self.add_compositor_event(CompositorEvent::SurfaceDeactivated(prev));
            }
            self.a_raised = Some(id);
        }

        if self.a_activated != Some(id) {
            self.a_activated = Some(id);
            self.add_compositor_event(CompositorEvent::SurfaceActivated(id));
        }
        self.mark_changed();
    }

    /// Raise the topmost visible window
    ///
    /// Used when the raised window goes away or is minimized. Without
    /// one the last background surface gets focus.
    pub fn raise_next_in_line(&mut self) {
        self.a_raised = None;
        self.a_activated = None;

        let next = self.a_layers.lc_zorder.iter().rev().cloned().find(|id| {
            match self.a_surfaces.get(*id) {
                Some(s) => !s.is_minimized() && !s.is_special() && s.is_toplevel_like(),
                None => false,
            }
        });

        if let Some(id) = next {
            self.raise(id);
            return;
        }

        // nothing left to raise, hand focus back to the desktop
        let desktop = self
            .a_layers
            .lc_background
            .iter()
            .rev()
            .cloned()
            .find(|id| self.a_surfaces.get(*id).is_some());
        if let Some(id) = desktop {
            self.activate(id);
        }
    }

    /// Minimize or restore a surface
    pub fn set_minimized(&mut self, id: SurfaceId, minimized: bool) {
        match self.a_surfaces.get_mut(id) {
            Some(surf) => surf.set_flag(SurfaceFlags::MINIMIZED, minimized),
            None => return,
        }

        if minimized && (self.a_raised == Some(id) || self.a_activated == Some(id)) {
            self.raise_next_in_line();
        } else if !minimized {
            self.raise(id);
        }
        self.mark_changed();
    }
}
