// Resize edge detection and anchoring
//
// Austin Shafer - 2020
use crate::hollywood::atmosphere::layers::EDGE_MARGIN;
use utils::region::Rect;

bitflags::bitflags! {
    /// Which edges of a window are being grabbed
    pub struct ResizeEdge: u32 {
        const NONE = 0;
        const TOP = 1;
        const LEFT = 2;
        const RIGHT = 4;
        const BOTTOM = 8;
        const TOP_LEFT = Self::TOP.bits | Self::LEFT.bits;
        const TOP_RIGHT = Self::TOP.bits | Self::RIGHT.bits;
        const BOTTOM_LEFT = Self::BOTTOM.bits | Self::LEFT.bits;
        const BOTTOM_RIGHT = Self::BOTTOM.bits | Self::RIGHT.bits;
    }
}

/// The pointer image to show
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CursorShape {
    Arrow,
    /// up and down arrows
    SizeVer,
    /// left and right arrows
    SizeHor,
    /// top left to bottom right
    SizeFDiag,
    /// top right to bottom left
    SizeBDiag,
}

fn in_range(val: f32, low: f32, high: f32) -> bool {
    val >= low && val <= high
}

/// Which edges of `rect` the point (x, y) is on
///
/// The bands are EDGE_MARGIN wide on each side of the edge, the top
/// and left bands reach twice as far outside. Corners come out as two
/// bits. A point away from every edge returns NONE.
pub fn near_edge(rect: &Rect<f32>, x: f32, y: f32) -> ResizeEdge {
    let pm = EDGE_MARGIN;
    let mut ret = ResizeEdge::NONE;

    // The point has to be next to the rect on the other axis too
    let in_x = in_range(x, rect.left() - 2.0 * pm, rect.right() + pm);
    let in_y = in_range(y, rect.top() - 2.0 * pm, rect.bottom() + pm);
    if !in_x || !in_y {
        return ret;
    }

    if in_range(y, rect.top() - 2.0 * pm, rect.top() + pm) {
        ret |= ResizeEdge::TOP;
    } else if in_range(y, rect.bottom() - pm, rect.bottom() + pm) {
        ret |= ResizeEdge::BOTTOM;
    }

    if in_range(x, rect.left() - 2.0 * pm, rect.left() + pm) {
        ret |= ResizeEdge::LEFT;
    } else if in_range(x, rect.right() - pm, rect.right() + pm) {
        ret |= ResizeEdge::RIGHT;
    }

    ret
}

/// The cursor to show while hovering or dragging `edge`
pub fn cursor_for_edge(edge: ResizeEdge) -> CursorShape {
    if edge == ResizeEdge::TOP_LEFT || edge == ResizeEdge::BOTTOM_RIGHT {
        CursorShape::SizeFDiag
    } else if edge == ResizeEdge::TOP_RIGHT || edge == ResizeEdge::BOTTOM_LEFT {
        CursorShape::SizeBDiag
    } else if edge.intersects(ResizeEdge::TOP | ResizeEdge::BOTTOM) {
        CursorShape::SizeVer
    } else if edge.intersects(ResizeEdge::LEFT | ResizeEdge::RIGHT) {
        CursorShape::SizeHor
    } else {
        CursorShape::Arrow
    }
}

/// The point that stays fixed while resizing from `edge`
///
/// Dragging the top edge keeps the bottom in place, dragging the left
/// edge keeps the right in place.
pub fn anchor_position(pos: (f32, f32), edge: ResizeEdge, size: (f32, f32)) -> (f32, f32) {
    let mut ret = pos;
    if edge.contains(ResizeEdge::TOP) {
        ret.1 += size.1;
    }
    if edge.contains(ResizeEdge::LEFT) {
        ret.0 += size.0;
    }
    ret
}

/// Where a window of `size` has to go to keep `anchor` fixed
pub fn anchored_position(anchor: (f32, f32), edge: ResizeEdge, size: (f32, f32)) -> (f32, f32) {
    let offset = anchor_position((0.0, 0.0), edge, size);
    (anchor.0 - offset.0, anchor.1 - offset.1)
}
