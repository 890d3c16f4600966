// X cursors for the window manager's own window
//
// Austin Shafer - 2020
use super::x11::XConnection;
use crate::hollywood::input::edges::{CursorShape, ResizeEdge};
use utils::{log, Result};

use std::collections::HashMap;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum XCursor {
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    LeftPointer,
}

impl XCursor {
    /// The glyph in the core "cursor" font
    pub fn glyph(&self) -> u16 {
        match self {
            XCursor::Top => 138,
            XCursor::Bottom => 16,
            XCursor::Left => 70,
            XCursor::Right => 96,
            XCursor::TopLeft => 134,
            XCursor::TopRight => 136,
            XCursor::BottomLeft => 12,
            XCursor::BottomRight => 14,
            XCursor::LeftPointer => 68,
        }
    }

    pub fn from_edge(edge: ResizeEdge) -> Self {
        if edge == ResizeEdge::TOP_LEFT {
            XCursor::TopLeft
        } else if edge == ResizeEdge::TOP_RIGHT {
            XCursor::TopRight
        } else if edge == ResizeEdge::BOTTOM_LEFT {
            XCursor::BottomLeft
        } else if edge == ResizeEdge::BOTTOM_RIGHT {
            XCursor::BottomRight
        } else if edge == ResizeEdge::TOP {
            XCursor::Top
        } else if edge == ResizeEdge::BOTTOM {
            XCursor::Bottom
        } else if edge == ResizeEdge::LEFT {
            XCursor::Left
        } else if edge == ResizeEdge::RIGHT {
            XCursor::Right
        } else {
            XCursor::LeftPointer
        }
    }

    pub fn from_shape(shape: CursorShape) -> Self {
        match shape {
            CursorShape::Arrow => XCursor::LeftPointer,
            CursorShape::SizeVer => XCursor::Top,
            CursorShape::SizeHor => XCursor::Left,
            CursorShape::SizeFDiag => XCursor::TopLeft,
            CursorShape::SizeBDiag => XCursor::TopRight,
        }
    }
}

/// Cursors are created the first time they are needed
#[derive(Debug, Default)]
pub struct CursorCache {
    cc_cursors: HashMap<XCursor, u32>,
    cc_current: Option<XCursor>,
}

impl CursorCache {
    pub fn get_current(&self) -> Option<XCursor> {
        self.cc_current
    }

    /// Show `cursor` on the window manager's window
    ///
    /// Client windows are left alone, they set their own cursors.
    pub fn set_cursor(&mut self, conn: &mut dyn XConnection, cursor: XCursor) -> Result<()> {
        if self.cc_current == Some(cursor) {
            return Ok(());
        }

        let id = match self.cc_cursors.get(&cursor) {
            Some(id) => *id,
            None => {
                let id = conn.create_glyph_cursor(cursor.glyph())?;
                log::debug!("Created X cursor {:?} as {}", cursor, id);
                self.cc_cursors.insert(cursor, id);
                id
            }
        };

        conn.set_wm_cursor(id)?;
        self.cc_current = Some(cursor);
        Ok(())
    }
}
