// The client facing side of input
//
// The compositor core does not speak the wayland protocol. Everything
// input routing wants to tell a client goes through a Seat as a
// SeatEvent, and the protocol layer turns those into wl_pointer,
// wl_keyboard and xdg requests.
//
// Austin Shafer - 2020
use super::edges::ResizeEdge;
use super::event::{Orientation, TouchPhase};
use crate::hollywood::atmosphere::SurfaceId;

use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq)]
pub enum SeatEvent {
    /// Pointer moved over a surface, position is surface local
    PointerMotion {
        surface: SurfaceId,
        local: (f32, f32),
    },
    PointerButton {
        surface: SurfaceId,
        button: u32,
        pressed: bool,
    },
    /// Raw motion for clients holding a relative pointer
    RelativeMotion { delta: (f32, f32) },
    Axis {
        surface: SurfaceId,
        orientation: Orientation,
        delta: f32,
    },
    /// Keys go to the activated surface
    Key { scancode: u32, pressed: bool },
    Touch {
        surface: SurfaceId,
        id: i32,
        phase: TouchPhase,
        local: (f32, f32),
    },
    /// A drag moved over `surface`, or over nothing
    DragMotion {
        surface: Option<SurfaceId>,
        local: (f32, f32),
    },
    Drop { surface: Option<SurfaceId> },
    /// The close gem was pressed
    Close { surface: SurfaceId },
    SetMaximized { surface: SurfaceId, maximized: bool },
    /// Interactive resize, sent on every motion of the grab
    Resize {
        surface: SurfaceId,
        initial_size: (f32, f32),
        delta: (f32, f32),
        edge: ResizeEdge,
    },
    MoveFinished { surface: SurfaceId },
    ResizeFinished { surface: SurfaceId },
}

/// Something that can deliver events to clients
pub trait Seat {
    fn deliver(&mut self, ev: SeatEvent);
}

/// A seat that queues its events
///
/// The event loop drains this after input handling and routes each
/// event to the wayland frontend or the XWayland window manager.
#[derive(Debug, Default)]
pub struct QueuedSeat {
    qs_events: VecDeque<SeatEvent>,
}

impl QueuedSeat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_next_event(&mut self) -> Option<SeatEvent> {
        self.qs_events.pop_front()
    }

    pub fn drain(&mut self) -> Vec<SeatEvent> {
        self.qs_events.drain(..).collect()
    }
}

impl Seat for QueuedSeat {
    fn deliver(&mut self, ev: SeatEvent) {
        self.qs_events.push_back(ev);
    }
}
