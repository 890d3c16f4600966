// Input events fed to the output window
//
// The platform translates whatever it reads into these, so the
// routing code never sees a backend specific type.
//
// Austin Shafer - 2020

// pointer buttons, from linux/input-event-codes.h
pub const BTN_LEFT: u32 = 0x110;
pub const BTN_RIGHT: u32 = 0x111;
pub const BTN_MIDDLE: u32 = 0x112;
pub const BTN_SIDE: u32 = 0x113;
pub const BTN_EXTRA: u32 = 0x114;

bitflags::bitflags! {
    /// Keyboard modifiers held during an event
    pub struct Mods: u16 {
        const NONE = 0x0000;
        const SHIFT = 0x0001;
        const CTRL = 0x0002;
        const ALT = 0x0004;
        /// Super, Meta or the Windows key
        const LOGO = 0x0008;
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerMove {
    /// absolute position in output coordinates
    pub pm_pos: (f32, f32),
    /// unaccelerated relative motion
    pub pm_delta: (f32, f32),
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerButton {
    pub pb_button: u32,
    pub pb_pressed: bool,
    pub pb_mods: Mods,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Axis {
    /// wheel movement in degrees
    pub ax_angle_delta: (f32, f32),
    /// precise movement from touchpads, preferred when present
    pub ax_pixel_delta: Option<(f32, f32)>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Key {
    /// evdev scancode
    pub k_scancode: u32,
    pub k_keysym: u32,
    pub k_mods: Mods,
    pub k_pressed: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TouchPhase {
    Down,
    Motion,
    Up,
    Cancel,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Touch {
    pub t_id: i32,
    pub t_phase: TouchPhase,
    pub t_pos: (f32, f32),
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    PointerMove(PointerMove),
    PointerButton(PointerButton),
    Axis(Axis),
    Key(Key),
    Touch(Touch),
}
