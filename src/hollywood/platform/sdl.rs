/// SDL2 platform
///
/// Runs the compositor in a GL window on another window system. Mostly
/// used for development.
// Austin Shafer - 2020
use super::{Platform, PlatformEvent};
use crate::hollywood::glcomp::gl::GlBackend;
use crate::hollywood::glcomp::RenderBackend;
use crate::hollywood::input::event::*;
use utils::fdwatch::FdWatch;
use utils::{anyhow, log, Result};

use ::sdl2::event::{Event, WindowEvent};
use ::sdl2::keyboard::{Mod, Scancode};
use ::sdl2::mouse::MouseButton;
use lazy_static::lazy_static;
use xkbcommon::xkb;

use std::os::unix::io::RawFd;

const SCROLL_SENSITIVITY: f32 = 32.0;
/// How long to nap between polls while also waiting on fds
const FD_POLL_SLEEP_MS: u64 = 8;

/// A table of (key, foreign key) pairs we can translate between
struct CodeTranslator<K: PartialEq + Copy, T: PartialEq + Copy> {
    ct_table: Vec<(K, T)>,
}

impl<K: PartialEq + Copy, T: PartialEq + Copy> CodeTranslator<K, T> {
    fn key_to_val(&self, code: K) -> Option<T> {
        self.ct_table
            .iter()
            .find(|entry| entry.0 == code)
            .map(|entry| entry.1)
    }
}

lazy_static! {
    /// SDL scancodes to linux/input-event-codes.h
    static ref CT_SDL_TO_LINUX_KEY: CodeTranslator<Scancode, u32> =
        CodeTranslator {
            ct_table: vec![
                (Scancode::Escape,       1), // KEY_ESC
                (Scancode::Num1,         2), // KEY_1
                (Scancode::Num2,         3), // KEY_2
                (Scancode::Num3,         4), // KEY_3
                (Scancode::Num4,         5), // KEY_4
                (Scancode::Num5,         6), // KEY_5
                (Scancode::Num6,         7), // KEY_6
                (Scancode::Num7,         8), // KEY_7
                (Scancode::Num8,         9), // KEY_8
                (Scancode::Num9,        10), // KEY_9
                (Scancode::Num0,        11), // KEY_0
                (Scancode::Minus,       12), // KEY_MINUS
                (Scancode::Equals,      13), // KEY_EQUAL
                (Scancode::Backspace,   14), // KEY_BACKSPACE
                (Scancode::Tab,         15), // KEY_TAB
                (Scancode::Q,           16),
                (Scancode::W,           17),
                (Scancode::E,           18),
                (Scancode::R,           19),
                (Scancode::T,           20),
                (Scancode::Y,           21),
                (Scancode::U,           22),
                (Scancode::I,           23),
                (Scancode::O,           24),
                (Scancode::P,           25),
                (Scancode::LeftBracket, 26), // KEY_LEFTBRACE
                (Scancode::RightBracket, 27), // KEY_RIGHTBRACE
                (Scancode::Return,      28), // KEY_ENTER
                (Scancode::LCtrl,       29), // KEY_LEFTCTRL
                (Scancode::A,           30),
                (Scancode::S,           31),
                (Scancode::D,           32),
                (Scancode::F,           33),
                (Scancode::G,           34),
                (Scancode::H,           35),
                (Scancode::J,           36),
                (Scancode::K,           37),
                (Scancode::L,           38),
                (Scancode::Semicolon,   39),
                (Scancode::Apostrophe,  40),
                (Scancode::Grave,       41),
                (Scancode::LShift,      42), // KEY_LEFTSHIFT
                (Scancode::Backslash,   43),
                (Scancode::Z,           44),
                (Scancode::X,           45),
                (Scancode::C,           46),
                (Scancode::V,           47),
                (Scancode::B,           48),
                (Scancode::N,           49),
                (Scancode::M,           50),
                (Scancode::Comma,       51),
                (Scancode::Period,      52), // KEY_DOT
                (Scancode::Slash,       53),
                (Scancode::RShift,      54), // KEY_RIGHTSHIFT
                (Scancode::KpMultiply,  55), // KEY_KPASTERISK
                (Scancode::LAlt,        56), // KEY_LEFTALT
                (Scancode::Space,       57),
                (Scancode::CapsLock,    58),
                (Scancode::F1,          59),
                (Scancode::F2,          60),
                (Scancode::F3,          61),
                (Scancode::F4,          62),
                (Scancode::F5,          63),
                (Scancode::F6,          64),
                (Scancode::F7,          65),
                (Scancode::F8,          66),
                (Scancode::F9,          67),
                (Scancode::F10,         68),
                (Scancode::NumLockClear, 69), // KEY_NUMLOCK
                (Scancode::ScrollLock,  70),
                (Scancode::Kp7,         71),
                (Scancode::Kp8,         72),
                (Scancode::Kp9,         73),
                (Scancode::KpMinus,     74),
                (Scancode::Kp4,         75),
                (Scancode::Kp5,         76),
                (Scancode::Kp6,         77),
                (Scancode::KpPlus,      78),
                (Scancode::Kp1,         79),
                (Scancode::Kp2,         80),
                (Scancode::Kp3,         81),
                (Scancode::Kp0,         82),
                (Scancode::KpPeriod,    83), // KEY_KPDOT
                (Scancode::F11,         87),
                (Scancode::F12,         88),
                (Scancode::KpEnter,     96),
                (Scancode::RCtrl,       97), // KEY_RIGHTCTRL
                (Scancode::KpDivide,    98), // KEY_KPSLASH
                (Scancode::PrintScreen, 99), // KEY_SYSRQ
                (Scancode::RAlt,       100), // KEY_RIGHTALT
                (Scancode::Home,       102),
                (Scancode::Up,         103),
                (Scancode::PageUp,     104),
                (Scancode::Left,       105),
                (Scancode::Right,      106),
                (Scancode::End,        107),
                (Scancode::Down,       108),
                (Scancode::PageDown,   109),
                (Scancode::Insert,     110),
                (Scancode::Delete,     111),
                (Scancode::Mute,       113),
                (Scancode::VolumeDown, 114),
                (Scancode::VolumeUp,   115),
                (Scancode::Pause,      119),
                (Scancode::LGui,       125), // KEY_LEFTMETA
                (Scancode::RGui,       126), // KEY_RIGHTMETA
                (Scancode::AudioNext,  163), // KEY_NEXTSONG
                (Scancode::AudioPlay,  164), // KEY_PLAYPAUSE
                (Scancode::AudioPrev,  165), // KEY_PREVIOUSSONG
                (Scancode::AudioStop,  166), // KEY_STOPCD
            ],
        };
}

/// Unknown keys become KEY_RESERVED
pub fn convert_sdl_scancode_to_linux(code: Scancode) -> u32 {
    CT_SDL_TO_LINUX_KEY.key_to_val(code).unwrap_or(0)
}

fn convert_sdl_mods(keymod: Mod) -> Mods {
    let mut mods = Mods::NONE;
    if keymod.intersects(Mod::LSHIFTMOD | Mod::RSHIFTMOD) {
        mods |= Mods::SHIFT;
    }
    if keymod.intersects(Mod::LCTRLMOD | Mod::RCTRLMOD) {
        mods |= Mods::CTRL;
    }
    if keymod.intersects(Mod::LALTMOD | Mod::RALTMOD) {
        mods |= Mods::ALT;
    }
    if keymod.intersects(Mod::LGUIMOD | Mod::RGUIMOD) {
        mods |= Mods::LOGO;
    }
    mods
}

fn convert_sdl_mouse_button(button: MouseButton) -> Option<u32> {
    match button {
        MouseButton::Left => Some(BTN_LEFT),
        MouseButton::Right => Some(BTN_RIGHT),
        MouseButton::Middle => Some(BTN_MIDDLE),
        MouseButton::X1 => Some(BTN_SIDE),
        MouseButton::X2 => Some(BTN_EXTRA),
        MouseButton::Unknown => None,
    }
}

pub struct SDL2Plat {
    _sdl: ::sdl2::Sdl,
    sdl_video: ::sdl2::VideoSubsystem,
    sdl_window: ::sdl2::video::Window,
    /// must outlive every GL call
    _sdl_gl_ctx: ::sdl2::video::GLContext,
    sdl_event_pump: ::sdl2::EventPump,
    /// last known mouse position
    ///
    /// The pointer can leave on one edge and come back on another, so
    /// relative motion is computed from this.
    sdl_mouse_pos: (i32, i32),
    sdl_mods: Mods,
    _sdl_xkb_ctx: xkb::Context,
    _sdl_xkb_keymap: xkb::Keymap,
    sdl_xkb_state: xkb::State,
    /// fds the user wants us to wake up on
    sdl_user_fds: Option<FdWatch>,
}

impl SDL2Plat {
    pub fn new(size: (u32, u32)) -> Result<Self> {
        let sdl = ::sdl2::init().map_err(|e| anyhow!("Could not init SDL: {}", e))?;
        let video = sdl
            .video()
            .map_err(|e| anyhow!("Could not init SDL video: {}", e))?;

        let gl_attr = video.gl_attr();
        gl_attr.set_context_profile(::sdl2::video::GLProfile::Core);
        gl_attr.set_context_version(3, 3);

        let window = video
            .window("hollywood", size.0, size.1)
            .opengl()
            .resizable()
            .position_centered()
            .build()?;
        let gl_ctx = window
            .gl_create_context()
            .map_err(|e| anyhow!("Could not create GL context: {}", e))?;
        let event_pump = sdl
            .event_pump()
            .map_err(|e| anyhow!("Could not get SDL event pump: {}", e))?;

        // Names are left empty so xkb reads them from the environment
        let context = xkb::Context::new(xkb::CONTEXT_NO_FLAGS);
        let keymap = xkb::Keymap::new_from_names(
            &context,
            "",
            "",
            "",
            "",
            None,
            xkb::KEYMAP_COMPILE_NO_FLAGS,
        )
        .ok_or_else(|| anyhow!("Could not initialize a xkb keymap"))?;
        let state = xkb::State::new(&keymap);

        Ok(Self {
            _sdl: sdl,
            sdl_video: video,
            sdl_window: window,
            _sdl_gl_ctx: gl_ctx,
            sdl_event_pump: event_pump,
            sdl_mouse_pos: (0, 0),
            sdl_mods: Mods::NONE,
            _sdl_xkb_ctx: context,
            _sdl_xkb_keymap: keymap,
            sdl_xkb_state: state,
            sdl_user_fds: None,
        })
    }

    /// Feed a key to xkb and get the resulting evdev code and keysym
    fn translate_key(&mut self, code: Scancode, direction: xkb::KeyDirection) -> (u32, u32) {
        let raw = convert_sdl_scancode_to_linux(code);

        // add 8 to account for differences between evdev and x11
        let sym = self.sdl_xkb_state.key_get_one_sym(raw + 8);
        self.sdl_xkb_state.update_key(raw + 8, direction);
        (raw, sym)
    }

    fn handle_event(&mut self, event: Event, out: &mut Vec<PlatformEvent>) {
        match event {
            Event::Quit { .. } => out.push(PlatformEvent::Quit),
            Event::KeyDown {
                scancode: Some(scancode),
                keymod,
                ..
            }
            | Event::KeyUp {
                scancode: Some(scancode),
                keymod,
                ..
            } => {
                let pressed = matches!(event, Event::KeyDown { .. });
                let direction = match pressed {
                    true => xkb::KeyDirection::Down,
                    false => xkb::KeyDirection::Up,
                };
                let (raw, sym) = self.translate_key(scancode, direction);
                self.sdl_mods = convert_sdl_mods(keymod);

                out.push(PlatformEvent::Input(InputEvent::Key(Key {
                    k_scancode: raw,
                    k_keysym: sym,
                    k_mods: self.sdl_mods,
                    k_pressed: pressed,
                })));
            }
            Event::MouseButtonDown { mouse_btn, .. } | Event::MouseButtonUp { mouse_btn, .. } => {
                let pressed = matches!(event, Event::MouseButtonDown { .. });
                match convert_sdl_mouse_button(mouse_btn) {
                    Some(button) => out.push(PlatformEvent::Input(InputEvent::PointerButton(
                        PointerButton {
                            pb_button: button,
                            pb_pressed: pressed,
                            pb_mods: self.sdl_mods,
                        },
                    ))),
                    None => log::debug!("Ignoring unknown SDL mouse button"),
                }
            }
            Event::MouseWheel { x, y, .. } => {
                out.push(PlatformEvent::Input(InputEvent::Axis(Axis {
                    // reverse the scroll direction
                    ax_angle_delta: (
                        x as f32 * SCROLL_SENSITIVITY * -1.0,
                        y as f32 * SCROLL_SENSITIVITY * -1.0,
                    ),
                    ax_pixel_delta: None,
                })))
            }
            Event::MouseMotion { x, y, .. } => {
                out.push(PlatformEvent::Input(InputEvent::PointerMove(PointerMove {
                    pm_pos: (x as f32, y as f32),
                    pm_delta: (
                        (x - self.sdl_mouse_pos.0) as f32,
                        (y - self.sdl_mouse_pos.1) as f32,
                    ),
                })));
                self.sdl_mouse_pos = (x, y);
            }
            Event::Window { win_event, .. } => match win_event {
                WindowEvent::Close => out.push(PlatformEvent::Quit),
                WindowEvent::Resized(..) | WindowEvent::SizeChanged(..) => {
                    out.push(PlatformEvent::Resized(self.sdl_window.drawable_size()))
                }
                WindowEvent::Exposed => out.push(PlatformEvent::Redraw),
                _ => {}
            },
            _ => {}
        }
    }
}

impl Platform for SDL2Plat {
    fn get_output_size(&self) -> (u32, u32) {
        self.sdl_window.drawable_size()
    }

    fn create_backend(&mut self) -> Result<Box<dyn RenderBackend>> {
        let video = &self.sdl_video;
        let gl = unsafe {
            glow::Context::from_loader_function(|name| video.gl_get_proc_address(name) as *const _)
        };

        Ok(Box::new(GlBackend::new(gl, self.get_output_size())?))
    }

    fn add_watch_fd(&mut self, fd: RawFd) {
        if self.sdl_user_fds.is_none() {
            match FdWatch::new() {
                Ok(w) => self.sdl_user_fds = Some(w),
                Err(e) => {
                    log::error!("Could not create fd watch: {:#}", e);
                    return;
                }
            }
        }

        if let Some(watch) = self.sdl_user_fds.as_mut() {
            watch.add_fd(fd);
            if let Err(e) = watch.register_events() {
                log::error!("Could not watch fd {}: {:#}", fd, e);
            }
        }
    }

    fn remove_watch_fd(&mut self, fd: RawFd) {
        if let Some(watch) = self.sdl_user_fds.as_mut() {
            watch.remove_fd(fd);
        }
    }

    /// Wait for SDL events or one of our fds
    ///
    /// SDL can't wait on our fds, so when there are some we have to
    /// poll both in a loop. Without fds SDL's own wait is used.
    fn dispatch(&mut self, timeout: Option<usize>) -> Result<Vec<PlatformEvent>> {
        let mut ret = Vec::new();

        if let Some(fds) = self.sdl_user_fds.as_mut() {
            let mut waited = 0;
            loop {
                if fds.wait_for_events(Some(1)) {
                    ret.push(PlatformEvent::UserFdReadable);
                    break;
                }

                if let Some(ev) = self.sdl_event_pump.poll_event() {
                    self.handle_event(ev, &mut ret);
                    break;
                }

                waited += 1 + FD_POLL_SLEEP_MS as usize;
                if timeout.map(|t| waited >= t).unwrap_or(false) {
                    return Ok(ret);
                }
                std::thread::sleep(std::time::Duration::from_millis(FD_POLL_SLEEP_MS));
            }
        } else {
            let ev = match timeout {
                Some(timeout) => match self.sdl_event_pump.wait_event_timeout(timeout as u32) {
                    Some(ev) => ev,
                    None => return Ok(ret),
                },
                None => self.sdl_event_pump.wait_event(),
            };
            self.handle_event(ev, &mut ret);
        }

        // drain everything else that is queued
        while let Some(ev) = self.sdl_event_pump.poll_event() {
            self.handle_event(ev, &mut ret);
        }

        Ok(ret)
    }

    fn swap_buffers(&mut self) {
        self.sdl_window.gl_swap_window();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scancodes_map_to_evdev() {
        assert_eq!(convert_sdl_scancode_to_linux(Scancode::Escape), 1);
        assert_eq!(convert_sdl_scancode_to_linux(Scancode::Tab), 15);
        assert_eq!(convert_sdl_scancode_to_linux(Scancode::LAlt), 56);
        assert_eq!(convert_sdl_scancode_to_linux(Scancode::AudioPlay), 164);
        assert_eq!(convert_sdl_scancode_to_linux(Scancode::Application), 0);
    }

    #[test]
    fn mods_fold_left_and_right() {
        assert_eq!(convert_sdl_mods(Mod::RSHIFTMOD), Mods::SHIFT);
        assert_eq!(
            convert_sdl_mods(Mod::LCTRLMOD | Mod::RGUIMOD),
            Mods::CTRL | Mods::LOGO
        );
        assert_eq!(convert_sdl_mods(Mod::NUMMOD), Mods::NONE);
    }
}
