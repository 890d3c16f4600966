// Global keyboard shortcuts
//
// Key presses are checked here before they are forwarded to a client.
// Media keys always match, the configurable bindings need their exact
// modifier set.
//
// Austin Shafer - 2020
extern crate xkbcommon;

use crate::hollywood::atmosphere::{Atmosphere, CompositorEvent};
use crate::hollywood::config::ShortcutConfig;
use crate::hollywood::input::event::Mods;
use utils::{anyhow, log, Context, Result};
use xkbcommon::xkb;

use std::str::FromStr;

/// Something the session should do in response to a key
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShortcutAction {
    MonitorBrightnessUp,
    MonitorBrightnessDown,
    KeyboardBrightnessUp,
    KeyboardBrightnessDown,
    VolumeUp,
    VolumeDown,
    VolumeMute,
    OpenBrowser,
    OpenSearch,
    TakeScreenshot,
    SwitchWindow,
}

lazy_static::lazy_static! {
    /// Keys that trigger an action no matter which modifiers are held
    static ref MEDIA_KEYS: Vec<(xkb::Keysym, ShortcutAction)> = vec![
        (xkb::keysyms::KEY_XF86MonBrightnessUp, ShortcutAction::MonitorBrightnessUp),
        (xkb::keysyms::KEY_XF86MonBrightnessDown, ShortcutAction::MonitorBrightnessDown),
        (xkb::keysyms::KEY_XF86KbdBrightnessUp, ShortcutAction::KeyboardBrightnessUp),
        (xkb::keysyms::KEY_XF86KbdBrightnessDown, ShortcutAction::KeyboardBrightnessDown),
        (xkb::keysyms::KEY_XF86AudioRaiseVolume, ShortcutAction::VolumeUp),
        (xkb::keysyms::KEY_XF86AudioLowerVolume, ShortcutAction::VolumeDown),
        (xkb::keysyms::KEY_XF86AudioMute, ShortcutAction::VolumeMute),
        (xkb::keysyms::KEY_XF86WWW, ShortcutAction::OpenBrowser),
        (xkb::keysyms::KEY_XF86Search, ShortcutAction::OpenSearch),
    ];
}

/// A key plus the exact set of modifiers that must be held
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub kc_mods: Mods,
    pub kc_keysym: xkb::Keysym,
}

impl FromStr for KeyCombo {
    type Err = utils::Error;

    /// Parse a binding like "Alt+Tab" or "Ctrl+Shift+Print"
    ///
    /// The last part is an xkb keysym name, everything before it is a
    /// modifier.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('+').map(|p| p.trim()).collect();
        let (key, mods) = match parts.split_last() {
            Some((key, mods)) if !key.is_empty() => (key, mods),
            _ => return Err(anyhow!("Empty key binding \"{}\"", s)),
        };

        let mut ret_mods = Mods::NONE;
        for m in mods {
            ret_mods |= match m.to_lowercase().as_str() {
                "alt" => Mods::ALT,
                "ctrl" | "control" => Mods::CTRL,
                "shift" => Mods::SHIFT,
                "super" | "meta" | "logo" => Mods::LOGO,
                other => return Err(anyhow!("Unknown modifier \"{}\" in \"{}\"", other, s)),
            };
        }

        let keysym = xkb::keysym_from_name(key, xkb::KEYSYM_NO_FLAGS);
        if keysym == xkb::keysyms::KEY_NoSymbol {
            return Err(anyhow!("Unknown key \"{}\" in \"{}\"", key, s));
        }

        Ok(KeyCombo {
            kc_mods: ret_mods,
            kc_keysym: keysym,
        })
    }
}

pub struct ShortcutManager {
    sm_bindings: Vec<(KeyCombo, ShortcutAction)>,
}

impl ShortcutManager {
    pub fn new(config: &ShortcutConfig) -> Result<Self> {
        let screenshot = KeyCombo::from_str(&config.take_screenshot)
            .context("Invalid TakeScreenshot binding")?;
        let switch = KeyCombo::from_str(&config.switch_window)
            .context("Invalid SwitchWindow binding")?;

        Ok(Self {
            sm_bindings: vec![
                (screenshot, ShortcutAction::TakeScreenshot),
                (switch, ShortcutAction::SwitchWindow),
            ],
        })
    }

    /// Find the action for a key, if any
    pub fn find_action(&self, mods: Mods, keysym: xkb::Keysym) -> Option<ShortcutAction> {
        if let Some((_, action)) = MEDIA_KEYS.iter().find(|(sym, _)| *sym == keysym) {
            return Some(*action);
        }

        self.sm_bindings
            .iter()
            .find(|(combo, _)| combo.kc_keysym == keysym && combo.kc_mods == mods)
            .map(|(_, action)| *action)
    }

    /// Check a key press against the bindings
    ///
    /// On a match the action is queued for the session and true is
    /// returned, the key must then not reach the client.
    pub fn check_and_handle(
        &self,
        atmos: &mut Atmosphere,
        mods: Mods,
        keysym: xkb::Keysym,
    ) -> bool {
        match self.find_action(mods, keysym) {
            Some(action) => {
                log::debug!("Shortcut {:?} triggered", action);
                atmos.add_compositor_event(CompositorEvent::Shortcut(action));
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_combo() {
        let combo = KeyCombo::from_str("Alt+Tab").unwrap();
        assert_eq!(combo.kc_mods, Mods::ALT);
        assert_eq!(combo.kc_keysym, xkb::keysyms::KEY_Tab);

        let combo = KeyCombo::from_str("ctrl + shift + Print").unwrap();
        assert_eq!(combo.kc_mods, Mods::CTRL | Mods::SHIFT);
        assert_eq!(combo.kc_keysym, xkb::keysyms::KEY_Print);

        assert!(KeyCombo::from_str("Hyper+Tab").is_err());
        assert!(KeyCombo::from_str("Alt+").is_err());
        assert!(KeyCombo::from_str("Alt+NotAKey").is_err());
    }

    #[test]
    fn media_keys_ignore_mods() {
        let sm = ShortcutManager::new(&ShortcutConfig::default()).unwrap();

        assert_eq!(
            sm.find_action(Mods::SHIFT, xkb::keysyms::KEY_XF86AudioMute),
            Some(ShortcutAction::VolumeMute)
        );
        assert_eq!(
            sm.find_action(Mods::NONE, xkb::keysyms::KEY_XF86KbdBrightnessUp),
            Some(ShortcutAction::KeyboardBrightnessUp)
        );
        assert_eq!(
            sm.find_action(Mods::NONE, xkb::keysyms::KEY_XF86MonBrightnessDown),
            Some(ShortcutAction::MonitorBrightnessDown)
        );
    }

    #[test]
    fn bindings_need_exact_mods() {
        let sm = ShortcutManager::new(&ShortcutConfig::default()).unwrap();

        assert_eq!(
            sm.find_action(Mods::ALT, xkb::keysyms::KEY_Tab),
            Some(ShortcutAction::SwitchWindow)
        );
        assert_eq!(sm.find_action(Mods::ALT | Mods::SHIFT, xkb::keysyms::KEY_Tab), None);
        assert_eq!(sm.find_action(Mods::NONE, xkb::keysyms::KEY_Tab), None);
        assert_eq!(
            sm.find_action(Mods::NONE, xkb::keysyms::KEY_Print),
            Some(ShortcutAction::TakeScreenshot)
        );
    }
}
