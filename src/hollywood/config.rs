// Compositor settings
//
// Loaded once at startup from a toml file. Every field has a default
// so an empty or missing file gives a working compositor.
//
// Austin Shafer - 2020
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use utils::{log, Context, Result};

/// Light or dark window chrome
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Light,
    Dark,
}

impl Default for ViewMode {
    fn default() -> Self {
        ViewMode::Light
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XWaylandConfig {
    pub enabled: bool,
    /// Name or path of the X server binary
    pub binary: String,
    /// How long to wait for the server to exit before killing it
    pub shutdown_timeout_ms: u64,
}

impl Default for XWaylandConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            binary: "Xwayland".to_string(),
            shutdown_timeout_ms: 3000,
        }
    }
}

/// Global key bindings, in the form "Alt+Tab"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcutConfig {
    pub take_screenshot: String,
    pub switch_window: String,
}

impl Default for ShortcutConfig {
    fn default() -> Self {
        Self {
            take_screenshot: "Print".to_string(),
            switch_window: "Alt+Tab".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default log filter, RUST_LOG overrides it
    pub log_level: String,
    pub view_mode: ViewMode,
    /// Height of the server side title bar
    pub decoration_size: f32,
    /// Width of the server side border
    pub border_size: f32,
    /// The display goes to sleep after this many ms without input
    pub idle_timeout_ms: u32,
    /// Size of the output when the platform doesn't tell us
    pub output_size: (u32, u32),
    /// Clear color behind everything, "#rrggbb"
    pub background_color: String,
    pub wallpaper: Option<PathBuf>,
    /// Holds Light/ and Dark/ gem images and the fallback window icons
    pub icon_dir: PathBuf,
    /// Running as the greeter, no wallpaper is drawn
    pub login_manager: bool,
    pub mini_mode: bool,
    pub xwayland: XWaylandConfig,
    pub shortcuts: ShortcutConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            view_mode: ViewMode::Light,
            decoration_size: 30.0,
            border_size: 1.0,
            idle_timeout_ms: 5 * 60 * 1000,
            output_size: (1280, 720),
            background_color: "#2e2e2e".to_string(),
            wallpaper: None,
            icon_dir: PathBuf::from("/usr/share/hollywood/icons"),
            login_manager: false,
            mini_mode: false,
            xwayland: XWaylandConfig::default(),
            shortcuts: ShortcutConfig::default(),
        }
    }
}

impl Config {
    /// The default config path
    ///
    /// $XDG_CONFIG_HOME/hollywood/compositor.toml, falling back to
    /// ~/.config if XDG_CONFIG_HOME isn't set.
    pub fn default_path() -> Option<PathBuf> {
        let base = match std::env::var_os("XDG_CONFIG_HOME") {
            Some(dir) => PathBuf::from(dir),
            None => PathBuf::from(std::env::var_os("HOME")?).join(".config"),
        };

        Some(base.join("hollywood").join("compositor.toml"))
    }

    /// Parse a config from toml text
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Could not parse compositor config")
    }

    /// Load the config
    ///
    /// An explicitly requested file must exist. The default file may
    /// be missing, in which case the defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        if !required && !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Could not read config file {:?}", path))?;
        Self::from_toml(&text).with_context(|| format!("Invalid config file {:?}", path))
    }
}
