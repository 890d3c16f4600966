// The Hollywood compositor core
//
// Austin Shafer - 2020
pub mod atmosphere;
pub mod config;
pub mod glcomp;
pub mod icon;
pub mod input;
pub mod platform;
pub mod shortcuts;
pub mod xwayland;

#[cfg(test)]
mod tests;

use atmosphere::{Atmosphere, CompositorEvent};
use config::Config;
use glcomp::output::OutputWindow;
use glcomp::ScreenCopyFrame;
use icon::IconReader;
use input::edges::CursorShape;
use input::seat::{QueuedSeat, Seat, SeatEvent};
use input::Input;
use platform::{Platform, PlatformEvent};
use shortcuts::{ShortcutAction, ShortcutManager};
use xwayland::server::{ServerEvent, XWaylandServer};
use xwayland::{XWaylandManager, XwmRequest};

use utils::{log, Context, Result};

use std::path::PathBuf;
use std::time::SystemTime;

/// Stands in for the wayland frontend
///
/// Events meant for wayland clients are only logged.
pub struct LogSeat;

impl Seat for LogSeat {
    fn deliver(&mut self, ev: SeatEvent) {
        log::debug!("Seat event for a wayland client: {:?}", ev);
    }
}

/// Saves the next frame as a png
struct ScreenshotFrame {
    sf_path: PathBuf,
}

impl ScreenCopyFrame for ScreenshotFrame {
    fn copy(&mut self, size: (u32, u32), pixels: Vec<u8>) {
        let img = match image::RgbaImage::from_raw(size.0, size.1, pixels) {
            Some(img) => img,
            None => {
                log::error!("Screen copy does not match the output size {:?}", size);
                return;
            }
        };

        match img.save(&self.sf_path) {
            Ok(()) => log::info!("Saved screenshot to {}", self.sf_path.display()),
            Err(e) => log::error!("Could not save screenshot: {}", e),
        }
    }
}

/// Where TakeScreenshot puts its file
fn screenshot_path() -> PathBuf {
    let dir = match std::env::var_os("XDG_PICTURES_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join("Pictures"),
            None => std::env::temp_dir(),
        },
    };
    let stamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    dir.join(format!("Screenshot-{}.png", stamp))
}

// The hollywood compositor
pub struct Hollywood {
    h_atmos: Atmosphere,
    h_platform: Box<dyn Platform>,
    /// We only drive one display
    h_output: OutputWindow,
    /// Collects what input routing wants to tell clients
    h_seat: QueuedSeat,
    /// Receives seat events the XWayland window manager doesn't want
    h_frontend: Box<dyn Seat>,
    h_icons: IconReader,
    h_xserver: Option<XWaylandServer>,
    h_xwm: Option<XWaylandManager>,
    /// Last cursor shown on the X side
    h_cursor: CursorShape,
}

impl Hollywood {
    /// Create the compositor on top of `platform`
    ///
    /// If XWayland is enabled the server is started here, but the
    /// window manager only connects once the server reports its
    /// display.
    pub fn spin(
        config: &Config,
        mut platform: Box<dyn Platform>,
        frontend: Box<dyn Seat>,
    ) -> Result<Self> {
        let mut atmos = Atmosphere::new(config);

        let shortcuts =
            ShortcutManager::new(&config.shortcuts).context("Could not load shortcuts")?;
        let backend = platform
            .create_backend()
            .context("Could not create render backend")?;
        let mut output = OutputWindow::new(0, backend, config, Input::new(shortcuts))?;
        output.resize(&mut atmos, platform.get_output_size());

        let xserver = if config.xwayland.enabled {
            match XWaylandServer::start(&config.xwayland) {
                Ok(server) => Some(server),
                Err(e) => {
                    log::error!("Running without X11 support: {}", e);
                    atmos.add_compositor_event(CompositorEvent::XWaylandFailed(e.to_string()));
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            h_atmos: atmos,
            h_platform: platform,
            h_output: output,
            h_seat: QueuedSeat::new(),
            h_frontend: frontend,
            h_icons: IconReader::new(),
            h_xserver: xserver,
            h_xwm: None,
            h_cursor: CursorShape::Arrow,
        })
    }

    pub fn get_atmosphere(&self) -> &Atmosphere {
        &self.h_atmos
    }

    pub fn get_atmosphere_mut(&mut self) -> &mut Atmosphere {
        &mut self.h_atmos
    }

    pub fn get_icon_reader(&self) -> &IconReader {
        &self.h_icons
    }

    pub fn get_xwayland_mut(&mut self) -> Option<&mut XWaylandManager> {
        self.h_xwm.as_mut()
    }

    /// Input routing may have queued events for clients
    fn dispatch_seat_events(&mut self) {
        while let Some(ev) = self.h_seat.get_next_event() {
            if let Some(xwm) = self.h_xwm.as_mut() {
                match xwm.handle_seat_event(&mut self.h_atmos, &ev) {
                    Ok(true) => continue,
                    Ok(false) => {}
                    Err(e) => {
                        log::error!("X window manager failed on {:?}: {:#}", ev, e);
                        continue;
                    }
                }
            }
            self.h_frontend.deliver(ev);
        }
    }

    /// Show the cursor input routing picked on X windows too
    fn sync_cursor(&mut self) {
        let shape = self.h_output.get_input().get_cursor();
        if shape == self.h_cursor {
            return;
        }
        self.h_cursor = shape;

        if let Some(xwm) = self.h_xwm.as_mut() {
            if let Err(e) = xwm.set_cursor(shape) {
                log::error!("Could not set X cursor: {:#}", e);
            }
        }
    }

    fn poll_xserver(&mut self) {
        let server = match self.h_xserver.as_mut() {
            Some(s) => s,
            None => return,
        };

        match server.poll() {
            Some(ServerEvent::Ready(display)) => match XWaylandManager::connect(server) {
                Ok(xwm) => {
                    if let Some(fd) = xwm.get_fd() {
                        self.h_platform.add_watch_fd(fd);
                    }
                    self.h_xwm = Some(xwm);
                    self.h_atmos
                        .add_compositor_event(CompositorEvent::XWaylandReady { display });
                }
                Err(e) => {
                    log::error!("{}", e);
                    self.h_xserver = None;
                    self.h_atmos
                        .add_compositor_event(CompositorEvent::XWaylandFailed(e.to_string()));
                }
            },
            Some(ServerEvent::Failed(reason)) => {
                self.h_xserver = None;
                self.h_atmos
                    .add_compositor_event(CompositorEvent::XWaylandFailed(reason));
            }
            Some(ServerEvent::Exited) => {
                if let Some(fd) = self.h_xwm.as_ref().and_then(|xwm| xwm.get_fd()) {
                    self.h_platform.remove_watch_fd(fd);
                }
                self.h_xwm = None;
                self.h_xserver = None;
                self.h_atmos
                    .add_compositor_event(CompositorEvent::XWaylandExited);
            }
            None => {}
        }
    }

    fn dispatch_xwm(&mut self) {
        let xwm = match self.h_xwm.as_mut() {
            Some(xwm) => xwm,
            None => return,
        };

        if let Err(e) = xwm.dispatch_events(&mut self.h_atmos) {
            log::error!("Lost the X connection: {:#}", e);
            if let Some(fd) = xwm.get_fd() {
                self.h_platform.remove_watch_fd(fd);
            }
            self.h_xwm = None;
            return;
        }

        while let Some(req) = xwm.get_next_request() {
            let input = self.h_output.get_input_mut();
            match req {
                XwmRequest::StartMove { surface } => {
                    log::debug!("X client started moving {:?}", surface);
                    input.start_move(&mut self.h_atmos);
                }
                XwmRequest::StartResize { surface, edge } => {
                    log::debug!("X client started resizing {:?} from {:?}", surface, edge);
                    input.start_resize(&mut self.h_atmos, edge, true);
                }
                XwmRequest::CancelGrab { surface } => {
                    log::debug!("X client cancelled its grab on {:?}", surface)
                }
            }
        }
    }

    fn handle_compositor_events(&mut self) {
        while let Some(ev) = self.h_atmos.get_next_compositor_event() {
            if let Some(xwm) = self.h_xwm.as_mut() {
                if let Err(e) = xwm.handle_compositor_event(&self.h_atmos, &ev) {
                    log::error!("X window manager failed on {:?}: {:#}", ev, e);
                }
            }

            match ev {
                CompositorEvent::Shortcut(ShortcutAction::TakeScreenshot) => {
                    self.h_output.setup_screen_copy_frame(Box::new(ScreenshotFrame {
                        sf_path: screenshot_path(),
                    }));
                    self.h_atmos.mark_changed();
                }
                CompositorEvent::FrameStarted | CompositorEvent::FrameDone => {}
                ev => log::debug!("Compositor event: {:?}", ev),
            }
        }
    }

    /// Run one iteration of the event loop
    ///
    /// Returns false once the platform asked us to quit.
    pub fn dispatch(&mut self, timeout: Option<usize>) -> Result<bool> {
        let events = self.h_platform.dispatch(timeout)?;

        for ev in events.iter() {
            match ev {
                PlatformEvent::Input(iev) => {
                    self.h_output
                        .handle_input_event(&mut self.h_atmos, &mut self.h_seat, iev)
                }
                PlatformEvent::Resized(size) => self.h_output.resize(&mut self.h_atmos, *size),
                PlatformEvent::Redraw => self.h_atmos.mark_changed(),
                // the X connection is drained below either way
                PlatformEvent::UserFdReadable => {}
                PlatformEvent::Quit => return Ok(false),
            }
        }

        self.dispatch_seat_events();
        self.sync_cursor();
        self.poll_xserver();
        self.dispatch_xwm();

        self.h_icons
            .apply_icons(&mut self.h_atmos, self.h_output.get_context().backend());
        self.h_atmos.check_idle();

        if self.h_atmos.is_changed() {
            self.h_output.paint(&mut self.h_atmos)?;
            self.h_platform.swap_buffers();
        }

        self.handle_compositor_events();
        Ok(true)
    }

    // This is the main loop of the entire system
    pub fn run_forever(&mut self) -> Result<()> {
        loop {
            // wake up in time to put the display to sleep
            let timeout = self.h_atmos.check_idle();
            if !self.dispatch(Some(timeout))? {
                log::info!("Platform asked us to quit");
                break;
            }
        }

        if let Some(server) = self.h_xserver.as_mut() {
            server.shutdown();
        }
        Ok(())
    }
}
