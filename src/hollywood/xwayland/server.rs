// Launching and stopping Xwayland
//
// The server gets three file descriptors: the write end of a pipe it
// prints its display number into (-displayfd), one end of a socket
// pair the window manager talks X over (-wm), and one end of a socket
// pair that is its wayland connection (WAYLAND_SOCKET).
//
// Austin Shafer - 2020
use crate::hollywood::config::XWaylandConfig;
use utils::log;

use nix::fcntl::OFlag;
use nix::sys::signal::{self, SigSet, Signal};
use nix::sys::socket::{socketpair, AddressFamily, SockFlag, SockType};
use nix::unistd::{self, Pid};
use thiserror::Error;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::os::unix::io::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::os::unix::process::CommandExt;
use std::process::{Child, Command};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Error)]
pub enum XWaylandError {
    #[error("Xwayland failed to start: {0}")]
    FailedToStart(#[source] std::io::Error),
    #[error("Could not create the Xwayland file descriptors: {0}")]
    Pipe(#[from] nix::errno::Errno),
    #[error("Xwayland reported an invalid display: {0:?}")]
    InvalidDisplay(String),
    #[error("Xwayland closed the display pipe without a display")]
    NoDisplay,
    #[error("Could not connect to Xwayland as its window manager: {0}")]
    Connection(String),
}

/// What happened to the server since the last poll
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// The display number is known and DISPLAY is set
    Ready(u32),
    /// The server never reported a usable display
    Failed(String),
    Exited,
}

/// Parse the line Xwayland writes into the displayfd pipe
pub fn parse_display(line: &str) -> Result<u32, XWaylandError> {
    let line = line.trim();
    line.parse::<u32>()
        .map_err(|_| XWaylandError::InvalidDisplay(line.to_string()))
}

/// Read the display number on a thread, the server may take a while
fn spawn_display_reader(fd: OwnedFd) -> Receiver<Result<u32, XWaylandError>> {
    let (tx, rx) = channel();

    thread::spawn(move || {
        let mut reader = BufReader::new(File::from(fd));
        let mut line = String::new();

        let res = match reader.read_line(&mut line) {
            Ok(0) => Err(XWaylandError::NoDisplay),
            Ok(_) => parse_display(&line),
            Err(e) => Err(XWaylandError::FailedToStart(e)),
        };
        // the server went away if nobody is listening
        let _ = tx.send(res);
    });

    rx
}

/// Duplicate `fd` without close-on-exec so the child inherits it
fn inheritable(fd: &OwnedFd) -> Result<OwnedFd, XWaylandError> {
    let raw: RawFd = unistd::dup(fd.as_raw_fd())?;
    // dup just handed us this fd
    Ok(unsafe { OwnedFd::from_raw_fd(raw) })
}

pub struct XWaylandServer {
    xs_child: Option<Child>,
    xs_display_rx: Option<Receiver<Result<u32, XWaylandError>>>,
    xs_display: Option<u32>,
    /// Our end of the -wm socket, taken by the window manager
    xs_wm_fd: Option<OwnedFd>,
    /// Our end of the server's wayland connection, taken by the
    /// wayland frontend
    xs_client_fd: Option<OwnedFd>,
    xs_shutdown_timeout: Duration,
}

impl XWaylandServer {
    /// Spawn the server
    ///
    /// This returns right away, `poll` reports when the display is
    /// ready.
    pub fn start(config: &XWaylandConfig) -> Result<Self, XWaylandError> {
        let (display_rd, display_wr) = unistd::pipe2(OFlag::O_CLOEXEC)?;
        let (wm_ours, wm_theirs) = socketpair(
            AddressFamily::Unix,
            SockType::Stream,
            None,
            SockFlag::SOCK_CLOEXEC,
        )?;
        let (client_ours, client_theirs) = socketpair(
            AddressFamily::Unix,
            SockType::Stream,
            None,
            SockFlag::SOCK_CLOEXEC,
        )?;

        let display_fd = inheritable(&display_wr)?;
        let wm_fd = inheritable(&wm_theirs)?;
        let client_fd = inheritable(&client_theirs)?;

        let mut cmd = Command::new(&config.binary);
        cmd.arg("-displayfd")
            .arg(display_fd.as_raw_fd().to_string())
            .arg("-rootless")
            .arg("-wm")
            .arg(wm_fd.as_raw_fd().to_string())
            .env("WAYLAND_SOCKET", client_fd.as_raw_fd().to_string())
            .env("EGL_PLATFORM", "DRM");

        // The server uses SIGUSR1 and SIGUSR2 to talk to its parent,
        // don't let it inherit our mask blocking them.
        unsafe {
            cmd.pre_exec(|| {
                let mut set = SigSet::empty();
                set.add(Signal::SIGUSR1);
                set.add(Signal::SIGUSR2);
                set.thread_unblock()?;
                Ok(())
            });
        }

        let child = cmd.spawn().map_err(XWaylandError::FailedToStart)?;
        log::debug!(
            "Started {} as pid {}",
            config.binary,
            child.id()
        );

        // The child has its copies, closing ours lets the display reader
        // see EOF if the server dies.
        drop(display_fd);
        drop(display_wr);
        drop(wm_fd);
        drop(wm_theirs);
        drop(client_fd);
        drop(client_theirs);

        Ok(Self {
            xs_child: Some(child),
            xs_display_rx: Some(spawn_display_reader(display_rd)),
            xs_display: None,
            xs_wm_fd: Some(wm_ours),
            xs_client_fd: Some(client_ours),
            xs_shutdown_timeout: Duration::from_millis(config.shutdown_timeout_ms),
        })
    }

    pub fn get_display(&self) -> Option<u32> {
        self.xs_display
    }

    pub fn is_running(&self) -> bool {
        self.xs_child.is_some()
    }

    pub fn take_wm_fd(&mut self) -> Option<OwnedFd> {
        self.xs_wm_fd.take()
    }

    pub fn take_client_fd(&mut self) -> Option<OwnedFd> {
        self.xs_client_fd.take()
    }

    /// Check for the display number and for the server exiting
    pub fn poll(&mut self) -> Option<ServerEvent> {
        if let Some(rx) = self.xs_display_rx.as_ref() {
            match rx.try_recv() {
                Ok(Ok(display)) => {
                    self.xs_display_rx = None;
                    self.xs_display = Some(display);
                    std::env::set_var("DISPLAY", format!(":{}", display));
                    log::debug!("Xwayland is ready on display :{}", display);
                    return Some(ServerEvent::Ready(display));
                }
                Ok(Err(e)) => {
                    self.xs_display_rx = None;
                    log::error!("Could not get the Xwayland display: {}", e);
                    return Some(ServerEvent::Failed(e.to_string()));
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => self.xs_display_rx = None,
            }
        }

        let child = self.xs_child.as_mut()?;
        match child.try_wait() {
            Ok(Some(status)) => {
                log::error!("Xwayland exited: {}", status);
                self.xs_child = None;
                Some(ServerEvent::Exited)
            }
            Ok(None) => None,
            Err(e) => {
                log::error!("Could not check on Xwayland: {}", e);
                None
            }
        }
    }

    /// Terminate the server, killing it if it doesn't exit in time
    pub fn shutdown(&mut self) {
        let mut child = match self.xs_child.take() {
            Some(c) => c,
            None => return,
        };

        let pid = Pid::from_raw(child.id() as i32);
        if let Err(e) = signal::kill(pid, Signal::SIGTERM) {
            log::error!("Could not terminate Xwayland: {}", e);
        }

        let deadline = Instant::now() + self.xs_shutdown_timeout;
        loop {
            match child.try_wait() {
                Ok(Some(_)) => return,
                Ok(None) if Instant::now() < deadline => thread::sleep(Duration::from_millis(10)),
                _ => break,
            }
        }

        log::error!("Xwayland did not exit in time, killing it");
        if let Err(e) = child.kill() {
            log::error!("Could not kill Xwayland: {}", e);
        }
        let _ = child.wait();
    }
}

impl Drop for XWaylandServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
