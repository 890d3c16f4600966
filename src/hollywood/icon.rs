// Window icons sent by clients
//
// A client hands us the read end of a pipe and writes an encoded image
// into it. Reading and decoding happen on a worker thread, the decoded
// pixels come back to the event loop over a channel and are uploaded
// there.
//
// Austin Shafer - 2020
use crate::hollywood::atmosphere::{Atmosphere, SurfaceId};
use crate::hollywood::glcomp::RenderBackend;
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::unistd;
use utils::{log, Context, Result};

use std::os::unix::io::{AsRawFd, OwnedFd, RawFd};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

/// How often a read that would block is retried
const MAX_READ_RETRIES: u32 = 1000;
const READ_RETRY_DELAY: Duration = Duration::from_millis(1);

/// A decoded RGBA8 image
#[derive(Debug, Clone, PartialEq)]
pub struct IconImage {
    pub ii_size: (u32, u32),
    pub ii_rgba: Vec<u8>,
}

/// The result of one icon request
#[derive(Debug)]
pub struct IconResult {
    pub ir_surface: SurfaceId,
    /// None if the data could not be read or decoded, the surface
    /// then gets the theme icon
    pub ir_icon: Option<IconImage>,
}

/// Read everything from `fd` until EOF
///
/// The fd may be non-blocking. A read that would block is retried
/// every millisecond, giving up after 1000 tries in a row.
pub fn read_data(fd: RawFd) -> Result<Vec<u8>> {
    let mut ret = Vec::new();
    let mut buf = [0u8; 4096];
    let mut retries = 0;

    loop {
        match unistd::read(fd, &mut buf) {
            Ok(0) => return Ok(ret),
            Ok(n) => {
                ret.extend_from_slice(&buf[..n]);
                retries = 0;
            }
            Err(Errno::EAGAIN) => {
                retries += 1;
                if retries >= MAX_READ_RETRIES {
                    return Err(Errno::EAGAIN).context("Timed out waiting for icon data");
                }
                thread::sleep(READ_RETRY_DELAY);
            }
            Err(Errno::EINTR) => {}
            Err(e) => return Err(e).context("Could not read icon data"),
        }
    }
}

/// Decode an encoded image (png, ico, ...) into RGBA8
pub fn decode_icon(data: &[u8]) -> Result<IconImage> {
    let img = image::load_from_memory(data)
        .context("Could not decode icon")?
        .to_rgba8();

    Ok(IconImage {
        ii_size: img.dimensions(),
        ii_rgba: img.into_raw(),
    })
}

/// Create the pipe a client writes its icon into
///
/// Returns (read end, write end). Both are close-on-exec, the read end
/// is non-blocking.
pub fn open_icon_pipe() -> Result<(OwnedFd, OwnedFd)> {
    unistd::pipe2(OFlag::O_CLOEXEC | OFlag::O_NONBLOCK).context("Could not create icon pipe")
}

pub struct IconReader {
    ir_tx: Sender<IconResult>,
    ir_rx: Receiver<IconResult>,
}

impl IconReader {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self {
            ir_tx: tx,
            ir_rx: rx,
        }
    }

    /// Read and decode the icon for `surface` from `fd` in the background
    pub fn request(&self, surface: SurfaceId, fd: OwnedFd) {
        let tx = self.ir_tx.clone();

        thread::spawn(move || {
            let icon = read_data(fd.as_raw_fd()).and_then(|data| decode_icon(&data));
            // close before reporting back
            drop(fd);

            let icon = match icon {
                Ok(icon) => Some(icon),
                Err(e) => {
                    log::debug!("No icon for {:?}: {:#}", surface, e);
                    None
                }
            };

            // the receiver only goes away on shutdown
            let _ = tx.send(IconResult {
                ir_surface: surface,
                ir_icon: icon,
            });
        });
    }

    /// Pull one finished request off the queue
    pub fn get_next_icon(&self) -> Option<IconResult> {
        match self.ir_rx.try_recv() {
            Ok(res) => Some(res),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Upload every finished icon and attach it to its surface
    pub fn apply_icons(&self, atmos: &mut Atmosphere, backend: &mut dyn RenderBackend) {
        while let Some(res) = self.get_next_icon() {
            let surf = match atmos.get_surface_mut(res.ir_surface) {
                Some(s) => s,
                None => {
                    log::debug!("Icon for destroyed surface {:?}", res.ir_surface);
                    continue;
                }
            };

            let tex = match res.ir_icon {
                Some(icon) => match backend.create_texture(icon.ii_size, &icon.ii_rgba) {
                    Ok(tex) => Some(tex),
                    Err(e) => {
                        log::error!("Could not upload icon: {:#}", e);
                        None
                    }
                },
                None => None,
            };

            if let Some(old) = std::mem::replace(&mut surf.s_icon, tex) {
                backend.destroy_texture(old);
            }
        }
    }
}
