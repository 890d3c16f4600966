// Helper class for watching file descriptors
//
// The event loop uses this to sleep until the XWayland display pipe,
// the X11 window manager socket or a platform fd is readable. FdWatch
// does not own the descriptors it watches, callers must remove an fd
// before closing it.
//
// Austin Shafer - 2020
extern crate nix;

use nix::poll::{poll, PollFd, PollFlags, PollTimeout};

use crate::Result;
use std::os::fd::BorrowedFd;
use std::os::unix::io::RawFd;

// A file descriptor watcher
pub struct FdWatch {
    // fds to watch, not owned
    fdw_fds: Vec<RawFd>,
}

impl FdWatch {
    pub fn new() -> Result<FdWatch> {
        Ok(FdWatch {
            fdw_fds: Vec::new(),
        })
    }

    pub fn add_fd(&mut self, fd: RawFd) {
        if !self.fdw_fds.contains(&fd) {
            self.fdw_fds.push(fd);
        }
    }

    pub fn remove_fd(&mut self, fd: RawFd) {
        self.fdw_fds.retain(|f| *f != fd);
    }

    pub fn is_empty(&self) -> bool {
        self.fdw_fds.is_empty()
    }

    pub fn register_events(&mut self) -> Result<()> {
        // poll takes the whole set on every wait
        Ok(())
    }

    // timeout in ms, None waits forever
    // returns true if something is ready to be read
    pub fn wait_for_events(&mut self, timeout: Option<usize>) -> bool {
        // Callers guarantee the fds stay open while they are registered
        let mut pollfds: Vec<PollFd> = self
            .fdw_fds
            .iter()
            .map(|fd| PollFd::new(unsafe { BorrowedFd::borrow_raw(*fd) }, PollFlags::POLLIN))
            .collect();

        let timeout = match timeout {
            Some(ms) => PollTimeout::from(ms.min(u16::MAX as usize) as u16),
            None => PollTimeout::NONE,
        };

        match poll(&mut pollfds, timeout) {
            Ok(n) => n > 0,
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::unistd;
    use std::os::unix::io::AsRawFd;

    #[test]
    fn pipe_becomes_readable() {
        let (rd, wr) = unistd::pipe().unwrap();
        let mut watch = FdWatch::new().unwrap();
        watch.add_fd(rd.as_raw_fd());

        assert!(!watch.wait_for_events(Some(0)));
        unistd::write(&wr, b"x").unwrap();
        assert!(watch.wait_for_events(Some(0)));

        watch.remove_fd(rd.as_raw_fd());
        assert!(watch.is_empty());
    }
}
