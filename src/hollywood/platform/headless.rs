// Headless Platform
//
// There is no display, so there is no input either. This is used when
// running without a window system and in tests.
//
// Austin Shafer - 2020
use super::{Platform, PlatformEvent};
use crate::hollywood::glcomp::headless::HeadlessBackend;
use crate::hollywood::glcomp::RenderBackend;
use utils::fdwatch::FdWatch;
use utils::{log, Result};

use std::os::unix::io::RawFd;
use std::time::Duration;

/// How long to wait when there is nothing to watch
const FRAME_SLEEP_MS: usize = 32;

pub struct HeadlessPlat {
    hp_size: (u32, u32),
    hp_fds: Option<FdWatch>,
}

impl HeadlessPlat {
    pub fn new(size: (u32, u32)) -> Self {
        Self {
            hp_size: size,
            hp_fds: None,
        }
    }
}

impl Platform for HeadlessPlat {
    fn get_output_size(&self) -> (u32, u32) {
        self.hp_size
    }

    fn create_backend(&mut self) -> Result<Box<dyn RenderBackend>> {
        Ok(Box::new(HeadlessBackend::new(self.hp_size)))
    }

    fn add_watch_fd(&mut self, fd: RawFd) {
        if self.hp_fds.is_none() {
            match FdWatch::new() {
                Ok(w) => self.hp_fds = Some(w),
                Err(e) => {
                    log::error!("Could not create fd watch: {:#}", e);
                    return;
                }
            }
        }

        if let Some(watch) = self.hp_fds.as_mut() {
            watch.add_fd(fd);
            if let Err(e) = watch.register_events() {
                log::error!("Could not watch fd {}: {:#}", fd, e);
            }
        }
    }

    fn remove_watch_fd(&mut self, fd: RawFd) {
        if let Some(watch) = self.hp_fds.as_mut() {
            watch.remove_fd(fd);
        }
    }

    fn dispatch(&mut self, timeout: Option<usize>) -> Result<Vec<PlatformEvent>> {
        let timeout = timeout.unwrap_or(FRAME_SLEEP_MS).min(FRAME_SLEEP_MS);

        match self.hp_fds.as_mut() {
            Some(watch) => match watch.wait_for_events(Some(timeout)) {
                true => Ok(vec![PlatformEvent::UserFdReadable]),
                false => Ok(Vec::new()),
            },
            None => {
                std::thread::sleep(Duration::from_millis(timeout as u64));
                Ok(Vec::new())
            }
        }
    }

    fn swap_buffers(&mut self) {}
}
