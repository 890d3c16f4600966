//! # Hollywood
//!
//! The compositor core: surfaces and their layers, the output paint
//! loop, input routing and the XWayland bridge.
//!
//! * `atmosphere` - the surface registry and the layer collections.
//! * `glcomp` - the OpenGL output window, decorations and shadows.
//! * `input` - input routing and the grab state machine.
//! * `xwayland` - runs Xwayland and manages its windows.
//! * `platform` - the window system we draw into (headless or SDL2).

// Austin Shafer - 2020
extern crate utils;

mod hollywood;
use hollywood::config::Config;
use hollywood::platform::Platform;
use hollywood::{Hollywood, LogSeat};

use utils::{anyhow, log, Result};

use std::path::PathBuf;
use std::time::SystemTime;

/// Get the path passed with --config, if any
fn config_path_from_args() -> Result<Option<PathBuf>> {
    let mut args = std::env::args().skip(1);
    let mut path = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let p = args
                    .next()
                    .ok_or_else(|| anyhow!("--config needs a path"))?;
                path = Some(PathBuf::from(p));
            }
            other => return Err(anyhow!("Unknown argument: {}", other)),
        }
    }

    Ok(path)
}

#[cfg(feature = "sdl")]
fn create_platform(config: &Config) -> Result<Box<dyn Platform>> {
    use hollywood::platform::sdl::SDL2Plat;
    Ok(Box::new(SDL2Plat::new(config.output_size)?))
}

#[cfg(not(feature = "sdl"))]
fn create_platform(config: &Config) -> Result<Box<dyn Platform>> {
    use hollywood::platform::headless::HeadlessPlat;
    Ok(Box::new(HeadlessPlat::new(config.output_size)))
}

fn run() -> Result<()> {
    let path = config_path_from_args()?;
    let config = Config::load(path.as_deref())?;
    utils::logging::init(&config.log_level);

    let platform = create_platform(&config)?;
    let mut storm = Hollywood::spin(&config, platform, Box::new(LogSeat))?;

    log::info!("Begin render loop...");
    let start = SystemTime::now();
    storm.run_forever()?;

    if let Ok(uptime) = SystemTime::now().duration_since(start) {
        log::info!("uptime: {}", uptime.as_secs_f32());
    }
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("hollywood: {:#}", e);
        std::process::exit(1);
    }
}
