// Category-based logging infrastructure
//
// Call sites go through the `log` facade. The binary installs
// env_logger once at startup with `init`.
//
// Austin Shafer - 2020
use std::str::FromStr;

/// Install the global logger
///
/// `default_level` is used when RUST_LOG is not set. It takes
/// the usual names: error, warn, info, debug, trace. Calling this
/// twice is harmless, the second install is ignored.
pub fn init(default_level: &str) {
    let level = ::log::LevelFilter::from_str(default_level).unwrap_or(::log::LevelFilter::Info);

    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();
}

/// Timing output for frame profiling
///
/// This is routed to trace so it is only printed when asked for
/// with RUST_LOG=profiling=trace
#[macro_export]
macro_rules! profiling {
    ($($format_args:tt)+) => ({
        $crate::__log::trace!(target: "profiling", $($format_args)+)
    })
}
