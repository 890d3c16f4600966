// A set of helper structs for common operations
//
// Austin Shafer - 2020
pub mod timing;
#[macro_use]
pub mod logging;
pub mod fdwatch;
pub mod log;
pub mod region;

extern crate anyhow;
pub use anyhow::{anyhow, Context, Error, Result};

#[doc(hidden)]
pub use ::log as __log;

/// Helper to perform max on PartialOrd types
///
/// We are using PartialOrd so that size and offset can handle
/// floating point types that do not support Ord
pub fn partial_max<T: PartialOrd>(a: T, b: T) -> T {
    if a >= b {
        return a;
    } else {
        return b;
    }
}

/// Helper to perform min on PartialOrd types
pub fn partial_min<T: PartialOrd>(a: T, b: T) -> T {
    if a <= b {
        return a;
    } else {
        return b;
    }
}

/// Clamp `val` into `[min, max]` for PartialOrd types
///
/// If the range is inverted `min` wins.
pub fn partial_clamp<T: PartialOrd>(val: T, min: T, max: T) -> T {
    partial_max(partial_min(val, max), min)
}
