// This makes it easy to import the logging stuff
// Austin Shafer - 2020

#![allow(unused_imports)]
pub use crate::profiling;
pub use crate::timing::get_current_millis;
pub use ::log::{debug, error, info, trace, warn};
