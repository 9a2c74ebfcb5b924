//! Motion control for a two-axis alt-az mount: coordinate conversion, scan path
//! generation, and the slew, track and scan jobs that drive the motors.

#[cfg(test)]
#[macro_use]
extern crate assert_float_eq;

pub mod astro_math;
pub mod config;
pub mod scans;
pub mod telescope_control;
mod util;

pub use util::*;
