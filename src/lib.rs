pub mod automaton;
pub mod config;
pub mod input;
pub mod pattern_codec;
pub mod patterns;
pub mod render;
pub mod rle;
pub mod rule_set;
pub mod session;
pub mod stamp;

mod parse_util;

/// Raw, unwrapped grid coordinate. Anything in range is accepted and wrapped onto the torus.
pub type GridOffset = i64;

/// A wrapped grid position, `x` in `[0, width)` and `y` in `[0, height)`.
pub type Position = (usize, usize);
