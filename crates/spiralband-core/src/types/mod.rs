//! Type aliases used across the SpiralBand crates.

pub mod aliases;

pub use aliases::*;
