//! Type aliases for callback shapes.
//!
//! Progress is reported as `(completed, total)` after each finished band.
//! The call is synchronous: generation does not resume until it returns.

/// Borrowed progress callback accepted by generation entry points.
pub type ProgressFn<'a> = &'a mut dyn FnMut(usize, usize);
