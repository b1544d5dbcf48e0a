//! Shared geometric primitives for the taxis placement toolchain.
//!
//! Everything in the placer is resolutely two-dimensional, and almost every
//! quantity exists once per axis: coordinates, sizes, pin offsets, but also
//! whole per-axis objects such as the pair of linear systems assembled during
//! global placement. [`Point`] is the generic axis pair used for all of them,
//! and [`Axis`] selects one of its components at runtime.

#![warn(missing_docs)]

mod point;
mod rect;

pub use point::{Axis, Point};
pub use rect::Rect;
