//! Immutable circuit netlist store for the taxis placer.
//!
//! The netlist is the read-only half of the placement problem: cells with
//! areas, sizes and movability flags, nets with weights, and pins attaching
//! nets to cells at fixed offsets. It is built once through
//! [`NetlistBuilder`] and never modified afterwards; the mutable half (cell
//! positions) lives in `taxis_place`.
//!
//! Cells, nets and pins are stored in parallel arrays indexed by dense
//! integer IDs, with CSR-style boundary arrays partitioning the pin range
//! once by net and once by cell. All cross-references are indices, never
//! owning references, which keeps the wirelength assemblers cache-friendly
//! at millions of pin lookups per placement iteration.

#![warn(missing_docs)]

mod data;
mod flags;
mod ids;

pub use data::{Cell, Netlist, NetlistBuilder, NetlistError};
pub use flags::CellFlags;
pub use ids::{CellId, NetId, PinId};
