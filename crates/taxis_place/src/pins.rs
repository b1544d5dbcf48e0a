//! Pin projections: per-net views of pin geometry in one and two dimensions.
//!
//! The wirelength models work on flat lists of pins carrying their absolute
//! position, their offset from the owning cell's origin, and whether that
//! cell may move on the axis under consideration. [`Pin2D::proj`] is the
//! single place a 2-D pin becomes a 1-D pin, so the per-axis views used by
//! the assemblers and the 2-D views used by the topology builders can never
//! disagree on projection policy.

use crate::placement::Placement;
use taxis_common::{Axis, Point};
use taxis_netlist::{CellFlags, CellId, NetId, Netlist};

/// A pin projected onto a single axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pin1D {
    /// Internal index of the owning cell.
    pub cell: CellId,
    /// Absolute position: cell position plus pin offset.
    pub pos: f64,
    /// Pin offset from the cell origin on this axis.
    pub offs: f64,
    /// Whether the owning cell may move on this axis.
    pub movable: bool,
}

/// A pin with its full two-dimensional geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pin2D {
    /// Internal index of the owning cell.
    pub cell: CellId,
    /// Absolute position: cell position plus pin offset.
    pub pos: Point<f64>,
    /// Pin offset from the cell origin.
    pub offs: Point<f64>,
    /// Per-axis movability of the owning cell.
    pub movable: Point<bool>,
}

impl Pin2D {
    /// Projects the pin onto `axis`.
    pub fn proj(&self, axis: Axis) -> Pin1D {
        Pin1D {
            cell: self.cell,
            pos: *self.pos.get(axis),
            offs: *self.offs.get(axis),
            movable: *self.movable.get(axis),
        }
    }
}

/// Returns the 2-D pins of net `net`, in the net's pin order.
pub fn pins_2d(netlist: &Netlist, placement: &Placement, net: NetId) -> Vec<Pin2D> {
    netlist
        .net_pins(net)
        .map(|(cell, offs)| {
            let flags = netlist.cell(cell).flags;
            Pin2D {
                cell,
                pos: placement.pos(cell) + offs,
                offs,
                movable: Point::new(
                    flags.contains(CellFlags::X_MOVABLE),
                    flags.contains(CellFlags::Y_MOVABLE),
                ),
            }
        })
        .collect()
}

/// Returns the per-axis 1-D pins of net `net`, in the net's pin order.
pub fn pins_1d(netlist: &Netlist, placement: &Placement, net: NetId) -> Point<Vec<Pin1D>> {
    let pins = pins_2d(netlist, placement, net);
    Point {
        x: pins.iter().map(|p| p.proj(Axis::X)).collect(),
        y: pins.iter().map(|p| p.proj(Axis::Y)).collect(),
    }
}
