//! Wirelength metrics: HPWL and tree-based estimates.
//!
//! These are observation-only: they never touch the linear systems. Each
//! net's contribution is scaled by its weight, so an all-ones weighting
//! yields the raw geometric lengths.

use crate::pins::{pins_1d, pins_2d};
use crate::placement::Placement;
use crate::topology::{mst_length, rsmt_length, RSMT_ACCURACY};
use taxis_common::Point;
use taxis_netlist::{NetId, Netlist};

/// Returns the weighted half-perimeter wirelength of the circuit.
///
/// Degenerate nets (fewer than two pins) contribute nothing.
pub fn hpwl(netlist: &Netlist, placement: &Placement) -> f64 {
    let mut sum = 0.0;
    for i in 0..netlist.net_cnt() {
        let net = NetId::from_raw(i);
        if netlist.net_pin_cnt(net) <= 1 {
            continue;
        }
        let pins = pins_1d(netlist, placement, net);
        let span_x = span(pins.x.iter().map(|p| p.pos));
        let span_y = span(pins.y.iter().map(|p| p.pos));
        sum += netlist.net_weight(net) * (span_x + span_y);
    }
    sum
}

/// Returns the weighted total length of per-net rectilinear spanning trees.
pub fn mst_wirelength(netlist: &Netlist, placement: &Placement) -> f64 {
    let mut sum = 0.0;
    for i in 0..netlist.net_cnt() {
        let net = NetId::from_raw(i);
        let points: Vec<Point<f64>> = pins_2d(netlist, placement, net)
            .iter()
            .map(|p| p.pos)
            .collect();
        sum += netlist.net_weight(net) * mst_length(&points);
    }
    sum
}

/// Returns the weighted total length of per-net Steiner tree estimates.
pub fn rsmt_wirelength(netlist: &Netlist, placement: &Placement) -> f64 {
    let mut sum = 0.0;
    for i in 0..netlist.net_cnt() {
        let net = NetId::from_raw(i);
        let points: Vec<Point<f64>> = pins_2d(netlist, placement, net)
            .iter()
            .map(|p| p.pos)
            .collect();
        sum += netlist.net_weight(net) * rsmt_length(&points, RSMT_ACCURACY);
    }
    sum
}

fn span(positions: impl Iterator<Item = f64>) -> f64 {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for p in positions {
        min = min.min(p);
        max = max.max(p);
    }
    max - min
}
