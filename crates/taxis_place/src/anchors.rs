//! Pulling forces: anchors that regularize and couple placements.
//!
//! Anchors are added on top of an assembled system pair. Their stiffness is
//! scaled by cell area so that large cells are not dominated by small ones:
//! a cell of twice the average area pulls twice as hard.

use crate::placement::Placement;
use taxis_common::Point;
use taxis_netlist::{CellId, Netlist};
use taxis_solver::LinearSystem;

/// Returns the per-cell anchor scaling factors `area_i / avg_area`.
pub fn area_scales(netlist: &Netlist) -> Vec<f64> {
    let cell_cnt = netlist.cell_cnt();
    let average = netlist.total_area() as f64 / cell_cnt as f64;
    (0..cell_cnt)
        .map(|i| netlist.cell(CellId::from_raw(i)).area as f64 / average)
        .collect()
}

/// Anchors every cell at its current position with stiffness
/// `scale_i / typical_distance`.
///
/// Regularizes an otherwise unconstrained system: without pulling forces a
/// pure wirelength model collapses all movable cells onto the fixed ones.
pub fn add_quadratic_pulling(
    systems: &mut Point<LinearSystem>,
    netlist: &Netlist,
    placement: &Placement,
    typical_distance: f64,
) {
    assert!(typical_distance > 0.0);
    let typical_force = 1.0 / typical_distance;
    let scaling = area_scales(netlist);
    for i in 0..netlist.cell_cnt() {
        let pos = placement.positions[i as usize];
        systems.x.add_anchor(typical_force * scaling[i as usize], i, pos.x);
        systems.y.add_anchor(typical_force * scaling[i as usize], i, pos.y);
    }
}

/// Anchors every cell at its upper-bound position, with stiffness inversely
/// proportional to its distance from the lower-bound position.
///
/// This is the classical bound-to-bound linearization: reweighting the
/// quadratic anchor by `1 / max(|UB - LB|, min_distance)` turns repeated
/// quadratic solves into an iteratively-reweighted L1 minimization.
/// `min_distance` must be strictly positive; it floors the weight for cells
/// that have already converged.
pub fn add_b2b_pulling(
    systems: &mut Point<LinearSystem>,
    netlist: &Netlist,
    ub: &Placement,
    lb: &Placement,
    force: f64,
    min_distance: f64,
) {
    assert!(min_distance > 0.0);
    assert_eq!(lb.cell_cnt(), ub.cell_cnt());
    let scaling = area_scales(netlist);
    for i in 0..netlist.cell_cnt() {
        let ub_pos = ub.positions[i as usize];
        let lb_pos = lb.positions[i as usize];
        systems.x.add_anchor(
            force * scaling[i as usize] / (ub_pos.x - lb_pos.x).abs().max(min_distance),
            i,
            ub_pos.x,
        );
        systems.y.add_anchor(
            force * scaling[i as usize] / (ub_pos.y - lb_pos.y).abs().max(min_distance),
            i,
            ub_pos.y,
        );
    }
}
