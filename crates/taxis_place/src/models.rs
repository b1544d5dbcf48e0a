//! Wirelength-model assemblers.
//!
//! Each builder lowers the nets of a circuit into Laplacian edges and
//! fixed-point forces on a pair of per-axis linear systems. All builders
//! share the same shape: `(netlist, placement, tol, min_pins, max_pins)`,
//! where only nets with `min_pins <= pin_cnt < max_pins` contribute. The
//! window enables mixed strategies, e.g. clique for small nets and star for
//! large ones.
//!
//! Edge weights are divided by the current pin-to-pin distance (floored at
//! `tol`), which linearizes the quadratic model toward HPWL in the usual
//! bound-to-bound fashion. `tol` is the single most important numerical
//! parameter here: it must be strictly positive, and it is what keeps
//! coincident pins from producing infinite weights.

use crate::pins::{pins_1d, pins_2d, Pin1D};
use crate::placement::Placement;
use crate::topology::{mst_topology, rsmt_topology, RSMT_ACCURACY};
use taxis_common::{Axis, Point};
use taxis_netlist::{CellFlags, CellId, NetId, Netlist};
use taxis_solver::LinearSystem;

/// Creates the per-axis system pair and seeds fixed cells.
///
/// Each cell that cannot move on an axis gets a unit diagonal and its
/// current coordinate on the right-hand side, pinning it in place: the
/// solver returns the current coordinate for those rows up to CG tolerance.
pub fn empty_systems(netlist: &Netlist, placement: &Placement) -> Point<LinearSystem> {
    let n = netlist.cell_cnt() as usize;
    let mut systems = Point::new(LinearSystem::new(n), LinearSystem::new(n));
    for i in 0..netlist.cell_cnt() {
        let flags = netlist.cell(CellId::from_raw(i)).flags;
        let pos = placement.positions[i as usize];
        if !flags.contains(CellFlags::X_MOVABLE) {
            systems.x.add_triplet(i, i, 1.0);
            systems.x.add_doublet(i, pos.x);
        }
        if !flags.contains(CellFlags::Y_MOVABLE) {
            systems.y.add_triplet(i, i, 1.0);
            systems.y.add_doublet(i, pos.y);
        }
    }
    systems
}

/// Connects two 1-D pins with stiffness `w`, dispatching on movability.
///
/// Both endpoints fixed is a no-op: the term would be constant.
pub(crate) fn add_pair(p1: &Pin1D, p2: &Pin1D, system: &mut LinearSystem, w: f64) {
    if p1.movable && p2.movable {
        system.add_force(w, p1.cell.as_raw(), p2.cell.as_raw(), p1.offs, p2.offs);
    } else if p1.movable {
        system.add_fixed_force(w, p1.cell.as_raw(), p2.pos, p1.offs);
    } else if p2.movable {
        system.add_fixed_force(w, p2.cell.as_raw(), p1.pos, p2.offs);
    }
}

/// Connects two 1-D pins with stiffness `scale / max(tol, distance)`.
pub(crate) fn add_pair_tol(p1: &Pin1D, p2: &Pin1D, system: &mut LinearSystem, tol: f64, scale: f64) {
    add_pair(p1, p2, system, scale / tol.max((p2.pos - p1.pos).abs()))
}

/// Returns whether net `net` falls inside the `[min_pins, max_pins)` window.
fn in_window(netlist: &Netlist, net: NetId, min_pins: u32, max_pins: u32) -> bool {
    let pin_cnt = netlist.net_pin_cnt(net);
    pin_cnt >= min_pins && pin_cnt < max_pins
}

/// Bound-to-bound model, fast variant.
///
/// Locates the extreme pins of each net (stable first occurrence on ties)
/// and connects every other pin to the minimum, and every non-extreme pin to
/// the maximum, with weight `1/(n-1)`. Concentrating edges on the extremes
/// approximates the HPWL gradient with `O(n)` edges per net.
pub fn build_hpwlf(
    netlist: &Netlist,
    placement: &Placement,
    tol: f64,
    min_pins: u32,
    max_pins: u32,
) -> Point<LinearSystem> {
    assert!(tol > 0.0);
    let mut systems = empty_systems(netlist, placement);
    for i in 0..netlist.net_cnt() {
        let net = NetId::from_raw(i);
        if !in_window(netlist, net, min_pins, max_pins) {
            continue;
        }
        let pins = pins_1d(netlist, placement, net);
        hpwlf_net(&pins.x, &mut systems.x, tol);
        hpwlf_net(&pins.y, &mut systems.y, tol);
    }
    systems
}

fn hpwlf_net(pins: &[Pin1D], system: &mut LinearSystem, tol: f64) {
    if pins.len() < 2 {
        return;
    }
    let mut min = 0;
    let mut max = 0;
    for (k, p) in pins.iter().enumerate() {
        if p.pos < pins[min].pos {
            min = k;
        }
        if p.pos > pins[max].pos {
            max = k;
        }
    }
    let scale = 1.0 / (pins.len() - 1) as f64;
    for (k, p) in pins.iter().enumerate() {
        if k != min {
            add_pair_tol(p, &pins[min], system, tol, scale);
            // Only one connection between the two extreme pins.
            if k != max {
                add_pair_tol(p, &pins[max], system, tol, scale);
            }
        }
    }
}

/// Bound-to-bound model, sorted-chain variant.
///
/// Sorts the pins by position and connects pin `k` to pin `k+2` with weight
/// `0.5`, plus the two extreme pins to their direct neighbors.
pub fn build_hpwlr(
    netlist: &Netlist,
    placement: &Placement,
    tol: f64,
    min_pins: u32,
    max_pins: u32,
) -> Point<LinearSystem> {
    assert!(tol > 0.0);
    let mut systems = empty_systems(netlist, placement);
    for i in 0..netlist.net_cnt() {
        let net = NetId::from_raw(i);
        if !in_window(netlist, net, min_pins, max_pins) {
            continue;
        }
        let pins = pins_1d(netlist, placement, net);
        hpwlr_net(&pins.x, &mut systems.x, tol);
        hpwlr_net(&pins.y, &mut systems.y, tol);
    }
    systems
}

fn hpwlr_net(pins: &[Pin1D], system: &mut LinearSystem, tol: f64) {
    if pins.len() < 2 {
        return;
    }
    let mut sorted = pins.to_vec();
    sorted.sort_by(|a, b| a.pos.total_cmp(&b.pos));
    let n = sorted.len();
    for k in 0..n.saturating_sub(2) {
        add_pair_tol(&sorted[k], &sorted[k + 2], system, tol, 0.5);
    }
    add_pair_tol(&sorted[0], &sorted[1], system, tol, 0.5);
    add_pair_tol(&sorted[n - 2], &sorted[n - 1], system, tol, 0.5);
}

/// Star model: one auxiliary variable per net.
///
/// The system pair is enlarged by `net_cnt` variables; the star center of
/// net `i` sits at variable `cell_cnt + i` and every pin connects to it with
/// weight `1/n`. Auxiliary rows of out-of-window or degenerate nets get a
/// unit diagonal so the system stays non-singular; auxiliary values are
/// discarded on writeback.
pub fn build_star(
    netlist: &Netlist,
    placement: &Placement,
    tol: f64,
    min_pins: u32,
    max_pins: u32,
) -> Point<LinearSystem> {
    assert!(tol > 0.0);
    let mut systems = empty_systems(netlist, placement);
    systems.x.add_variables(netlist.net_cnt() as usize);
    systems.y.add_variables(netlist.net_cnt() as usize);
    for i in 0..netlist.net_cnt() {
        let net = NetId::from_raw(i);
        let star = netlist.cell_cnt() + i;
        if !in_window(netlist, net, min_pins, max_pins) {
            systems.x.add_triplet(star, star, 1.0);
            systems.y.add_triplet(star, star, 1.0);
            continue;
        }
        let pins = pins_1d(netlist, placement, net);
        star_net(&pins.x, &mut systems.x, star);
        star_net(&pins.y, &mut systems.y, star);
    }
    systems
}

fn star_net(pins: &[Pin1D], system: &mut LinearSystem, star: u32) {
    // Degenerate nets still populate the diagonal to avoid divide by zero.
    if pins.len() < 2 {
        system.add_triplet(star, star, 1.0);
        return;
    }
    let w = 1.0 / pins.len() as f64;
    for p in pins {
        if p.movable {
            system.add_force(w, p.cell.as_raw(), star, p.offs, 0.0);
        } else {
            system.add_fixed_force(w, star, p.pos, 0.0);
        }
    }
}

/// Clique model: one edge per unordered pin pair, weight `1/(n-1)`.
///
/// `O(n^2)` edges per net; meant for small nets only, with the star model
/// covering the rest of the window.
pub fn build_clique(
    netlist: &Netlist,
    placement: &Placement,
    tol: f64,
    min_pins: u32,
    max_pins: u32,
) -> Point<LinearSystem> {
    assert!(tol > 0.0);
    let mut systems = empty_systems(netlist, placement);
    for i in 0..netlist.net_cnt() {
        let net = NetId::from_raw(i);
        if !in_window(netlist, net, min_pins, max_pins) {
            continue;
        }
        let pins = pins_1d(netlist, placement, net);
        clique_net(&pins.x, &mut systems.x, tol);
        clique_net(&pins.y, &mut systems.y, tol);
    }
    systems
}

fn clique_net(pins: &[Pin1D], system: &mut LinearSystem, tol: f64) {
    if pins.len() < 2 {
        return;
    }
    let scale = 1.0 / (pins.len() - 1) as f64;
    for i in 0..pins.len() - 1 {
        for j in i + 1..pins.len() {
            add_pair_tol(&pins[i], &pins[j], system, tol, scale);
        }
    }
}

/// MST model: unit-weight forces along the rectilinear spanning tree edges.
pub fn build_mst(
    netlist: &Netlist,
    placement: &Placement,
    tol: f64,
    min_pins: u32,
    max_pins: u32,
) -> Point<LinearSystem> {
    assert!(tol > 0.0);
    let mut systems = empty_systems(netlist, placement);
    for i in 0..netlist.net_cnt() {
        let net = NetId::from_raw(i);
        if !in_window(netlist, net, min_pins, max_pins) || netlist.net_pin_cnt(net) <= 1 {
            continue;
        }
        let pins = pins_2d(netlist, placement, net);
        let points: Vec<Point<f64>> = pins.iter().map(|p| p.pos).collect();
        for (a, b) in mst_topology(&points) {
            let (pa, pb) = (&pins[a as usize], &pins[b as usize]);
            for axis in Axis::BOTH {
                add_pair_tol(
                    &pa.proj(axis),
                    &pb.proj(axis),
                    systems.get_mut(axis),
                    tol,
                    1.0,
                );
            }
        }
    }
    systems
}

/// RSMT model: unit-weight forces along per-axis Steiner tree edge lists.
///
/// The topology builder returns independent edge lists for the two axes, so
/// each axis is assembled from its own list.
pub fn build_rsmt(
    netlist: &Netlist,
    placement: &Placement,
    tol: f64,
    min_pins: u32,
    max_pins: u32,
) -> Point<LinearSystem> {
    assert!(tol > 0.0);
    let mut systems = empty_systems(netlist, placement);
    for i in 0..netlist.net_cnt() {
        let net = NetId::from_raw(i);
        if !in_window(netlist, net, min_pins, max_pins) || netlist.net_pin_cnt(net) <= 1 {
            continue;
        }
        let pins = pins_2d(netlist, placement, net);
        let points: Vec<Point<f64>> = pins.iter().map(|p| p.pos).collect();
        let edges = rsmt_topology(&points, RSMT_ACCURACY);
        for axis in Axis::BOTH {
            for &(a, b) in edges.get(axis) {
                add_pair_tol(
                    &pins[a as usize].proj(axis),
                    &pins[b as usize].proj(axis),
                    systems.get_mut(axis),
                    tol,
                    1.0,
                );
            }
        }
    }
    systems
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use taxis_netlist::{CellId, NetlistBuilder};

    const WINDOW: (u32, u32) = (2, u32::MAX);

    /// One net over `positions.len()` unit cells, pin offsets zero.
    fn single_net(positions: &[Point<f64>], fixed: &[usize]) -> (Netlist, Placement) {
        let mut b = NetlistBuilder::new();
        let mut pins = Vec::new();
        for (i, _) in positions.iter().enumerate() {
            let flags = if fixed.contains(&i) {
                CellFlags::NONE
            } else {
                CellFlags::MOVABLE
            };
            let c = b.add_cell(i as u64, 1, Point::new(1, 1), flags);
            pins.push((c, Point::splat(0.0)));
        }
        b.add_net(0, 1.0, &pins);
        let nl = b.finish().unwrap();
        let pl = Placement::from_positions(positions.to_vec());
        (nl, pl)
    }

    fn dot(a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn fixed_cells_are_seeded() {
        let (nl, pl) = single_net(&[Point::new(2.0, 3.0), Point::new(5.0, 7.0)], &[1]);
        let systems = empty_systems(&nl, &pl);
        // Cell 1 is pinned: unit diagonal, position on the RHS.
        let e1 = [0.0, 1.0];
        assert_eq!(systems.x.apply(&e1), vec![0.0, 1.0]);
        assert_eq!(systems.x.rhs(), &[0.0, 5.0]);
        assert_eq!(systems.y.rhs(), &[0.0, 7.0]);
    }

    #[test]
    fn add_pair_skips_two_fixed_pins() {
        let p1 = Pin1D {
            cell: CellId::from_raw(0),
            pos: 0.0,
            offs: 0.0,
            movable: false,
        };
        let p2 = Pin1D {
            cell: CellId::from_raw(1),
            pos: 5.0,
            offs: 0.0,
            movable: false,
        };
        let mut sys = LinearSystem::new(2);
        add_pair(&p1, &p2, &mut sys, 1.0);
        assert_eq!(sys.apply(&[1.0, 1.0]), vec![0.0, 0.0]);
        assert_eq!(sys.rhs(), &[0.0, 0.0]);
    }

    #[test]
    fn tol_floors_the_distance() {
        let p1 = Pin1D {
            cell: CellId::from_raw(0),
            pos: 1.0,
            offs: 0.0,
            movable: true,
        };
        let p2 = Pin1D {
            cell: CellId::from_raw(1),
            pos: 1.0,
            offs: 0.0,
            movable: true,
        };
        let mut sys = LinearSystem::new(2);
        // Coincident pins: weight becomes scale/tol, not infinity.
        add_pair_tol(&p1, &p2, &mut sys, 0.5, 1.0);
        assert_abs_diff_eq!(sys.apply(&[1.0, 0.0])[0], 2.0);
    }

    #[test]
    fn hpwlf_two_pin_net_pulls_to_fixed() {
        let (nl, pl) = single_net(&[Point::new(5.0, 0.0), Point::new(0.0, 0.0)], &[1]);
        let systems = build_hpwlf(&nl, &pl, 1e-3, WINDOW.0, WINDOW.1);
        let sol = systems.x.solve_cg(&[5.0, 0.0], 100);
        assert_abs_diff_eq!(sol[0], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn hpwlf_connects_extremes_once() {
        // Three collinear pins: 2 edges to the min, 1 edge to the max.
        let (nl, pl) = single_net(
            &[
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(2.0, 0.0),
            ],
            &[],
        );
        let systems = build_hpwlf(&nl, &pl, 1e-3, WINDOW.0, WINDOW.1);
        // Edge weights on x: pin1-pin0 (d=1), pin1-pin2 (d=1), pin2-pin0 (d=2),
        // each scaled by 1/(n-1) = 0.5.
        let diag: Vec<f64> = (0..3)
            .map(|i| {
                let mut e = vec![0.0; 3];
                e[i] = 1.0;
                systems.x.apply(&e)[i]
            })
            .collect();
        assert_abs_diff_eq!(diag[0], 0.5 + 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(diag[1], 0.5 + 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(diag[2], 0.5 + 0.25, epsilon = 1e-12);
    }

    #[test]
    fn window_excludes_nets() {
        let (nl, pl) = single_net(&[Point::new(0.0, 0.0), Point::new(4.0, 0.0)], &[]);
        // Window [3, inf): the 2-pin net contributes nothing.
        let systems = build_clique(&nl, &pl, 1e-3, 3, u32::MAX);
        assert_eq!(systems.x.apply(&[1.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn star_allocates_auxiliaries_and_stabilizes() {
        let mut b = NetlistBuilder::new();
        let c0 = b.add_cell(0, 1, Point::new(1, 1), CellFlags::MOVABLE);
        let c1 = b.add_cell(1, 1, Point::new(1, 1), CellFlags::MOVABLE);
        let c2 = b.add_cell(2, 1, Point::new(1, 1), CellFlags::MOVABLE);
        b.add_net(0, 1.0, &[(c0, Point::splat(0.0)), (c1, Point::splat(0.0)), (c2, Point::splat(0.0))]);
        b.add_net(1, 1.0, &[(c0, Point::splat(0.0))]);
        let nl = b.finish().unwrap();
        let pl = Placement::flat(3, Point::splat(0.0));

        let systems = build_star(&nl, &pl, 1e-3, 2, 100);
        assert_eq!(systems.x.internal_size(), 5);
        // Net 1 is outside the window: its auxiliary row is a unit diagonal.
        let mut e4 = vec![0.0; 5];
        e4[4] = 1.0;
        assert_eq!(systems.x.apply(&e4)[4], 1.0);
        // Net 0 couples its pins to auxiliary 3 with weight 1/3.
        let mut e3 = vec![0.0; 5];
        e3[3] = 1.0;
        assert_abs_diff_eq!(systems.x.apply(&e3)[3], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(systems.x.apply(&e3)[0], -1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn clique_edge_count_is_quadratic() {
        let (nl, pl) = single_net(
            &[
                Point::new(0.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(2.0, 0.5),
                Point::new(3.0, 2.0),
            ],
            &[0],
        );
        let systems = build_clique(&nl, &pl, 1e-3, WINDOW.0, WINDOW.1);
        // With 4 pins and pin 0 fixed, the movable block still couples every
        // movable pair; check symmetry of the assembled operator.
        let u = [0.3, -1.0, 2.0, 0.5];
        let v = [1.0, 0.25, -0.75, 2.0];
        assert_abs_diff_eq!(
            dot(&u, &systems.x.apply(&v)),
            dot(&v, &systems.x.apply(&u)),
            epsilon = 1e-12
        );
    }

    #[test]
    fn mst_and_rsmt_skip_degenerate_nets() {
        let mut b = NetlistBuilder::new();
        let c0 = b.add_cell(0, 1, Point::new(1, 1), CellFlags::MOVABLE);
        b.add_net(0, 1.0, &[(c0, Point::splat(0.0))]);
        let nl = b.finish().unwrap();
        let pl = Placement::flat(1, Point::splat(0.0));
        // min_pins = 0 admits the single-pin net; the builders must still
        // skip it rather than build an empty topology.
        let mst = build_mst(&nl, &pl, 1e-3, 0, u32::MAX);
        let rsmt = build_rsmt(&nl, &pl, 1e-3, 0, u32::MAX);
        assert_eq!(mst.x.apply(&[1.0]), vec![0.0]);
        assert_eq!(rsmt.y.apply(&[1.0]), vec![0.0]);
    }

    #[test]
    fn rsmt_square_couples_both_axes() {
        let (nl, pl) = single_net(
            &[
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(0.0, 1.0),
                Point::new(1.0, 1.0),
            ],
            &[0],
        );
        let systems = build_rsmt(&nl, &pl, 1e-3, WINDOW.0, WINDOW.1);
        // Every movable cell must be coupled on at least one axis.
        for i in 1..4 {
            let mut e = vec![0.0; 4];
            e[i] = 1.0;
            let coupled = systems.x.apply(&e)[i] != 0.0 || systems.y.apply(&e)[i] != 0.0;
            assert!(coupled, "cell {i} has no coupling");
        }
    }

    #[test]
    #[should_panic]
    fn zero_tol_is_rejected() {
        let (nl, pl) = single_net(&[Point::splat(0.0), Point::splat(1.0)], &[]);
        build_hpwlf(&nl, &pl, 0.0, 2, u32::MAX);
    }
}
