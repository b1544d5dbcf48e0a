//! The solve driver: parallel per-axis conjugate gradient and writeback.

use crate::placement::Placement;
use taxis_common::Point;
use taxis_netlist::{CellFlags, CellId, Netlist};
use taxis_solver::LinearSystem;

/// Solves both axis systems and writes the solutions into `placement`.
///
/// The two conjugate-gradient solves share no data and run concurrently;
/// both complete before writeback begins. Each guess is seeded from the
/// current placement, with auxiliary variables (rows beyond the cell count)
/// starting from zero and discarded afterwards.
///
/// Writeback honors the movability mask: a coordinate is overwritten only if
/// the cell's movability bit for that axis is set, and the written value is
/// asserted finite. Fixed-cell rows are seeded to solve back to their current
/// coordinate, so the mask keeps frozen coordinates bit-identical.
pub fn solve(
    systems: &Point<LinearSystem>,
    netlist: &Netlist,
    placement: &mut Placement,
    max_iters: usize,
) {
    let cell_cnt = netlist.cell_cnt() as usize;
    assert_eq!(placement.cell_cnt() as usize, cell_cnt);
    assert!(systems.x.internal_size() >= cell_cnt);
    assert!(systems.y.internal_size() >= cell_cnt);

    let mut x_guess = vec![0.0; systems.x.internal_size()];
    let mut y_guess = vec![0.0; systems.y.internal_size()];
    for i in 0..cell_cnt {
        x_guess[i] = placement.positions[i].x;
        y_guess[i] = placement.positions[i].y;
    }

    tracing::debug!(
        cells = cell_cnt,
        x_vars = systems.x.internal_size(),
        y_vars = systems.y.internal_size(),
        max_iters,
        "solving axis systems"
    );
    let (x_sol, y_sol) = rayon::join(
        || systems.x.solve_cg(&x_guess, max_iters),
        || systems.y.solve_cg(&y_guess, max_iters),
    );

    for i in 0..cell_cnt {
        let flags = netlist.cell(CellId::from_raw(i as u32)).flags;
        if flags.contains(CellFlags::X_MOVABLE) {
            assert!(x_sol[i].is_finite());
            placement.positions[i].x = x_sol[i];
        }
        if flags.contains(CellFlags::Y_MOVABLE) {
            assert!(y_sol[i].is_finite());
            placement.positions[i].y = y_sol[i];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{build_hpwlf, empty_systems};
    use approx::assert_abs_diff_eq;
    use taxis_netlist::NetlistBuilder;

    #[test]
    fn writeback_respects_movability_mask() {
        let mut b = NetlistBuilder::new();
        let c0 = b.add_cell(0, 1, Point::new(1, 1), CellFlags::X_MOVABLE);
        let c1 = b.add_cell(1, 1, Point::new(1, 1), CellFlags::NONE);
        b.add_net(0, 1.0, &[(c0, Point::splat(0.0)), (c1, Point::splat(0.0))]);
        let nl = b.finish().unwrap();
        let mut pl =
            Placement::from_positions(vec![Point::new(5.0, 9.0), Point::new(0.0, 0.0)]);

        let systems = build_hpwlf(&nl, &pl, 1e-3, 2, u32::MAX);
        solve(&systems, &nl, &mut pl, 100);

        // x moved toward the fixed cell; y is bit-for-bit untouched.
        assert_abs_diff_eq!(pl.positions[0].x, 0.0, epsilon = 1e-6);
        assert_eq!(pl.positions[0].y.to_bits(), 9.0_f64.to_bits());
        assert_eq!(pl.positions[1], Point::new(0.0, 0.0));
        pl.selfcheck();
    }

    #[test]
    fn auxiliary_rows_are_discarded() {
        let mut b = NetlistBuilder::new();
        let c0 = b.add_cell(0, 1, Point::new(1, 1), CellFlags::MOVABLE);
        b.add_net(0, 1.0, &[(c0, Point::splat(0.0))]);
        let nl = b.finish().unwrap();
        let mut pl = Placement::flat(1, Point::new(2.0, 3.0));

        // Star-sized systems: one auxiliary beyond the single cell.
        let mut systems = empty_systems(&nl, &pl);
        systems.x.add_variables(1);
        systems.y.add_variables(1);
        systems.x.add_triplet(1, 1, 1.0);
        systems.y.add_triplet(1, 1, 1.0);
        systems.x.add_anchor(1.0, 0, 2.0);
        systems.y.add_anchor(1.0, 0, 3.0);

        solve(&systems, &nl, &mut pl, 50);
        assert_eq!(pl.cell_cnt(), 1);
        assert_abs_diff_eq!(pl.positions[0].x, 2.0, epsilon = 1e-8);
        assert_abs_diff_eq!(pl.positions[0].y, 3.0, epsilon = 1e-8);
    }

    #[test]
    #[should_panic]
    fn undersized_system_is_a_contract_violation() {
        let mut b = NetlistBuilder::new();
        b.add_cell(0, 1, Point::new(1, 1), CellFlags::MOVABLE);
        b.add_cell(1, 1, Point::new(1, 1), CellFlags::MOVABLE);
        let nl = b.finish().unwrap();
        let mut pl = Placement::flat(2, Point::splat(0.0));
        let systems = Point::new(LinearSystem::new(1), LinearSystem::new(1));
        solve(&systems, &nl, &mut pl, 10);
    }
}
