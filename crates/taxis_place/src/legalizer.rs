//! Bridge to the external rough legalizer.
//!
//! The legalizer itself is a black box behind [`RoughLegalizer`]: it takes
//! movable cells (with areas and target positions), fixed obstacles and a
//! bounding surface, and returns spread positions that respect density.
//! This module marshals netlist and placement state across that boundary
//! and computes the disruption metrics the outer iteration uses to decide
//! convergence.

use crate::placement::Placement;
use serde::{Deserialize, Serialize};
use taxis_common::{Point, Rect};
use taxis_netlist::{CellFlags, CellId, Netlist};

/// A cell the legalizer is allowed to move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovableCell {
    /// Occupied capacity.
    pub area: i64,
    /// Target position, typically the lower-bound placement.
    pub pos: Point<f64>,
    /// Internal index of the cell in the placement.
    pub index: CellId,
}

/// A fixed obstacle the legalizer must spread around.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedCell {
    /// Width and height of the obstacle.
    pub size: Point<i32>,
    /// Position of the obstacle.
    pub pos: Point<f64>,
}

/// Everything the rough legalizer needs for one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalizerInput {
    /// The region cells are spread over.
    pub surface: Rect<i64>,
    /// Cells to spread.
    pub movable: Vec<MovableCell>,
    /// Obstacles to spread around.
    pub fixed: Vec<FixedCell>,
}

/// A spread position exported by the legalizer for one movable cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadPosition {
    /// Internal index of the cell in the placement.
    pub index: CellId,
    /// The exported position.
    pub pos: Point<f64>,
}

/// The rough legalization contract.
///
/// Implementations are pure functions of their input: same input, same
/// spread positions.
pub trait RoughLegalizer {
    /// Spreads the movable cells over the surface and exports one position
    /// per movable cell.
    fn spread(&self, input: &LegalizerInput) -> Vec<SpreadPosition>;
}

/// Partitions the circuit into legalizer input over `surface`.
///
/// A cell is movable for the legalizer if it can move on at least one axis;
/// fully pinned cells become obstacles.
pub fn make_rough_legalizer_input(
    netlist: &Netlist,
    placement: &Placement,
    surface: Rect<i64>,
) -> LegalizerInput {
    let mut movable = Vec::new();
    let mut fixed = Vec::new();
    for i in 0..netlist.cell_cnt() {
        let id = CellId::from_raw(i);
        let cell = netlist.cell(id);
        let pos = placement.pos(id);
        if cell.flags.intersects(CellFlags::MOVABLE) {
            movable.push(MovableCell {
                area: cell.area,
                pos,
                index: id,
            });
        } else {
            fixed.push(FixedCell {
                size: cell.size,
                pos,
            });
        }
    }
    LegalizerInput {
        surface,
        movable,
        fixed,
    }
}

/// Applies exported spread positions to the placement.
pub fn apply_legalizer_output(placement: &mut Placement, spread: &[SpreadPosition]) {
    for s in spread {
        assert!(s.pos.x.is_finite() && s.pos.y.is_finite());
        placement.set_pos(s.index, s.pos);
    }
}

/// Mean area-weighted rectilinear distance between two placements.
///
/// Asserts that cells which cannot move on an axis have not moved on it.
pub fn mean_linear_disruption(netlist: &Netlist, lb: &Placement, ub: &Placement) -> f64 {
    let mut tot_cost = 0.0;
    let mut tot_area = 0.0;
    for i in 0..netlist.cell_cnt() {
        let id = CellId::from_raw(i);
        let cell = netlist.cell(id);
        let diff = immobile_checked_diff(cell.flags, lb.pos(id), ub.pos(id));
        let area = cell.area as f64;
        tot_cost += area * (diff.x.abs() + diff.y.abs());
        tot_area += area;
    }
    if tot_area == 0.0 {
        return 0.0;
    }
    tot_cost / tot_area
}

/// Root of the mean area-weighted squared rectilinear distance between two
/// placements.
pub fn mean_quadratic_disruption(netlist: &Netlist, lb: &Placement, ub: &Placement) -> f64 {
    let mut tot_cost = 0.0;
    let mut tot_area = 0.0;
    for i in 0..netlist.cell_cnt() {
        let id = CellId::from_raw(i);
        let cell = netlist.cell(id);
        let diff = immobile_checked_diff(cell.flags, lb.pos(id), ub.pos(id));
        let area = cell.area as f64;
        let manhattan = diff.x.abs() + diff.y.abs();
        tot_cost += area * manhattan * manhattan;
        tot_area += area;
    }
    if tot_area == 0.0 {
        return 0.0;
    }
    (tot_cost / tot_area).sqrt()
}

fn immobile_checked_diff(flags: CellFlags, lb: Point<f64>, ub: Point<f64>) -> Point<f64> {
    let diff = lb - ub;
    if !flags.contains(CellFlags::X_MOVABLE) {
        assert_eq!(diff.x, 0.0);
    }
    if !flags.contains(CellFlags::Y_MOVABLE) {
        assert_eq!(diff.y, 0.0);
    }
    diff
}
