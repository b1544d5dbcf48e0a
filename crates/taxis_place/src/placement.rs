//! Mutable placement state.

use serde::{Deserialize, Serialize};
use taxis_common::Point;
use taxis_netlist::CellId;

/// Per-cell positions and orientations.
///
/// The mutable counterpart of the immutable netlist: one position and one
/// orientation vector per cell, indexed by [`CellId`]. Every coordinate is
/// finite at every observable moment; [`selfcheck`](Self::selfcheck) asserts
/// it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Cell positions, indexed by cell internal index.
    pub positions: Vec<Point<f64>>,
    /// Cell orientation vectors (`±1` per axis for mirroring).
    pub orientations: Vec<Point<f64>>,
}

impl Placement {
    /// Creates a placement with every cell at `pos`, unmirrored.
    pub fn flat(cell_cnt: u32, pos: Point<f64>) -> Self {
        Self {
            positions: vec![pos; cell_cnt as usize],
            orientations: vec![Point::splat(1.0); cell_cnt as usize],
        }
    }

    /// Creates a placement from explicit positions, unmirrored.
    pub fn from_positions(positions: Vec<Point<f64>>) -> Self {
        let orientations = vec![Point::splat(1.0); positions.len()];
        Self {
            positions,
            orientations,
        }
    }

    /// Returns the number of placed cells.
    pub fn cell_cnt(&self) -> u32 {
        self.positions.len() as u32
    }

    /// Returns the position of a cell.
    pub fn pos(&self, cell: CellId) -> Point<f64> {
        self.positions[cell.as_raw() as usize]
    }

    /// Overwrites the position of a cell.
    pub fn set_pos(&mut self, cell: CellId, pos: Point<f64>) {
        self.positions[cell.as_raw() as usize] = pos;
    }

    /// Asserts that every coordinate is finite.
    pub fn selfcheck(&self) {
        assert_eq!(self.positions.len(), self.orientations.len());
        for p in &self.positions {
            assert!(p.x.is_finite() && p.y.is_finite());
        }
        for o in &self.orientations {
            assert!(o.x.is_finite() && o.y.is_finite());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_placement() {
        let pl = Placement::flat(3, Point::new(1.0, 2.0));
        assert_eq!(pl.cell_cnt(), 3);
        assert_eq!(pl.pos(CellId::from_raw(2)), Point::new(1.0, 2.0));
        assert_eq!(pl.orientations[0], Point::splat(1.0));
        pl.selfcheck();
    }

    #[test]
    fn set_pos_overwrites() {
        let mut pl = Placement::flat(2, Point::splat(0.0));
        pl.set_pos(CellId::from_raw(1), Point::new(-3.0, 4.0));
        assert_eq!(pl.pos(CellId::from_raw(1)), Point::new(-3.0, 4.0));
        assert_eq!(pl.pos(CellId::from_raw(0)), Point::splat(0.0));
    }

    #[test]
    #[should_panic]
    fn selfcheck_rejects_nan() {
        let pl = Placement::from_positions(vec![Point::new(f64::NAN, 0.0)]);
        pl.selfcheck();
    }

    #[test]
    fn serde_roundtrip() {
        let pl = Placement::from_positions(vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)]);
        let json = serde_json::to_string(&pl).unwrap();
        let restored: Placement = serde_json::from_str(&json).unwrap();
        assert_eq!(pl, restored);
    }
}
