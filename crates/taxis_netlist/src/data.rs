//! The netlist store and its builder.
//!
//! [`Netlist`] is a struct-of-arrays circuit database. Pins are stored in
//! net-major order; `net_limits` and `cell_limits` are CSR boundary arrays
//! that partition the pin range `[0, pin_cnt)` by net and (through the
//! `cell_pins` permutation) by cell. The store is immutable once built.

use crate::flags::CellFlags;
use crate::ids::{CellId, NetId, PinId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use taxis_common::Point;

/// Attribute view of a single cell.
///
/// Returned by value from [`Netlist::cell`]; the underlying storage is
/// struct-of-arrays.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cell {
    /// Cell area, used as capacity by the legalizer and as anchor scaling.
    pub area: i64,
    /// Cell width and height.
    pub size: Point<i32>,
    /// Movability flags (plus opaque host bits).
    pub flags: CellFlags,
}

/// An error produced while building a netlist from external input.
#[derive(Debug, thiserror::Error)]
pub enum NetlistError {
    /// A pin references a cell index outside the built cell range.
    #[error("pin on net {net} references cell {cell}, but only {cell_cnt} cells exist")]
    CellOutOfRange {
        /// External ID of the offending net.
        net: u64,
        /// Raw index of the referenced cell.
        cell: u32,
        /// Number of cells in the netlist.
        cell_cnt: u32,
    },
    /// A pin offset is NaN or infinite.
    #[error("non-finite pin offset on net {net}")]
    NonFiniteOffset {
        /// External ID of the offending net.
        net: u64,
    },
    /// Two cells were registered under the same external ID.
    #[error("duplicate external cell id {0}")]
    DuplicateCellId(u64),
    /// Two nets were registered under the same external ID.
    #[error("duplicate external net id {0}")]
    DuplicateNetId(u64),
    /// A net weight is negative or non-finite.
    #[error("invalid weight {weight} on net {net}")]
    InvalidNetWeight {
        /// External ID of the offending net.
        net: u64,
        /// The rejected weight.
        weight: f64,
    },
}

/// The immutable circuit netlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Netlist {
    // Per-cell parallel arrays.
    areas: Vec<i64>,
    sizes: Vec<Point<i32>>,
    flags: Vec<CellFlags>,
    ext_cell_ids: Vec<u64>,

    // Per-net parallel arrays.
    weights: Vec<f64>,
    ext_net_ids: Vec<u64>,
    /// CSR boundaries: pins of net `i` are `net_limits[i]..net_limits[i+1]`.
    net_limits: Vec<u32>,

    // Per-pin parallel arrays, in net-major order.
    pin_cells: Vec<CellId>,
    pin_offsets: Vec<Point<f64>>,

    /// CSR boundaries: pins of cell `c` are the `cell_pins` slots
    /// `cell_limits[c]..cell_limits[c+1]`.
    cell_limits: Vec<u32>,
    /// Permutation of `[0, pin_cnt)` grouping pins by owning cell.
    cell_pins: Vec<PinId>,

    /// Auxiliary index: external cell ID to internal (rebuilt on deserialization).
    #[serde(skip)]
    cell_by_ext: HashMap<u64, CellId>,
    /// Auxiliary index: external net ID to internal (rebuilt on deserialization).
    #[serde(skip)]
    net_by_ext: HashMap<u64, NetId>,
}

impl Netlist {
    /// Returns the number of cells.
    pub fn cell_cnt(&self) -> u32 {
        self.areas.len() as u32
    }

    /// Returns the number of nets.
    pub fn net_cnt(&self) -> u32 {
        self.weights.len() as u32
    }

    /// Returns the number of pins.
    pub fn pin_cnt(&self) -> u32 {
        self.pin_cells.len() as u32
    }

    /// Returns the attribute view of a cell.
    pub fn cell(&self, id: CellId) -> Cell {
        let i = id.as_raw() as usize;
        Cell {
            area: self.areas[i],
            size: self.sizes[i],
            flags: self.flags[i],
        }
    }

    /// Returns the weight of a net.
    pub fn net_weight(&self, id: NetId) -> f64 {
        self.weights[id.as_raw() as usize]
    }

    /// Returns the number of pins on a net.
    pub fn net_pin_cnt(&self, id: NetId) -> u32 {
        let i = id.as_raw() as usize;
        self.net_limits[i + 1] - self.net_limits[i]
    }

    /// Iterates over the pins of a net, in the order they were registered.
    pub fn net_pins(&self, id: NetId) -> impl Iterator<Item = (CellId, Point<f64>)> + '_ {
        let i = id.as_raw() as usize;
        let range = self.net_limits[i] as usize..self.net_limits[i + 1] as usize;
        range.map(move |p| (self.pin_cells[p], self.pin_offsets[p]))
    }

    /// Returns the pins owned by a cell.
    pub fn cell_pins(&self, id: CellId) -> &[PinId] {
        let i = id.as_raw() as usize;
        &self.cell_pins[self.cell_limits[i] as usize..self.cell_limits[i + 1] as usize]
    }

    /// Returns the cell owning a pin.
    pub fn pin_cell(&self, id: PinId) -> CellId {
        self.pin_cells[id.as_raw() as usize]
    }

    /// Returns the offset of a pin from its cell's reference point.
    pub fn pin_offset(&self, id: PinId) -> Point<f64> {
        self.pin_offsets[id.as_raw() as usize]
    }

    /// Returns the external ID of a cell.
    pub fn cell_ext_id(&self, id: CellId) -> u64 {
        self.ext_cell_ids[id.as_raw() as usize]
    }

    /// Returns the external ID of a net.
    pub fn net_ext_id(&self, id: NetId) -> u64 {
        self.ext_net_ids[id.as_raw() as usize]
    }

    /// Looks up a cell by its external ID.
    pub fn cell_by_ext(&self, ext: u64) -> Option<CellId> {
        self.cell_by_ext.get(&ext).copied()
    }

    /// Looks up a net by its external ID.
    pub fn net_by_ext(&self, ext: u64) -> Option<NetId> {
        self.net_by_ext.get(&ext).copied()
    }

    /// Sum of all cell areas.
    pub fn total_area(&self) -> i64 {
        self.areas.iter().sum()
    }

    /// Rebuilds the external-ID indices after deserialization.
    pub fn rebuild_indices(&mut self) {
        self.cell_by_ext.clear();
        for (i, &ext) in self.ext_cell_ids.iter().enumerate() {
            self.cell_by_ext.insert(ext, CellId::from_raw(i as u32));
        }
        self.net_by_ext.clear();
        for (i, &ext) in self.ext_net_ids.iter().enumerate() {
            self.net_by_ext.insert(ext, NetId::from_raw(i as u32));
        }
    }

    /// Validates the structural invariants of the store.
    ///
    /// Failures are contract violations (a bug in the builder or in a
    /// deserialized payload), not recoverable conditions.
    pub fn selfcheck(&self) {
        let cell_cnt = self.areas.len();
        assert_eq!(cell_cnt + 1, self.cell_limits.len());
        assert_eq!(cell_cnt, self.sizes.len());
        assert_eq!(cell_cnt, self.flags.len());
        assert_eq!(cell_cnt, self.ext_cell_ids.len());
        assert_eq!(cell_cnt, self.cell_by_ext.len());

        let net_cnt = self.weights.len();
        assert_eq!(net_cnt + 1, self.net_limits.len());
        assert_eq!(net_cnt, self.ext_net_ids.len());
        assert_eq!(net_cnt, self.net_by_ext.len());

        let pin_cnt = self.pin_cells.len();
        assert_eq!(pin_cnt, self.pin_offsets.len());
        assert_eq!(pin_cnt, self.cell_pins.len());

        // Boundary arrays partition [0, pin_cnt).
        assert_eq!(self.net_limits[0], 0);
        assert_eq!(*self.net_limits.last().unwrap() as usize, pin_cnt);
        assert!(self.net_limits.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(self.cell_limits[0], 0);
        assert_eq!(*self.cell_limits.last().unwrap() as usize, pin_cnt);
        assert!(self.cell_limits.windows(2).all(|w| w[0] <= w[1]));

        // The cell-major view is a permutation of the pin range and agrees
        // with pin ownership.
        let mut seen = vec![false; pin_cnt];
        for c in 0..cell_cnt {
            for slot in self.cell_limits[c] as usize..self.cell_limits[c + 1] as usize {
                let pin = self.cell_pins[slot].as_raw() as usize;
                assert!(!seen[pin]);
                seen[pin] = true;
                assert_eq!(self.pin_cells[pin].as_raw() as usize, c);
            }
        }
        assert!(seen.iter().all(|&s| s));

        for p in &self.pin_offsets {
            assert!(p.x.is_finite() && p.y.is_finite());
        }
        for (&ext, &id) in &self.cell_by_ext {
            assert_eq!(self.ext_cell_ids[id.as_raw() as usize], ext);
        }
        for (&ext, &id) in &self.net_by_ext {
            assert_eq!(self.ext_net_ids[id.as_raw() as usize], ext);
        }
    }
}

/// Accumulates cells and nets, then freezes them into a [`Netlist`].
#[derive(Debug)]
pub struct NetlistBuilder {
    areas: Vec<i64>,
    sizes: Vec<Point<i32>>,
    flags: Vec<CellFlags>,
    ext_cell_ids: Vec<u64>,

    weights: Vec<f64>,
    ext_net_ids: Vec<u64>,
    net_limits: Vec<u32>,

    pin_cells: Vec<CellId>,
    pin_offsets: Vec<Point<f64>>,
}

impl Default for NetlistBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NetlistBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            areas: Vec::new(),
            sizes: Vec::new(),
            flags: Vec::new(),
            ext_cell_ids: Vec::new(),
            weights: Vec::new(),
            ext_net_ids: Vec::new(),
            net_limits: vec![0],
            pin_cells: Vec::new(),
            pin_offsets: Vec::new(),
        }
    }

    /// Registers a cell and returns its internal ID.
    pub fn add_cell(&mut self, ext_id: u64, area: i64, size: Point<i32>, flags: CellFlags) -> CellId {
        let id = CellId::from_raw(self.areas.len() as u32);
        self.areas.push(area);
        self.sizes.push(size);
        self.flags.push(flags);
        self.ext_cell_ids.push(ext_id);
        id
    }

    /// Registers a net with its pins and returns its internal ID.
    ///
    /// Each pin is an `(owning cell, offset)` pair; pin order is preserved.
    pub fn add_net(&mut self, ext_id: u64, weight: f64, pins: &[(CellId, Point<f64>)]) -> NetId {
        let id = NetId::from_raw(self.weights.len() as u32);
        self.weights.push(weight);
        self.ext_net_ids.push(ext_id);
        for &(cell, offset) in pins {
            self.pin_cells.push(cell);
            self.pin_offsets.push(offset);
        }
        self.net_limits.push(self.pin_cells.len() as u32);
        id
    }

    /// Validates the accumulated input and freezes it into a [`Netlist`].
    pub fn finish(self) -> Result<Netlist, NetlistError> {
        let cell_cnt = self.areas.len() as u32;

        // Validate pin references, offsets and weights net by net.
        for n in 0..self.weights.len() {
            let ext = self.ext_net_ids[n];
            let weight = self.weights[n];
            if !(weight.is_finite() && weight >= 0.0) {
                return Err(NetlistError::InvalidNetWeight { net: ext, weight });
            }
            for p in self.net_limits[n] as usize..self.net_limits[n + 1] as usize {
                let cell = self.pin_cells[p].as_raw();
                if cell >= cell_cnt {
                    return Err(NetlistError::CellOutOfRange { net: ext, cell, cell_cnt });
                }
                let offset = self.pin_offsets[p];
                if !(offset.x.is_finite() && offset.y.is_finite()) {
                    return Err(NetlistError::NonFiniteOffset { net: ext });
                }
            }
        }

        // Group pins by owning cell with a counting sort; the second pass
        // preserves net-major pin order within each cell.
        let pin_cnt = self.pin_cells.len();
        let mut cell_limits = vec![0u32; cell_cnt as usize + 1];
        for cell in &self.pin_cells {
            cell_limits[cell.as_raw() as usize + 1] += 1;
        }
        for i in 1..cell_limits.len() {
            cell_limits[i] += cell_limits[i - 1];
        }
        let mut cursor = cell_limits.clone();
        let mut cell_pins = vec![PinId::from_raw(0); pin_cnt];
        for (p, cell) in self.pin_cells.iter().enumerate() {
            let slot = &mut cursor[cell.as_raw() as usize];
            cell_pins[*slot as usize] = PinId::from_raw(p as u32);
            *slot += 1;
        }

        let mut netlist = Netlist {
            areas: self.areas,
            sizes: self.sizes,
            flags: self.flags,
            ext_cell_ids: self.ext_cell_ids,
            weights: self.weights,
            ext_net_ids: self.ext_net_ids,
            net_limits: self.net_limits,
            pin_cells: self.pin_cells,
            pin_offsets: self.pin_offsets,
            cell_limits,
            cell_pins,
            cell_by_ext: HashMap::new(),
            net_by_ext: HashMap::new(),
        };
        netlist.rebuild_indices();
        if netlist.cell_by_ext.len() != netlist.ext_cell_ids.len() {
            let dup = first_duplicate(&netlist.ext_cell_ids);
            return Err(NetlistError::DuplicateCellId(dup));
        }
        if netlist.net_by_ext.len() != netlist.ext_net_ids.len() {
            let dup = first_duplicate(&netlist.ext_net_ids);
            return Err(NetlistError::DuplicateNetId(dup));
        }
        Ok(netlist)
    }
}

fn first_duplicate(ids: &[u64]) -> u64 {
    let mut seen = std::collections::HashSet::new();
    for &id in ids {
        if !seen.insert(id) {
            return id;
        }
    }
    unreachable!("caller established a duplicate exists")
}
