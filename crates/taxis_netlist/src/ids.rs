//! Dense index newtypes for netlist entities.
//!
//! The netlist is struct-of-arrays: cells, nets and pins each live in
//! parallel vectors, and [`CellId`], [`NetId`] and [`PinId`] are the `u32`
//! indices into them. Keeping the three index spaces as distinct types stops
//! a pin index from ever being used to look up a cell. All of them are
//! `Copy`, ordered by storage position, hashable, and serializable.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Wraps a raw array index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Unwraps to the raw array index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Index into the netlist's per-cell arrays.
    CellId
);

define_id!(
    /// Index into the netlist's per-net arrays.
    NetId
);

define_id!(
    /// Index into the netlist's net-major pin arrays.
    PinId
);
