//! Analytical global placement core.
//!
//! This crate turns a netlist and a current placement into an improved
//! placement by repeatedly solving quadratic wirelength approximations and
//! reconciling the result with a rough legalizer. One outer iteration runs:
//!
//! 1. **Project** pin geometry into per-axis views ([`pins`])
//! 2. **Assemble** a wirelength model into a pair of linear systems
//!    ([`models`]), plus pulling forces toward the last legalized placement
//!    ([`anchors`])
//! 3. **Solve** both axes concurrently and write back the movable
//!    coordinates ([`solve`])
//! 4. **Legalize** through the external rough legalizer and measure the
//!    disruption ([`legalizer`])
//!
//! # Usage
//!
//! ```ignore
//! use taxis_place::{anchors, legalizer, models, solve, wirelength, Placement};
//!
//! let mut systems = models::build_hpwlf(&netlist, &lb, 1e-5, 2, u32::MAX);
//! anchors::add_b2b_pulling(&mut systems, &netlist, &ub, &lb, 0.03, 0.01);
//! solve::solve(&systems, &netlist, &mut lb, 200);
//!
//! let input = legalizer::make_rough_legalizer_input(&netlist, &lb, surface);
//! let spread = my_legalizer.spread(&input);
//! legalizer::apply_legalizer_output(&mut ub, &spread);
//! tracing::info!(hpwl = wirelength::hpwl(&netlist, &ub), "iteration done");
//! ```
//!
//! The crate is re-entrant across independent `(netlist, placement)` pairs
//! and holds no global state; the only parallelism is the two-axis fork-join
//! inside [`solve::solve`].

#![warn(missing_docs)]

pub mod anchors;
pub mod legalizer;
pub mod models;
pub mod pins;
pub mod placement;
pub mod solve;
pub mod topology;
pub mod wirelength;

pub use legalizer::{
    apply_legalizer_output, make_rough_legalizer_input, mean_linear_disruption,
    mean_quadratic_disruption, FixedCell, LegalizerInput, MovableCell, RoughLegalizer,
    SpreadPosition,
};
pub use models::{
    build_clique, build_hpwlf, build_hpwlr, build_mst, build_rsmt, build_star, empty_systems,
};
pub use placement::Placement;
pub use wirelength::{hpwl, mst_wirelength, rsmt_wirelength};
