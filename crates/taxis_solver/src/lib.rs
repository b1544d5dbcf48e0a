//! Sparse symmetric linear systems for analytical placement.
//!
//! A placement iteration lowers every net into Laplacian edges and anchor
//! terms of a symmetric, diagonally dominant (hence positive semi-definite)
//! system per axis. [`LinearSystem`] is the accumulator for those terms and
//! owns the conjugate-gradient solve; it is built fresh for each iteration
//! and never retained across solves.
//!
//! The accumulator records coordinate-form entries; [`LinearSystem::solve_cg`]
//! assembles them into a CSR matrix (summing duplicates) and runs a
//! Jacobi-preconditioned conjugate gradient. Convergence is deterministic for
//! fixed inputs, and hitting the iteration cap is not an error: the caller
//! writes back whatever the solver produced.

#![warn(missing_docs)]

mod csr;
mod system;

pub use system::LinearSystem;
