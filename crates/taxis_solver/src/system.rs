//! The linear-system accumulator and its conjugate-gradient solve.

use crate::csr::Csr;

/// Relative residual at which the conjugate gradient stops early.
const CG_TOLERANCE: f64 = 1e-10;

/// A symmetric, diagonally dominant linear system under construction.
///
/// Force-directed placement only ever adds three kinds of terms: Laplacian
/// edges between two variables, anchors pulling a variable toward a fixed
/// target, and raw right-hand-side contributions. The accumulator records
/// them in coordinate form; assembly happens inside [`solve_cg`](Self::solve_cg).
#[derive(Debug, Clone)]
pub struct LinearSystem {
    size: usize,
    entries: Vec<(u32, u32, f64)>,
    rhs: Vec<f64>,
}

impl LinearSystem {
    /// Creates an empty system over `size` variables.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            entries: Vec::new(),
            rhs: vec![0.0; size],
        }
    }

    /// Returns the current number of variables.
    pub fn internal_size(&self) -> usize {
        self.size
    }

    /// Enlarges the system by `k` fresh variables.
    ///
    /// Used by the star wirelength model for its per-net auxiliary variables.
    pub fn add_variables(&mut self, k: usize) {
        self.size += k;
        self.rhs.resize(self.size, 0.0);
    }

    /// Adds a Laplacian edge of weight `w` between variables `i` and `j`.
    ///
    /// With `i == j` this degenerates to a plain diagonal contribution,
    /// which is how fixed variables and stabilizing unit diagonals are
    /// seeded.
    pub fn add_triplet(&mut self, i: u32, j: u32, w: f64) {
        debug_assert!((i as usize) < self.size && (j as usize) < self.size);
        if i == j {
            self.entries.push((i, i, w));
        } else {
            self.entries.push((i, i, w));
            self.entries.push((j, j, w));
            self.entries.push((i, j, -w));
            self.entries.push((j, i, -w));
        }
    }

    /// Adds `b` to the right-hand side at row `i`.
    pub fn add_doublet(&mut self, i: u32, b: f64) {
        debug_assert!((i as usize) < self.size);
        self.rhs[i as usize] += b;
    }

    /// Pulls variable `i` toward `target` with stiffness `w`.
    pub fn add_anchor(&mut self, w: f64, i: u32, target: f64) {
        self.add_triplet(i, i, w);
        self.add_doublet(i, w * target);
    }

    /// Connects movable variable `i` (pin offset `mov_offset`) to a fixed
    /// location `fixed_pos` with stiffness `w`.
    pub fn add_fixed_force(&mut self, w: f64, i: u32, fixed_pos: f64, mov_offset: f64) {
        self.add_triplet(i, i, w);
        self.add_doublet(i, w * (fixed_pos - mov_offset));
    }

    /// Connects movable variables `i` and `j`, whose pins sit at offsets
    /// `off_i` and `off_j` from their cell origins, with stiffness `w`.
    pub fn add_force(&mut self, w: f64, i: u32, j: u32, off_i: f64, off_j: f64) {
        self.add_triplet(i, j, w);
        self.add_doublet(i, w * (off_j - off_i));
        self.add_doublet(j, w * (off_i - off_j));
    }

    /// Multiplies the assembled matrix by `x`.
    ///
    /// Assembles on every call; meant for diagnostics and property tests on
    /// small instances, not for the solve path.
    pub fn apply(&self, x: &[f64]) -> Vec<f64> {
        assert_eq!(x.len(), self.size);
        let matrix = Csr::from_entries(self.size, &self.entries);
        let mut out = vec![0.0; self.size];
        matrix.mul_vec(x, &mut out);
        out
    }

    /// Returns the accumulated right-hand side.
    pub fn rhs(&self) -> &[f64] {
        &self.rhs
    }

    /// Solves the system by Jacobi-preconditioned conjugate gradient.
    ///
    /// Starts from `guess` and runs at most `max_iters` iterations, stopping
    /// early once the residual has shrunk below a relative tolerance.
    /// Non-convergence within the cap is not an error; the best iterate so
    /// far is returned. The result is deterministic for fixed inputs.
    pub fn solve_cg(&self, guess: &[f64], max_iters: usize) -> Vec<f64> {
        assert_eq!(guess.len(), self.size);
        let matrix = Csr::from_entries(self.size, &self.entries);
        let diag = matrix.diagonal();
        // Variables with an empty row have a zero residual as well; a unit
        // preconditioner entry keeps them exactly at their guess.
        let inv_diag: Vec<f64> = diag
            .iter()
            .map(|&d| if d > 0.0 { 1.0 / d } else { 1.0 })
            .collect();

        let mut x = guess.to_vec();
        let mut r = vec![0.0; self.size];
        matrix.mul_vec(&x, &mut r);
        for i in 0..self.size {
            r[i] = self.rhs[i] - r[i];
        }

        let threshold = CG_TOLERANCE * norm(&self.rhs).max(1.0);
        let mut z: Vec<f64> = r.iter().zip(&inv_diag).map(|(ri, di)| ri * di).collect();
        let mut p = z.clone();
        let mut rz = dot(&r, &z);
        let mut ap = vec![0.0; self.size];

        let mut iters = 0;
        for _ in 0..max_iters {
            if norm(&r) <= threshold {
                break;
            }
            iters += 1;

            matrix.mul_vec(&p, &mut ap);
            let pap = dot(&p, &ap);
            if pap <= 0.0 {
                // Numerical breakdown on a semi-definite direction; keep the
                // current iterate.
                break;
            }
            let alpha = rz / pap;
            for i in 0..self.size {
                x[i] += alpha * p[i];
                r[i] -= alpha * ap[i];
            }

            for i in 0..self.size {
                z[i] = r[i] * inv_diag[i];
            }
            let rz_next = dot(&r, &z);
            let beta = rz_next / rz;
            rz = rz_next;
            for i in 0..self.size {
                p[i] = z[i] + beta * p[i];
            }
        }

        tracing::debug!(
            size = self.size,
            iters,
            residual = norm(&r),
            "conjugate gradient finished"
        );
        x
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn norm(v: &[f64]) -> f64 {
    dot(v, v).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn empty_system_returns_guess() {
        let sys = LinearSystem::new(3);
        let sol = sys.solve_cg(&[1.0, 2.0, 3.0], 10);
        assert_eq!(sol, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn single_anchor_moves_to_target() {
        let mut sys = LinearSystem::new(1);
        sys.add_anchor(2.0, 0, 7.5);
        let sol = sys.solve_cg(&[0.0], 10);
        assert_abs_diff_eq!(sol[0], 7.5, epsilon = 1e-9);
    }

    #[test]
    fn laplacian_edge_with_fixed_end() {
        // Variable 1 pinned at 4.0, edge of weight 1 pulling variable 0 onto it.
        let mut sys = LinearSystem::new(2);
        sys.add_triplet(1, 1, 1.0);
        sys.add_doublet(1, 4.0);
        sys.add_force(1.0, 0, 1, 0.0, 0.0);
        let sol = sys.solve_cg(&[0.0, 4.0], 50);
        assert_abs_diff_eq!(sol[0], 4.0, epsilon = 1e-6);
        assert_abs_diff_eq!(sol[1], 4.0, epsilon = 1e-6);
    }

    #[test]
    fn fixed_force_is_an_offset_anchor() {
        // Pin offset 0.5 on the movable end, fixed end at 3.0: the cell
        // origin settles at 2.5.
        let mut sys = LinearSystem::new(1);
        sys.add_fixed_force(1.0, 0, 3.0, 0.5);
        let sol = sys.solve_cg(&[0.0], 10);
        assert_abs_diff_eq!(sol[0], 2.5, epsilon = 1e-9);
    }

    #[test]
    fn force_offsets_shift_the_optimum() {
        // Two variables joined pin-to-pin with offsets 1.0 and -1.0; one end
        // anchored. At the optimum the pin positions coincide:
        // x0 + 1 == x1 - 1.
        let mut sys = LinearSystem::new(2);
        sys.add_anchor(100.0, 0, 0.0);
        sys.add_force(1.0, 0, 1, 1.0, -1.0);
        let sol = sys.solve_cg(&[0.0, 0.0], 50);
        assert_abs_diff_eq!(sol[0] + 1.0, sol[1] - 1.0, epsilon = 1e-6);
    }

    #[test]
    fn add_variables_extends_rhs() {
        let mut sys = LinearSystem::new(2);
        sys.add_variables(3);
        assert_eq!(sys.internal_size(), 5);
        assert_eq!(sys.rhs().len(), 5);
        sys.add_anchor(1.0, 4, 1.0);
        let sol = sys.solve_cg(&[0.0; 5], 10);
        assert_abs_diff_eq!(sol[4], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn assembled_matrix_is_symmetric() {
        let mut sys = LinearSystem::new(4);
        sys.add_force(1.5, 0, 2, 0.1, -0.2);
        sys.add_force(0.25, 1, 3, 0.0, 0.0);
        sys.add_anchor(2.0, 2, 5.0);
        sys.add_triplet(3, 3, 1.0);

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..8 {
            let u: Vec<f64> = (0..4).map(|_| rng.gen_range(-1.0..1.0)).collect();
            let v: Vec<f64> = (0..4).map(|_| rng.gen_range(-1.0..1.0)).collect();
            let uav = dot(&u, &sys.apply(&v));
            let vau = dot(&v, &sys.apply(&u));
            assert_abs_diff_eq!(uav, vau, epsilon = 1e-12);
        }
    }

    #[test]
    fn convergence_is_deterministic() {
        let mut sys = LinearSystem::new(3);
        sys.add_anchor(1.0, 0, 1.0);
        sys.add_force(0.5, 0, 1, 0.0, 0.0);
        sys.add_force(0.5, 1, 2, 0.0, 0.0);
        let a = sys.solve_cg(&[0.0, 0.0, 0.0], 100);
        let b = sys.solve_cg(&[0.0, 0.0, 0.0], 100);
        assert_eq!(a, b);
    }

    #[test]
    fn iteration_cap_is_respected() {
        // A chain long enough that one iteration cannot converge; the result
        // must still be finite and usable.
        let n = 50;
        let mut sys = LinearSystem::new(n);
        sys.add_anchor(1.0, 0, 1.0);
        for i in 0..(n as u32 - 1) {
            sys.add_force(1.0, i, i + 1, 0.0, 0.0);
        }
        let sol = sys.solve_cg(&vec![0.0; n], 1);
        assert!(sol.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn solution_of_tridiagonal_system() {
        // Anchors at both ends of a 3-chain; interior settles at the mean.
        let mut sys = LinearSystem::new(3);
        sys.add_anchor(1.0, 0, 0.0);
        sys.add_anchor(1.0, 2, 6.0);
        sys.add_force(1.0, 0, 1, 0.0, 0.0);
        sys.add_force(1.0, 1, 2, 0.0, 0.0);
        let sol = sys.solve_cg(&[0.0, 0.0, 0.0], 100);
        // Exact solution: x = [1.5, 3.0, 4.5].
        assert_abs_diff_eq!(sol[0], 1.5, epsilon = 1e-6);
        assert_abs_diff_eq!(sol[1], 3.0, epsilon = 1e-6);
        assert_abs_diff_eq!(sol[2], 4.5, epsilon = 1e-6);
    }
}
