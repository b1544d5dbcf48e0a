//! Rectilinear tree topologies over pin positions.
//!
//! The MST and RSMT wirelength models consume tree topologies built over a
//! net's pin positions. The builders here are reference implementations
//! behind the signatures the models contract: a deterministic Prim MST, and
//! a Steiner builder that is exact for up to three pins, uses a single-trunk
//! heuristic for small nets, and falls back to the MST beyond its accuracy
//! window. A stronger Steiner package can replace them without touching the
//! models.

use taxis_common::{Axis, Point};

/// Steiner accuracy used by the RSMT model and wirelength metric.
pub const RSMT_ACCURACY: usize = 8;

fn rectilinear(a: Point<f64>, b: Point<f64>) -> f64 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

fn ordered(a: usize, b: usize) -> (u32, u32) {
    (a.min(b) as u32, a.max(b) as u32)
}

/// Builds a rectilinear minimum spanning tree over `points`.
///
/// Returns `points.len() - 1` edges as `(i, j)` index pairs with `i < j`,
/// or no edges for fewer than two points. Ties are broken by index order,
/// so the result is deterministic.
pub fn mst_topology(points: &[Point<f64>]) -> Vec<(u32, u32)> {
    let n = points.len();
    if n < 2 {
        return Vec::new();
    }

    // Prim with a dense frontier; nets stay small enough for O(n^2).
    let mut in_tree = vec![false; n];
    let mut best_dist = vec![f64::INFINITY; n];
    let mut best_src = vec![0usize; n];
    in_tree[0] = true;
    for j in 1..n {
        best_dist[j] = rectilinear(points[0], points[j]);
    }

    let mut edges = Vec::with_capacity(n - 1);
    for _ in 1..n {
        let mut next = usize::MAX;
        for j in 0..n {
            if !in_tree[j] && (next == usize::MAX || best_dist[j] < best_dist[next]) {
                next = j;
            }
        }
        in_tree[next] = true;
        edges.push(ordered(best_src[next], next));
        for j in 0..n {
            if !in_tree[j] {
                let d = rectilinear(points[next], points[j]);
                if d < best_dist[j] {
                    best_dist[j] = d;
                    best_src[j] = next;
                }
            }
        }
    }
    edges
}

/// Returns the total rectilinear length of the MST over `points`.
pub fn mst_length(points: &[Point<f64>]) -> f64 {
    mst_topology(points)
        .iter()
        .map(|&(a, b)| rectilinear(points[a as usize], points[b as usize]))
        .sum()
}

/// Builds a rectilinear Steiner tree topology over `points`.
///
/// Returns one edge list per axis (`i < j` per edge); the Steiner tree may
/// share vertices between axes, so the lists are independent. `accuracy`
/// bounds the net size up to which the Steiner heuristic is attempted;
/// larger nets fall back to the MST topology on both axes.
pub fn rsmt_topology(points: &[Point<f64>], accuracy: usize) -> Point<Vec<(u32, u32)>> {
    let n = points.len();
    if n < 2 {
        return Point::new(Vec::new(), Vec::new());
    }
    if n == 2 {
        return Point::new(vec![(0, 1)], vec![(0, 1)]);
    }
    if n == 3 {
        // Three pins admit an exact Steiner point at the coordinate-wise
        // median; per axis this is the sorted chain.
        return Point::new(sorted_chain(points, Axis::X), sorted_chain(points, Axis::Y));
    }
    if n > accuracy {
        let edges = mst_topology(points);
        return Point::new(edges.clone(), edges);
    }

    // Single-trunk heuristic: a trunk along the better axis at the median of
    // the perpendicular coordinates, with one stub per pin. The trunk axis
    // gets the sorted chain; the stub axis connects every pin to the median
    // pin.
    let horizontal = trunk_length(points, Axis::X);
    let vertical = trunk_length(points, Axis::Y);
    let trunk = if horizontal <= vertical { Axis::X } else { Axis::Y };
    let stub = match trunk {
        Axis::X => Axis::Y,
        Axis::Y => Axis::X,
    };

    let median = median_index(points, stub);
    let stubs = (0..n)
        .filter(|&k| k != median)
        .map(|k| ordered(k, median))
        .collect();
    match trunk {
        Axis::X => Point::new(sorted_chain(points, Axis::X), stubs),
        Axis::Y => Point::new(stubs, sorted_chain(points, Axis::Y)),
    }
}

/// Returns the length of the Steiner tree heuristic over `points`.
///
/// Never exceeds [`mst_length`] on the same points.
pub fn rsmt_length(points: &[Point<f64>], accuracy: usize) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    if n == 2 {
        return rectilinear(points[0], points[1]);
    }
    if n == 3 {
        // Exact: the half-perimeter of the bounding box.
        return span(points, Axis::X) + span(points, Axis::Y);
    }
    let mst = mst_length(points);
    if n > accuracy {
        return mst;
    }
    let trunk = trunk_length(points, Axis::X).min(trunk_length(points, Axis::Y));
    trunk.min(mst)
}

/// Length of a single-trunk Steiner tree with the trunk running along `axis`.
fn trunk_length(points: &[Point<f64>], axis: Axis) -> f64 {
    let stub_axis = match axis {
        Axis::X => Axis::Y,
        Axis::Y => Axis::X,
    };
    let median = *points[median_index(points, stub_axis)].get(stub_axis);
    let stubs: f64 = points
        .iter()
        .map(|p| (p.get(stub_axis) - median).abs())
        .sum();
    span(points, axis) + stubs
}

/// Coordinate span of `points` along `axis`.
fn span(points: &[Point<f64>], axis: Axis) -> f64 {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for p in points {
        min = min.min(*p.get(axis));
        max = max.max(*p.get(axis));
    }
    max - min
}

/// Index of the pin with the median coordinate along `axis`.
fn median_index(points: &[Point<f64>], axis: Axis) -> usize {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| points[a].get(axis).total_cmp(points[b].get(axis)));
    order[points.len() / 2]
}

/// Chain of edges between index-adjacent pins after sorting along `axis`.
fn sorted_chain(points: &[Point<f64>], axis: Axis) -> Vec<(u32, u32)> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| points[a].get(axis).total_cmp(points[b].get(axis)));
    order.windows(2).map(|w| ordered(w[0], w[1])).collect()
}
