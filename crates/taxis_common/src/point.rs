//! Axis pairs: the [`Point`] container and the [`Axis`] selector.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Neg, Sub};

/// One of the two placement axes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Axis {
    /// The horizontal axis.
    X,
    /// The vertical axis.
    Y,
}

impl Axis {
    /// Both axes, in x-then-y order.
    pub const BOTH: [Axis; 2] = [Axis::X, Axis::Y];
}

/// A pair of per-axis values.
///
/// `Point<f64>` is a coordinate and `Point<i32>` a size, but the type is also
/// used for any object that exists once per axis: `Point<Vec<Pin1D>>` holds
/// the per-axis pin projections of a net, and `Point<LinearSystem>` the pair
/// of systems solved during a placement iteration.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Point<T> {
    /// The x component.
    pub x: T,
    /// The y component.
    pub y: T,
}

impl<T> Point<T> {
    /// Creates a point from its two components.
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    /// Returns a reference to the component on `axis`.
    pub fn get(&self, axis: Axis) -> &T {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }

    /// Returns a mutable reference to the component on `axis`.
    pub fn get_mut(&mut self, axis: Axis) -> &mut T {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
        }
    }

    /// Applies `f` to both components.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Point<U> {
        Point {
            x: f(self.x),
            y: f(self.y),
        }
    }

    /// Borrows both components.
    pub fn as_ref(&self) -> Point<&T> {
        Point {
            x: &self.x,
            y: &self.y,
        }
    }
}

impl<T: Copy> Point<T> {
    /// Creates a point with the same value on both axes.
    pub fn splat(v: T) -> Self {
        Self { x: v, y: v }
    }
}

impl<T: Add<Output = T>> Add for Point<T> {
    type Output = Point<T>;

    fn add(self, rhs: Self) -> Self {
        Point {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl<T: Sub<Output = T>> Sub for Point<T> {
    type Output = Point<T>;

    fn sub(self, rhs: Self) -> Self {
        Point {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl<T: Neg<Output = T>> Neg for Point<T> {
    type Output = Point<T>;

    fn neg(self) -> Self {
        Point {
            x: -self.x,
            y: -self.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_access() {
        let mut p = Point::new(1.0, 2.0);
        assert_eq!(*p.get(Axis::X), 1.0);
        assert_eq!(*p.get(Axis::Y), 2.0);
        *p.get_mut(Axis::Y) = 5.0;
        assert_eq!(p.y, 5.0);
    }

    #[test]
    fn map_changes_type() {
        let p = Point::new(3_i32, -4_i32);
        let q = p.map(|v| v as f64 * 2.0);
        assert_eq!(q, Point::new(6.0, -8.0));
    }

    #[test]
    fn arithmetic() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(10.0, 20.0);
        assert_eq!(a + b, Point::new(11.0, 22.0));
        assert_eq!(b - a, Point::new(9.0, 18.0));
        assert_eq!(-a, Point::new(-1.0, -2.0));
    }

    #[test]
    fn splat_both_axes() {
        let p = Point::splat(7_u32);
        assert_eq!(p.x, p.y);
    }

    #[test]
    fn per_axis_containers() {
        let mut pair: Point<Vec<u32>> = Point::default();
        for axis in Axis::BOTH {
            pair.get_mut(axis).push(1);
        }
        assert_eq!(pair.x.len(), 1);
        assert_eq!(pair.y.len(), 1);
    }

    #[test]
    fn serde_roundtrip() {
        let p = Point::new(1.5_f64, -2.5_f64);
        let json = serde_json::to_string(&p).unwrap();
        let restored: Point<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(p, restored);
    }
}
