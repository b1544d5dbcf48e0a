//! Axis-aligned boxes.

use crate::point::Point;
use serde::{Deserialize, Serialize};
use std::ops::Sub;

/// An axis-aligned box, described by its minimum and maximum corners.
///
/// Used as the legalization surface handed to the rough legalizer.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Rect<T> {
    /// The corner with the smallest coordinates.
    pub min: Point<T>,
    /// The corner with the largest coordinates.
    pub max: Point<T>,
}

impl<T> Rect<T> {
    /// Creates a box from its two corners.
    pub fn new(min: Point<T>, max: Point<T>) -> Self {
        Self { min, max }
    }
}

impl<T: Sub<Output = T> + Copy> Rect<T> {
    /// Returns the extent of the box on both axes.
    pub fn size(&self) -> Point<T> {
        Point {
            x: self.max.x - self.min.x,
            y: self.max.y - self.min.y,
        }
    }
}
