// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Square-lattice geometry: points, unit steps, and the eight-element point
//! group used by pivot moves.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

// ---------------------------------------------------------------------------
// LatticePoint
// ---------------------------------------------------------------------------

/// A site of the 2D square lattice.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct LatticePoint {
    pub x: i32,
    pub y: i32,
}

impl LatticePoint {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance between two sites.
    pub fn manhattan(self, other: LatticePoint) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl Add for LatticePoint {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for LatticePoint {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(i32, i32)> for LatticePoint {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for LatticePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Unit steps of the square lattice. Candidate enumeration and exact
/// counting both walk this array in order, so reordering it changes which
/// candidate a given random draw selects.
pub const STEPS: [LatticePoint; 4] = [
    LatticePoint::new(1, 0),
    LatticePoint::new(-1, 0),
    LatticePoint::new(0, 1),
    LatticePoint::new(0, -1),
];

/// Coordination number of the square lattice.
pub const COORDINATION: usize = STEPS.len();

// ---------------------------------------------------------------------------
// Symmetry
// ---------------------------------------------------------------------------

/// The point group of the square lattice (dihedral group of order 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symmetry {
    Identity,
    Rotate90,
    Rotate180,
    Rotate270,
    /// Reflection across the x-axis.
    ReflectX,
    /// Reflection across the y-axis.
    ReflectY,
    /// Reflection across the line `y = x`.
    ReflectDiagonal,
    /// Reflection across the line `y = -x`.
    ReflectAntiDiagonal,
}

impl Symmetry {
    pub const ALL: [Symmetry; 8] = [
        Symmetry::Identity,
        Symmetry::Rotate90,
        Symmetry::Rotate180,
        Symmetry::Rotate270,
        Symmetry::ReflectX,
        Symmetry::ReflectY,
        Symmetry::ReflectDiagonal,
        Symmetry::ReflectAntiDiagonal,
    ];

    /// Every element except the identity; pivot proposals draw from these.
    pub const NON_IDENTITY: [Symmetry; 7] = [
        Symmetry::Rotate90,
        Symmetry::Rotate180,
        Symmetry::Rotate270,
        Symmetry::ReflectX,
        Symmetry::ReflectY,
        Symmetry::ReflectDiagonal,
        Symmetry::ReflectAntiDiagonal,
    ];

    /// Apply the symmetry to a displacement vector.
    pub fn apply(self, v: LatticePoint) -> LatticePoint {
        let (x, y) = (v.x, v.y);
        match self {
            Self::Identity => LatticePoint::new(x, y),
            Self::Rotate90 => LatticePoint::new(-y, x),
            Self::Rotate180 => LatticePoint::new(-x, -y),
            Self::Rotate270 => LatticePoint::new(y, -x),
            Self::ReflectX => LatticePoint::new(x, -y),
            Self::ReflectY => LatticePoint::new(-x, y),
            Self::ReflectDiagonal => LatticePoint::new(y, x),
            Self::ReflectAntiDiagonal => LatticePoint::new(-y, -x),
        }
    }

    /// Apply the symmetry to `point`, holding `pivot` fixed.
    pub fn apply_about(self, pivot: LatticePoint, point: LatticePoint) -> LatticePoint {
        pivot + self.apply(point - pivot)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetries_preserve_adjacency() {
        let a = LatticePoint::new(2, 5);
        let b = LatticePoint::new(2, 6);
        let pivot = LatticePoint::new(-1, 4);
        for sym in Symmetry::ALL {
            let (ta, tb) = (sym.apply_about(pivot, a), sym.apply_about(pivot, b));
            assert_eq!(ta.manhattan(tb), 1, "{sym:?} broke adjacency");
            assert_eq!(sym.apply_about(pivot, pivot), pivot);
        }
    }

    #[test]
    fn non_identity_elements_move_a_generic_point() {
        let p = LatticePoint::new(1, 2);
        for sym in Symmetry::NON_IDENTITY {
            assert_ne!(sym.apply(p), p, "{sym:?} fixed a generic point");
        }
    }

    #[test]
    fn group_images_of_a_generic_point_are_distinct() {
        let p = LatticePoint::new(1, 2);
        let mut images: Vec<_> = Symmetry::ALL.iter().map(|s| s.apply(p)).collect();
        images.sort();
        images.dedup();
        assert_eq!(images.len(), 8);
    }
}
