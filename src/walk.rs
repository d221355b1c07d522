// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Walk model and the step candidate enumerator.
//!
//! Every grower and the pivot sampler's atmosphere measurement answer
//! "which neighbours of the endpoint are still free?" through
//! [`candidate_steps`]. Occupancy is abstracted behind [`Occupancy`] so the
//! same enumerator runs against a growth walk's visited set and against the
//! pivot chain's position index.

use std::collections::{HashMap, HashSet};

use crate::lattice::{LatticePoint, COORDINATION, STEPS};

// ---------------------------------------------------------------------------
// Occupancy
// ---------------------------------------------------------------------------

/// Membership test for lattice sites already taken by a walk.
pub trait Occupancy {
    fn is_occupied(&self, point: LatticePoint) -> bool;
}

impl Occupancy for HashSet<LatticePoint> {
    fn is_occupied(&self, point: LatticePoint) -> bool {
        self.contains(&point)
    }
}

impl<V> Occupancy for HashMap<LatticePoint, V> {
    fn is_occupied(&self, point: LatticePoint) -> bool {
        self.contains_key(&point)
    }
}

/// Set of sites visited by a walk under growth.
pub type VisitedSet = HashSet<LatticePoint>;

// ---------------------------------------------------------------------------
// Step candidate enumerator
// ---------------------------------------------------------------------------

/// Free neighbours of an endpoint, at most [`COORDINATION`] of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidates {
    points: [LatticePoint; COORDINATION],
    len: usize,
}

impl Candidates {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[LatticePoint] {
        &self.points[..self.len]
    }
}

/// Neighbours of `endpoint` not yet occupied, in [`STEPS`] order.
///
/// An empty result means the walk is trapped.
pub fn candidate_steps<O: Occupancy + ?Sized>(endpoint: LatticePoint, occupied: &O) -> Candidates {
    let mut candidates = Candidates {
        points: [endpoint; COORDINATION],
        len: 0,
    };
    for step in STEPS {
        let next = endpoint + step;
        if !occupied.is_occupied(next) {
            candidates.points[candidates.len] = next;
            candidates.len += 1;
        }
    }
    candidates
}

/// Number of single-step elongations available at `endpoint`.
pub fn atmosphere<O: Occupancy + ?Sized>(endpoint: LatticePoint, occupied: &O) -> usize {
    candidate_steps(endpoint, occupied).len()
}

// ---------------------------------------------------------------------------
// Walk
// ---------------------------------------------------------------------------

/// An ordered self-avoiding walk together with its visited set.
///
/// The two are only mutated together through [`Walk::extend`] and
/// [`Walk::retract`], so they cannot drift apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Walk {
    points: Vec<LatticePoint>,
    visited: VisitedSet,
}

impl Walk {
    /// A zero-step walk sitting at `start`.
    pub fn new(start: LatticePoint) -> Self {
        Self::with_capacity(start, 0)
    }

    /// A zero-step walk with room for `steps` more sites.
    pub fn with_capacity(start: LatticePoint, steps: usize) -> Self {
        let mut points = Vec::with_capacity(steps + 1);
        let mut visited = VisitedSet::with_capacity(steps + 1);
        points.push(start);
        visited.insert(start);
        Self { points, visited }
    }

    pub fn from_origin() -> Self {
        Self::new(LatticePoint::ORIGIN)
    }

    /// Build a walk from explicit sites. Returns `None` unless the sequence is
    /// non-empty, nearest-neighbour connected and self-avoiding.
    pub fn from_points(points: &[LatticePoint]) -> Option<Self> {
        let (&start, rest) = points.split_first()?;
        let mut walk = Self::with_capacity(start, rest.len());
        for &p in rest {
            if !walk.extend(p) {
                return None;
            }
        }
        Some(walk)
    }

    /// Number of steps (sites minus one).
    pub fn steps(&self) -> usize {
        self.points.len() - 1
    }

    pub fn points(&self) -> &[LatticePoint] {
        &self.points
    }

    pub fn endpoint(&self) -> LatticePoint {
        self.points[self.points.len() - 1]
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    /// Free continuations of the endpoint.
    pub fn candidates(&self) -> Candidates {
        candidate_steps(self.endpoint(), &self.visited)
    }

    /// Append `next` if it is an unoccupied neighbour of the endpoint.
    pub fn extend(&mut self, next: LatticePoint) -> bool {
        if self.endpoint().manhattan(next) != 1 || !self.visited.insert(next) {
            return false;
        }
        self.points.push(next);
        true
    }

    /// Remove the endpoint. The starting site is never removed.
    pub fn retract(&mut self) -> Option<LatticePoint> {
        if self.points.len() == 1 {
            return None;
        }
        let last = self.points.pop()?;
        self.visited.remove(&last);
        Some(last)
    }
}

impl Occupancy for Walk {
    fn is_occupied(&self, point: LatticePoint) -> bool {
        self.visited.contains(&point)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(i32, i32)]) -> Vec<LatticePoint> {
        raw.iter().copied().map(LatticePoint::from).collect()
    }

    #[test]
    fn fresh_walk_has_four_candidates() {
        let walk = Walk::from_origin();
        assert_eq!(walk.steps(), 0);
        assert_eq!(walk.candidates().len(), 4);
    }

    #[test]
    fn candidates_exclude_visited_sites() {
        let walk = Walk::from_points(&pts(&[(0, 0), (1, 0), (1, 1)])).expect("valid walk");
        let cands = walk.candidates();
        assert_eq!(cands.len(), 3);
        assert!(!cands.as_slice().contains(&LatticePoint::new(1, 0)));
    }

    #[test]
    fn trapped_endpoint_has_no_candidates() {
        // Spiral that seals (1,1) in on all four sides.
        let walk = Walk::from_points(&pts(&[
            (1, 0),
            (2, 0),
            (2, 1),
            (2, 2),
            (1, 2),
            (0, 2),
            (0, 1),
            (1, 1),
        ]))
        .expect("valid walk");
        assert!(walk.candidates().is_empty());
        assert_eq!(atmosphere(walk.endpoint(), walk.visited()), 0);
    }

    #[test]
    fn extend_rejects_occupied_and_distant_sites() {
        let mut walk = Walk::from_points(&pts(&[(0, 0), (1, 0)])).expect("valid walk");
        assert!(!walk.extend(LatticePoint::new(0, 0)));
        assert!(!walk.extend(LatticePoint::new(3, 0)));
        assert!(walk.extend(LatticePoint::new(1, 1)));
        assert_eq!(walk.steps(), 2);
    }

    #[test]
    fn retract_keeps_visited_set_in_step() {
        let mut walk = Walk::from_points(&pts(&[(0, 0), (0, 1), (1, 1)])).expect("valid walk");
        assert_eq!(walk.retract(), Some(LatticePoint::new(1, 1)));
        assert!(!walk.is_occupied(LatticePoint::new(1, 1)));
        assert_eq!(walk.visited().len(), walk.points().len());
        walk.retract();
        assert_eq!(walk.retract(), None);
        assert_eq!(walk.endpoint(), LatticePoint::ORIGIN);
    }

    #[test]
    fn from_points_rejects_self_intersection() {
        assert!(Walk::from_points(&pts(&[(0, 0), (1, 0), (1, 1), (0, 1), (0, 0)])).is_none());
        assert!(Walk::from_points(&[]).is_none());
    }

    #[test]
    fn enumerator_accepts_position_index() {
        let mut index = HashMap::new();
        index.insert(LatticePoint::new(1, 0), 0usize);
        index.insert(LatticePoint::new(0, 1), 1usize);
        assert_eq!(atmosphere(LatticePoint::ORIGIN, &index), 2);
    }
}
