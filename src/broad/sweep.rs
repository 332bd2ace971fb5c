//! Single-axis sort and sweep.

use super::{can_collide, collidable_handles, Broadphase, CollisionPair};
use crate::{body::{BodyHandle, RigidBody}, config::SweepAxis, Fp};
use indexmap::IndexSet;

#[derive(Debug, Clone, Copy)]
struct Endpoint {
    is_end: bool,
    handle: BodyHandle,
    value: Fp,
}

/// Sorts bounding box begin and end values along one axis and pairs up bodies whose intervals overlap.
/// The endpoint order is kept between calls over the same candidates, so mostly-coherent motion sorts
/// in close to linear time.
#[derive(Debug, Clone)]
pub struct SortAndSweep {
    axis: SweepAxis,
    endpoints: Vec<Endpoint>,
    active: IndexSet<BodyHandle>,
    last_candidates: Vec<BodyHandle>,
    handles: Vec<BodyHandle>,
}

impl SortAndSweep {
    pub fn new(axis: SweepAxis) -> SortAndSweep {
        SortAndSweep { axis, endpoints: Vec::new(), active: IndexSet::new(), last_candidates: Vec::new(), handles: Vec::new() }
    }

    #[inline]
    pub fn axis(&self) -> SweepAxis {
        self.axis
    }

    fn refresh(&mut self, bodies: &[RigidBody], candidates: &[BodyHandle]) {
        let axis = self.axis;
        if self.last_candidates.as_slice() == candidates {
            // update b & e values in place, keeping last step's order
            let mut stale = false;
            for e in self.endpoints.iter_mut() {
                match bodies[e.handle].world_aabb() {
                    Some(aabb) => e.value = if e.is_end { axis.component(aabb.max) } else { axis.component(aabb.min) },
                    None => stale = true,
                }
            }
            if !stale {
                return;
            }
        }

        self.endpoints.clear();
        for &handle in candidates {
            if let Some(aabb) = bodies[handle].world_aabb() {
                self.endpoints.push(Endpoint { is_end: false, handle, value: axis.component(aabb.min) });
                self.endpoints.push(Endpoint { is_end: true, handle, value: axis.component(aabb.max) });
            }
        }
        self.last_candidates.clear();
        self.last_candidates.extend_from_slice(candidates);
    }
}

impl Default for SortAndSweep {
    fn default() -> Self {
        SortAndSweep::new(SweepAxis::X)
    }
}

impl Broadphase for SortAndSweep {
    fn find_potential_pairs(&mut self, bodies: &[RigidBody], pairs: &mut Vec<CollisionPair>) {
        let mut handles = std::mem::take(&mut self.handles);
        collidable_handles(bodies, &mut handles);
        self.find_pairs_among(bodies, &handles, pairs);
        self.handles = handles;
    }

    fn find_pairs_among(&mut self, bodies: &[RigidBody], candidates: &[BodyHandle], pairs: &mut Vec<CollisionPair>) {
        self.refresh(bodies, candidates);
        // insertion sort: the endpoints are expected to be mostly sorted already
        insertion_sort(&mut self.endpoints);

        self.active.clear();
        for e in self.endpoints.iter() {
            if e.is_end {
                self.active.shift_remove(&e.handle);
            } else {
                for &other in self.active.iter() {
                    if can_collide(&bodies[other], &bodies[e.handle]) {
                        pairs.push(CollisionPair::new(other, e.handle));
                    }
                }
                self.active.insert(e.handle);
            }
        }
    }
}

/// Begins sort ahead of ends at equal values so that touching intervals overlap.
#[inline]
fn precedes(a: &Endpoint, b: &Endpoint) -> bool {
    a.value < b.value || (a.value == b.value && !a.is_end && b.is_end)
}

// code based off of https://en.wikipedia.org/wiki/Insertion_sort#Algorithm
fn insertion_sort(a: &mut [Endpoint]) {
    for i in 1..a.len() {
        let val = a[i];
        let mut j = i;
        while j != 0 && precedes(&val, &a[j - 1]) {
            a[j] = a[j - 1];
            j -= 1;
        }
        a[j] = val;
    }
}
