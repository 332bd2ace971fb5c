//! Broadphase data and logic module.

pub mod octree;
pub mod sweep;

use crate::body::{BodyHandle, RigidBody};

/// An unordered candidate pair, stored with `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionPair {
    pub a: BodyHandle,
    pub b: BodyHandle,
}
impl CollisionPair {
    #[inline]
    pub fn new(a: BodyHandle, b: BodyHandle) -> CollisionPair {
        if a <= b { CollisionPair { a, b } } else { CollisionPair { a: b, b: a } }
    }
}

#[inline]
pub fn can_collide(a: &RigidBody, b: &RigidBody) -> bool {
    //! Whether the pair is worth a narrowphase test: both have shapes, and at least one is neither static nor at rest.
    a.shape.is_some() && b.shape.is_some() && !(a.is_immobile() && b.is_immobile())
}

pub(crate) fn collidable_handles(bodies: &[RigidBody], out: &mut Vec<BodyHandle>) {
    out.clear();
    out.extend(bodies.iter().enumerate().filter(|(_, b)| b.shape.is_some()).map(|(i, _)| i));
}

/// A strategy producing a superset of the body pairs whose bounding boxes overlap.
pub trait Broadphase: std::fmt::Debug {
    /// Appends candidate pairs over every body with a shape.
    fn find_potential_pairs(&mut self, bodies: &[RigidBody], pairs: &mut Vec<CollisionPair>);
    /// Appends candidate pairs drawn only from `candidates`, which index into `bodies`.
    fn find_pairs_among(&mut self, bodies: &[RigidBody], candidates: &[BodyHandle], pairs: &mut Vec<CollisionPair>);
}

/// Tests every pair. Quadratic, but allocation free and the reference for what the others must find.
#[derive(Debug, Default, Clone)]
pub struct BruteForce {
    handles: Vec<BodyHandle>,
}
impl BruteForce {
    pub fn new() -> BruteForce {
        BruteForce::default()
    }
}
impl Broadphase for BruteForce {
    fn find_potential_pairs(&mut self, bodies: &[RigidBody], pairs: &mut Vec<CollisionPair>) {
        let mut handles = std::mem::take(&mut self.handles);
        collidable_handles(bodies, &mut handles);
        self.find_pairs_among(bodies, &handles, pairs);
        self.handles = handles;
    }

    fn find_pairs_among(&mut self, bodies: &[RigidBody], candidates: &[BodyHandle], pairs: &mut Vec<CollisionPair>) {
        for (i, &a) in candidates.iter().enumerate() {
            for &b in candidates[i + 1..].iter() {
                if can_collide(&bodies[a], &bodies[b]) {
                    pairs.push(CollisionPair::new(a, b));
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{shape::Shape, Fp, Vec3};

    /// Deterministic xorshift for scattering test bodies.
    pub(crate) struct XorShift(pub u64);
    impl XorShift {
        pub(crate) fn next_fp(&mut self) -> Fp {
            self.0 ^= self.0 << 13;
            self.0 ^= self.0 >> 7;
            self.0 ^= self.0 << 17;
            (self.0 >> 40) as Fp / (1u64 << 24) as Fp
        }
        pub(crate) fn range(&mut self, lo: Fp, hi: Fp) -> Fp {
            lo + (hi - lo) * self.next_fp()
        }
    }

    pub(crate) fn scattered_bodies(count: usize, spread: Fp, seed: u64) -> Vec<RigidBody> {
        let mut rng = XorShift(seed);
        (0..count)
            .map(|i| {
                let pos = Vec3::new(rng.range(-spread, spread), rng.range(-spread, spread), rng.range(-spread, spread));
                let shape = if i % 3 == 0 {
                    Shape::sphere(rng.range(0.2, 1.0))
                } else {
                    Shape::cuboid(Vec3::new(rng.range(0.2, 1.0), rng.range(0.2, 1.0), rng.range(0.2, 1.0)))
                };
                RigidBody::new(pos, shape).with_static(i % 7 == 0).with_rest(i % 11 == 0)
            })
            .collect()
    }

    pub(crate) fn overlapping_pairs(bodies: &[RigidBody]) -> Vec<CollisionPair> {
        let mut pairs = vec![];
        for a in 0..bodies.len() {
            for b in a + 1..bodies.len() {
                if !can_collide(&bodies[a], &bodies[b]) {
                    continue;
                }
                if let (Some(x), Some(y)) = (bodies[a].world_aabb(), bodies[b].world_aabb()) {
                    if x.overlaps(&y) {
                        pairs.push(CollisionPair::new(a, b));
                    }
                }
            }
        }
        pairs
    }

    #[test]
    fn pairs_are_ordered() {
        assert_eq!(CollisionPair::new(5, 2), CollisionPair { a: 2, b: 5 });
        assert_eq!(CollisionPair::new(2, 5), CollisionPair::new(5, 2));
    }

    #[test]
    fn immobile_pairs_are_culled() {
        let moving = RigidBody::new(Vec3::ZERO, Shape::sphere(1.0));
        let fixed = moving.clone().with_static(true);
        let sleeping = moving.clone().with_rest(true);
        let empty = RigidBody::without_shape(Vec3::ZERO);

        assert!(can_collide(&moving, &moving));
        assert!(can_collide(&moving, &fixed));
        assert!(can_collide(&sleeping, &moving));
        assert!(!can_collide(&fixed, &fixed));
        assert!(!can_collide(&sleeping, &sleeping));
        assert!(!can_collide(&fixed, &sleeping));
        assert!(!can_collide(&sleeping, &fixed));
        assert!(!can_collide(&moving, &empty));
    }

    #[test]
    fn brute_force_finds_every_collidable_pair() {
        let bodies = vec![
            RigidBody::new(Vec3::ZERO, Shape::sphere(1.0)),
            RigidBody::new(Vec3::new(100.0, 0.0, 0.0), Shape::sphere(1.0)).with_static(true),
            RigidBody::without_shape(Vec3::ZERO),
            RigidBody::new(Vec3::new(-100.0, 0.0, 0.0), Shape::sphere(1.0)).with_static(true),
        ];
        let mut pairs = vec![];
        BruteForce::new().find_potential_pairs(&bodies, &mut pairs);
        assert_eq!(pairs, vec![CollisionPair::new(0, 1), CollisionPair::new(0, 3)]);
    }
}
