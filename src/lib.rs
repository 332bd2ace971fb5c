//! Broadphase and narrowphase collision detection for 3D rigid bodies.
//!
//! Each step, a [`Broadphase`](broad::Broadphase) strategy prunes the body set down to candidate
//! pairs, the [`Detector`](narrow::Detector) runs a separating axis test on every pair, and colliding
//! pairs get a [`Manifold`](narrow::manifold::Manifold) of clipped contact points.
//! [`CollisionPipeline`](pipeline::CollisionPipeline) ties the three together.

pub mod body;
pub mod broad;
pub mod config;
pub mod error;
pub mod narrow;
pub mod pipeline;
pub mod shape;

#[cfg(not(feature = "f64"))]
pub type Fp = f32;
#[cfg(not(feature = "f64"))]
pub type Vec3 = glam::Vec3;
#[cfg(not(feature = "f64"))]
pub type Quat = glam::Quat;
#[cfg(not(feature = "f64"))]
pub type Mat3 = glam::Mat3;

#[cfg(feature = "f64")]
pub type Fp = f64;
#[cfg(feature = "f64")]
pub type Vec3 = glam::DVec3;
#[cfg(feature = "f64")]
pub type Quat = glam::DQuat;
#[cfg(feature = "f64")]
pub type Mat3 = glam::DMat3;

/// Tolerance for near-parallel axes, near-parallel clip edges and plane side tests.
pub const EPSILON: Fp = 1e-4;

pub use body::{BodyHandle, RigidBody, Transform};
pub use broad::{Broadphase, BruteForce, CollisionPair, octree::Octree, sweep::SortAndSweep};
pub use config::{BroadphaseConfig, CollisionConfig, NarrowPhaseConfig, OctreeConfig, SecondaryBroadphase, SweepAxis};
pub use error::ConfigError;
pub use narrow::{Aabb, CollisionData, Detector, Edge, Plane, manifold::{Contact, Manifold}};
pub use pipeline::CollisionPipeline;
pub use shape::{CollisionShape, ConvexHull, Shape};
