//! Collision configuration and strategy construction.

use crate::{
    broad::{octree::Octree, Broadphase, BruteForce, sweep::SortAndSweep},
    error::{ConfigError, Result},
    narrow::Aabb,
    Fp, Vec3,
};

/// Deepest octree the node pool is sized for.
pub const MAX_SUPPORTED_DEPTH: usize = 8;

/// Axis a sort and sweep orders bounding boxes along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum SweepAxis {
    X,
    Y,
    Z,
}
impl SweepAxis {
    #[inline]
    pub fn component(self, v: Vec3) -> Fp {
        match self {
            SweepAxis::X => v.x,
            SweepAxis::Y => v.y,
            SweepAxis::Z => v.z,
        }
    }
}
impl Default for SweepAxis {
    fn default() -> Self {
        SweepAxis::X
    }
}

/// Strategy run within each octree leaf.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum SecondaryBroadphase {
    BruteForce,
    SortAndSweep { axis: SweepAxis },
}
impl Default for SecondaryBroadphase {
    fn default() -> Self {
        SecondaryBroadphase::SortAndSweep { axis: SweepAxis::X }
    }
}
impl SecondaryBroadphase {
    pub fn build(&self) -> Box<dyn Broadphase> {
        match *self {
            SecondaryBroadphase::BruteForce => Box::new(BruteForce::new()),
            SecondaryBroadphase::SortAndSweep { axis } => Box::new(SortAndSweep::new(axis)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct OctreeConfig {
    /// A node holding more objects than this is subdivided.
    pub max_objects_per_partition: usize,
    /// Depth below the root at which subdivision stops.
    pub max_partition_depth: usize,
    pub secondary: SecondaryBroadphase,
    /// World region to partition. Always grown to hold every body.
    pub bounds: Option<Aabb>,
    /// Node pool size; a full tree of `max_partition_depth` when unset.
    pub node_capacity: Option<usize>,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self { max_objects_per_partition: 5, max_partition_depth: 3, secondary: SecondaryBroadphase::default(), bounds: None, node_capacity: None }
    }
}

impl OctreeConfig {
    pub fn with_max_objects(mut self, max_objects_per_partition: usize) -> Self {
        self.max_objects_per_partition = max_objects_per_partition;
        self
    }
    pub fn with_max_depth(mut self, max_partition_depth: usize) -> Self {
        self.max_partition_depth = max_partition_depth;
        self
    }
    pub fn with_secondary(mut self, secondary: SecondaryBroadphase) -> Self {
        self.secondary = secondary;
        self
    }
    pub fn with_bounds(mut self, bounds: Aabb) -> Self {
        self.bounds = Some(bounds);
        self
    }
    pub fn with_node_capacity(mut self, capacity: usize) -> Self {
        self.node_capacity = Some(capacity);
        self
    }

    pub fn node_capacity(&self) -> usize {
        //! Configured pool size, or the node count of a complete tree.
        self.node_capacity.unwrap_or_else(|| (0..=self.max_partition_depth.min(MAX_SUPPORTED_DEPTH)).map(|d| 8usize.pow(d as u32)).sum())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_objects_per_partition == 0 {
            return Err(ConfigError::ZeroObjectsPerPartition);
        }
        if self.max_partition_depth > MAX_SUPPORTED_DEPTH {
            return Err(ConfigError::PartitionDepthTooLarge { depth: self.max_partition_depth, max: MAX_SUPPORTED_DEPTH });
        }
        if let Some(capacity) = self.node_capacity {
            if capacity == 0 {
                return Err(ConfigError::NodeCapacityTooSmall { capacity });
            }
        }
        if let Some(b) = self.bounds {
            let finite = [b.min.x, b.min.y, b.min.z, b.max.x, b.max.y, b.max.z].iter().all(|v| v.is_finite());
            if !finite || b.min.x > b.max.x || b.min.y > b.max.y || b.min.z > b.max.z {
                return Err(ConfigError::InvalidBounds);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum BroadphaseConfig {
    BruteForce,
    SortAndSweep { axis: SweepAxis },
    Octree(OctreeConfig),
}

impl Default for BroadphaseConfig {
    fn default() -> Self {
        BroadphaseConfig::Octree(OctreeConfig::default())
    }
}

impl BroadphaseConfig {
    pub fn validate(&self) -> Result<()> {
        match self {
            BroadphaseConfig::Octree(octree) => octree.validate(),
            _ => Ok(()),
        }
    }

    pub fn build(&self) -> Result<Box<dyn Broadphase>> {
        self.validate()?;
        let broadphase: Box<dyn Broadphase> = match self {
            BroadphaseConfig::BruteForce => Box::new(BruteForce::new()),
            BroadphaseConfig::SortAndSweep { axis } => Box::new(SortAndSweep::new(*axis)),
            BroadphaseConfig::Octree(octree) => Box::new(Octree::new(octree)?),
        };
        Ok(broadphase)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct NarrowPhaseConfig {
    /// Contacts closer than this on body A are merged. Zero disables merging.
    pub contact_merge_distance: Fp,
}

impl Default for NarrowPhaseConfig {
    fn default() -> Self {
        Self { contact_merge_distance: 0.0 }
    }
}

impl NarrowPhaseConfig {
    pub fn with_merge_distance(mut self, contact_merge_distance: Fp) -> Self {
        self.contact_merge_distance = contact_merge_distance;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let d = self.contact_merge_distance;
        if d < 0.0 || !d.is_finite() {
            return Err(ConfigError::NegativeMergeDistance(d as f64));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionConfig {
    pub broadphase: BroadphaseConfig,
    pub narrowphase: NarrowPhaseConfig,
}

impl CollisionConfig {
    pub fn with_broadphase(mut self, broadphase: BroadphaseConfig) -> Self {
        self.broadphase = broadphase;
        self
    }
    pub fn with_narrowphase(mut self, narrowphase: NarrowPhaseConfig) -> Self {
        self.narrowphase = narrowphase;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.broadphase.validate()?;
        self.narrowphase.validate()
    }
}
