//! Configuration errors.

use thiserror::Error;

/// Rejected collision configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("octree partitions must allow at least one object")]
    ZeroObjectsPerPartition,
    #[error("octree depth {depth} exceeds the supported maximum of {max}")]
    PartitionDepthTooLarge { depth: usize, max: usize },
    #[error("octree node capacity {capacity} cannot hold the root node")]
    NodeCapacityTooSmall { capacity: usize },
    #[error("octree bounds are inverted or not finite")]
    InvalidBounds,
    /// Carries the rejected distance, widened to `f64`.
    #[error("contact merge distance {0} is negative or not finite")]
    NegativeMergeDistance(f64),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
