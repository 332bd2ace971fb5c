//! Octree space partitioning with a secondary broadphase per leaf.

use super::{collidable_handles, Broadphase, CollisionPair};
use crate::{body::{BodyHandle, RigidBody}, config::OctreeConfig, error::Result, narrow::Aabb};
use fnv::FnvHashSet;
use log::debug;

#[derive(Debug, Clone, Default)]
struct OctreeNode {
    bounds: Option<Aabb>,
    objects: Vec<BodyHandle>,
}
impl OctreeNode {
    fn reset(&mut self, bounds: Aabb) {
        self.bounds = Some(bounds);
        self.objects.clear();
    }
}

/// Rebuilt every call: the root box is subdivided into octants until a node holds few enough objects
/// or the depth limit is hit, then the secondary broadphase runs on each non-empty leaf.
///
/// Nodes come from a pool that keeps its allocations between calls. Running out of nodes panics.
#[derive(Debug)]
pub struct Octree {
    max_objects: usize,
    max_depth: usize,
    bounds: Option<Aabb>,
    capacity: usize,
    secondary: Box<dyn Broadphase>,

    nodes: Vec<OctreeNode>,
    pool_index: usize,
    leaves: Vec<usize>,
    aabbs: Vec<Option<Aabb>>,
    seen: FnvHashSet<CollisionPair>,
    leaf_pairs: Vec<CollisionPair>,
    handles: Vec<BodyHandle>,
}

impl Octree {
    pub fn new(config: &OctreeConfig) -> Result<Octree> {
        config.validate()?;
        Ok(Octree::with_secondary(config, config.secondary.build()))
    }

    pub fn with_secondary(config: &OctreeConfig, secondary: Box<dyn Broadphase>) -> Octree {
        //! Like `new`, but runs an arbitrary broadphase within the leaves. `config` is not validated.
        Octree {
            max_objects: config.max_objects_per_partition,
            max_depth: config.max_partition_depth,
            bounds: config.bounds,
            capacity: config.node_capacity(),
            secondary,
            nodes: Vec::new(),
            pool_index: 0,
            leaves: Vec::new(),
            aabbs: Vec::new(),
            seen: FnvHashSet::default(),
            leaf_pairs: Vec::new(),
            handles: Vec::new(),
        }
    }

    /// Nodes used by the last build, root included.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.pool_index
    }
    /// Non-empty leaves of the last build.
    #[inline]
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    fn allocate(&mut self, bounds: Aabb) -> usize {
        assert!(self.pool_index < self.capacity, "octree node pool exhausted ({} nodes)", self.capacity);
        let index = self.pool_index;
        if index == self.nodes.len() {
            self.nodes.push(OctreeNode::default());
        }
        self.nodes[index].reset(bounds);
        self.pool_index += 1;
        index
    }

    fn divide(&mut self, node: usize, depth: usize) {
        if self.nodes[node].objects.len() <= self.max_objects || depth >= self.max_depth {
            if !self.nodes[node].objects.is_empty() {
                self.leaves.push(node);
            }
            return;
        }
        let bounds = match self.nodes[node].bounds {
            Some(b) => b,
            None => return,
        };

        for octant in 0..8 {
            let octant_bounds = bounds.octant(octant);
            let child = self.allocate(octant_bounds);

            // children are always allocated after their parent
            let (head, tail) = self.nodes.split_at_mut(child);
            let (parent, child_node) = (&head[node], &mut tail[0]);
            for &handle in parent.objects.iter() {
                if let Some(aabb) = &self.aabbs[handle] {
                    if octant_bounds.overlaps(aabb) {
                        child_node.objects.push(handle);
                    }
                }
            }

            if child_node.objects.is_empty() {
                // hand the unused node straight back to the pool
                self.pool_index -= 1;
                continue;
            }
            self.divide(child, depth + 1);
        }
    }
}

impl Broadphase for Octree {
    fn find_potential_pairs(&mut self, bodies: &[RigidBody], pairs: &mut Vec<CollisionPair>) {
        let mut handles = std::mem::take(&mut self.handles);
        collidable_handles(bodies, &mut handles);
        self.find_pairs_among(bodies, &handles, pairs);
        self.handles = handles;
    }

    fn find_pairs_among(&mut self, bodies: &[RigidBody], candidates: &[BodyHandle], pairs: &mut Vec<CollisionPair>) {
        self.pool_index = 0;
        self.leaves.clear();
        if candidates.is_empty() {
            return;
        }

        self.aabbs.clear();
        self.aabbs.resize(bodies.len(), None);
        let mut root_bounds = self.bounds;
        for &handle in candidates {
            let aabb = bodies[handle].world_aabb();
            if let Some(aabb) = aabb {
                root_bounds = Some(match root_bounds {
                    Some(b) => b.merge(&aabb),
                    None => aabb,
                });
            }
            self.aabbs[handle] = aabb;
        }
        let root_bounds = match root_bounds {
            Some(b) => b,
            None => return,
        };

        let root = self.allocate(root_bounds);
        let aabbs = &self.aabbs;
        self.nodes[root].objects.extend(candidates.iter().copied().filter(|&h| aabbs[h].is_some()));
        self.divide(root, 0);

        self.seen.clear();
        let before = pairs.len();
        for &leaf in self.leaves.iter() {
            self.leaf_pairs.clear();
            self.secondary.find_pairs_among(bodies, &self.nodes[leaf].objects, &mut self.leaf_pairs);
            for &pair in self.leaf_pairs.iter() {
                if self.seen.insert(pair) {
                    pairs.push(pair);
                }
            }
        }

        debug!("octree: {} nodes, {} leaves, {} pairs", self.pool_index, self.leaves.len(), pairs.len() - before);
    }
}
