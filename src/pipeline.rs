//! Per-step collision detection: broadphase, narrowphase, then manifold generation.

use crate::{
    body::RigidBody,
    broad::{Broadphase, CollisionPair},
    config::{CollisionConfig, NarrowPhaseConfig},
    error::Result,
    narrow::{manifold::Manifold, Detector, NarrowPhaseContext},
};
use log::debug;

/// Step-local broadphase scratch.
#[derive(Debug, Default)]
pub struct BroadphaseContext {
    pub pairs: Vec<CollisionPair>,
}

#[derive(Debug)]
pub struct CollisionPipeline {
    broadphase: Box<dyn Broadphase>,
    detector: Detector,
    narrowphase: NarrowPhaseConfig,
    broad_ctx: BroadphaseContext,
    narrow_ctx: NarrowPhaseContext,
    manifolds: Vec<Manifold>,
}

impl CollisionPipeline {
    pub fn new(config: &CollisionConfig) -> Result<CollisionPipeline> {
        config.validate()?;
        Ok(CollisionPipeline::with_broadphase(config.broadphase.build()?, config.narrowphase))
    }

    pub fn with_broadphase(broadphase: Box<dyn Broadphase>, narrowphase: NarrowPhaseConfig) -> CollisionPipeline {
        CollisionPipeline {
            broadphase,
            detector: Detector::new(),
            narrowphase,
            broad_ctx: BroadphaseContext::default(),
            narrow_ctx: NarrowPhaseContext::new(),
            manifolds: Vec::new(),
        }
    }

    #[inline]
    pub fn detector_mut(&mut self) -> &mut Detector {
        &mut self.detector
    }
    /// Candidate pairs of the last step.
    #[inline]
    pub fn pairs(&self) -> &[CollisionPair] {
        &self.broad_ctx.pairs
    }
    #[inline]
    pub fn manifolds(&self) -> &[Manifold] {
        &self.manifolds
    }
    pub fn take_manifolds(&mut self) -> Vec<Manifold> {
        //! Hands the last step's manifolds to the caller, leaving none behind.
        std::mem::take(&mut self.manifolds)
    }

    pub fn step(&mut self, bodies: &[RigidBody]) -> &[Manifold] {
        //! Finds every colliding pair among `bodies` and builds its contact manifold. Manifold handles
        //! index into `bodies`.
        self.broad_ctx.pairs.clear();
        self.manifolds.clear();
        self.broadphase.find_potential_pairs(bodies, &mut self.broad_ctx.pairs);

        for pair in self.broad_ctx.pairs.iter() {
            let (a, b) = (&bodies[pair.a], &bodies[pair.b]);
            let data = match self.detector.check_collision(&mut self.narrow_ctx, a, b) {
                Some(data) => data,
                None => continue,
            };

            let mut manifold = Manifold::new(pair.a, pair.b);
            let merge = self.narrowphase.contact_merge_distance;
            if self.detector.build_manifold(&mut self.narrow_ctx, a, b, &data, merge, &mut manifold) {
                self.manifolds.push(manifold);
            }
        }

        debug!("step: {} bodies, {} candidate pairs, {} manifolds", bodies.len(), self.broad_ctx.pairs.len(), self.manifolds.len());
        &self.manifolds
    }
}
