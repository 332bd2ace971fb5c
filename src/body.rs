use crate::{narrow::Aabb, shape::{CollisionShape, Shape}, Fp, Mat3, Quat, Vec3};

/// Index of a body in the slice handed to the broadphase and pipeline.
pub type BodyHandle = usize;

/// Rigid placement: rotation about the origin, then translation. No scale.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Transform {
    #[inline]
    pub fn new(position: Vec3, orientation: Quat) -> Transform {
        Transform { position, orientation }
    }
    #[inline]
    pub fn from_position(position: Vec3) -> Transform {
        Transform { position, orientation: Quat::IDENTITY }
    }

    #[inline]
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.orientation * local + self.position
    }
    #[inline]
    pub fn transform_vector(&self, local: Vec3) -> Vec3 {
        self.orientation * local
    }
    #[inline]
    pub fn inverse_transform_vector(&self, world: Vec3) -> Vec3 {
        self.orientation.inverse() * world
    }
}
impl Default for Transform {
    fn default() -> Self {
        Transform::from_position(Vec3::ZERO)
    }
}

/// The collision-relevant view of a rigid body.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct RigidBody {
    pub transform: Transform,
    /// Bodies without a shape take no part in collision detection.
    pub shape: Option<Shape>,
    /// Immovable; never tested against other immovable bodies.
    pub is_static: bool,
    /// Asleep; treated as immovable until woken.
    pub at_rest: bool,
}

impl RigidBody {
    pub fn new(position: Vec3, shape: Shape) -> RigidBody {
        RigidBody { transform: Transform::from_position(position), shape: Some(shape), is_static: false, at_rest: false }
    }
    pub fn without_shape(position: Vec3) -> RigidBody {
        RigidBody { transform: Transform::from_position(position), shape: None, is_static: false, at_rest: false }
    }

    pub fn with_orientation(mut self, orientation: Quat) -> RigidBody {
        self.transform.orientation = orientation;
        self
    }
    pub fn with_static(mut self, is_static: bool) -> RigidBody {
        self.is_static = is_static;
        self
    }
    pub fn with_rest(mut self, at_rest: bool) -> RigidBody {
        self.at_rest = at_rest;
        self
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }
    #[inline]
    pub fn is_immobile(&self) -> bool {
        self.is_static || self.at_rest
    }

    pub fn world_aabb(&self) -> Option<Aabb> {
        //! World-space bounding box from the shape's support points along the world axes.
        let shape = self.shape.as_ref()?;
        let extent = |axis: Vec3| {
            let (min, max) = shape.min_max_vertex_on_axis(&self.transform, axis);
            (min.dot(axis), max.dot(axis))
        };
        let (min_x, max_x) = extent(Vec3::new(1.0, 0.0, 0.0));
        let (min_y, max_y) = extent(Vec3::new(0.0, 1.0, 0.0));
        let (min_z, max_z) = extent(Vec3::new(0.0, 0.0, 1.0));
        Some(Aabb::new(Vec3::new(min_x, min_y, min_z), Vec3::new(max_x, max_y, max_z)))
    }

    pub fn build_inverse_inertia(&self, inverse_mass: Fp) -> Mat3 {
        //! Local-space inverse inertia tensor. Zero without a shape.
        match &self.shape {
            Some(shape) => shape.build_inverse_inertia(inverse_mass),
            None => Mat3::ZERO,
        }
    }
}
