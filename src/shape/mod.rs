//! Collision shapes: spheres and convex polyhedra.

pub mod hull;

use crate::{body::Transform, narrow::{Edge, Plane}, Fp, Mat3, Vec3};
pub use hull::ConvexHull;

/// The face of a shape that faces along a given direction, with the planes bounding its footprint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferencePolygon {
    /// World-space face vertices in winding order; a single point for curved shapes.
    pub points: Vec<Vec3>,
    pub normal: Vec3,
    /// Inward-facing planes through the face edges, built from the neighbouring faces.
    pub adjacent_planes: Vec<Plane>,
}
impl ReferencePolygon {
    pub fn clear(&mut self) {
        self.points.clear();
        self.adjacent_planes.clear();
        self.normal = Vec3::ZERO;
    }
}

/// Queries every shape answers for the separating axis test and manifold generation.
pub trait CollisionShape {
    /// One of the `Shape::*_ID` bit flags.
    fn shape_id(&self) -> u8;
    /// Support points with the lowest and highest projection onto the world-space `axis`.
    fn min_max_vertex_on_axis(&self, tr: &Transform, axis: Vec3) -> (Vec3, Vec3);
    /// Appends world-space face normals worth testing as separating axes.
    fn collision_axes(&self, tr: &Transform, out: &mut Vec<Vec3>);
    /// Appends world-space edges.
    fn edges(&self, tr: &Transform, out: &mut Vec<Edge>);
    /// Fills `out` with the face best aligned with `axis`.
    fn incident_reference_polygon(&self, tr: &Transform, axis: Vec3, out: &mut ReferencePolygon);
    fn build_inverse_inertia(&self, inverse_mass: Fp) -> Mat3;
}

#[inline]
fn ratio(num: Fp, den: Fp) -> Fp {
    // degenerate extents give no rotational response instead of infinity
    if den > 0.0 { num / den } else { 0.0 }
}

fn cuboid_inverse_inertia(dims: Vec3, inverse_mass: Fp) -> Mat3 {
    let d = dims * dims;
    Mat3::from_diagonal(Vec3::new(
        ratio(12.0 * inverse_mass, d.y + d.z),
        ratio(12.0 * inverse_mass, d.x + d.z),
        ratio(12.0 * inverse_mass, d.x + d.y),
    ))
}

// ---------- Sphere ---------- //

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Sphere {
    pub radius: Fp,
}
impl Sphere {
    #[inline]
    pub fn new(radius: Fp) -> Sphere {
        Sphere { radius }
    }
}
impl CollisionShape for Sphere {
    #[inline]
    fn shape_id(&self) -> u8 {
        Shape::SPHERE_ID
    }
    #[inline]
    fn min_max_vertex_on_axis(&self, tr: &Transform, axis: Vec3) -> (Vec3, Vec3) {
        (tr.position - axis * self.radius, tr.position + axis * self.radius)
    }
    fn collision_axes(&self, _: &Transform, _: &mut Vec<Vec3>) {}
    fn edges(&self, _: &Transform, _: &mut Vec<Edge>) {}
    fn incident_reference_polygon(&self, tr: &Transform, axis: Vec3, out: &mut ReferencePolygon) {
        out.points.push(tr.position + axis * self.radius);
        out.normal = axis;
    }
    fn build_inverse_inertia(&self, inverse_mass: Fp) -> Mat3 {
        Mat3::from_diagonal(Vec3::splat(ratio(inverse_mass, 0.4 * self.radius * self.radius)))
    }
}

// ---------- Cuboid & Pyramid ---------- //

/// Box given by its half dimensions along each local axis.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Cuboid {
    half_dims: Vec3,
    hull: ConvexHull,
}
impl Cuboid {
    pub fn new(half_dims: Vec3) -> Cuboid {
        Cuboid { half_dims, hull: ConvexHull::cuboid(half_dims) }
    }
    #[inline]
    pub fn half_dims(&self) -> Vec3 {
        self.half_dims
    }
    #[inline]
    pub fn hull(&self) -> &ConvexHull {
        &self.hull
    }
}

/// Square-based pyramid, apex up along local y.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Pyramid {
    half_dims: Vec3,
    hull: ConvexHull,
}
impl Pyramid {
    pub fn new(half_dims: Vec3) -> Pyramid {
        Pyramid { half_dims, hull: ConvexHull::pyramid(half_dims) }
    }
    #[inline]
    pub fn half_dims(&self) -> Vec3 {
        self.half_dims
    }
    #[inline]
    pub fn hull(&self) -> &ConvexHull {
        &self.hull
    }
}

macro_rules! impl_polyhedron {
    ($t:ty, $id:expr, |$s:ident, $m:ident| $inertia:expr) => {
        impl CollisionShape for $t {
            #[inline]
            fn shape_id(&self) -> u8 {
                $id
            }
            #[inline]
            fn min_max_vertex_on_axis(&self, tr: &Transform, axis: Vec3) -> (Vec3, Vec3) {
                self.hull().world_min_max(tr, axis)
            }
            fn collision_axes(&self, tr: &Transform, out: &mut Vec<Vec3>) {
                self.hull().world_axes(tr, out)
            }
            fn edges(&self, tr: &Transform, out: &mut Vec<Edge>) {
                self.hull().world_edges(tr, out)
            }
            fn incident_reference_polygon(&self, tr: &Transform, axis: Vec3, out: &mut ReferencePolygon) {
                self.hull().world_reference_polygon(tr, axis, out)
            }
            fn build_inverse_inertia(&self, inverse_mass: Fp) -> Mat3 {
                let $s = self;
                let $m = inverse_mass;
                $inertia
            }
        }
    };
}

impl_polyhedron!(Cuboid, Shape::CUBOID_ID, |s, inv| cuboid_inverse_inertia(s.half_dims * 2.0, inv));
impl_polyhedron!(Pyramid, Shape::PYRAMID_ID, |s, inv| {
    let d = s.half_dims * 2.0;
    let d = d * d;
    Mat3::from_diagonal(Vec3::new(
        ratio(3.0 * inv, 0.2 * d.x + 0.15 * d.y),
        ratio(3.0 * inv, 0.2 * d.z + 0.15 * d.y),
        ratio(3.0 * inv, 0.2 * d.z + 0.2 * d.x),
    ))
});
impl_polyhedron!(ConvexHull, Shape::HULL_ID, |s, inv| match s.local_aabb() {
    Some(aabb) => cuboid_inverse_inertia(aabb.extents(), inv),
    None => Mat3::ZERO,
});

impl ConvexHull {
    #[inline]
    fn hull(&self) -> &ConvexHull {
        self
    }
}

// ---------- Shape ---------- //

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    Sphere(Sphere),
    Cuboid(Cuboid),
    Pyramid(Pyramid),
    Hull(ConvexHull),
}

impl Shape {
    pub const CUBOID_ID: u8 = 1;
    pub const SPHERE_ID: u8 = 2;
    pub const PYRAMID_ID: u8 = 4;
    pub const HULL_ID: u8 = 8;
    /// Size of a table indexed by `id_a | id_b`.
    pub const ID_COMBINATIONS: usize = 16;

    #[inline]
    pub fn sphere(radius: Fp) -> Shape {
        Shape::Sphere(Sphere::new(radius))
    }
    #[inline]
    pub fn cuboid(half_dims: Vec3) -> Shape {
        Shape::Cuboid(Cuboid::new(half_dims))
    }
    #[inline]
    pub fn pyramid(half_dims: Vec3) -> Shape {
        Shape::Pyramid(Pyramid::new(half_dims))
    }

    #[inline]
    pub fn is_polyhedron(&self) -> bool {
        !matches!(self, Shape::Sphere(_))
    }

    #[inline]
    fn inner(&self) -> &dyn CollisionShape {
        match self {
            Shape::Sphere(s) => s,
            Shape::Cuboid(c) => c,
            Shape::Pyramid(p) => p,
            Shape::Hull(h) => h,
        }
    }
}

impl CollisionShape for Shape {
    #[inline]
    fn shape_id(&self) -> u8 {
        self.inner().shape_id()
    }
    #[inline]
    fn min_max_vertex_on_axis(&self, tr: &Transform, axis: Vec3) -> (Vec3, Vec3) {
        self.inner().min_max_vertex_on_axis(tr, axis)
    }
    #[inline]
    fn collision_axes(&self, tr: &Transform, out: &mut Vec<Vec3>) {
        self.inner().collision_axes(tr, out)
    }
    #[inline]
    fn edges(&self, tr: &Transform, out: &mut Vec<Edge>) {
        self.inner().edges(tr, out)
    }
    #[inline]
    fn incident_reference_polygon(&self, tr: &Transform, axis: Vec3, out: &mut ReferencePolygon) {
        self.inner().incident_reference_polygon(tr, axis, out)
    }
    #[inline]
    fn build_inverse_inertia(&self, inverse_mass: Fp) -> Mat3 {
        self.inner().build_inverse_inertia(inverse_mass)
    }
}

impl From<Sphere> for Shape {
    fn from(s: Sphere) -> Self {
        Shape::Sphere(s)
    }
}
impl From<Cuboid> for Shape {
    fn from(c: Cuboid) -> Self {
        Shape::Cuboid(c)
    }
}
impl From<Pyramid> for Shape {
    fn from(p: Pyramid) -> Self {
        Shape::Pyramid(p)
    }
}
impl From<ConvexHull> for Shape {
    fn from(h: ConvexHull) -> Self {
        Shape::Hull(h)
    }
}
