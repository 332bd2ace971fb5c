//! Narrowphase data and logic module.

pub mod clip;
pub mod manifold;

use crate::{body::{RigidBody, Transform}, shape::{CollisionShape, ReferencePolygon, Shape}, Fp, Vec3, EPSILON};
use log::{error, trace};

// ---------- Point, Plane & Box ---------- //

/// A world-space segment of a shape's silhouette.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub pos_a: Vec3,
    pub pos_b: Vec3,
}
impl Edge {
    #[inline]
    pub fn new(pos_a: Vec3, pos_b: Vec3) -> Edge {
        Edge { pos_a, pos_b }
    }
}

/// Plane satisfying `normal . p + distance == 0`. Points with a non-negative signed distance are inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: Fp,
}
impl Plane {
    #[inline]
    pub fn new(normal: Vec3, distance: Fp) -> Plane {
        Plane { normal, distance }
    }
    #[inline]
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Plane {
        Plane { normal, distance: -normal.dot(point) }
    }

    #[inline]
    pub fn signed_distance(&self, point: Vec3) -> Fp {
        self.normal.dot(point) + self.distance
    }
    #[inline]
    pub fn is_point_inside(&self, point: Vec3) -> bool {
        //! Returns whether `point` is on the kept side of the plane, with `EPSILON` slack.
        self.signed_distance(point) >= -EPSILON
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}
impl Aabb {
    #[inline]
    pub fn new(min: Vec3, max: Vec3) -> Aabb {
        Aabb { min, max }
    }
    #[inline]
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Aabb {
        Aabb { min: center - half_extents, max: center + half_extents }
    }
    pub fn from_points(points: &[Vec3]) -> Option<Aabb> {
        //! Smallest box holding every point, `None` for an empty slice.
        let (first, rest) = points.split_first()?;
        Some(rest.iter().fold(Aabb::new(*first, *first), |aabb, &p| Aabb::new(aabb.min.min(p), aabb.max.max(p))))
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
    #[inline]
    pub fn extents(&self) -> Vec3 {
        self.max - self.min
    }
    #[inline]
    pub fn merge(&self, other: &Aabb) -> Aabb {
        Aabb { min: self.min.min(other.min), max: self.max.max(other.max) }
    }

    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        //! Inclusive overlap test; touching boxes overlap.
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
    #[inline]
    pub fn contains(&self, other: &Aabb) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && self.min.z <= other.min.z
            && self.max.x >= other.max.x
            && self.max.y >= other.max.y
            && self.max.z >= other.max.z
    }

    pub fn octant(&self, index: usize) -> Aabb {
        //! Returns one of the eight boxes produced by splitting at the center.
        //! Bit 0 of `index` selects the upper x half, bit 1 the upper y half, bit 2 the upper z half.
        let c = self.center();
        let pick = |bit: usize, min: Fp, mid: Fp, max: Fp| if index & bit != 0 { (mid, max) } else { (min, mid) };
        let (lx, ux) = pick(1, self.min.x, c.x, self.max.x);
        let (ly, uy) = pick(2, self.min.y, c.y, self.max.y);
        let (lz, uz) = pick(4, self.min.z, c.z, self.max.z);
        Aabb { min: Vec3::new(lx, ly, lz), max: Vec3::new(ux, uy, uz) }
    }
}

// ---------- Separating Axis ---------- //

/// Result of a single axis test, and of a whole shape pair test once the best axis is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionData {
    /// Points from body A toward body B.
    pub normal: Vec3,
    /// Non-positive while overlapping; values closer to zero are shallower.
    pub penetration: Fp,
    pub point_on_plane: Vec3,
}

pub fn check_collision_axis(axis: Vec3, tr_a: &Transform, shape_a: &Shape, tr_b: &Transform, shape_b: &Shape) -> Option<CollisionData> {
    //! Projects both shapes onto `axis`. Returns `None` if `axis` separates them.
    let (min1, max1) = shape_a.min_max_vertex_on_axis(tr_a, axis);
    let (min2, max2) = shape_b.min_max_vertex_on_axis(tr_b, axis);

    let min_corr1 = axis.dot(min1);
    let max_corr1 = axis.dot(max1);
    let min_corr2 = axis.dot(min2);
    let max_corr2 = axis.dot(max2);

    if min_corr1 <= min_corr2 && max_corr1 >= min_corr2 {
        let penetration = min_corr2 - max_corr1;
        return Some(CollisionData { normal: axis, penetration, point_on_plane: max1 + axis * penetration });
    }
    if min_corr2 <= min_corr1 && max_corr2 > min_corr1 {
        let normal = -axis;
        let penetration = min_corr1 - max_corr2;
        return Some(CollisionData { normal, penetration, point_on_plane: min1 + normal * penetration });
    }
    None
}

pub fn closest_point_on_edges(target: Vec3, edges: &[Edge]) -> Vec3 {
    //! Clamped projection of `target` onto every edge, keeping the globally closest. Returns `target` if `edges` is empty.
    let mut closest = target;
    let mut closest_dist_sq = Fp::MAX;

    for edge in edges {
        let a_t = target - edge.pos_a;
        let a_b = edge.pos_b - edge.pos_a;

        // a zero-length edge yields NaN here, which fails both comparisons and lands on pos_b
        let t = a_t.dot(a_b) / a_b.dot(a_b);
        let candidate = if t < 0.0 {
            edge.pos_a
        } else if t <= 1.0 {
            edge.pos_a + a_b * t
        } else {
            edge.pos_b
        };

        let dist_sq = (target - candidate).length_squared();
        if dist_sq < closest_dist_sq {
            closest_dist_sq = dist_sq;
            closest = candidate;
        }
    }
    closest
}

pub fn add_possible_axis(axis: Vec3, axes: &mut Vec<Vec3>) {
    //! Normalizes and appends `axis` unless it has no usable direction or is near parallel to one already present.
    let length = axis.length();
    if !(length > Fp::EPSILON) {
        return;
    }
    let axis = axis / length;
    if axes.iter().any(|a| a.dot(axis).abs() >= 1.0 - EPSILON) {
        return;
    }
    axes.push(axis);
}

// ---------- Detector ---------- //

/// Step-local scratch reused by every pair test. Never shared between concurrently tested pairs.
#[derive(Debug, Default)]
pub struct NarrowPhaseContext {
    pub(crate) axes: Vec<Vec3>,
    pub(crate) shape_axes: Vec<Vec3>,
    pub(crate) edges_a: Vec<Edge>,
    pub(crate) edges_b: Vec<Edge>,
    pub(crate) poly_a: ReferencePolygon,
    pub(crate) poly_b: ReferencePolygon,
    pub(crate) clip_polygon: Vec<Vec3>,
    pub(crate) clip_scratch: Vec<Vec3>,
}
impl NarrowPhaseContext {
    pub fn new() -> NarrowPhaseContext {
        NarrowPhaseContext::default()
    }
}

pub type CollisionTestFn = fn(&mut NarrowPhaseContext, &Transform, &Shape, &Transform, &Shape) -> Option<CollisionData>;

/// Shape-pair dispatch, keyed by `shape_id_a | shape_id_b` so that the key is order independent.
#[derive(Clone)]
pub struct Detector {
    table: [Option<CollisionTestFn>; Shape::ID_COMBINATIONS],
}
impl Detector {
    pub fn new() -> Detector {
        let mut detector = Detector::empty();
        detector.register(Shape::SPHERE_ID, Shape::SPHERE_ID, sphere_sphere_test);

        let polyhedra = [Shape::CUBOID_ID, Shape::PYRAMID_ID, Shape::HULL_ID];
        for &a in polyhedra.iter() {
            for &b in polyhedra.iter() {
                detector.register(a, b, polyhedron_test);
            }
            detector.register(a, Shape::SPHERE_ID, polyhedron_sphere_test);
        }
        detector
    }
    pub fn empty() -> Detector {
        //! A detector with no registered shape pairs. Every check reports no collision.
        Detector { table: [None; Shape::ID_COMBINATIONS] }
    }

    pub fn register(&mut self, id_a: u8, id_b: u8, test: CollisionTestFn) {
        self.table[(id_a | id_b) as usize] = Some(test);
    }
    pub fn is_registered(&self, id_a: u8, id_b: u8) -> bool {
        self.table[(id_a | id_b) as usize].is_some()
    }

    pub fn check_collision(&self, ctx: &mut NarrowPhaseContext, a: &RigidBody, b: &RigidBody) -> Option<CollisionData> {
        //! Runs the exact test for the pair's shapes. Bodies without a shape never collide.
        let shape_a = a.shape.as_ref()?;
        let shape_b = b.shape.as_ref()?;
        self.check_shapes(ctx, &a.transform, shape_a, &b.transform, shape_b)
    }
    pub fn check_shapes(&self, ctx: &mut NarrowPhaseContext, tr_a: &Transform, shape_a: &Shape, tr_b: &Transform, shape_b: &Shape) -> Option<CollisionData> {
        let key = (shape_a.shape_id() | shape_b.shape_id()) as usize;
        match self.table.get(key).copied().flatten() {
            Some(test) => {
                let result = test(ctx, tr_a, shape_a, tr_b, shape_b);
                trace!("narrowphase {:#06b}: {:?}", key, result.map(|d| d.penetration));
                result
            }
            None => {
                error!("no collision test registered for shape ids {} and {}", shape_a.shape_id(), shape_b.shape_id());
                None
            }
        }
    }

    pub fn build_manifold(
        &self,
        ctx: &mut NarrowPhaseContext,
        a: &RigidBody,
        b: &RigidBody,
        data: &CollisionData,
        merge_distance: Fp,
        out: &mut manifold::Manifold,
    ) -> bool {
        //! Appends the contact points for a pair `check_collision` reported as colliding.
        match (a.shape.as_ref(), b.shape.as_ref()) {
            (Some(shape_a), Some(shape_b)) => {
                manifold::build_collision_manifold(ctx, &a.transform, shape_a, &b.transform, shape_b, data, merge_distance, out)
            }
            _ => false,
        }
    }
}
impl Default for Detector {
    fn default() -> Detector {
        Detector::new()
    }
}
impl std::fmt::Debug for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let keys: Vec<usize> = (0..Shape::ID_COMBINATIONS).filter(|&k| self.table[k].is_some()).collect();
        f.debug_struct("Detector").field("registered", &keys).finish()
    }
}

// ---------- Shape-Shape tests ---------- //

fn best_axis(axes: &[Vec3], tr_a: &Transform, shape_a: &Shape, tr_b: &Transform, shape_b: &Shape) -> Option<CollisionData> {
    // first separating axis ends the search; ties go to the later axis
    let mut best: Option<CollisionData> = None;
    for &axis in axes {
        let current = check_collision_axis(axis, tr_a, shape_a, tr_b, shape_b)?;
        match best {
            Some(b) if current.penetration < b.penetration => (),
            _ => best = Some(current),
        }
    }
    best
}

pub fn sphere_sphere_test(_: &mut NarrowPhaseContext, tr_a: &Transform, shape_a: &Shape, tr_b: &Transform, shape_b: &Shape) -> Option<CollisionData> {
    let between = tr_b.position - tr_a.position;
    let axis = if between.length_squared() < EPSILON * EPSILON {
        Vec3::new(0.0, 1.0, 0.0) // coincident centers
    } else {
        between.normalize()
    };
    // spheres that only touch have nothing to resolve
    check_collision_axis(axis, tr_a, shape_a, tr_b, shape_b).filter(|data| data.penetration < 0.0)
}

pub fn polyhedron_test(ctx: &mut NarrowPhaseContext, tr_a: &Transform, shape_a: &Shape, tr_b: &Transform, shape_b: &Shape) -> Option<CollisionData> {
    ctx.axes.clear();
    ctx.shape_axes.clear();
    shape_a.collision_axes(tr_a, &mut ctx.shape_axes);
    shape_b.collision_axes(tr_b, &mut ctx.shape_axes);
    for &axis in ctx.shape_axes.iter() {
        add_possible_axis(axis, &mut ctx.axes);
    }

    ctx.edges_a.clear();
    ctx.edges_b.clear();
    shape_a.edges(tr_a, &mut ctx.edges_a);
    shape_b.edges(tr_b, &mut ctx.edges_b);
    for ea in ctx.edges_a.iter() {
        let da = ea.pos_b - ea.pos_a;
        for eb in ctx.edges_b.iter() {
            let db = eb.pos_b - eb.pos_a;
            let cross = da.cross(db);
            // compare the sine of the edge angle, so small bodies keep their edge axes
            if cross.length_squared() > EPSILON * EPSILON * da.length_squared() * db.length_squared() {
                add_possible_axis(cross, &mut ctx.axes);
            }
        }
    }

    best_axis(&ctx.axes, tr_a, shape_a, tr_b, shape_b)
}

pub fn polyhedron_sphere_test(ctx: &mut NarrowPhaseContext, tr_a: &Transform, shape_a: &Shape, tr_b: &Transform, shape_b: &Shape) -> Option<CollisionData> {
    let (complex_tr, complex, sphere_tr) = if shape_a.shape_id() == Shape::SPHERE_ID {
        (tr_b, shape_b, tr_a)
    } else {
        (tr_a, shape_a, tr_b)
    };

    ctx.axes.clear();
    ctx.shape_axes.clear();
    complex.collision_axes(complex_tr, &mut ctx.shape_axes);
    for &axis in ctx.shape_axes.iter() {
        add_possible_axis(axis, &mut ctx.axes);
    }

    ctx.edges_a.clear();
    complex.edges(complex_tr, &mut ctx.edges_a);
    let closest = closest_point_on_edges(sphere_tr.position, &ctx.edges_a);
    add_possible_axis(sphere_tr.position - closest, &mut ctx.axes);

    best_axis(&ctx.axes, tr_a, shape_a, tr_b, shape_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Cuboid, Pyramid, Sphere};
    use crate::Quat;
    use approx::assert_abs_diff_eq;

    fn unit_box_at(x: Fp, y: Fp, z: Fp) -> RigidBody {
        RigidBody::new(Vec3::new(x, y, z), Shape::from(Cuboid::new(Vec3::splat(0.5))))
    }
    fn sphere_at(x: Fp, y: Fp, z: Fp, radius: Fp) -> RigidBody {
        RigidBody::new(Vec3::new(x, y, z), Shape::from(Sphere::new(radius)))
    }

    #[test]
    fn axis_overlap_matches_interval_overlap() {
        let axis = Vec3::new(1.0, 0.0, 0.0);
        let a = unit_box_at(0.0, 0.0, 0.0);
        let (sa, sb) = (a.shape.as_ref().unwrap(), a.shape.as_ref().unwrap());

        // [-0.5, 0.5] against [0.2, 1.2]
        let b = unit_box_at(0.7, 0.0, 0.0);
        let data = check_collision_axis(axis, &a.transform, sa, &b.transform, sb).unwrap();
        assert_abs_diff_eq!(data.penetration, -0.3, epsilon = 1e-5);
        assert_abs_diff_eq!(data.normal, axis, epsilon = 1e-6);

        // reversed operands flip the normal
        let data = check_collision_axis(axis, &b.transform, sb, &a.transform, sa).unwrap();
        assert_abs_diff_eq!(data.penetration, -0.3, epsilon = 1e-5);
        assert_abs_diff_eq!(data.normal, -axis, epsilon = 1e-6);

        // [-0.5, 0.5] against [0.6, 1.6]
        let b = unit_box_at(1.1, 0.0, 0.0);
        assert!(check_collision_axis(axis, &a.transform, sa, &b.transform, sb).is_none());
        assert!(check_collision_axis(axis, &b.transform, sb, &a.transform, sa).is_none());
    }

    #[test]
    fn point_on_plane_sits_on_the_deeper_support() {
        let axis = Vec3::new(1.0, 0.0, 0.0);
        let a = sphere_at(0.0, 0.0, 0.0, 1.0);
        let b = sphere_at(1.5, 0.0, 0.0, 1.0);
        let s = a.shape.as_ref().unwrap();
        let data = check_collision_axis(axis, &a.transform, s, &b.transform, s).unwrap();
        // max support of A is x = 1.0, pushed back by the -0.5 penetration
        assert_abs_diff_eq!(data.point_on_plane, Vec3::new(0.5, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn closest_point_clamps_to_segments() {
        let edges = [
            Edge::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)),
            Edge::new(Vec3::new(5.0, 5.0, 0.0), Vec3::new(5.0, 6.0, 0.0)),
        ];
        assert_abs_diff_eq!(closest_point_on_edges(Vec3::new(1.0, 3.0, 0.0), &edges), Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
        assert_abs_diff_eq!(closest_point_on_edges(Vec3::new(-4.0, 1.0, 0.0), &edges), Vec3::new(0.0, 0.0, 0.0), epsilon = 1e-6);
        assert_abs_diff_eq!(closest_point_on_edges(Vec3::new(5.0, 9.0, 0.0), &edges), Vec3::new(5.0, 6.0, 0.0), epsilon = 1e-6);

        let degenerate = [Edge::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(1.0, 1.0, 1.0))];
        assert_abs_diff_eq!(closest_point_on_edges(Vec3::ZERO, &degenerate), Vec3::new(1.0, 1.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn possible_axes_are_deduplicated() {
        let mut axes = vec![];
        add_possible_axis(Vec3::new(2.0, 0.0, 0.0), &mut axes);
        add_possible_axis(Vec3::new(-1.0, 0.0, 0.0), &mut axes);
        add_possible_axis(Vec3::new(1.0, 0.00001, 0.0), &mut axes);
        add_possible_axis(Vec3::ZERO, &mut axes);
        add_possible_axis(Vec3::new(0.0, 0.0, 3.0), &mut axes);
        // short axes keep their direction
        add_possible_axis(Vec3::new(0.0, 0.001, 0.0), &mut axes);
        assert_eq!(axes.len(), 3);
        assert_abs_diff_eq!(axes[0], Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
        assert_abs_diff_eq!(axes[1], Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-6);
        assert_abs_diff_eq!(axes[2], Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn separated_cuboids_do_not_collide() {
        let detector = Detector::new();
        let mut ctx = NarrowPhaseContext::new();
        let a = unit_box_at(0.0, 0.0, 0.0);
        let b = unit_box_at(2.0, 0.0, 0.0);
        assert!(detector.check_collision(&mut ctx, &a, &b).is_none());
        assert!(detector.check_collision(&mut ctx, &b, &a).is_none());
    }

    #[test]
    fn overlapping_cuboids_report_shallowest_axis() {
        let detector = Detector::new();
        let mut ctx = NarrowPhaseContext::new();
        let a = unit_box_at(0.0, 0.0, 0.0);
        let b = unit_box_at(0.7, 0.0, 0.0);

        let data = detector.check_collision(&mut ctx, &a, &b).unwrap();
        assert_abs_diff_eq!(data.penetration.abs(), 0.3, epsilon = 1e-4);
        assert_abs_diff_eq!(data.normal.x.abs(), 1.0, epsilon = 1e-4);
        assert!(data.normal.x > 0.0);
    }

    #[test]
    fn rotated_cuboid_uses_edge_axes() {
        let detector = Detector::new();
        let mut ctx = NarrowPhaseContext::new();
        let a = unit_box_at(0.0, 0.0, 0.0);
        // rotated 45 degrees about y and z; corner region only
        let rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_4 as Fp) * Quat::from_rotation_z(std::f32::consts::FRAC_PI_4 as Fp);
        let far = unit_box_at(1.6, 0.0, 0.0).with_orientation(rotation);
        assert!(detector.check_collision(&mut ctx, &a, &far).is_none());

        let near = unit_box_at(1.0, 0.0, 0.0).with_orientation(rotation);
        let data = detector.check_collision(&mut ctx, &a, &near).unwrap();
        assert!(data.penetration <= 0.0);
        assert_abs_diff_eq!(data.normal.length(), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn small_bodies_keep_edge_axes() {
        // crossed edges meet at x = 1.414 * scale; every face axis overlaps at either offset
        let detector = Detector::new();
        let mut ctx = NarrowPhaseContext::new();
        let quarter = std::f32::consts::FRAC_PI_4 as Fp;
        for &scale in [1.0, 0.05, 0.01].iter() {
            let cube = |x: Fp, rotation: Quat| {
                RigidBody::new(Vec3::new(x, 0.0, 0.0), Shape::from(Cuboid::new(Vec3::splat(0.5 * scale)))).with_orientation(rotation)
            };
            let a = cube(0.0, Quat::from_rotation_z(quarter));

            let apart = cube(1.5 * scale, Quat::from_rotation_y(quarter));
            assert!(detector.check_collision(&mut ctx, &a, &apart).is_none(), "scale {}", scale);
            assert!(detector.check_collision(&mut ctx, &apart, &a).is_none(), "scale {}", scale);

            let crossing = cube(1.3 * scale, Quat::from_rotation_y(quarter));
            let data = detector.check_collision(&mut ctx, &a, &crossing).unwrap();
            assert!(data.penetration < 0.0);
        }
    }

    #[test]
    fn sphere_sphere_penetration() {
        let detector = Detector::new();
        let mut ctx = NarrowPhaseContext::new();
        let a = sphere_at(0.0, 0.0, 0.0, 1.0);
        let b = sphere_at(0.0, 1.5, 0.0, 0.75);

        let data = detector.check_collision(&mut ctx, &a, &b).unwrap();
        assert_abs_diff_eq!(data.penetration, 1.5 - 1.75, epsilon = 1e-5);
        assert_abs_diff_eq!(data.normal, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-5);

        let c = sphere_at(0.0, 1.76, 0.0, 0.75);
        assert!(detector.check_collision(&mut ctx, &a, &c).is_none());

        // exactly touching is not a collision
        let touching = sphere_at(2.0, 0.0, 0.0, 1.0);
        assert!(detector.check_collision(&mut ctx, &a, &touching).is_none());
        assert!(detector.check_collision(&mut ctx, &touching, &a).is_none());

        // coincident centers still yield a normal
        let d = sphere_at(0.0, 0.0, 0.0, 1.0);
        let data = detector.check_collision(&mut ctx, &a, &d).unwrap();
        assert_abs_diff_eq!(data.normal.length(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn sphere_against_cuboid_either_order() {
        let detector = Detector::new();
        let mut ctx = NarrowPhaseContext::new();
        let cuboid = unit_box_at(0.0, 0.0, 0.0);
        let sphere = sphere_at(0.0, 0.9, 0.0, 0.5);

        let data = detector.check_collision(&mut ctx, &cuboid, &sphere).unwrap();
        assert_abs_diff_eq!(data.penetration, -0.1, epsilon = 1e-4);
        assert_abs_diff_eq!(data.normal, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-4);

        let data = detector.check_collision(&mut ctx, &sphere, &cuboid).unwrap();
        assert_abs_diff_eq!(data.penetration, -0.1, epsilon = 1e-4);
        assert_abs_diff_eq!(data.normal, Vec3::new(0.0, -1.0, 0.0), epsilon = 1e-4);

        // near the corner, outside the rounded region but inside the face slabs
        let corner = sphere_at(0.8, 0.8, 0.8, 0.5);
        assert!(detector.check_collision(&mut ctx, &cuboid, &corner).is_none());
    }

    #[test]
    fn pyramid_against_cuboid() {
        let detector = Detector::new();
        let mut ctx = NarrowPhaseContext::new();
        let floor = RigidBody::new(Vec3::ZERO, Shape::from(Cuboid::new(Vec3::new(2.0, 0.5, 2.0))));
        let resting = RigidBody::new(Vec3::new(0.0, 0.9, 0.0), Shape::from(Pyramid::new(Vec3::splat(0.5))));
        let data = detector.check_collision(&mut ctx, &floor, &resting).unwrap();
        assert_abs_diff_eq!(data.penetration, -0.1, epsilon = 1e-4);
        assert_abs_diff_eq!(data.normal, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-4);

        let above = RigidBody::new(Vec3::new(0.0, 1.1, 0.0), Shape::from(Pyramid::new(Vec3::splat(0.5))));
        assert!(detector.check_collision(&mut ctx, &floor, &above).is_none());
    }

    #[test]
    fn unregistered_pair_reports_no_collision() {
        let detector = Detector::empty();
        let mut ctx = NarrowPhaseContext::new();
        assert!(!detector.is_registered(Shape::SPHERE_ID, Shape::SPHERE_ID));
        let a = sphere_at(0.0, 0.0, 0.0, 1.0);
        let b = sphere_at(0.5, 0.0, 0.0, 1.0);
        assert!(detector.check_collision(&mut ctx, &a, &b).is_none());
    }

    #[test]
    fn shapeless_bodies_never_collide() {
        let detector = Detector::new();
        let mut ctx = NarrowPhaseContext::new();
        let a = RigidBody::without_shape(Vec3::ZERO);
        let b = sphere_at(0.0, 0.0, 0.0, 1.0);
        assert!(detector.check_collision(&mut ctx, &a, &b).is_none());
    }

    #[test]
    fn octants_tile_the_box() {
        let aabb = Aabb::new(Vec3::new(-1.0, -2.0, -3.0), Vec3::new(1.0, 2.0, 3.0));
        let lower = aabb.octant(0);
        assert_eq!(lower, Aabb::new(aabb.min, Vec3::ZERO));
        let upper = aabb.octant(7);
        assert_eq!(upper, Aabb::new(Vec3::ZERO, aabb.max));
        let x_only = aabb.octant(1);
        assert_eq!(x_only, Aabb::new(Vec3::new(0.0, -2.0, -3.0), Vec3::new(1.0, 0.0, 0.0)));
        assert!((0..8).all(|i| aabb.contains(&aabb.octant(i))));
    }
}
