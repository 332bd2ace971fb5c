//! Convex polyhedra with vertex/edge/face connectivity.

use crate::{body::Transform, narrow::{Aabb, Edge, Plane}, Vec3, EPSILON};
use super::ReferencePolygon;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct HullVertex {
    pub pos: Vec3,
    pub enclosing_faces: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct HullEdge {
    pub start: usize,
    pub end: usize,
    pub enclosing_faces: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct HullFace {
    /// Outward unit normal in hull space.
    pub normal: Vec3,
    /// Vertex indices in winding order.
    pub verts: Vec<usize>,
    pub edges: Vec<usize>,
}

/// A convex polyhedron in its own local space. Every edge is shared by exactly two faces once the hull
/// is closed.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvexHull {
    vertices: Vec<HullVertex>,
    edges: Vec<HullEdge>,
    faces: Vec<HullFace>,
    /// Face normals with antiparallel duplicates removed.
    unique_normals: Vec<Vec3>,
}

impl ConvexHull {
    pub fn new() -> ConvexHull {
        ConvexHull::default()
    }

    pub fn from_faces(points: &[Vec3], faces: &[&[usize]]) -> ConvexHull {
        //! Builds a hull from vertices and face index loops. Normals are taken from each loop's winding
        //! and turned outward relative to the vertex centroid.
        let mut hull = ConvexHull::new();
        for &p in points {
            hull.add_vertex(p);
        }
        let centroid = if points.is_empty() {
            Vec3::ZERO
        } else {
            points.iter().fold(Vec3::ZERO, |acc, &p| acc + p) / points.len() as crate::Fp
        };

        for &face in faces {
            let normal = newell_normal(points, face);
            let center = face.iter().fold(Vec3::ZERO, |acc, &i| acc + points[i]) / face.len().max(1) as crate::Fp;
            let normal = if normal.dot(center - centroid) < 0.0 { -normal } else { normal };
            hull.add_face(normal, face);
        }
        hull
    }

    pub fn cuboid(half_dims: Vec3) -> ConvexHull {
        let h = half_dims;
        let points = [
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
        ];
        let mut hull = ConvexHull::new();
        for &p in points.iter() {
            hull.add_vertex(p);
        }
        // explicit normals keep flat boxes well formed
        hull.add_face(Vec3::new(0.0, 0.0, -1.0), &[0, 1, 2, 3]);
        hull.add_face(Vec3::new(0.0, 0.0, 1.0), &[7, 6, 5, 4]);
        hull.add_face(Vec3::new(0.0, 1.0, 0.0), &[5, 6, 2, 1]);
        hull.add_face(Vec3::new(0.0, -1.0, 0.0), &[0, 3, 7, 4]);
        hull.add_face(Vec3::new(1.0, 0.0, 0.0), &[6, 7, 3, 2]);
        hull.add_face(Vec3::new(-1.0, 0.0, 0.0), &[4, 5, 1, 0]);
        hull
    }

    pub fn pyramid(half_dims: Vec3) -> ConvexHull {
        //! Square base at `-half_dims.y`, apex at `+half_dims.y`.
        let h = half_dims;
        let points = [
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(0.0, h.y, 0.0),
        ];
        let faces: [&[usize]; 5] = [&[0, 1, 4], &[1, 2, 4], &[2, 3, 4], &[3, 0, 4], &[0, 3, 2, 1]];
        ConvexHull::from_faces(&points, &faces)
    }

    pub fn add_vertex(&mut self, pos: Vec3) -> usize {
        self.vertices.push(HullVertex { pos, enclosing_faces: Vec::new() });
        self.vertices.len() - 1
    }

    pub fn add_face(&mut self, normal: Vec3, verts: &[usize]) -> usize {
        //! Adds a face over existing vertices, creating its edges or sharing ones another face already made.
        let normal = if normal.length_squared() > 0.0 { normal.normalize() } else { normal };
        let index = self.faces.len();
        let mut face = HullFace { normal, verts: verts.to_vec(), edges: Vec::with_capacity(verts.len()) };

        for (i, &start) in verts.iter().enumerate() {
            let end = verts[(i + 1) % verts.len()];
            let existing = self.edges.iter().position(|e| (e.start == start && e.end == end) || (e.start == end && e.end == start));
            let edge = match existing {
                Some(e) => e,
                None => {
                    self.edges.push(HullEdge { start, end, enclosing_faces: Vec::with_capacity(2) });
                    self.edges.len() - 1
                }
            };
            self.edges[edge].enclosing_faces.push(index);
            face.edges.push(edge);
            self.vertices[start].enclosing_faces.push(index);
        }

        if !self.unique_normals.iter().any(|n| n.dot(normal).abs() >= 1.0 - EPSILON) {
            self.unique_normals.push(normal);
        }
        self.faces.push(face);
        index
    }

    #[inline]
    pub fn vertices(&self) -> &[HullVertex] {
        &self.vertices
    }
    #[inline]
    pub fn edges(&self) -> &[HullEdge] {
        &self.edges
    }
    #[inline]
    pub fn faces(&self) -> &[HullFace] {
        &self.faces
    }
    #[inline]
    pub fn unique_normals(&self) -> &[Vec3] {
        &self.unique_normals
    }
    pub fn local_aabb(&self) -> Option<Aabb> {
        let points: Vec<Vec3> = self.vertices.iter().map(|v| v.pos).collect();
        Aabb::from_points(&points)
    }

    pub fn min_max_vertices(&self, local_axis: Vec3) -> Option<(usize, usize)> {
        //! Indices of the vertices with the lowest and highest projection onto `local_axis`.
        let (first, rest) = self.vertices.split_first()?;
        let start = local_axis.dot(first.pos);
        let (mut min_i, mut max_i, mut min_p, mut max_p) = (0, 0, start, start);
        for (i, v) in rest.iter().enumerate() {
            let proj = local_axis.dot(v.pos);
            if proj > max_p {
                max_p = proj;
                max_i = i + 1;
            }
            if proj <= min_p {
                min_p = proj;
                min_i = i + 1;
            }
        }
        Some((min_i, max_i))
    }

    pub(crate) fn world_min_max(&self, tr: &Transform, axis: Vec3) -> (Vec3, Vec3) {
        let local_axis = tr.inverse_transform_vector(axis);
        match self.min_max_vertices(local_axis) {
            Some((min, max)) => (tr.transform_point(self.vertices[min].pos), tr.transform_point(self.vertices[max].pos)),
            None => (tr.position, tr.position),
        }
    }

    pub(crate) fn world_axes(&self, tr: &Transform, out: &mut Vec<Vec3>) {
        out.extend(self.unique_normals.iter().map(|&n| tr.transform_vector(n)));
    }

    pub(crate) fn world_edges(&self, tr: &Transform, out: &mut Vec<Edge>) {
        out.extend(self.edges.iter().map(|e| {
            Edge::new(tr.transform_point(self.vertices[e.start].pos), tr.transform_point(self.vertices[e.end].pos))
        }));
    }

    pub(crate) fn world_reference_polygon(&self, tr: &Transform, axis: Vec3, out: &mut ReferencePolygon) {
        let local_axis = tr.inverse_transform_vector(axis);
        let furthest = match self.min_max_vertices(local_axis) {
            Some((_, max)) => &self.vertices[max],
            None => return,
        };

        let mut best_face = None;
        let mut best_corr = crate::Fp::MIN;
        for &f in furthest.enclosing_faces.iter() {
            let corr = local_axis.dot(self.faces[f].normal);
            if corr > best_corr {
                best_corr = corr;
                best_face = Some(f);
            }
        }
        let best = match best_face {
            Some(f) => f,
            None => return,
        };
        let face = &self.faces[best];

        out.normal = tr.transform_vector(face.normal);
        out.points.extend(face.verts.iter().map(|&v| tr.transform_point(self.vertices[v].pos)));

        for &e in face.edges.iter() {
            let edge = &self.edges[e];
            let on_edge = tr.transform_point(self.vertices[edge.start].pos);
            for &adjacent in edge.enclosing_faces.iter().filter(|&&f| f != best) {
                let normal = -tr.transform_vector(self.faces[adjacent].normal);
                out.adjacent_planes.push(Plane::from_point_normal(on_edge, normal));
            }
        }
    }
}

fn newell_normal(points: &[Vec3], face: &[usize]) -> Vec3 {
    let mut normal = Vec3::ZERO;
    for (i, &a) in face.iter().enumerate() {
        let (p, q) = (points[a], points[face[(i + 1) % face.len()]]);
        normal += Vec3::new((p.y - q.y) * (p.z + q.z), (p.z - q.z) * (p.x + q.x), (p.x - q.x) * (p.y + q.y));
    }
    if normal.length_squared() > 0.0 { normal.normalize() } else { normal }
}
