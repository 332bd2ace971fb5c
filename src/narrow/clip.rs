//! Sutherland-Hodgman polygon clipping against planes.

use super::Plane;
use crate::{Vec3, EPSILON};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipMode {
    /// Drops outside vertices without generating boundary points.
    Discard,
    /// Replaces every crossing edge with its intersection on the plane.
    Split,
}

#[inline]
pub fn plane_edge_intersection(plane: &Plane, start: Vec3, end: Vec3) -> Vec3 {
    //! Point where the segment `start..end` meets `plane`. Returns `start` when the segment is near parallel.
    let ab = end - start;
    let ab_p = plane.normal.dot(ab);

    if ab_p.abs() > EPSILON {
        let p_co = plane.normal * -plane.distance;
        let fac = -plane.normal.dot(start - p_co) / ab_p;
        start + ab * fac
    } else {
        start
    }
}

pub fn sutherland_hodgman(polygon: &mut Vec<Vec3>, planes: &[Plane], mode: ClipMode, scratch: &mut Vec<Vec3>) {
    //! Clips the closed polygon `polygon` by each plane in turn, in place. `scratch` is swapped in as the
    //! second buffer. Stops early once nothing is left.
    for plane in planes {
        if polygon.is_empty() {
            break;
        }
        std::mem::swap(polygon, scratch);
        polygon.clear();

        let mut start = match scratch.last() {
            Some(&p) => p,
            None => break,
        };
        for &end in scratch.iter() {
            let start_in = plane.is_point_inside(start);
            let end_in = plane.is_point_inside(end);

            match mode {
                ClipMode::Split => {
                    if start_in && end_in {
                        polygon.push(end);
                    } else if start_in {
                        polygon.push(plane_edge_intersection(plane, start, end));
                    } else if end_in {
                        polygon.push(plane_edge_intersection(plane, end, start));
                        polygon.push(end);
                    }
                }
                ClipMode::Discard => {
                    if end_in {
                        polygon.push(end);
                    }
                }
            }
            start = end;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn square() -> Vec<Vec3> {
        vec![
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(-1.0, 0.0, 1.0),
        ]
    }

    #[test]
    fn intersection_lands_on_plane() {
        let plane = Plane::from_point_normal(Vec3::new(0.25, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let hit = plane_edge_intersection(&plane, Vec3::new(-1.0, 2.0, 0.0), Vec3::new(1.0, 2.0, 0.0));
        assert_abs_diff_eq!(hit, Vec3::new(0.25, 2.0, 0.0), epsilon = 1e-5);

        // parallel segment
        let start = Vec3::new(-1.0, 0.0, 0.0);
        assert_eq!(plane_edge_intersection(&plane, start, Vec3::new(-1.0, 1.0, 0.0)), start);
    }

    #[test]
    fn split_cuts_square_in_half() {
        let mut polygon = square();
        let mut scratch = Vec::new();
        let planes = [Plane::from_point_normal(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0))];
        sutherland_hodgman(&mut polygon, &planes, ClipMode::Split, &mut scratch);

        assert_eq!(polygon.len(), 4);
        assert!(polygon.iter().all(|p| p.x >= -1e-5));
        assert!(polygon.iter().any(|p| (p.x - 0.0).abs() < 1e-5 && (p.z + 1.0).abs() < 1e-5));
        assert!(polygon.iter().any(|p| (p.x - 0.0).abs() < 1e-5 && (p.z - 1.0).abs() < 1e-5));
    }

    #[test]
    fn discard_only_keeps_inside_vertices() {
        let mut polygon = square();
        let mut scratch = Vec::new();
        let planes = [Plane::from_point_normal(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0))];
        sutherland_hodgman(&mut polygon, &planes, ClipMode::Discard, &mut scratch);

        assert_eq!(polygon, vec![Vec3::new(1.0, 0.0, -1.0), Vec3::new(1.0, 0.0, 1.0)]);
    }

    #[test]
    fn clipping_is_idempotent() {
        let planes = [
            Plane::from_point_normal(Vec3::new(-0.5, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
            Plane::from_point_normal(Vec3::new(0.0, 0.0, 0.5), Vec3::new(0.0, 0.0, -1.0)),
        ];
        let mut scratch = Vec::new();
        let mut once = square();
        sutherland_hodgman(&mut once, &planes, ClipMode::Split, &mut scratch);
        let mut twice = once.clone();
        sutherland_hodgman(&mut twice, &planes, ClipMode::Split, &mut scratch);

        assert_eq!(once.len(), twice.len());
        for (a, b) in once.iter().zip(twice.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-5);
        }
        for p in once.iter() {
            assert!(planes.iter().all(|plane| plane.is_point_inside(*p)));
        }
    }

    #[test]
    fn fully_outside_empties_and_stops() {
        let mut polygon = square();
        let mut scratch = Vec::new();
        let planes = [
            Plane::from_point_normal(Vec3::new(5.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
            Plane::from_point_normal(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0)),
        ];
        sutherland_hodgman(&mut polygon, &planes, ClipMode::Split, &mut scratch);
        assert!(polygon.is_empty());

        // empty input stays empty
        sutherland_hodgman(&mut polygon, &planes, ClipMode::Discard, &mut scratch);
        assert!(polygon.is_empty());
    }
}
