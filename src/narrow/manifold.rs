//! Contact manifold generation by reference/incident face clipping.

use super::{clip::{sutherland_hodgman, ClipMode}, CollisionData, NarrowPhaseContext, Plane};
use crate::{body::{BodyHandle, Transform}, shape::{CollisionShape, Shape}, Fp, Vec3};
use log::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Contact {
    pub point_on_a: Vec3,
    pub point_on_b: Vec3,
    /// Unit normal from body A toward body B.
    pub normal: Vec3,
    /// Positive overlap depth along `normal`.
    pub penetration: Fp,
}
impl Contact {
    #[inline]
    pub fn new(point_on_a: Vec3, point_on_b: Vec3, normal: Vec3, penetration: Fp) -> Contact {
        Contact { point_on_a, point_on_b, normal, penetration }
    }
}

/// Contacts between two bodies for a single step. Handed off by value to whatever resolves them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Manifold {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    contacts: Vec<Contact>,
}
impl Manifold {
    pub fn new(body_a: BodyHandle, body_b: BodyHandle) -> Manifold {
        Manifold { body_a, body_b, contacts: Vec::new() }
    }

    pub fn add_contact(&mut self, contact: Contact, merge_distance: Fp) {
        //! Appends `contact`. With a positive `merge_distance`, contacts closer than it on body A are
        //! merged, keeping the deeper of the two.
        if merge_distance <= 0.0 {
            self.contacts.push(contact);
            return;
        }

        let threshold = merge_distance * merge_distance;
        let mut keep_new = true;
        self.contacts.retain(|existing| {
            if (existing.point_on_a - contact.point_on_a).length_squared() >= threshold {
                true
            } else if existing.penetration < contact.penetration {
                false
            } else {
                keep_new = false;
                true
            }
        });
        if keep_new {
            self.contacts.push(contact);
        }
    }

    #[inline]
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.contacts.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
    pub fn deepest(&self) -> Option<&Contact> {
        self.contacts.iter().fold(None, |deepest: Option<&Contact>, c| match deepest {
            Some(d) if d.penetration >= c.penetration => Some(d),
            _ => Some(c),
        })
    }
}

pub fn build_collision_manifold(
    ctx: &mut NarrowPhaseContext,
    tr_a: &Transform,
    shape_a: &Shape,
    tr_b: &Transform,
    shape_b: &Shape,
    data: &CollisionData,
    merge_distance: Fp,
    out: &mut Manifold,
) -> bool {
    //! Clips the incident face of one shape against the reference face of the other and appends a
    //! contact for every clipped point that penetrates. Returns whether any contact was produced.
    let NarrowPhaseContext { poly_a, poly_b, clip_polygon, clip_scratch, .. } = ctx;
    let normal = data.normal;
    let penetration = data.penetration;
    if penetration >= 0.0 {
        // touching without overlap
        return false;
    }

    poly_a.clear();
    poly_b.clear();
    shape_a.incident_reference_polygon(tr_a, normal, poly_a);
    shape_b.incident_reference_polygon(tr_b, -normal, poly_b);

    if poly_a.points.is_empty() || poly_b.points.is_empty() {
        warn!("manifold skipped: shape {} or {} produced no reference polygon", shape_a.shape_id(), shape_b.shape_id());
        return false;
    }

    // a single support point, as from a sphere, is the contact
    if poly_a.points.len() == 1 {
        let on_a = poly_a.points[0];
        out.add_contact(Contact::new(on_a, on_a + normal * penetration, normal, -penetration), merge_distance);
        return true;
    }
    if poly_b.points.len() == 1 {
        let on_b = poly_b.points[0];
        out.add_contact(Contact::new(on_b - normal * penetration, on_b, normal, -penetration), merge_distance);
        return true;
    }

    // the face most aligned with the normal is the reference
    let flipped = normal.dot(poly_a.normal).abs() <= normal.dot(poly_b.normal).abs();
    let (reference, incident) = if flipped { (&*poly_b, &*poly_a) } else { (&*poly_a, &*poly_b) };

    let ref_plane = Plane::from_point_normal(reference.points[0], -reference.normal);
    let offset = reference.points.iter().map(|p| p.dot(normal)).fold(Fp::MIN, Fp::max);

    clip_polygon.clear();
    clip_polygon.extend_from_slice(&incident.points);
    sutherland_hodgman(clip_polygon, &reference.adjacent_planes, ClipMode::Split, clip_scratch);
    sutherland_hodgman(clip_polygon, std::slice::from_ref(&ref_plane), ClipMode::Discard, clip_scratch);

    for &point in clip_polygon.iter() {
        let (pen, on_a, on_b) = if flipped {
            let pen = offset - point.dot(normal);
            (pen, point, point + normal * pen)
        } else {
            let pen = point.dot(normal) - offset;
            (pen, point - normal * pen, point)
        };
        if pen < 0.0 {
            out.add_contact(Contact::new(on_a, on_b, normal, -pen), merge_distance);
        }
    }
    !out.is_empty()
}
