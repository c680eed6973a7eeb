//! Hittable trait and Hit record for ray-object intersection.

use crate::{Material, Ray};
use sawass_math::{Aabb, Vec2, Vec3};

/// Record of a ray-object intersection.
#[derive(Clone, Copy, Debug)]
pub struct Hit<'a> {
    /// Ray parameter where the intersection occurs
    pub distance: f32,
    /// Point of intersection
    pub point: Vec3,
    /// Unit surface normal, pointing out of the surface (not against the ray)
    pub normal: Vec3,
    /// UV texture coordinates
    pub uv: Vec2,
    /// Material at the intersection point, borrowed from the entity
    pub material: &'a Material,
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Closest intersection with `ray` whose distance lies strictly inside
    /// `(t_min, t_max)`, with moving geometry evaluated at `time`.
    fn hit(&self, ray: &Ray, time: f32, t_min: f32, t_max: f32) -> Option<Hit<'_>>;

    /// Box enclosing the object over the whole interval `[t0, t1]`, or `None`
    /// for unbounded geometry.
    fn bounding_box(&self, t0: f32, t1: f32) -> Option<Aabb>;

    /// Number of primitives behind this object; aggregates count through
    /// to their members.
    fn primitive_count(&self) -> usize {
        1
    }
}

impl<T: Hittable + ?Sized> Hittable for Box<T> {
    fn hit(&self, ray: &Ray, time: f32, t_min: f32, t_max: f32) -> Option<Hit<'_>> {
        (**self).hit(ray, time, t_min, t_max)
    }

    fn bounding_box(&self, t0: f32, t1: f32) -> Option<Aabb> {
        (**self).bounding_box(t0, t1)
    }

    fn primitive_count(&self) -> usize {
        (**self).primitive_count()
    }
}

/// A flat list of hittable objects, queried by linear scan.
#[derive(Default)]
pub struct HittableList {
    objects: Vec<Box<dyn Hittable>>,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            objects: Vec::with_capacity(capacity),
        }
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: Box<dyn Hittable>) {
        self.objects.push(object);
    }

    /// Take every object out, leaving the list empty.
    pub fn take(&mut self) -> Vec<Box<dyn Hittable>> {
        std::mem::take(&mut self.objects)
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl From<Vec<Box<dyn Hittable>>> for HittableList {
    fn from(objects: Vec<Box<dyn Hittable>>) -> Self {
        Self { objects }
    }
}

impl Hittable for HittableList {
    fn hit(&self, ray: &Ray, time: f32, t_min: f32, t_max: f32) -> Option<Hit<'_>> {
        let mut closest: Option<Hit<'_>> = None;
        let mut closest_so_far = t_max;

        for object in &self.objects {
            if let Some(hit) = object.hit(ray, time, t_min, closest_so_far) {
                closest_so_far = hit.distance;
                closest = Some(hit);
            }
        }

        closest
    }

    fn bounding_box(&self, t0: f32, t1: f32) -> Option<Aabb> {
        if self.objects.is_empty() {
            return None;
        }
        self.objects.iter().try_fold(Aabb::INVALID, |acc, object| {
            object
                .bounding_box(t0, t1)
                .map(|b| Aabb::surrounding(&acc, &b))
        })
    }

    fn primitive_count(&self) -> usize {
        self.objects.iter().map(|o| o.primitive_count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sphere;

    fn grey() -> Material {
        Material::lambertian(Vec3::splat(0.5))
    }

    #[test]
    fn test_list_returns_closest_hit() {
        let mut list = HittableList::new();
        list.add(Box::new(Sphere::new(Vec3::new(0.0, 0.0, -10.0), 1.0, grey())));
        list.add(Box::new(Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0, grey())));
        list.add(Box::new(Sphere::new(Vec3::new(0.0, 0.0, -6.0), 1.0, grey())));

        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        let hit = list.hit(&ray, 0.0, 0.001, f32::INFINITY).unwrap();

        assert!((hit.distance - 2.0).abs() < 1e-5);
        assert!((hit.point - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-5);
    }

    #[test]
    fn test_list_respects_t_max() {
        let mut list = HittableList::new();
        list.add(Box::new(Sphere::new(Vec3::new(0.0, 0.0, -10.0), 1.0, grey())));

        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        assert!(list.hit(&ray, 0.0, 0.001, 5.0).is_none());
        assert!(list.hit(&ray, 0.0, 0.001, 9.5).is_some());
    }

    #[test]
    fn test_empty_list() {
        let list = HittableList::new();
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::X);

        assert!(list.is_empty());
        assert!(list.hit(&ray, 0.0, 0.0, f32::INFINITY).is_none());
        assert!(list.bounding_box(0.0, 1.0).is_none());
    }

    #[test]
    fn test_list_bounding_box() {
        let mut list = HittableList::new();
        list.add(Box::new(Sphere::new(Vec3::new(-2.0, 0.0, 0.0), 1.0, grey())));
        list.add(Box::new(Sphere::new(Vec3::new(3.0, 1.0, 0.0), 0.5, grey())));

        let bbox = list.bounding_box(0.0, 1.0).unwrap();
        assert_eq!(bbox.min, Vec3::new(-3.0, -1.0, -1.0));
        assert_eq!(bbox.max, Vec3::new(3.5, 1.5, 1.0));
    }
}
