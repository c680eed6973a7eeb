//! Sphere primitive for ray tracing, optionally moving for motion blur.

use crate::{
    hittable::{Hit, Hittable},
    Material, Ray,
};
use sawass_math::{lerp, Aabb, Vec2, Vec3};
use std::f32::consts::PI;

/// Where an entity sits at a given time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Static(Vec3),
    /// Linear travel from `start` (at `start_time`) to `end` (at `end_time`).
    /// Times outside the interval extrapolate along the same line.
    Linear {
        start: Vec3,
        end: Vec3,
        start_time: f32,
        end_time: f32,
    },
}

impl Motion {
    pub fn position(&self, time: f32) -> Vec3 {
        match *self {
            Motion::Static(center) => center,
            Motion::Linear {
                start,
                end,
                start_time,
                end_time,
            } => {
                let span = end_time - start_time;
                if span.abs() <= f32::EPSILON {
                    return start;
                }
                lerp(start, end, (time - start_time) / span)
            }
        }
    }

    pub fn is_static(&self) -> bool {
        match *self {
            Motion::Static(_) => true,
            Motion::Linear { start, end, .. } => start == end,
        }
    }
}

/// A sphere primitive. Owns its material.
#[derive(Debug, Clone)]
pub struct Sphere {
    motion: Motion,
    radius: f32,
    material: Material,
}

impl Sphere {
    /// Create a new static sphere. Negative radii are clamped to zero.
    pub fn new(center: Vec3, radius: f32, material: Material) -> Self {
        Self {
            motion: Motion::Static(center),
            radius: radius.max(0.0),
            material,
        }
    }

    /// Create a sphere travelling from `start` to `end` over
    /// `[start_time, end_time]`.
    pub fn moving(
        start: Vec3,
        end: Vec3,
        start_time: f32,
        end_time: f32,
        radius: f32,
        material: Material,
    ) -> Self {
        Self {
            motion: Motion::Linear {
                start,
                end,
                start_time,
                end_time,
            },
            radius: radius.max(0.0),
            material,
        }
    }

    pub fn center(&self, time: f32) -> Vec3 {
        self.motion.position(time)
    }

    /// UV coordinates for a point on the unit sphere centered at origin.
    ///
    /// `u` runs around the Y axis from the +X direction, `v` from the south
    /// pole (0) to the north pole (1).
    pub fn uv(p: Vec3) -> Vec2 {
        let phi = p.z.atan2(p.x);
        // Clamp away rounding that would push asin out of its domain.
        let theta = p.y.clamp(-1.0, 1.0).asin();

        Vec2::new(1.0 - (phi + PI) / (2.0 * PI), (theta + PI / 2.0) / PI)
    }
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, time: f32, t_min: f32, t_max: f32) -> Option<Hit<'_>> {
        let center = self.center(time);
        let direction = ray.direction();

        // t²(D·D) + 2t D·(O-C) + (O-C)·(O-C) - r² = 0
        let oc = ray.origin() - center;
        let a = direction.length_squared();
        if a < f32::EPSILON {
            return None;
        }
        let b = direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = b * b - a * c;
        if discriminant <= 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (-b - sqrtd) / a;
        if root <= t_min || root >= t_max {
            root = (-b + sqrtd) / a;
            if root <= t_min || root >= t_max {
                return None;
            }
        }

        let point = ray.at(root);
        let normal = (point - center) / self.radius;

        Some(Hit {
            distance: root,
            point,
            normal,
            uv: Self::uv(normal),
            material: &self.material,
        })
    }

    fn bounding_box(&self, t0: f32, t1: f32) -> Option<Aabb> {
        let box0 = Aabb::around(self.center(t0), self.radius);
        if self.motion.is_static() {
            return Some(box0);
        }
        let box1 = Aabb::around(self.center(t1), self.radius);
        Some(Aabb::surrounding(&box0, &box1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn grey() -> Material {
        Material::lambertian(Color::new(0.5, 0.5, 0.5))
    }

    #[test]
    fn test_sphere_hit_from_outside() {
        let center = Vec3::new(0.0, 0.0, -1.0);
        let sphere = Sphere::new(center, 0.5, grey());

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let hit = sphere.hit(&ray, 0.0, 0.001, f32::INFINITY).unwrap();

        assert!((hit.distance - 0.5).abs() < 1e-5); // Should hit at t=0.5
        assert!(((hit.point - center).length() - 0.5).abs() < 1e-5);
        assert!((hit.normal - (hit.point - center) / 0.5).length() < 1e-6);
        assert!((hit.normal - Vec3::Z).length() < 1e-5);
        assert!((hit.normal.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_sphere_hit_from_inside_uses_far_root() {
        let sphere = Sphere::new(Vec3::ZERO, 2.0, grey());
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::X);
        let hit = sphere.hit(&ray, 0.0, 0.001, f32::INFINITY).unwrap();

        assert!((hit.distance - 2.0).abs() < 1e-5);
        // Normal still points outward
        assert!((hit.normal - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_sphere_random_hits_lie_on_surface() {
        let mut rng = StdRng::seed_from_u64(31);
        let center = Vec3::new(1.0, -2.0, 3.0);
        let radius = 1.5;
        let sphere = Sphere::new(center, radius, grey());

        for _ in 0..500 {
            let origin = center
                + Vec3::new(
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                );
            if (origin - center).length() <= radius {
                continue;
            }
            let ray = Ray::new_simple(origin, center - origin);
            let hit = sphere.hit(&ray, 0.0, 0.001, f32::INFINITY).unwrap();

            assert!(((hit.point - center).length() - radius).abs() < 1e-3);
            assert!((hit.normal - (hit.point - center) / radius).length() < 1e-5);
            // Aimed at the center, the near root faces the origin
            assert!(hit.normal.dot(ray.direction()) < 0.0);
        }
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, grey());

        // Ray pointing away from sphere
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert!(sphere.hit(&ray, 0.0, 0.001, f32::INFINITY).is_none());

        // Parallel ray offset by more than the radius
        let ray = Ray::new_simple(Vec3::new(0.6, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(sphere.hit(&ray, 0.0, 0.001, f32::INFINITY).is_none());

        // Tangent ray (zero discriminant) is a miss
        let ray = Ray::new_simple(Vec3::new(0.5, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(sphere.hit(&ray, 0.0, 0.001, f32::INFINITY).is_none());
    }

    #[test]
    fn test_sphere_range_is_exclusive() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, grey());
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        // Roots at 0.5 and 1.5
        assert!(sphere.hit(&ray, 0.0, 0.5, f32::INFINITY).is_some_and(|h| (h.distance - 1.5).abs() < 1e-5));
        assert!(sphere.hit(&ray, 0.0, 0.001, 0.5).is_none());
        assert!(sphere.hit(&ray, 0.0, 1.5, f32::INFINITY).is_none());
    }

    #[test]
    fn test_degenerate_ray_never_hits() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0, grey());
        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, 0.5), Vec3::ZERO);
        assert!(sphere.hit(&ray, 0.0, f32::NEG_INFINITY, f32::INFINITY).is_none());
    }

    #[test]
    fn test_moving_sphere_follows_time() {
        let sphere = Sphere::moving(
            Vec3::new(0.0, 0.0, -5.0),
            Vec3::new(0.0, 2.0, -5.0),
            0.0,
            1.0,
            0.5,
            grey(),
        );
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        assert!(sphere.hit(&ray, 0.0, 0.001, f32::INFINITY).is_some());
        assert!(sphere.hit(&ray, 1.0, 0.001, f32::INFINITY).is_none());
        assert_eq!(sphere.center(0.5), Vec3::new(0.0, 1.0, -5.0));

        let up = Ray::new_simple(Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = sphere.hit(&up, 1.0, 0.001, f32::INFINITY).unwrap();
        assert!((hit.point - Vec3::new(0.0, 2.0, -4.5)).length() < 1e-5);
    }

    #[test]
    fn test_bounding_box_covers_motion() {
        let still = Sphere::new(Vec3::new(1.0, 2.0, 3.0), 1.0, grey());
        let bbox = still.bounding_box(0.0, 1.0).unwrap();
        assert_eq!(bbox.min, Vec3::new(0.0, 1.0, 2.0));
        assert_eq!(bbox.max, Vec3::new(2.0, 3.0, 4.0));

        let moving = Sphere::moving(Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0), 0.0, 1.0, 1.0, grey());
        let bbox = moving.bounding_box(0.0, 1.0).unwrap();
        assert_eq!(bbox.min, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(bbox.max, Vec3::new(5.0, 1.0, 1.0));
    }

    #[test]
    fn test_bounding_box_is_conservative() {
        let mut rng = StdRng::seed_from_u64(77);
        let sphere = Sphere::new(Vec3::new(0.3, -0.2, -4.0), 1.2, grey());
        let bbox = sphere.bounding_box(0.0, 0.0).unwrap();

        let mut hits = 0;
        for _ in 0..2_000 {
            let origin = Vec3::new(
                rng.gen_range(-3.0..3.0),
                rng.gen_range(-3.0..3.0),
                rng.gen_range(0.0..3.0),
            );
            let target = Vec3::new(
                rng.gen_range(-2.0..2.0),
                rng.gen_range(-2.0..2.0),
                rng.gen_range(-6.0..-2.0),
            );
            let ray = Ray::new_simple(origin, target - origin);
            let t_min = rng.gen_range(0.0..2.0);
            let t_max = t_min + rng.gen_range(0.5..10.0);

            if sphere.hit(&ray, 0.0, t_min, t_max).is_some() {
                hits += 1;
                assert!(bbox.ray_intersects(&ray, t_min, t_max));
            }
        }
        assert!(hits > 20, "too few hits ({hits}) to mean anything");
    }

    #[test]
    fn test_sphere_uv() {
        let uv = Sphere::uv(Vec3::Y);
        assert!((uv.y - 1.0).abs() < 1e-6);

        let uv = Sphere::uv(-Vec3::Y);
        assert!(uv.y.abs() < 1e-6);

        let uv = Sphere::uv(-Vec3::X);
        assert!((uv.x - 0.0).abs() < 1e-6 || (uv.x - 1.0).abs() < 1e-6);
        assert!((uv.y - 0.5).abs() < 1e-6);

        let uv = Sphere::uv(Vec3::X);
        assert!((uv.x - 0.5).abs() < 1e-6);
    }
}
