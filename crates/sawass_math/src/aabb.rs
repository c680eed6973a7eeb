use crate::{Ray, Vec3};

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// Defined by its minimum and maximum corners. Every constructor except
/// [`Aabb::INVALID`] guarantees `min[i] <= max[i]` on all three axes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// The empty box: `min = +inf`, `max = -inf`.
    ///
    /// Deliberately inverted so it is the identity of [`Aabb::surrounding`];
    /// folding any sequence of boxes starting from it yields their union.
    pub const INVALID: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create an AABB from its corners. Components are reordered so the
    /// result is always valid.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self::from_points(min, max)
    }

    /// Create an AABB from two arbitrary corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Box of half-extent `radius` around `center`.
    pub fn around(center: Vec3, radius: f32) -> Self {
        let r = Vec3::splat(radius.abs());
        Self {
            min: center - r,
            max: center + r,
        }
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            min: box0.min.min(box1.min),
            max: box0.max.max(box1.max),
        }
    }

    /// True unless this is (or was folded only from) [`Aabb::INVALID`].
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    /// Minimum corner coordinate along `axis` (0=X, 1=Y, 2=Z).
    #[inline]
    pub fn min_on(&self, axis: usize) -> f32 {
        self.min[axis]
    }

    /// Size along each axis.
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    pub fn longest_axis(&self) -> usize {
        let e = self.extent();
        if e.x > e.y && e.x > e.z {
            0
        } else if e.y > e.z {
            1
        } else {
            2
        }
    }

    /// Test if a ray intersects this AABB within `(t_min, t_max)`.
    ///
    /// Uses the slab method: each axis narrows the parametric range and the
    /// test fails as soon as the range becomes empty.
    pub fn ray_intersects(&self, ray: &Ray, mut t_min: f32, mut t_max: f32) -> bool {
        let origin = ray.origin();
        let direction = ray.direction();

        for axis in 0..3 {
            let inv_d = 1.0 / direction[axis];
            let mut t0 = (self.min[axis] - origin[axis]) * inv_d;
            let mut t1 = (self.max[axis] - origin[axis]) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            // f32::max/min ignore a NaN operand, which keeps the current
            // range when the origin lies exactly on a slab of a parallel ray.
            t_min = t0.max(t_min);
            t_max = t1.min(t_max);
            if t_max <= t_min {
                return false;
            }
        }

        true
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::INVALID
    }
}
