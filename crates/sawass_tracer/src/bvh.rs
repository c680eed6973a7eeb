//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree of boxes built once per scene. A ray that misses a node's
//! box skips the whole subtree, which brings intersection cost down from
//! O(n) to roughly O(log n).

use crate::{Hit, Hittable, Ray, TracerError, TracerResult};
use rand::{Rng, RngCore};
use sawass_math::Aabb;

/// BVH node - either a branch with two children or a leaf with one object.
pub enum BvhNode {
    /// Tree over zero objects; never hit.
    Empty,
    /// A single object and its box over the build interval.
    Leaf {
        object: Box<dyn Hittable>,
        bbox: Aabb,
    },
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
}

/// An object paired with its box, computed once before sorting.
struct Primitive {
    object: Box<dyn Hittable>,
    bbox: Aabb,
}

impl BvhNode {
    /// Build a BVH over `objects` as they move during `[t0, t1]`, splitting
    /// every node along the axis where the node's box is longest.
    ///
    /// Fails if any object cannot produce a bounding box.
    pub fn new(objects: Vec<Box<dyn Hittable>>, t0: f32, t1: f32) -> TracerResult<Self> {
        let primitives = Self::bound(objects, t0, t1)?;
        let count = primitives.len();

        let node = Self::build(primitives, &mut |prims: &[Primitive]| {
            prims
                .iter()
                .fold(Aabb::INVALID, |acc, p| Aabb::surrounding(&acc, &p.bbox))
                .longest_axis()
        });

        log::debug!(
            "Built BVH over {} objects (depth {}, longest-axis split)",
            count,
            node.depth()
        );
        Ok(node)
    }

    /// Same as [`BvhNode::new`] but picks the split axis of every node
    /// uniformly at random from `rng`.
    pub fn with_random_axis(
        objects: Vec<Box<dyn Hittable>>,
        t0: f32,
        t1: f32,
        rng: &mut dyn RngCore,
    ) -> TracerResult<Self> {
        let primitives = Self::bound(objects, t0, t1)?;
        let count = primitives.len();

        let node = Self::build(primitives, &mut |_: &[Primitive]| rng.gen_range(0..3));

        log::debug!(
            "Built BVH over {} objects (depth {}, random split)",
            count,
            node.depth()
        );
        Ok(node)
    }

    /// Query every object's box once; an unbounded object aborts the build.
    fn bound(objects: Vec<Box<dyn Hittable>>, t0: f32, t1: f32) -> TracerResult<Vec<Primitive>> {
        objects
            .into_iter()
            .enumerate()
            .map(|(index, object)| match object.bounding_box(t0, t1) {
                Some(bbox) => Ok(Primitive { object, bbox }),
                None => Err(TracerError::MissingBoundingBox { index, t0, t1 }),
            })
            .collect()
    }

    /// Recursive construction: sort by the box minimum along the chosen axis,
    /// split at the midpoint, recurse.
    fn build(
        mut primitives: Vec<Primitive>,
        choose_axis: &mut dyn FnMut(&[Primitive]) -> usize,
    ) -> Self {
        if primitives.len() <= 1 {
            return match primitives.pop() {
                Some(Primitive { object, bbox }) => BvhNode::Leaf { object, bbox },
                None => BvhNode::Empty,
            };
        }

        let axis = choose_axis(&primitives);
        primitives.sort_by(|a, b| a.bbox.min_on(axis).total_cmp(&b.bbox.min_on(axis)));

        let right_primitives = primitives.split_off(primitives.len() / 2);
        let left = Self::build(primitives, choose_axis);
        let right = Self::build(right_primitives, choose_axis);
        let bbox = Aabb::surrounding(&left.bbox(), &right.bbox());

        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox,
        }
    }

    /// Box of this node; [`Aabb::INVALID`] for an empty tree.
    pub fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Empty => Aabb::INVALID,
            BvhNode::Leaf { bbox, .. } | BvhNode::Branch { bbox, .. } => *bbox,
        }
    }

    /// Number of leaves; a nested tree in a leaf counts once.
    pub fn len(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => left.len() + right.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, BvhNode::Empty)
    }

    /// Number of node levels; 0 for an empty tree.
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

impl Hittable for BvhNode {
    fn hit(&self, ray: &Ray, time: f32, t_min: f32, t_max: f32) -> Option<Hit<'_>> {
        match self {
            BvhNode::Empty => None,

            BvhNode::Leaf { object, bbox } => {
                if !bbox.ray_intersects(ray, t_min, t_max) {
                    return None;
                }
                object.hit(ray, time, t_min, t_max)
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.ray_intersects(ray, t_min, t_max) {
                    return None;
                }

                let hit_left = left.hit(ray, time, t_min, t_max);

                // Only check right up to closest hit
                let right_max = hit_left.as_ref().map_or(t_max, |h| h.distance);
                let hit_right = right.hit(ray, time, t_min, right_max);

                hit_right.or(hit_left)
            }
        }
    }

    fn bounding_box(&self, _t0: f32, _t1: f32) -> Option<Aabb> {
        match self {
            BvhNode::Empty => None,
            _ => Some(self.bbox()),
        }
    }

    fn primitive_count(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { object, .. } => object.primitive_count(),
            BvhNode::Branch { left, right, .. } => {
                left.primitive_count() + right.primitive_count()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HittableList, Material, Sphere};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use sawass_math::{Color, Vec3};

    /// Geometry with no finite extent.
    struct Unbounded;

    impl Hittable for Unbounded {
        fn hit(&self, _ray: &Ray, _time: f32, _t_min: f32, _t_max: f32) -> Option<Hit<'_>> {
            None
        }

        fn bounding_box(&self, _t0: f32, _t1: f32) -> Option<Aabb> {
            None
        }
    }

    fn random_spheres(rng: &mut StdRng, count: usize) -> Vec<Sphere> {
        (0..count)
            .map(|i| {
                let center = Vec3::new(
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                );
                let radius = rng.gen_range(0.1..1.5);
                // Distinct albedo per sphere so the material identifies the hit
                let material = Material::metal(Color::new(i as f32, 0.0, 0.0), 0.0);
                Sphere::new(center, radius, material)
            })
            .collect()
    }

    fn boxed(spheres: &[Sphere]) -> Vec<Box<dyn Hittable>> {
        spheres
            .iter()
            .cloned()
            .map(|s| Box::new(s) as Box<dyn Hittable>)
            .collect()
    }

    /// The trees hold clones, so spheres are told apart by their albedo.
    fn sphere_id(material: &Material) -> f32 {
        match material {
            Material::Metal { albedo, .. } => albedo.x,
            other => panic!("unexpected material {other:?}"),
        }
    }

    fn random_ray(rng: &mut StdRng) -> Ray {
        let origin = Vec3::new(
            rng.gen_range(-15.0..15.0),
            rng.gen_range(-15.0..15.0),
            rng.gen_range(-15.0..15.0),
        );
        let target = Vec3::new(
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-10.0..10.0),
        );
        Ray::new_simple(origin, target - origin)
    }

    fn assert_same_hits(bvh: &BvhNode, linear: &HittableList, rng: &mut StdRng) {
        let mut hits = 0;
        for _ in 0..2_000 {
            let ray = random_ray(rng);
            let t_min = rng.gen_range(0.0..5.0);
            let t_max = if rng.gen_bool(0.3) {
                f32::INFINITY
            } else {
                t_min + rng.gen_range(0.1..30.0)
            };

            let expected = linear.hit(&ray, 0.0, t_min, t_max);
            let actual = bvh.hit(&ray, 0.0, t_min, t_max);

            match (expected, actual) {
                (None, None) => {}
                (Some(e), Some(a)) => {
                    hits += 1;
                    assert_eq!(e.distance, a.distance);
                    assert_eq!(e.point, a.point);
                    assert_eq!(sphere_id(e.material), sphere_id(a.material));
                }
                (e, a) => panic!(
                    "BVH disagrees with linear scan: expected {:?}, got {:?}",
                    e.map(|h| h.distance),
                    a.map(|h| h.distance)
                ),
            }
        }
        assert!(hits > 100, "only {hits} hits, test is not exercising the tree");
    }

    #[test]
    fn test_bvh_empty() {
        let bvh = BvhNode::new(vec![], 0.0, 1.0).unwrap();
        assert!(bvh.is_empty());
        assert_eq!(bvh.len(), 0);

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::X);
        assert!(bvh.hit(&ray, 0.0, 0.001, f32::INFINITY).is_none());
        assert!(bvh.bounding_box(0.0, 1.0).is_none());
    }

    #[test]
    fn test_bvh_single_sphere() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, Material::lambertian(Color::splat(0.5)));
        let bvh = BvhNode::new(vec![Box::new(sphere)], 0.0, 1.0).unwrap();

        // Should create a leaf
        assert!(matches!(bvh, BvhNode::Leaf { .. }));

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let hit = bvh.hit(&ray, 0.0, 0.001, f32::INFINITY).unwrap();
        assert!((hit.distance - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_bvh_two_spheres_are_two_leaves() {
        let grey = Material::lambertian(Color::splat(0.5));
        let objects: Vec<Box<dyn Hittable>> = vec![
            Box::new(Sphere::new(Vec3::new(3.0, 0.0, 0.0), 0.5, grey.clone())),
            Box::new(Sphere::new(Vec3::new(-3.0, 0.0, 0.0), 0.5, grey)),
        ];
        let bvh = BvhNode::new(objects, 0.0, 1.0).unwrap();

        match &bvh {
            BvhNode::Branch { left, right, bbox } => {
                assert!(matches!(**left, BvhNode::Leaf { .. }));
                assert!(matches!(**right, BvhNode::Leaf { .. }));
                // Sorted by box minimum along X
                assert_eq!(left.bbox().min.x, -3.5);
                assert_eq!(bbox.min, Vec3::new(-3.5, -0.5, -0.5));
                assert_eq!(bbox.max, Vec3::new(3.5, 0.5, 0.5));
            }
            _ => panic!("expected a branch"),
        }
    }

    #[test]
    fn test_bvh_multiple_spheres() {
        let spheres: Vec<Box<dyn Hittable>> = (0..10)
            .map(|i| {
                let sphere = Sphere::new(
                    Vec3::new(i as f32, 0.0, -5.0),
                    0.5,
                    Material::lambertian(Color::splat(0.5)),
                );
                Box::new(sphere) as Box<dyn Hittable>
            })
            .collect();

        let bvh = BvhNode::new(spheres, 0.0, 1.0).unwrap();
        assert_eq!(bvh.len(), 10);
        assert!(bvh.depth() <= 5);

        // Test ray that hits sphere at x=5
        let ray = Ray::new_simple(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = bvh.hit(&ray, 0.0, 0.001, f32::INFINITY).unwrap();

        // Hit point should be near z = -4.5 (sphere at z=-5, radius 0.5)
        assert!((hit.point.z - (-4.5)).abs() < 0.01);
    }

    #[test]
    fn test_bvh_matches_linear_scan() {
        let mut rng = StdRng::seed_from_u64(2024);
        for count in [1, 2, 3, 7, 64, 257] {
            let spheres = random_spheres(&mut rng, count);
            let linear = HittableList::from(boxed(&spheres));
            let bvh = BvhNode::new(boxed(&spheres), 0.0, 1.0).unwrap();
            assert_eq!(bvh.len(), count);
            if count >= 64 {
                assert_same_hits(&bvh, &linear, &mut rng);
            }
        }
    }

    #[test]
    fn test_nested_tree_counts_primitives() {
        let mut rng = StdRng::seed_from_u64(31);
        let inner = BvhNode::new(boxed(&random_spheres(&mut rng, 12)), 0.0, 1.0).unwrap();

        let mut objects = boxed(&random_spheres(&mut rng, 3));
        objects.push(Box::new(inner));
        let outer = BvhNode::new(objects, 0.0, 1.0).unwrap();

        assert_eq!(outer.len(), 4);
        assert_eq!(outer.primitive_count(), 15);
        assert_eq!(BvhNode::Empty.primitive_count(), 0);
        assert_eq!(HittableList::from(boxed(&random_spheres(&mut rng, 5))).primitive_count(), 5);
    }

    #[test]
    fn test_random_axis_bvh_matches_linear_scan() {
        let mut rng = StdRng::seed_from_u64(7);
        let spheres = random_spheres(&mut rng, 150);
        let linear = HittableList::from(boxed(&spheres));
        let bvh = BvhNode::with_random_axis(boxed(&spheres), 0.0, 1.0, &mut rng).unwrap();

        assert_eq!(bvh.len(), 150);
        assert_same_hits(&bvh, &linear, &mut rng);
    }

    #[test]
    fn test_bvh_with_moving_spheres() {
        let grey = Material::lambertian(Color::splat(0.5));
        let objects: Vec<Box<dyn Hittable>> = vec![
            Box::new(Sphere::moving(
                Vec3::new(0.0, 0.0, -5.0),
                Vec3::new(0.0, 3.0, -5.0),
                0.0,
                1.0,
                0.5,
                grey.clone(),
            )),
            Box::new(Sphere::new(Vec3::new(10.0, 0.0, -5.0), 0.5, grey)),
        ];
        let bvh = BvhNode::new(objects, 0.0, 1.0).unwrap();

        // The node box must cover the sphere at the end of the shutter.
        let ray = Ray::new_simple(Vec3::new(0.0, 3.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(bvh.hit(&ray, 1.0, 0.001, f32::INFINITY).is_some());
        assert!(bvh.hit(&ray, 0.0, 0.001, f32::INFINITY).is_none());
    }

    #[test]
    fn test_bvh_rejects_unbounded_object() {
        let grey = Material::lambertian(Color::splat(0.5));
        let objects: Vec<Box<dyn Hittable>> = vec![
            Box::new(Sphere::new(Vec3::ZERO, 1.0, grey)),
            Box::new(Unbounded),
        ];

        match BvhNode::new(objects, 0.0, 1.0) {
            Err(TracerError::MissingBoundingBox { index, .. }) => assert_eq!(index, 1),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("BVH accepted an unbounded object"),
        }
    }
}
