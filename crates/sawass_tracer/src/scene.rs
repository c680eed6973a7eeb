//! Scene container: owns every entity and answers the aggregate hit query.

use crate::{BvhNode, Hit, Hittable, HittableList, Ray, TracerResult};

/// Collection of entities, flat, BVH-accelerated, or both.
///
/// Entities added with [`Scene::add`] go to a flat list that is scanned
/// linearly. [`Scene::into_bvh`] moves them into a BVH; anything added
/// afterwards is scanned linearly alongside the tree.
#[derive(Default)]
pub struct Scene {
    entities: HittableList,
    bvh: Option<BvhNode>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entities: HittableList::with_capacity(capacity),
            bvh: None,
        }
    }

    /// Wrap an already built BVH.
    pub fn from_bvh(bvh: BvhNode) -> Self {
        Self {
            entities: HittableList::new(),
            bvh: Some(bvh),
        }
    }

    /// Add an entity to the flat list.
    pub fn add<H: Hittable + 'static>(&mut self, entity: H) -> &mut Self {
        self.entities.add(Box::new(entity));
        self
    }

    pub fn add_boxed(&mut self, entity: Box<dyn Hittable>) -> &mut Self {
        self.entities.add(entity);
        self
    }

    /// Rebuild the scene as a BVH over every entity for the shutter interval
    /// `[t0, t1]`.
    ///
    /// A previously built tree becomes a single child object of the new one.
    pub fn into_bvh(mut self, t0: f32, t1: f32) -> TracerResult<Self> {
        let mut objects = self.entities.take();
        if let Some(existing) = self.bvh.take() {
            if !existing.is_empty() {
                objects.push(Box::new(existing));
            }
        }

        Ok(Self::from_bvh(BvhNode::new(objects, t0, t1)?))
    }

    /// Closest hit over all entities with distance in `(t_min, t_max)`.
    pub fn hit(&self, ray: &Ray, time: f32, t_min: f32, t_max: f32) -> Option<Hit<'_>> {
        let tree_hit = self
            .bvh
            .as_ref()
            .and_then(|bvh| bvh.hit(ray, time, t_min, t_max));

        let list_max = tree_hit.as_ref().map_or(t_max, |h| h.distance);
        self.entities.hit(ray, time, t_min, list_max).or(tree_hit)
    }

    /// Number of primitives in the scene, counted through nested trees.
    pub fn len(&self) -> usize {
        self.entities.primitive_count() + self.bvh.as_ref().map_or(0, |bvh| bvh.primitive_count())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once [`Scene::into_bvh`] (or [`Scene::from_bvh`]) has been used.
    pub fn is_accelerated(&self) -> bool {
        self.bvh.is_some()
    }
}
