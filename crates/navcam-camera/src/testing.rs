//! In-memory scene for unit tests.

use std::collections::BTreeMap;

use glam::Vec3;
use navcam_math::{Aabb, Ray, RayHit};

use crate::scene::{EntityId, SceneQuery};

#[derive(Clone, Debug, Default)]
pub struct TestScene {
    entities: BTreeMap<EntityId, (Vec3, Aabb)>,
    /// Static geometry that is hit by rays but is not an entity.
    boxes: Vec<Aabb>,
}

impl TestScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity with a box of `half_extents` around `position`.
    pub fn with_entity(mut self, id: EntityId, position: Vec3, half_extents: Vec3) -> Self {
        self.entities.insert(
            id,
            (position, Aabb::from_center_half_extents(position, half_extents)),
        );
        self
    }

    pub fn with_box(mut self, aabb: Aabb) -> Self {
        self.boxes.push(aabb);
        self
    }

    pub fn move_entity(&mut self, id: EntityId, position: Vec3) {
        if let Some((pos, bounds)) = self.entities.get_mut(&id) {
            let half = bounds.size() * 0.5;
            *pos = position;
            *bounds = Aabb::from_center_half_extents(position, half);
        }
    }

    pub fn remove(&mut self, id: EntityId) {
        self.entities.remove(&id);
    }
}

impl SceneQuery for TestScene {
    fn raycast(&self, ray: &Ray) -> Option<RayHit> {
        self.entities
            .values()
            .map(|(_, bounds)| bounds)
            .chain(self.boxes.iter())
            .filter_map(|aabb| aabb.intersect_ray(ray))
            .min_by(f32::total_cmp)
            .map(|t| RayHit {
                point: ray.at(t),
                distance: t,
            })
    }

    fn world_bounds(&self, entity: EntityId) -> Option<Aabb> {
        self.entities.get(&entity).map(|(_, bounds)| *bounds)
    }

    fn position(&self, entity: EntityId) -> Option<Vec3> {
        self.entities.get(&entity).map(|(pos, _)| *pos)
    }

    fn scene_bounds(&self) -> Option<Aabb> {
        self.entities
            .values()
            .map(|(_, bounds)| *bounds)
            .chain(self.boxes.iter().copied())
            .reduce(|a, b| a.union(&b))
    }
}
