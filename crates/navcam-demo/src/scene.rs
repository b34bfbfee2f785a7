//! A small procedural scene: random crates on the ground and one drone that
//! circles over them.

use glam::Vec3;
use navcam_camera::{EntityId, SceneQuery};
use navcam_math::{Aabb, Ray, RayHit};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use tracing::info;

pub const DRONE: EntityId = EntityId(1);
/// Crates are numbered from here.
pub const FIRST_CRATE: u64 = 100;

const DRONE_RADIUS: f32 = 8.0;
const DRONE_HEIGHT: f32 = 2.5;
const DRONE_HALF_EXTENTS: Vec3 = Vec3::new(0.6, 0.2, 0.6);
/// Radians per second.
const DRONE_ANGULAR_SPEED: f32 = 0.4;

pub struct DemoScene {
    crates: Vec<Aabb>,
    time: f32,
    drone_alive: bool,
}

impl DemoScene {
    pub fn generate(seed: u64, crate_count: usize) -> Self {
        let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
        let crates = (0..crate_count)
            .map(|_| {
                let half = Vec3::new(
                    rng.gen_range(0.3..1.5),
                    rng.gen_range(0.3..2.0),
                    rng.gen_range(0.3..1.5),
                );
                let center = Vec3::new(
                    rng.gen_range(-20.0..20.0),
                    half.y,
                    rng.gen_range(-30.0..-5.0),
                );
                Aabb::from_center_half_extents(center, half)
            })
            .collect::<Vec<_>>();
        info!(seed, crates = crates.len(), "demo scene generated");
        Self {
            crates,
            time: 0.0,
            drone_alive: true,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.time += dt;
    }

    pub fn despawn_drone(&mut self) {
        self.drone_alive = false;
        info!(entity = %DRONE, "drone despawned");
    }

    fn drone_position(&self) -> Option<Vec3> {
        if !self.drone_alive {
            return None;
        }
        let angle = self.time * DRONE_ANGULAR_SPEED;
        Some(Vec3::new(
            angle.cos() * DRONE_RADIUS,
            DRONE_HEIGHT,
            angle.sin() * DRONE_RADIUS - 15.0,
        ))
    }

    fn crate_bounds(&self, entity: EntityId) -> Option<Aabb> {
        let index = entity.0.checked_sub(FIRST_CRATE)?;
        self.crates.get(usize::try_from(index).ok()?).copied()
    }
}

impl SceneQuery for DemoScene {
    fn raycast(&self, ray: &Ray) -> Option<RayHit> {
        let drone = self
            .drone_position()
            .map(|p| Aabb::from_center_half_extents(p, DRONE_HALF_EXTENTS));
        self.crates
            .iter()
            .chain(drone.iter())
            .filter_map(|aabb| aabb.intersect_ray(ray))
            .min_by(f32::total_cmp)
            .map(|t| RayHit {
                point: ray.at(t),
                distance: t,
            })
    }

    fn world_bounds(&self, entity: EntityId) -> Option<Aabb> {
        if entity == DRONE {
            return self
                .drone_position()
                .map(|p| Aabb::from_center_half_extents(p, DRONE_HALF_EXTENTS));
        }
        self.crate_bounds(entity)
    }

    fn position(&self, entity: EntityId) -> Option<Vec3> {
        if entity == DRONE {
            return self.drone_position();
        }
        self.crate_bounds(entity).map(|b| b.center())
    }

    /// Crates only; the drone moves too much to frame.
    fn scene_bounds(&self) -> Option<Aabb> {
        self.crates.iter().copied().reduce(|a, b| a.union(&b))
    }
}
