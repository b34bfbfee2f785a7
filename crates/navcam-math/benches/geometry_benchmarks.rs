use criterion::{Criterion, black_box, criterion_group, criterion_main};
use glam::{Quat, Vec3};
use navcam_math::*;

fn bench_look_rotation(c: &mut Criterion) {
    let dir = black_box(Vec3::new(0.3, -0.4, -0.8));
    c.bench_function("look_rotation", |bencher| {
        bencher.iter(|| black_box(look_rotation(dir, Vec3::Y)))
    });
}

fn bench_angle_between(c: &mut Criterion) {
    let a = black_box(Quat::from_rotation_y(0.4));
    let b = black_box(Quat::from_rotation_x(-0.2) * Quat::from_rotation_y(0.41));
    c.bench_function("angle_between_deg", |bencher| {
        bencher.iter(|| black_box(angle_between_deg(a, b)))
    });
}

fn bench_ray_aabb(c: &mut Criterion) {
    let aabb = black_box(Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(2.0)));
    let ray = black_box(Ray::new(Vec3::new(0.5, 8.0, 12.0), Vec3::new(0.0, -0.5, -1.0)));
    c.bench_function("aabb_intersect_ray", |bencher| {
        bencher.iter(|| black_box(aabb.intersect_ray(&ray)))
    });
}

fn bench_ground_plane(c: &mut Criterion) {
    let ray = black_box(Ray::new(Vec3::new(0.0, 20.0, 5.0), Vec3::new(0.1, -1.0, -0.3)));
    c.bench_function("ground_plane_raycast", |bencher| {
        bencher.iter(|| black_box(Plane::GROUND.raycast(&ray)))
    });
}

criterion_group!(
    benches,
    bench_look_rotation,
    bench_angle_between,
    bench_ray_aabb,
    bench_ground_plane
);
criterion_main!(benches);
