use bevy::math::{Rect, Vec2};
use criterion::{black_box, criterion_group, Criterion};
use raycast_lights::physics::light::{
    geometry::ObstructionId,
    light_source::LightSource,
    occluders::{Occluder, OccluderWorld},
};

fn world() -> OccluderWorld {
    let mut world = OccluderWorld::new(Rect::new(-100.0, -100.0, 100.0, 100.0));
    for i in 0..32u32 {
        let angle = i as f32 / 32.0 * std::f32::consts::TAU;
        world.add(
            ObstructionId(i),
            Occluder::Circle {
                center: Vec2::new(angle.cos(), angle.sin()) * 40.0,
                radius: 3.0,
            },
        );
    }
    world
}

/// Mesh recalculation with clean endpoints, which is the common case each frame
fn calculate_light_mesh(c: &mut Criterion) {
    let world = world();
    let mut point = LightSource::point(Vec2::ZERO, 512, 80.0);
    let mut directional = LightSource::directional(512, 20.0);
    c.bench_function("point_light_mesh", |b| {
        b.iter(|| point.calculate_light_mesh(black_box(&world)))
    });
    c.bench_function("directional_light_mesh", |b| {
        b.iter(|| directional.calculate_light_mesh(black_box(&world)))
    });
}

/// Moving a light every frame forces the endpoints to be rebuilt
fn moving_light(c: &mut Criterion) {
    let world = world();
    let mut light = LightSource::cone(Vec2::ZERO, 512, 80.0, 0.0, 90.0);
    let mut t = 0.0f32;
    c.bench_function("moving_cone_light", |b| {
        b.iter(|| {
            t += 0.01;
            light.set_direction(t * 30.0).unwrap();
            light.update(black_box(0.016), &world);
        })
    });
}

fn contains(c: &mut Criterion) {
    let world = world();
    let mut light = LightSource::point(Vec2::ZERO, 512, 80.0);
    light.calculate_light_mesh(&world);
    let points: Vec<Vec2> = (0..200)
        .map(|i| {
            let angle = i as f32 * 0.37;
            Vec2::new(angle.cos(), angle.sin()) * (i % 90) as f32
        })
        .collect();
    c.bench_function("point_light_contains", |b| {
        b.iter(|| {
            for point in points.iter() {
                black_box(light.contains(*point));
            }
        })
    });
}

criterion_group!(benches, calculate_light_mesh, moving_light, contains);
