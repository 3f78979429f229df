use bevy::math::{Rect, Vec2};
use criterion::{black_box, criterion_group, Criterion};
use raycast_lights::physics::light::{
    geometry::ObstructionId,
    light_source::LightSource,
    occluders::{Occluder, OccluderWorld},
    ray_handler::{RayHandler, RayHandlerBuilder},
};

/// A grid of boxes with a light between every other pair
fn scene(num_lights: usize, num_rays: usize) -> (OccluderWorld, RayHandler) {
    let mut world = OccluderWorld::new(Rect::new(-500.0, -500.0, 500.0, 500.0));
    let mut id = 0;
    for x in -10..10 {
        for y in -10..10 {
            let center = Vec2::new(x as f32 * 50.0, y as f32 * 50.0);
            world.add(
                ObstructionId(id),
                Occluder::Box(Rect::from_center_size(center, Vec2::splat(10.0))),
            );
            id += 1;
        }
    }

    let mut handler = RayHandlerBuilder::new()
        .capacity(num_lights * (num_rays + 1) * 2)
        .build();
    for i in 0..num_lights {
        let column = (i % 20) as f32;
        let row = (i / 20) as f32;
        let position = Vec2::new(column * 50.0 - 475.0, row * 50.0 - 475.0);
        let light = if i % 2 == 0 {
            LightSource::point(position, num_rays, 120.0)
        } else {
            LightSource::cone(position, num_rays, 120.0, i as f32 * 37.0, 60.0)
        };
        handler.add_light(light, &world).unwrap();
    }
    handler
        .add_directional_light(num_rays, 30.0, &world)
        .unwrap();
    (world, handler)
}

fn update(c: &mut Criterion) {
    let (world, mut handler) = scene(64, 256);
    c.bench_function("ray_handler_update", |b| {
        b.iter(|| handler.update(black_box(0.016), &world).unwrap())
    });
}

fn update_parallel(c: &mut Criterion) {
    let (world, mut handler) = scene(64, 256);
    c.bench_function("ray_handler_update_parallel", |b| {
        b.iter(|| handler.update_parallel(black_box(0.016), &world).unwrap())
    });
}

fn is_lit(c: &mut Criterion) {
    let (_, handler) = scene(64, 256);
    let points: Vec<Vec2> = (0..100)
        .map(|i| Vec2::new(i as f32 * 9.0 - 450.0, i as f32 * 7.0 - 350.0))
        .collect();
    c.bench_function("ray_handler_is_lit", |b| {
        b.iter(|| {
            for point in points.iter() {
                black_box(handler.is_lit(*point));
            }
        })
    });
}

criterion_group!(benches, update, update_parallel, is_lit);
