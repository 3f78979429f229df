//! A small collision world of static occluders.
//! Implements the geometry query port so lights can be used without a full
//! physics engine, and so tests and benches have something to cast against.

use bevy::ecs::system::Resource;
use bevy::math::{Rect, Vec2};
use itertools::Itertools;

use super::geometry::{GeometryQuery, ObstructionId, RayCandidate};

/// Segments shorter than this are treated as points and never hit anything
const MIN_RAY_LENGTH_SQUARED: f32 = 1e-12;

/// The shapes that can block light
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Occluder {
    /// An occluder in the shape of a circle
    Circle { center: Vec2, radius: f32 },
    /// A single wall
    Segment { start: Vec2, end: Vec2 },
    /// An axis aligned box, hit on any of its four edges
    Box(Rect),
}

impl Occluder {
    /// Every intersection of the segment `origin -> origin + delta` with this shape,
    /// as (fraction, point, normal)
    fn intersections(&self, origin: Vec2, delta: Vec2) -> Vec<(f32, Vec2, Vec2)> {
        let mut hits = Vec::new();
        match *self {
            Occluder::Circle { center, radius } => {
                hits.extend(circle_intersection(origin, delta, center, radius));
            }
            Occluder::Segment { start, end } => {
                hits.extend(segment_intersection(origin, delta, start, end));
            }
            Occluder::Box(rect) => {
                let corners = [
                    rect.min,
                    Vec2::new(rect.max.x, rect.min.y),
                    rect.max,
                    Vec2::new(rect.min.x, rect.max.y),
                ];
                for (start, end) in corners.into_iter().circular_tuple_windows() {
                    hits.extend(segment_intersection(origin, delta, start, end));
                }
            }
        }
        hits
    }
}

/// Ray against circle. A ray starting inside the circle does not hit it,
/// the same as a physics engine would report.
fn circle_intersection(
    origin: Vec2,
    delta: Vec2,
    center: Vec2,
    radius: f32,
) -> Option<(f32, Vec2, Vec2)> {
    let s = origin - center;
    let b = s.length_squared() - radius * radius;
    let rr = delta.length_squared();
    if rr < MIN_RAY_LENGTH_SQUARED || b < 0.0 {
        return None;
    }
    let c = s.dot(delta);
    let sigma = c * c - rr * b;
    if sigma < 0.0 {
        return None;
    }
    let a = -(c + sigma.sqrt());
    if a < 0.0 || a > rr {
        return None;
    }
    let fraction = a / rr;
    let point = origin + delta * fraction;
    Some((fraction, point, (point - center).normalize_or_zero()))
}

/// Ray against line segment. Parallel segments never hit.
fn segment_intersection(
    origin: Vec2,
    delta: Vec2,
    start: Vec2,
    end: Vec2,
) -> Option<(f32, Vec2, Vec2)> {
    if delta.length_squared() < MIN_RAY_LENGTH_SQUARED {
        return None;
    }
    let edge = end - start;
    let denom = delta.perp_dot(edge);
    if denom.abs() <= f32::EPSILON {
        return None;
    }
    let to_start = start - origin;
    let t = to_start.perp_dot(edge) / denom;
    let u = to_start.perp_dot(delta) / denom;
    if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
        return None;
    }
    let mut normal = edge.perp().normalize_or_zero();
    if normal.dot(delta) > 0.0 {
        normal = -normal;
    }
    Some((t, origin + delta * t, normal))
}

/// A world made of static occluders inside a bounding rect
#[derive(Resource, Debug, Clone)]
pub struct OccluderWorld {
    bounds: Rect,
    occluders: Vec<(ObstructionId, Occluder)>,
}

impl OccluderWorld {
    /// An empty world with the given bounds
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            occluders: Vec::new(),
        }
    }

    /// Adds an occluder belonging to the given body
    pub fn add(&mut self, id: ObstructionId, occluder: Occluder) {
        self.occluders.push((id, occluder));
    }

    /// Builder style version of `add`
    pub fn with(mut self, id: ObstructionId, occluder: Occluder) -> Self {
        self.add(id, occluder);
        self
    }

    /// Removes every occluder belonging to the given body
    pub fn remove(&mut self, id: ObstructionId) {
        self.occluders.retain(|(other, _)| *other != id);
    }

    /// Moves every occluder belonging to the body by `offset`
    pub fn translate(&mut self, id: ObstructionId, offset: Vec2) {
        for (other, occluder) in self.occluders.iter_mut() {
            if *other != id {
                continue;
            }
            *occluder = match *occluder {
                Occluder::Circle { center, radius } => Occluder::Circle {
                    center: center + offset,
                    radius,
                },
                Occluder::Segment { start, end } => Occluder::Segment {
                    start: start + offset,
                    end: end + offset,
                },
                Occluder::Box(rect) => Occluder::Box(Rect::from_corners(
                    rect.min + offset,
                    rect.max + offset,
                )),
            };
        }
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    pub fn len(&self) -> usize {
        self.occluders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occluders.is_empty()
    }
}

impl GeometryQuery for OccluderWorld {
    fn cast_ray(
        &self,
        origin: Vec2,
        target: Vec2,
        callback: &mut dyn FnMut(&RayCandidate) -> f32,
    ) {
        let delta = target - origin;
        let mut max_fraction = 1.0;
        for (id, occluder) in &self.occluders {
            for (fraction, point, normal) in occluder.intersections(origin, delta) {
                if fraction > max_fraction {
                    continue;
                }
                let answer = callback(&RayCandidate {
                    obstruction: *id,
                    point,
                    normal,
                    fraction,
                });
                if answer == 0.0 {
                    return;
                }
                if answer > 0.0 {
                    max_fraction = max_fraction.min(answer);
                }
            }
        }
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }
}
