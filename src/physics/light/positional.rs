//! Positional lights: point and cone lights anchored at a single position.
//!
//! Both kinds keep their ray endpoints relative to the anchor, raycast from the
//! anchor to each endpoint, and build a triangle fan with the anchor as centroid.
//! They only differ in how the endpoints are spread around the anchor.

use bevy::math::Vec2;
use bevy::render::color::Color;

use super::geometry::{nearest_hit, GeometryQuery, ObstructionId};
use super::types::LightVertex;
use crate::physics::util::functions::crossing_number_contains;
use crate::physics::util::mesh::LightMesh;
use crate::physics::util::vectors::RelXyPoint;

/// Cone arcs are never narrower than this many degrees
pub const MIN_CONE_DEGREE: f32 = 0.01;

/// Divides the full circle into `num_rays` steps of `360 / (num_rays - 1)` degrees.
/// The first and last ray both point along 0 degrees, which closes the fan without
/// a gap at the seam.
pub fn point_endpoints(num_rays: usize, radius: f32) -> Vec<RelXyPoint> {
    debug_assert!(num_rays >= 3, "at least 3 rays, got {}", num_rays);
    let step = 360.0 / (num_rays as f32 - 1.0);
    (0..num_rays)
        .map(|i| RelXyPoint::from_polar(radius, (step * i as f32).to_radians()))
        .collect()
}

/// Sweeps from `direction + cone_degree / 2` down to `direction - cone_degree / 2`
/// in `num_rays` even steps. All angles in degrees.
pub fn cone_endpoints(
    num_rays: usize,
    radius: f32,
    direction: f32,
    cone_degree: f32,
) -> Vec<RelXyPoint> {
    debug_assert!(num_rays >= 3, "at least 3 rays, got {}", num_rays);
    (0..num_rays)
        .map(|i| {
            let angle =
                direction + 0.5 * cone_degree - cone_degree * i as f32 / (num_rays as f32 - 1.0);
            RelXyPoint::from_polar(radius, angle.to_radians())
        })
        .collect()
}

/// The arc of a cone light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConeArc {
    /// Where the center ray points, in degrees
    pub direction: f32,
    /// Full width of the arc in degrees
    pub cone_degree: f32,
}

impl ConeArc {
    pub fn new(direction: f32, cone_degree: f32) -> Self {
        Self {
            direction,
            cone_degree: cone_degree.max(MIN_CONE_DEGREE),
        }
    }
}

/// Everything a positional light knows about where it is and how far it reaches
#[derive(Debug, Clone, PartialEq)]
pub struct PositionalShape {
    pub anchor: Vec2,
    pub radius: f32,
    /// Unobstructed ray targets relative to the anchor
    pub endpoints: Vec<RelXyPoint>,
}

impl PositionalShape {
    pub fn new(anchor: Vec2, radius: f32) -> Self {
        Self {
            anchor,
            radius: radius.max(0.0),
            endpoints: Vec::new(),
        }
    }

    /// One nearest-hit query per endpoint, from the anchor to the endpoint in world space
    pub fn cast_rays<W>(
        &self,
        world: &W,
        ignore: Option<ObstructionId>,
        hit_points: &mut Vec<Vec2>,
        hit_fractions: &mut Vec<f32>,
    ) where
        W: GeometryQuery + ?Sized,
    {
        hit_points.clear();
        hit_fractions.clear();
        for endpoint in &self.endpoints {
            let hit = nearest_hit(world, self.anchor, endpoint.to_world(self.anchor), ignore);
            hit_points.push(hit.point);
            hit_fractions.push(hit.fraction);
        }
    }

    /// Centroid first with full attenuation, then one rim vertex per ray faded by
    /// how far the ray got. The fan index list is simply `0..=num_rays`.
    pub fn build_fan(
        &self,
        color: Color,
        hit_points: &[Vec2],
        hit_fractions: &[f32],
        mesh: &mut LightMesh,
    ) {
        mesh.clear();
        let vertices = &mut mesh.vertices;
        let indices = &mut mesh.indices;
        vertices.reserve(hit_points.len() + 1);
        indices.reserve(hit_points.len() + 1);

        vertices.push(LightVertex::new(self.anchor, color, 1.0));
        indices.push(0);
        for (i, (point, fraction)) in hit_points.iter().zip(hit_fractions).enumerate() {
            vertices.push(LightVertex::new(*point, color, 1.0 - fraction));
            indices.push(i as u32 + 1);
        }
    }

    /// Cheap radius reject first, then a crossing-number test over the polygon
    /// running anchor -> hit points -> anchor.
    /// The anchor itself is the fan's centroid and counts as lit whenever the
    /// radius is positive, even though it sits on the polygon's boundary.
    pub fn contains(&self, hit_points: &[Vec2], point: Vec2) -> bool {
        let dst2 = self.anchor.distance_squared(point);
        if self.radius * self.radius <= dst2 {
            return false;
        }
        if dst2 == 0.0 {
            return true;
        }
        let polygon = std::iter::once(self.anchor)
            .chain(hit_points.iter().copied())
            .chain(std::iter::once(self.anchor));
        crossing_number_contains(polygon, point)
    }

    /// The world space rim of the unobstructed light
    pub fn world_endpoints(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.endpoints.iter().map(|e| e.to_world(self.anchor))
    }
}
