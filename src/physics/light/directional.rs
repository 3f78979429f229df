//! Directional lights cover the whole world with parallel rays, like sunlight.
//!
//! There is no anchor. Instead a grid of `num_rays` segments is laid across the
//! world bounds, perpendicular to the light direction, and every segment is
//! raycast from its start to its end. The grid origin is snapped to a cell
//! derived from the ray spacing so it stays put when the bounds jitter a little.

use std::iter::once;

use bevy::math::{Rect, Vec2};
use bevy::render::color::Color;

use super::geometry::{nearest_hit, GeometryQuery, ObstructionId};
use super::types::LightVertex;
use crate::physics::util::functions::{crossing_number_contains, snap_ceil, snap_floor};
use crate::physics::util::mesh::LightMesh;

/// Ray segments of a directional light, all in world space
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalShape {
    /// Degrees, measured counter clockwise from +x
    pub direction: f32,
    /// The world bounds the current segments were laid out for
    pub bounds: Option<Rect>,
    pub starts: Vec<Vec2>,
    pub ends: Vec<Vec2>,
}

impl DirectionalShape {
    pub fn new(direction: f32) -> Self {
        Self {
            direction,
            bounds: None,
            starts: Vec::new(),
            ends: Vec::new(),
        }
    }

    /// True when the segments were laid out for different bounds than these
    pub fn is_stale_for(&self, bounds: Rect) -> bool {
        self.bounds != Some(bounds)
    }

    /// Lays out `num_rays` parallel segments across `bounds`.
    ///
    /// Every segment is `2 * size` long where `size = max(width, height)`, and the
    /// segments are spread over `2 * size` perpendicular to the light direction, so
    /// the grid covers the bounds whichever way it is rotated.
    pub fn calculate_endpoints(&mut self, num_rays: usize, bounds: Rect) {
        debug_assert!(num_rays >= 3, "at least 3 rays, got {}", num_rays);
        let size = bounds.width().max(bounds.height());
        let angle = self.direction.to_radians();
        let (sin, cos) = angle.sin_cos();
        let along = Vec2::new(cos, sin) * size;
        let across = Vec2::new(-sin, cos) * size;
        let portion = across * 2.0 / (num_rays as f32 - 1.0);

        let unsnapped = bounds.center() - across;
        let origin = Vec2::new(
            snap_floor(unsnapped.x, 2.0 * portion.x),
            snap_ceil(unsnapped.y, 2.0 * portion.y),
        );

        self.starts.clear();
        self.ends.clear();
        for i in 0..num_rays {
            let grid_point = origin + portion * i as f32;
            self.starts.push(grid_point - along);
            self.ends.push(grid_point + along);
        }
        self.bounds = Some(bounds);
    }

    /// One nearest-hit query per segment. Only the end of each segment is clipped.
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
        for (start, end) in self.starts.iter().zip(&self.ends) {
            let hit = nearest_hit(world, *start, *end, ignore);
            hit_points.push(hit.point);
            hit_fractions.push(hit.fraction);
        }
    }

    /// Interleaved (start, hit) pairs drawn as a strip. Directional light does not fade.
    pub fn build_strip(&self, color: Color, hit_points: &[Vec2], mesh: &mut LightMesh) {
        mesh.clear();
        mesh.vertices.reserve(hit_points.len() * 2);
        mesh.indices.reserve(hit_points.len() * 2);
        for (start, hit) in self.starts.iter().zip(hit_points) {
            let i = mesh.vertices.len() as u32;
            mesh.vertices.push(LightVertex::new(*start, color, 1.0));
            mesh.vertices.push(LightVertex::new(*hit, color, 1.0));
            mesh.indices.push(i);
            mesh.indices.push(i + 1);
        }
    }

    /// Crossing-number test over the lit region: the hit points traced forward,
    /// then the segment starts traced backward, closed at the first hit point.
    pub fn contains(&self, hit_points: &[Vec2], point: Vec2) -> bool {
        let Some(first) = hit_points.first() else {
            return false;
        };
        let polygon = hit_points
            .iter()
            .copied()
            .chain(self.starts.iter().rev().copied())
            .chain(once(*first));
        crossing_number_contains(polygon, point)
    }
}
