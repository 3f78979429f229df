//! A single light source and its per frame recompute.
//!
//! Every light goes through the same steps each frame: refresh its ray endpoints
//! if its shape changed, raycast once per ray, then rebuild its mesh from the hits.
//! The endpoint refresh is gated by [`EndpointState`]: shape setters only mark the
//! light dirty, and only [`LightSource::calculate_endpoints`] marks it clean.

use std::fmt;

use bevy::log::{trace, warn};
use bevy::math::{Rect, Vec2};
use bevy::render::color::Color;

use super::directional::DirectionalShape;
use super::errors::WrongLightKindError;
use super::geometry::{GeometryQuery, ObstructionId};
use super::positional::{
    cone_endpoints, point_endpoints, ConeArc, PositionalShape, MIN_CONE_DEGREE,
};
use super::types::{EndpointState, LightKindTag, Topology};
use crate::physics::util::functions::circle_intersects_rect;
use crate::physics::util::mesh::LightMesh;

/// Rays cast by a light when nobody says otherwise
pub const DEFAULT_NUM_RAYS: usize = 100;
/// Fewer rays than this can not enclose an area
pub const MIN_NUM_RAYS: usize = 3;

/// The shape specific state of each kind of light
#[derive(Debug, Clone, PartialEq)]
pub enum LightKind {
    /// Rays in every direction around an anchor
    Point(PositionalShape),
    /// Rays over an arc around an anchor
    Cone {
        shape: PositionalShape,
        arc: ConeArc,
    },
    /// Parallel rays over the whole world
    Directional(DirectionalShape),
}

impl LightKind {
    pub fn tag(&self) -> LightKindTag {
        match self {
            LightKind::Point(_) => LightKindTag::Point,
            LightKind::Cone { .. } => LightKindTag::Cone,
            LightKind::Directional(_) => LightKindTag::Directional,
        }
    }

    fn positional(&self) -> Option<&PositionalShape> {
        match self {
            LightKind::Point(shape) | LightKind::Cone { shape, .. } => Some(shape),
            LightKind::Directional(_) => None,
        }
    }

    fn positional_mut(&mut self) -> Option<&mut PositionalShape> {
        match self {
            LightKind::Point(shape) | LightKind::Cone { shape, .. } => Some(shape),
            LightKind::Directional(_) => None,
        }
    }
}

fn clamp_num_rays(num_rays: usize) -> usize {
    if num_rays < MIN_NUM_RAYS {
        warn!(
            "A light needs at least {} rays, got {}. Clamping.",
            MIN_NUM_RAYS, num_rays
        );
        return MIN_NUM_RAYS;
    }
    num_rays
}

fn clamp_radius(radius: f32) -> f32 {
    if radius < 0.0 {
        warn!("Negative light radius {}, the light will be empty", radius);
        return 0.0;
    }
    radius
}

fn clamp_cone_degree(cone_degree: f32) -> f32 {
    if cone_degree < MIN_CONE_DEGREE {
        warn!(
            "Cone degree {} is below {}. Clamping.",
            cone_degree, MIN_CONE_DEGREE
        );
        return MIN_CONE_DEGREE;
    }
    cone_degree
}

/// A light that raycasts against a [`GeometryQuery`] and keeps the resulting mesh
#[derive(Debug, Clone, PartialEq)]
pub struct LightSource {
    kind: LightKind,
    num_rays: usize,
    color: Color,
    state: EndpointState,
    active: bool,
    name: String,
    ignore_obstruction: Option<ObstructionId>,
    hit_points: Vec<Vec2>,
    hit_fractions: Vec<f32>,
    mesh: LightMesh,
}

/* ======================================
 * Construction
 * ====================================== */
impl LightSource {
    /// Creates a light of the given kind. Its endpoints start out dirty.
    pub fn new(kind: LightKind, num_rays: usize) -> Self {
        let topology = kind.tag().topology();
        Self {
            kind,
            num_rays: clamp_num_rays(num_rays),
            color: Color::WHITE,
            state: EndpointState::Dirty,
            active: true,
            name: String::new(),
            ignore_obstruction: None,
            hit_points: Vec::new(),
            hit_fractions: Vec::new(),
            mesh: LightMesh::empty(topology),
        }
    }

    pub fn point(position: Vec2, num_rays: usize, radius: f32) -> Self {
        Self::new(
            LightKind::Point(PositionalShape::new(position, clamp_radius(radius))),
            num_rays,
        )
    }

    /// `direction` and `cone_degree` are in degrees
    pub fn cone(
        position: Vec2,
        num_rays: usize,
        radius: f32,
        direction: f32,
        cone_degree: f32,
    ) -> Self {
        Self::new(
            LightKind::Cone {
                shape: PositionalShape::new(position, clamp_radius(radius)),
                arc: ConeArc::new(direction, clamp_cone_degree(cone_degree)),
            },
            num_rays,
        )
    }

    /// `direction` is in degrees
    pub fn directional(num_rays: usize, direction: f32) -> Self {
        Self::new(
            LightKind::Directional(DirectionalShape::new(direction)),
            num_rays,
        )
    }
}

/* ======================================
 * Per frame recompute
 * ====================================== */
impl LightSource {
    /// Rebuilds the ray endpoints from the current shape parameters and marks
    /// the light clean. Directional lights lay their rays over `world.bounds()`.
    pub fn calculate_endpoints<W>(&mut self, world: &W)
    where
        W: GeometryQuery + ?Sized,
    {
        let num_rays = self.num_rays;
        match &mut self.kind {
            LightKind::Point(shape) => {
                shape.endpoints = point_endpoints(num_rays, shape.radius);
            }
            LightKind::Cone { shape, arc } => {
                shape.endpoints =
                    cone_endpoints(num_rays, shape.radius, arc.direction, arc.cone_degree);
            }
            LightKind::Directional(shape) => {
                shape.calculate_endpoints(num_rays, world.bounds());
            }
        }
        trace!("Recalculated endpoints of {}", self);
        self.state = EndpointState::Clean;
    }

    /// Raycasts every ray against `world` and rebuilds the mesh from the hits.
    /// Endpoints are refreshed first if the light is dirty, so a mesh is never
    /// built from stale endpoints.
    pub fn calculate_light_mesh<W>(&mut self, world: &W)
    where
        W: GeometryQuery + ?Sized,
    {
        if let LightKind::Directional(shape) = &self.kind {
            if shape.is_stale_for(world.bounds()) {
                self.state = EndpointState::Dirty;
            }
        }
        if self.state.is_dirty() {
            self.calculate_endpoints(world);
        }

        let ignore = self.ignore_obstruction;
        match &self.kind {
            LightKind::Point(shape) | LightKind::Cone { shape, .. } => {
                shape.cast_rays(world, ignore, &mut self.hit_points, &mut self.hit_fractions);
                shape.build_fan(
                    self.color,
                    &self.hit_points,
                    &self.hit_fractions,
                    &mut self.mesh,
                );
            }
            LightKind::Directional(shape) => {
                shape.cast_rays(world, ignore, &mut self.hit_points, &mut self.hit_fractions);
                shape.build_strip(self.color, &self.hit_points, &mut self.mesh);
            }
        }
    }

    /// Called once per frame
    pub fn update<W>(&mut self, _delta_seconds: f32, world: &W)
    where
        W: GeometryQuery + ?Sized,
    {
        self.calculate_light_mesh(world);
    }

    /// Is the point inside the lit area from the last mesh calculation?
    pub fn contains(&self, point: Vec2) -> bool {
        match &self.kind {
            LightKind::Point(shape) | LightKind::Cone { shape, .. } => {
                shape.contains(&self.hit_points, point)
            }
            LightKind::Directional(shape) => shape.contains(&self.hit_points, point),
        }
    }

    /// Could this light reach anything inside `rect`?
    /// Directional lights cover the whole world so they always can.
    pub fn intersects(&self, rect: Rect) -> bool {
        match self.kind.positional() {
            Some(shape) => circle_intersects_rect(shape.anchor, shape.radius, rect),
            None => true,
        }
    }
}

/* ======================================
 * Getters
 * ====================================== */
impl LightSource {
    pub fn get_kind(&self) -> &LightKind {
        &self.kind
    }
    pub fn get_kind_tag(&self) -> LightKindTag {
        self.kind.tag()
    }
    /// Point and cone lights are positional, directional lights are not
    pub fn is_positional(&self) -> bool {
        self.kind.tag().is_positional()
    }
    pub fn get_topology(&self) -> Topology {
        self.mesh.topology
    }
    pub fn get_num_rays(&self) -> usize {
        self.num_rays
    }
    pub fn get_color(&self) -> Color {
        self.color
    }
    pub fn get_state(&self) -> EndpointState {
        self.state
    }
    pub fn is_dirty(&self) -> bool {
        self.state.is_dirty()
    }
    pub fn is_active(&self) -> bool {
        self.active
    }
    pub fn get_name(&self) -> &str {
        &self.name
    }
    pub fn get_ignore_obstruction(&self) -> Option<ObstructionId> {
        self.ignore_obstruction
    }
    /// Where each ray stopped, from the last mesh calculation
    pub fn get_hit_points(&self) -> &[Vec2] {
        &self.hit_points
    }
    /// How far along each ray it got before stopping, 1.0 when unobstructed
    pub fn get_hit_fractions(&self) -> &[f32] {
        &self.hit_fractions
    }
    pub fn get_mesh(&self) -> &LightMesh {
        &self.mesh
    }
    /// The anchor of a positional light
    pub fn get_position(&self) -> Option<Vec2> {
        self.kind.positional().map(|shape| shape.anchor)
    }
    pub fn get_radius(&self) -> Option<f32> {
        self.kind.positional().map(|shape| shape.radius)
    }
    /// In degrees, for cone and directional lights
    pub fn get_direction(&self) -> Option<f32> {
        match &self.kind {
            LightKind::Cone { arc, .. } => Some(arc.direction),
            LightKind::Directional(shape) => Some(shape.direction),
            LightKind::Point(_) => None,
        }
    }
    pub fn get_cone_degree(&self) -> Option<f32> {
        match &self.kind {
            LightKind::Cone { arc, .. } => Some(arc.cone_degree),
            _ => None,
        }
    }
}

/* ======================================
 * Setters
 * Anything that changes the shape marks the light dirty
 * ====================================== */
impl LightSource {
    /// Takes effect on the next mesh calculation without touching the endpoints
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn set_num_rays(&mut self, num_rays: usize) {
        self.num_rays = clamp_num_rays(num_rays);
        self.state = EndpointState::Dirty;
    }

    /// Moves the anchor of a positional light
    pub fn set_position(&mut self, position: Vec2) -> Result<(), WrongLightKindError> {
        let found = self.kind.tag();
        let shape = self.kind.positional_mut().ok_or(WrongLightKindError {
            operation: "set_position",
            found,
        })?;
        shape.anchor = position;
        self.state = EndpointState::Dirty;
        Ok(())
    }

    /// Negative radii are clamped to zero, which gives an empty light
    pub fn set_radius(&mut self, radius: f32) -> Result<(), WrongLightKindError> {
        let found = self.kind.tag();
        let shape = self.kind.positional_mut().ok_or(WrongLightKindError {
            operation: "set_radius",
            found,
        })?;
        shape.radius = clamp_radius(radius);
        self.state = EndpointState::Dirty;
        Ok(())
    }

    /// In degrees, for cone and directional lights
    pub fn set_direction(&mut self, direction: f32) -> Result<(), WrongLightKindError> {
        match &mut self.kind {
            LightKind::Cone { arc, .. } => arc.direction = direction,
            LightKind::Directional(shape) => shape.direction = direction,
            LightKind::Point(_) => {
                return Err(WrongLightKindError {
                    operation: "set_direction",
                    found: LightKindTag::Point,
                })
            }
        }
        self.state = EndpointState::Dirty;
        Ok(())
    }

    /// Arcs narrower than [`MIN_CONE_DEGREE`] are widened to it
    pub fn set_cone_degree(&mut self, cone_degree: f32) -> Result<(), WrongLightKindError> {
        let found = self.kind.tag();
        let LightKind::Cone { arc, .. } = &mut self.kind else {
            return Err(WrongLightKindError {
                operation: "set_cone_degree",
                found,
            });
        };
        arc.cone_degree = clamp_cone_degree(cone_degree);
        self.state = EndpointState::Dirty;
        Ok(())
    }

    /// Inactive lights are skipped by the ray handler
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Rays pass straight through this body, usually the one the light is attached to
    pub fn set_ignore_obstruction(&mut self, obstruction: Option<ObstructionId>) {
        self.ignore_obstruction = obstruction;
    }
}

impl fmt::Display for LightSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = if self.name.is_empty() {
            "unnamed"
        } else {
            self.name.as_str()
        };
        let activity = if self.active { "active" } else { "inactive" };
        match self.get_position() {
            Some(position) => write!(
                f,
                "[Light {}: {} at ({}, {}), {}]",
                name,
                self.kind.tag(),
                position.x,
                position.y,
                activity
            ),
            None => write!(f, "[Light {}: {}, {}]", name, self.kind.tag(), activity),
        }
    }
}
