//! Types for light physics.

use bevy::{math::Vec2, render::color::Color};
use bytemuck::{Pod, Zeroable};
use strum_macros::{Display, EnumIter};

/// A single vertex of a light mesh, laid out for direct upload to a vertex buffer.
/// The renderer fades intensity with `attenuation`, which is `1 - hit_fraction`
/// for positional rim vertices and 1.0 everywhere else.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Default, Pod, Zeroable)]
pub struct LightVertex {
    /// Position in world space, or render space once packed by the ray handler
    pub position: Vec2,
    /// RGBA components of the light color
    pub color: [f32; 4],
    /// In [0, 1]
    pub attenuation: f32,
}

impl LightVertex {
    pub fn new(position: Vec2, color: Color, attenuation: f32) -> Self {
        Self {
            position,
            color: color.as_rgba_f32(),
            attenuation,
        }
    }

    /// Same vertex with its position multiplied by `scale`
    pub fn scaled(self, scale: f32) -> Self {
        Self {
            position: self.position * scale,
            ..self
        }
    }
}

/// How the renderer should interpret a light's index list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Topology {
    /// Centroid first, then the rim. Used by positional lights.
    Fan,
    /// Interleaved start/end pairs. Used by directional lights.
    Strip,
}

/// The closed set of light kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum LightKindTag {
    Point,
    Cone,
    Directional,
}

impl LightKindTag {
    /// Positional lights are anchored at a point and drawn as a fan
    pub fn is_positional(&self) -> bool {
        matches!(self, LightKindTag::Point | LightKindTag::Cone)
    }

    pub fn topology(&self) -> Topology {
        if self.is_positional() {
            Topology::Fan
        } else {
            Topology::Strip
        }
    }
}

/// Whether a light's ray endpoints are up to date with its shape parameters.
/// Only shape mutating setters move a light to `Dirty`, and only an endpoint
/// recompute moves it back to `Clean`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndpointState {
    Clean,
    #[default]
    Dirty,
}

impl EndpointState {
    pub fn is_dirty(&self) -> bool {
        matches!(self, EndpointState::Dirty)
    }
}

/// One draw call for the renderer: draw `count` indices starting at `offset`
/// of the shared index buffer with the given topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCommand {
    pub topology: Topology,
    pub count: usize,
    pub offset: usize,
}
