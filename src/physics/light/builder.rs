use bevy::math::Vec2;
use bevy::render::color::Color;

use super::geometry::ObstructionId;
use super::light_source::{LightSource, DEFAULT_NUM_RAYS};

/// Settings shared by every kind of light.
/// Finish with one of the `build_*` methods to pick the kind.
#[derive(Debug, Clone)]
pub struct LightSourceBuilder {
    num_rays: usize,
    color: Color,
    name: String,
    ignore_obstruction: Option<ObstructionId>,
    active: bool,
}

impl Default for LightSourceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LightSourceBuilder {
    /// A white, active, unnamed light with the default number of rays
    pub fn new() -> Self {
        Self {
            num_rays: DEFAULT_NUM_RAYS,
            color: Color::WHITE,
            name: String::new(),
            ignore_obstruction: None,
            active: true,
        }
    }
    /// Clamped to at least three when built
    pub fn num_rays(mut self, num_rays: usize) -> Self {
        self.num_rays = num_rays;
        self
    }
    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
    /// The body the light is attached to, so it does not shadow itself
    pub fn ignore_obstruction(mut self, obstruction: ObstructionId) -> Self {
        self.ignore_obstruction = Some(obstruction);
        self
    }
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    fn finish(self, mut light: LightSource) -> LightSource {
        light.set_color(self.color);
        light.set_name(self.name);
        light.set_ignore_obstruction(self.ignore_obstruction);
        light.set_active(self.active);
        light
    }

    pub fn build_point(self, position: Vec2, radius: f32) -> LightSource {
        let light = LightSource::point(position, self.num_rays, radius);
        self.finish(light)
    }

    /// `direction` and `cone_degree` are in degrees
    pub fn build_cone(
        self,
        position: Vec2,
        radius: f32,
        direction: f32,
        cone_degree: f32,
    ) -> LightSource {
        let light = LightSource::cone(position, self.num_rays, radius, direction, cone_degree);
        self.finish(light)
    }

    /// `direction` is in degrees
    pub fn build_directional(self, direction: f32) -> LightSource {
        let light = LightSource::directional(self.num_rays, direction);
        self.finish(light)
    }
}
